use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Backend user identifier (opaque string).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reject an empty id before it reaches a `/{user_id}` URL.
    pub(crate) fn require(&self) -> Result<&str, crate::error::Error> {
        if self.0.is_empty() {
            return Err(crate::error::Error::MissingUserId);
        }
        Ok(&self.0)
    }
}

/// Tenant database identifier, sent to `/auth/instance` on selection.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct DbId(pub String);

/// Which of the two bearer credentials an operation needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenKind {
    #[display("access")]
    Access,
    #[display("refresh")]
    Refresh,
}

/// Email/password pair for the first login step. Never persisted.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Token pair returned by login, instance selection and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Front-end role carried by a tenant binding.
///
/// Unknown role strings are kept as [`Role::Other`] and never satisfy a
/// route requirement naming a known role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Supervisor,
    Saler,
    Buyer,
    NotAllow,
    Other(String),
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Supervisor => "supervisor",
            Self::Saler => "saler",
            Self::Buyer => "buyer",
            Self::NotAllow => "notallow",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "supervisor" => Self::Supervisor,
            "saler" => Self::Saler,
            "buyer" => Self::Buyer,
            "notallow" => Self::NotAllow,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<Role> for String {
    fn from(r: Role) -> Self {
        match r {
            Role::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

/// Session payload as returned by `GET /backend/session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub user_id: UserId,
    pub email: String,
    #[serde(default)]
    pub is_root: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_id: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_back: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_front: Option<Role>,
}

/// Who the session belongs to, independent of tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub is_root: bool,
}

/// Whether a tenant instance has been selected for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantBinding {
    Unbound,
    Bound {
        db_id: Option<DbId>,
        instance_name: String,
        role_back: Option<Role>,
        role_front: Option<Role>,
    },
}

/// Resolved session: identity plus tenant binding.
///
/// Built from [`SessionData`]; the binding is `Bound` only when the backend
/// reported a non-empty `instanceName`, and role fields are discarded otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Identity,
    pub tenant: TenantBinding,
}

impl Session {
    #[must_use]
    pub fn is_bound(&self) -> bool {
        matches!(self.tenant, TenantBinding::Bound { .. })
    }

    /// Front-end role of a bound session.
    #[must_use]
    pub fn role_front(&self) -> Option<&Role> {
        match &self.tenant {
            TenantBinding::Bound { role_front, .. } => role_front.as_ref(),
            TenantBinding::Unbound => None,
        }
    }

    #[must_use]
    pub fn instance_name(&self) -> Option<&str> {
        match &self.tenant {
            TenantBinding::Bound { instance_name, .. } => Some(instance_name),
            TenantBinding::Unbound => None,
        }
    }

    #[must_use]
    pub fn stage(&self) -> AuthStage {
        if self.is_bound() {
            AuthStage::AuthenticatedBound
        } else {
            AuthStage::AuthenticatedNoTenant
        }
    }
}

impl From<SessionData> for Session {
    fn from(data: SessionData) -> Self {
        let identity = Identity {
            user_id: data.user_id,
            email: data.email,
            is_root: data.is_root,
        };
        let tenant = match data.instance_name.filter(|name| !name.is_empty()) {
            Some(instance_name) => TenantBinding::Bound {
                db_id: data.db_id,
                instance_name,
                role_back: data.role_back,
                role_front: data.role_front,
            },
            None => TenantBinding::Unbound,
        };
        Self { identity, tenant }
    }
}

impl From<Session> for SessionData {
    fn from(session: Session) -> Self {
        let (db_id, instance_name, role_back, role_front) = match session.tenant {
            TenantBinding::Bound {
                db_id,
                instance_name,
                role_back,
                role_front,
            } => (db_id, Some(instance_name), role_back, role_front),
            TenantBinding::Unbound => (None, None, None, None),
        };
        Self {
            user_id: session.identity.user_id,
            email: session.identity.email,
            is_root: session.identity.is_root,
            db_id,
            instance_name,
            role_back,
            role_front,
        }
    }
}

/// Two-step login state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    Anonymous,
    AuthenticatedNoTenant,
    AuthenticatedBound,
}

impl AuthStage {
    #[must_use]
    pub fn of(session: Option<&Session>) -> Self {
        session.map_or(Self::Anonymous, Session::stage)
    }
}

/// One tenant binding available to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInstance {
    pub id: i64,
    pub user_id: UserId,
    pub db_id: DbId,
    #[serde(rename = "roleback")]
    pub role_back: Role,
    #[serde(rename = "rolefront")]
    pub role_front: Role,
    pub is_active: bool,
    pub instance_name: String,
    pub instance_db_name: String,
    pub instance_db_host: String,
}

/// Keep only instances the user may select.
#[must_use]
pub fn active_instances(instances: Vec<UserInstance>) -> Vec<UserInstance> {
    instances.into_iter().filter(|i| i.is_active).collect()
}
