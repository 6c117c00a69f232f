use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use url::Url;

use crate::error::Error;
use crate::tokens::{IssuedTokens, TokenSet, TokenUpdate};
use crate::traits::IdentityBackend;
use crate::types::{
    Credentials, DbId, SessionData, TokenKind, TokenResponse, UserId, UserInstance,
    active_instances,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend connection settings.
///
/// Required fields are constructor parameters; an unset backend URL is
/// reported once, when the configuration is built.
///
/// ```rust,ignore
/// use tenant_auth::GatewayConfig;
///
/// let config = GatewayConfig::new("https://api.example.com".parse()?)
///     .with_timeout(std::time::Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GatewayConfig {
    pub(crate) base_url: Url,
    pub(crate) timeout: Duration,
}

impl GatewayConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Per-request timeout (default: 10 s). A timed-out call is a failed call.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }
}

/// Client for the remote identity API.
///
/// Holds no per-user state: every operation takes the caller's current
/// [`TokenSet`] and hands back a [`TokenUpdate`] for the caller to apply.
/// Each operation is a single outbound call without retries.
#[derive(Debug, Clone)]
pub struct Gateway {
    pub(crate) config: GatewayConfig,
    pub(crate) http: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SelectInstanceBody<'a> {
    db_id: &'a DbId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshBody<'a> {
    refresh_token: &'a str,
}

impl Gateway {
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// First login step: exchange credentials for an unbound access token.
    ///
    /// The returned update stores only the access token (short lifetime) and
    /// drops any refresh token left over from an earlier login.
    ///
    /// # Errors
    ///
    /// [`Error::Rejected`] carrying the backend message on bad credentials,
    /// [`Error::Http`] on transport failure.
    pub async fn login(
        &self,
        credentials: &Credentials,
        remember_me: bool,
    ) -> Result<TokenUpdate, Error> {
        log_outcome("login", self.send_login(credentials, remember_me).await)
    }

    async fn send_login(
        &self,
        credentials: &Credentials,
        remember_me: bool,
    ) -> Result<TokenUpdate, Error> {
        let response = self
            .http
            .post(self.config.endpoint("/auth/login"))
            .timeout(self.config.timeout)
            .json(credentials)
            .send()
            .await?;
        let response = ensure_success(response, "login").await?;
        let issued: TokenResponse = response.json().await?;

        Ok(TokenUpdate::Store(IssuedTokens {
            access: issued.access_token,
            refresh: None,
            remember_me,
        }))
    }

    /// Second login step: bind the session to a tenant instance.
    ///
    /// # Errors
    ///
    /// [`Error::MissingToken`] without an access token (no network call),
    /// otherwise as for [`login`](Self::login).
    pub async fn select_instance(
        &self,
        tokens: &TokenSet,
        db_id: &DbId,
    ) -> Result<TokenUpdate, Error> {
        let access = tokens
            .access()
            .ok_or(Error::MissingToken(TokenKind::Access))?;

        log_outcome(
            "instance selection",
            self.send_select_instance(access, db_id, tokens.remember_me).await,
        )
    }

    async fn send_select_instance(
        &self,
        access: &str,
        db_id: &DbId,
        remember_me: bool,
    ) -> Result<TokenUpdate, Error> {
        let response = self
            .http
            .post(self.config.endpoint("/auth/instance"))
            .timeout(self.config.timeout)
            .bearer_auth(access)
            .json(&SelectInstanceBody { db_id })
            .send()
            .await?;
        let response = ensure_success(response, "instance selection").await?;
        let issued: TokenResponse = response.json().await?;

        Ok(TokenUpdate::Store(IssuedTokens::from_response(
            issued,
            None,
            remember_me,
        )))
    }

    /// Exchange the stored refresh token for a new pair.
    ///
    /// # Errors
    ///
    /// [`Error::MissingToken`] without a refresh token, [`Error::Rejected`]
    /// when the backend refuses it (expired or revoked).
    pub async fn refresh(&self, tokens: &TokenSet) -> Result<TokenUpdate, Error> {
        let refresh = tokens
            .refresh()
            .ok_or(Error::MissingToken(TokenKind::Refresh))?;

        let result = self.exchange_refresh_token(refresh).await.map(|issued| {
            TokenUpdate::Store(IssuedTokens::from_response(
                issued,
                Some(refresh),
                tokens.remember_me,
            ))
        });

        log_outcome("token refresh", result)
    }

    /// Current session, or `None` when there is none.
    ///
    /// Absence is a normal outcome: a missing token, a non-2xx answer and a
    /// failed call all yield `None`.
    pub async fn get_session(&self, tokens: &TokenSet) -> Option<SessionData> {
        let access = tokens.access()?;
        match self.fetch_session(access).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed");
                None
            }
        }
    }

    /// Notify the backend and always clear local tokens.
    ///
    /// The notification is best effort; its failures are only logged.
    pub async fn logout(&self, tokens: &TokenSet) -> TokenUpdate {
        if let Some(access) = tokens.access() {
            let sent = self
                .http
                .post(self.config.endpoint("/auth/logout"))
                .timeout(self.config.timeout)
                .bearer_auth(access)
                .send()
                .await;

            match sent {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!(status = %response.status(), "Backend logout rejected");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Backend logout notification failed"),
            }
        }

        TokenUpdate::Clear
    }

    /// Tenant instances available to `user_id`.
    ///
    /// A 404 means the user has no instances and yields an empty list.
    ///
    /// # Errors
    ///
    /// [`Error::MissingUserId`] for an empty id (no network call),
    /// [`Error::Rejected`] for any other non-2xx status, [`Error::Http`] on
    /// transport failure.
    pub async fn list_instances(
        &self,
        tokens: &TokenSet,
        user_id: &UserId,
    ) -> Result<Vec<UserInstance>, Error> {
        user_id.require()?;
        log_outcome(
            "instance listing",
            self.send_list_instances(tokens.access(), user_id).await,
        )
    }

    async fn send_list_instances(
        &self,
        access: Option<&str>,
        user_id: &UserId,
    ) -> Result<Vec<UserInstance>, Error> {
        let path = format!(
            "/user-instances/user/{}",
            urlencoding::encode(user_id.as_str())
        );
        let mut request = self
            .http
            .get(self.config.endpoint(&path))
            .timeout(self.config.timeout);
        if let Some(access) = access {
            request = request.bearer_auth(access);
        }

        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let response = ensure_success(response, "instance listing").await?;
        response.json::<Vec<UserInstance>>().await.map_err(Into::into)
    }

    /// Like [`list_instances`](Self::list_instances), keeping only selectable entries.
    ///
    /// # Errors
    ///
    /// As for [`list_instances`](Self::list_instances).
    pub async fn list_active_instances(
        &self,
        tokens: &TokenSet,
        user_id: &UserId,
    ) -> Result<Vec<UserInstance>, Error> {
        self.list_instances(tokens, user_id).await.map(active_instances)
    }
}

impl IdentityBackend for Gateway {
    async fn fetch_session(&self, access_token: &str) -> Result<Option<SessionData>, Error> {
        let response = self
            .http
            .get(self.config.endpoint("/backend/session"))
            .timeout(self.config.timeout)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "No session for access token");
            return Ok(None);
        }
        Ok(Some(response.json::<SessionData>().await?))
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, Error> {
        let response = self
            .http
            .post(self.config.endpoint("/auth/refresh"))
            .timeout(self.config.timeout)
            .json(&RefreshBody { refresh_token })
            .send()
            .await?;

        let response = ensure_success(response, "token refresh").await?;
        response.json::<TokenResponse>().await.map_err(Into::into)
    }
}

/// Checks HTTP response status; returns the response on success or a
/// [`Error::Rejected`] carrying the backend's `message`, if any.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(Error::Rejected {
        operation,
        status,
        message: backend_message(&body),
    })
}

/// Extract `message` from an error body. Arrays of messages are joined.
pub(crate) fn backend_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("message")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}

fn log_outcome<T>(operation: &'static str, result: Result<T, Error>) -> Result<T, Error> {
    match &result {
        Err(e @ Error::Http(_)) => tracing::error!(error = %e, operation, "Backend call failed"),
        Err(e) => tracing::info!(error = %e, operation, "Backend refused request"),
        Ok(_) => tracing::debug!(operation, "Backend call succeeded"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> Gateway {
        Gateway::new(GatewayConfig::new("http://127.0.0.1:9/api/".parse().unwrap()))
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = GatewayConfig::new("https://api.example.com/v1/".parse().unwrap());
        assert_eq!(
            config.endpoint("/auth/login"),
            "https://api.example.com/v1/auth/login"
        );
    }

    #[test]
    fn default_timeout_is_ten_seconds() {
        let config = GatewayConfig::new("https://api.example.com".parse().unwrap());
        assert_eq!(config.timeout(), Duration::from_secs(10));
        let config = config.with_timeout(Duration::from_millis(250));
        assert_eq!(config.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn backend_message_variants() {
        assert_eq!(
            backend_message(r#"{"message":"Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(
            backend_message(r#"{"message":["email must be an email","password too short"]}"#)
                .as_deref(),
            Some("email must be an email, password too short")
        );
        assert_eq!(backend_message(r#"{"error":"x"}"#), None);
        assert_eq!(backend_message("<html>"), None);
    }

    #[tokio::test]
    async fn select_instance_without_access_token_fails_locally() {
        let err = gateway()
            .select_instance(&TokenSet::default(), &DbId("db-1".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingToken(TokenKind::Access)));
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_fails_locally() {
        let tokens = TokenSet {
            access: Some("acc".into()),
            ..TokenSet::default()
        };
        let err = gateway().refresh(&tokens).await.unwrap_err();
        assert!(matches!(err, Error::MissingToken(TokenKind::Refresh)));
    }

    #[tokio::test]
    async fn empty_user_id_fails_before_listing() {
        let err = gateway()
            .list_instances(&TokenSet::default(), &UserId(String::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingUserId));
    }

    #[tokio::test]
    async fn get_session_without_access_token_is_none() {
        assert_eq!(gateway().get_session(&TokenSet::default()).await, None);
    }
}
