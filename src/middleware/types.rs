use serde::{Deserialize, Serialize};

use crate::account::UserData;
use crate::error::Error;
use crate::types::{DbId, UserInstance};

/// `{success, error}` result of an auth action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: &Error, fallback: &str) -> Self {
        Self {
            success: false,
            error: Some(error.user_message(fallback)),
        }
    }
}

/// Result of listing tenant instances. An empty `data` is a success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstancesResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<UserInstance>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<Vec<UserInstance>, Error>> for InstancesResponse {
    fn from(result: Result<Vec<UserInstance>, Error>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(e) => Self {
                success: false,
                data: None,
                error: Some(e.user_message("Failed to load instances")),
            },
        }
    }
}

/// Result of a profile update, carrying the stored profile on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdateResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<UserData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<UserData, Error>> for UserUpdateResponse {
    fn from(result: Result<UserData, Error>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(e) => Self {
                success: false,
                data: None,
                error: Some(e.user_message("Failed to update user data")),
            },
        }
    }
}

/// Result of a password-reset request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Result of checking a pre-registration token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreRegistrationResponse {
    pub success: bool,
    pub status: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LoginRequest {
    pub(super) email: String,
    pub(super) password: String,
    #[serde(default)]
    pub(super) remember_me: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SelectInstanceRequest {
    pub(super) db_id: DbId,
}

#[derive(Debug, Deserialize)]
pub(super) struct InstancesQuery {
    #[serde(default)]
    pub(super) active: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct LostPasswordRequest {
    pub(super) email: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenEmailQuery {
    pub(super) token: String,
    pub(super) email: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct PasswordChangeRequest {
    pub(super) password: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct PasswordUpdateRequest {
    pub(super) token: String,
    pub(super) email: String,
    pub(super) password: String,
}
