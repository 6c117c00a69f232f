//! Password recovery and pre-registration token checks.
//!
//! These calls need no session; they sit beside the login flow on the
//! public `/auth/*` and `/user-pre/*` pages.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::gateway::{Gateway, backend_message, ensure_success};

/// Result of validating a password-reset link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetTokenCheck {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Result of setting a new password.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdate {
    pub password_updated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Serialize)]
struct ResetRequestBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct PasswordUpdateBody<'a> {
    token: &'a str,
    email: &'a str,
    password: &'a str,
}

impl Gateway {
    /// Ask the backend to email a password-reset link.
    ///
    /// # Errors
    ///
    /// [`Error::Rejected`] with a user-facing message when the email is
    /// unknown (404) or the backend fails (500); [`Error::Http`] on
    /// transport failure.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), Error> {
        let response = self
            .http
            .post(self.config.endpoint("/auth/reset-password"))
            .timeout(self.config.timeout)
            .json(&ResetRequestBody { email })
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Password reset request failed"))?;

        let status = response.status();
        let message = match status {
            StatusCode::OK => return Ok(()),
            StatusCode::NOT_FOUND => Some("Email not found".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR => {
                Some("Internal server error, please try again later".to_string())
            }
            _ => backend_message(&response.text().await.unwrap_or_default()),
        };
        tracing::info!(status = %status, "Password reset request refused");

        Err(Error::Rejected {
            operation: "password reset request",
            status: status.as_u16(),
            message,
        })
    }

    /// Validate the token from a password-reset link.
    ///
    /// Any failure reads as an invalid token.
    pub async fn check_reset_token(&self, token: &str, email: &str) -> ResetTokenCheck {
        let sent = self
            .http
            .get(self.config.endpoint("/auth/reset-password/check"))
            .timeout(self.config.timeout)
            .query(&[("token", token), ("email", email)])
            .send()
            .await;

        match sent {
            Ok(response) if response.status() == StatusCode::OK => {
                response.json().await.unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Malformed reset-token check response");
                    ResetTokenCheck::default()
                })
            }
            Ok(response) => {
                tracing::debug!(status = %response.status(), "Reset token rejected");
                ResetTokenCheck::default()
            }
            Err(e) => {
                tracing::error!(error = %e, "Reset token check failed");
                ResetTokenCheck::default()
            }
        }
    }

    /// Set a new password using a reset token.
    ///
    /// Any failure reads as "not updated".
    pub async fn update_password(
        &self,
        token: &str,
        email: &str,
        password: &str,
    ) -> PasswordUpdate {
        let sent = self
            .http
            .post(self.config.endpoint("/auth/reset-password/update"))
            .timeout(self.config.timeout)
            .json(&PasswordUpdateBody {
                token,
                email,
                password,
            })
            .send()
            .await;

        match sent {
            Ok(response) if response.status() == StatusCode::OK => {
                response.json().await.unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Malformed password update response");
                    PasswordUpdate::default()
                })
            }
            Ok(response) => {
                tracing::info!(status = %response.status(), "Password update refused");
                PasswordUpdate::default()
            }
            Err(e) => {
                tracing::error!(error = %e, "Password update failed");
                PasswordUpdate::default()
            }
        }
    }

    /// Validate a pre-registration invitation token.
    ///
    /// Returns the backend's payload for a valid token.
    ///
    /// # Errors
    ///
    /// [`Error::Rejected`] for an invalid or expired token, [`Error::Http`]
    /// on transport failure.
    pub async fn check_pre_registration(
        &self,
        email: &str,
        token: &str,
    ) -> Result<serde_json::Value, Error> {
        let response = self
            .http
            .get(self.config.endpoint("/user-pre/check"))
            .timeout(self.config.timeout)
            .query(&[("email", email), ("token", token)])
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Pre-registration check failed"))?;

        let response = ensure_success(response, "pre-registration check").await?;
        response.json().await.map_err(Into::into)
    }
}
