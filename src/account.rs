//! The signed-in user's own account: profile read, profile edit and
//! password change.
//!
//! All three calls carry the session's access token and check for it
//! locally before any network call.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::gateway::{Gateway, ensure_success};
use crate::tokens::TokenSet;
use crate::types::{TokenKind, UserId};

/// User profile as returned by `GET /users/{userId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub user_id: UserId,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_root: bool,
    #[serde(default)]
    pub is_active: bool,
}

/// Editable profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Serialize)]
struct PasswordChangeBody<'a> {
    password: &'a str,
}

impl Gateway {
    /// Profile of `user_id`, or `None`.
    ///
    /// A missing token, an empty id, a non-2xx answer and a failed call all
    /// yield `None`.
    pub async fn get_user(&self, tokens: &TokenSet, user_id: &UserId) -> Option<UserData> {
        match self.send_get_user(tokens, user_id).await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user_id, "User lookup failed");
                None
            }
        }
    }

    async fn send_get_user(&self, tokens: &TokenSet, user_id: &UserId) -> Result<UserData, Error> {
        let (access, path) = user_call(tokens, user_id)?;
        let response = self
            .http
            .get(self.config.endpoint(&path))
            .timeout(self.config.timeout)
            .bearer_auth(access)
            .send()
            .await?;

        let response = ensure_success(response, "user lookup").await?;
        response.json().await.map_err(Into::into)
    }

    /// Replace the editable profile fields of `user_id`.
    ///
    /// # Errors
    ///
    /// [`Error::MissingToken`] or [`Error::MissingUserId`] before any call,
    /// [`Error::Rejected`] carrying the backend message, [`Error::Http`] on
    /// transport failure.
    pub async fn update_user(
        &self,
        tokens: &TokenSet,
        user_id: &UserId,
        profile: &ProfileUpdate,
    ) -> Result<UserData, Error> {
        let (access, path) = user_call(tokens, user_id)?;
        let response = self
            .http
            .patch(self.config.endpoint(&path))
            .timeout(self.config.timeout)
            .bearer_auth(access)
            .json(profile)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Profile update failed"))?;

        let response = ensure_success(response, "profile update")
            .await
            .inspect_err(|e| tracing::info!(error = %e, "Profile update refused"))?;
        response.json().await.map_err(Into::into)
    }

    /// Set a new password for the signed-in user.
    ///
    /// # Errors
    ///
    /// As for [`update_user`](Self::update_user).
    pub async fn change_password(
        &self,
        tokens: &TokenSet,
        user_id: &UserId,
        password: &str,
    ) -> Result<(), Error> {
        let (access, path) = user_call(tokens, user_id)?;
        let response = self
            .http
            .patch(self.config.endpoint(&path))
            .timeout(self.config.timeout)
            .bearer_auth(access)
            .json(&PasswordChangeBody { password })
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Password change failed"))?;

        ensure_success(response, "password change")
            .await
            .inspect_err(|e| tracing::info!(error = %e, "Password change refused"))?;
        Ok(())
    }
}

fn user_call<'a>(tokens: &'a TokenSet, user_id: &UserId) -> Result<(&'a str, String), Error> {
    let access = tokens
        .access()
        .ok_or(Error::MissingToken(TokenKind::Access))?;
    let id = user_id.require()?;
    Ok((access, format!("/users/{}", urlencoding::encode(id))))
}
