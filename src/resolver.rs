//! Session resolution with a single silent refresh.
//!
//! The resolver reads tokens and talks to the backend but never writes
//! cookies; the returned [`Resolution`] carries the mutation for whoever
//! holds the response.

use crate::tokens::{IssuedTokens, TokenSet, TokenUpdate};
use crate::traits::IdentityBackend;
use crate::types::Session;

/// Outcome of resolving a session from the current tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No usable session. `clear_tokens` is set when the held tokens were
    /// tried and found dead.
    Unauthenticated { clear_tokens: bool },
    /// The access token is valid as-is.
    Active(Session),
    /// The access token was dead; a refresh produced new tokens the caller
    /// must persist.
    Refreshed { session: Session, tokens: IssuedTokens },
}

impl Resolution {
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Active(session) | Self::Refreshed { session, .. } => Some(session),
            Self::Unauthenticated { .. } => None,
        }
    }

    #[must_use]
    pub fn into_session(self) -> Option<Session> {
        match self {
            Self::Active(session) | Self::Refreshed { session, .. } => Some(session),
            Self::Unauthenticated { .. } => None,
        }
    }

    /// Cookie mutation the caller has to apply, if any.
    #[must_use]
    pub fn token_update(&self) -> Option<TokenUpdate> {
        match self {
            Self::Refreshed { tokens, .. } => Some(TokenUpdate::Store(tokens.clone())),
            Self::Unauthenticated { clear_tokens: true } => Some(TokenUpdate::Clear),
            Self::Unauthenticated { clear_tokens: false } | Self::Active(_) => None,
        }
    }
}

/// Resolve the session behind `tokens`.
///
/// At most one refresh and one re-fetch follow a failed lookup, so the worst
/// case is three sequential backend calls. Backend failures count as "no
/// session".
pub async fn resolve<B: IdentityBackend>(backend: &B, tokens: &TokenSet) -> Resolution {
    let Some(access) = tokens.access() else {
        return Resolution::Unauthenticated {
            clear_tokens: false,
        };
    };

    if let Some(session) = lookup(backend, access).await {
        return Resolution::Active(session);
    }

    let Some(refresh) = tokens.refresh() else {
        tracing::debug!("Session lookup failed and no refresh token is held");
        return Resolution::Unauthenticated { clear_tokens: true };
    };

    let issued = match backend.exchange_refresh_token(refresh).await {
        Ok(issued) => IssuedTokens::from_response(issued, Some(refresh), tokens.remember_me),
        Err(e) => {
            tracing::info!(error = %e, "Silent token refresh failed");
            return Resolution::Unauthenticated { clear_tokens: true };
        }
    };

    match lookup(backend, &issued.access).await {
        Some(session) => {
            tracing::debug!(user_id = %session.identity.user_id, "Session restored by refresh");
            Resolution::Refreshed {
                session,
                tokens: issued,
            }
        }
        None => {
            tracing::info!("Refreshed access token was not accepted");
            Resolution::Unauthenticated { clear_tokens: true }
        }
    }
}

async fn lookup<B: IdentityBackend>(backend: &B, access: &str) -> Option<Session> {
    match backend.fetch_session(access).await {
        Ok(session) => session.map(Session::from),
        Err(e) => {
            tracing::warn!(error = %e, "Session lookup failed");
            None
        }
    }
}
