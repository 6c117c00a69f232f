//! Per-request navigation decision.
//!
//! [`evaluate`] is the framework-free core of the route guard; the axum
//! layer in [`crate::middleware`] only reads cookies, calls it, and applies
//! the outcome.

use crate::resolver::resolve;
use crate::routing::{RouteTable, has_required_role};
use crate::tokens::{TokenSet, TokenUpdate};
use crate::traits::IdentityBackend;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// What to do with a request, plus the cookie mutation to attach either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    pub decision: GuardDecision,
    pub token_update: Option<TokenUpdate>,
}

impl GuardOutcome {
    fn allow(token_update: Option<TokenUpdate>) -> Self {
        Self {
            decision: GuardDecision::Allow,
            token_update,
        }
    }

    fn redirect(location: impl Into<String>, token_update: Option<TokenUpdate>) -> Self {
        Self {
            decision: GuardDecision::Redirect(location.into()),
            token_update,
        }
    }
}

/// Decide whether `path` may be served for the holder of `tokens`.
///
/// Checks run in a fixed order: the remembered-login shortcut and public
/// paths first (so redirects cannot loop), then token presence (so no
/// backend call is made without a token), then session, tenant and role.
/// Authorization failures redirect to the landing page; every other
/// failure ends on the login page with cookies cleared.
pub async fn evaluate<B: IdentityBackend>(
    backend: &B,
    table: &RouteTable,
    path: &str,
    tokens: &TokenSet,
) -> GuardOutcome {
    if table.is_login(path) && tokens.access().is_some() && tokens.remember_me {
        let resolution = resolve(backend, tokens).await;
        let update = resolution.token_update();
        if resolution.session().is_some_and(|s| s.is_bound()) {
            tracing::debug!("Remembered session on login page, sending home");
            return GuardOutcome::redirect(table.landing_path(), update);
        }
        return GuardOutcome::allow(update);
    }

    if table.is_public(path) {
        return GuardOutcome::allow(None);
    }

    if tokens.access().is_none() {
        return GuardOutcome::redirect(login_redirect(table, path), None);
    }

    let resolution = resolve(backend, tokens).await;
    let update = resolution.token_update();
    let Some(session) = resolution.into_session() else {
        tracing::debug!(path, "Session could not be resolved, clearing tokens");
        return GuardOutcome::redirect(login_redirect(table, path), Some(TokenUpdate::Clear));
    };

    if table.requires_tenant(path) && !session.is_bound() {
        tracing::debug!(path, "No tenant instance selected");
        return GuardOutcome::redirect(table.landing_path(), update);
    }

    if let Some(rule) = table.rule_for(path) {
        if !has_required_role(session.role_front(), &rule.roles) {
            tracing::info!(
                path,
                user_id = %session.identity.user_id,
                role = ?session.role_front(),
                "Role not permitted for route"
            );
            return GuardOutcome::redirect(table.landing_path(), update);
        }
    }

    GuardOutcome::allow(update)
}

/// Login page URL carrying `path` as the post-login return target.
#[must_use]
pub fn login_redirect(table: &RouteTable, path: &str) -> String {
    format!(
        "{}?redirect={}",
        table.login_path(),
        urlencoding::encode(path)
    )
}
