//! Per-view session cache.
//!
//! Fetches the session once on mount and again only on an explicit
//! [`SessionHook::refetch`]. It never refreshes tokens; that happens at the
//! route guard before the view is served.

use std::sync::Arc;

use tokio::sync::watch;

use crate::tokens::{TokenSet, TokenUpdate};
use crate::traits::IdentityBackend;
use crate::types::Session;

/// Snapshot exposed to the view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub session: Option<Session>,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub struct SessionHook<B> {
    backend: Arc<B>,
    tokens: TokenSet,
    state: watch::Sender<SessionState>,
}

impl<B: IdentityBackend> SessionHook<B> {
    /// Create the hook and perform the initial fetch.
    pub async fn mount(backend: Arc<B>, tokens: TokenSet) -> Self {
        let (state, _) = watch::channel(SessionState {
            is_loading: true,
            ..SessionState::default()
        });
        let hook = Self {
            backend,
            tokens,
            state,
        };
        hook.refetch().await;
        hook
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Observe state changes, including the loading flag.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Track a cookie mutation made by an action (login, instance selection, logout).
    ///
    /// Does not fetch; call [`refetch`](Self::refetch) afterwards.
    pub fn apply(&mut self, update: TokenUpdate) {
        self.tokens = update.into_token_set();
    }

    /// Fetch the session again. Failures land in [`SessionState::error`].
    pub async fn refetch(&self) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });

        let (session, error) = match self.tokens.access() {
            None => (None, None),
            Some(access) => match self.backend.fetch_session(access).await {
                Ok(data) => (data.map(Session::from), None),
                Err(e) => {
                    tracing::warn!(error = %e, "Session fetch failed");
                    (None, Some(e.user_message("Failed to load session")))
                }
            },
        };

        self.state.send_replace(SessionState {
            session,
            is_loading: false,
            error,
        });
    }
}
