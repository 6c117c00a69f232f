use std::sync::Arc;

use super::config::AuthSettings;
use crate::gateway::Gateway;
use crate::routing::RouteTable;
use crate::tokens::CookiePolicy;

/// Shared state for auth action handlers.
#[derive(Clone)]
pub(super) struct ActionState {
    pub(super) gateway: Arc<Gateway>,
    pub(super) settings: AuthSettings,
}

/// State for the [`route_guard`](super::route_guard) middleware.
pub struct GuardState<B> {
    pub(crate) backend: Arc<B>,
    pub(crate) routes: Arc<RouteTable>,
    pub(crate) cookie_policy: CookiePolicy,
}

impl<B> GuardState<B> {
    #[must_use]
    pub fn new(backend: Arc<B>, routes: RouteTable, cookie_policy: CookiePolicy) -> Self {
        Self {
            backend,
            routes: Arc::new(routes),
            cookie_policy,
        }
    }
}

// Manual Clone: avoid derive adding a `B: Clone` bound.
impl<B> Clone for GuardState<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            routes: self.routes.clone(),
            cookie_policy: self.cookie_policy,
        }
    }
}
