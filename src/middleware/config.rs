use std::sync::Arc;
use std::time::Duration;

use url::Url;

use super::state::GuardState;
use crate::error::Error;
use crate::gateway::{Gateway, GatewayConfig};
use crate::routing::RouteTable;
use crate::tokens::CookiePolicy;

/// Shared auth settings used by both config and runtime state.
#[derive(Debug, Clone)]
pub(crate) struct AuthSettings {
    pub(crate) cookie_policy: CookiePolicy,
    pub(crate) auth_path: String,
    pub(crate) routes: Arc<RouteTable>,
}

impl AuthSettings {
    fn defaults() -> Self {
        Self {
            cookie_policy: CookiePolicy::default(),
            auth_path: "/api/auth".into(),
            routes: Arc::new(RouteTable::default()),
        }
    }
}

/// Authentication configuration.
///
/// Required field (`gateway`) is a constructor parameter, so there are no
/// runtime "missing field" errors.
///
/// Use [`from_env()`](AuthConfig::from_env) for convention-based setup,
/// or [`new()`](AuthConfig::new) with `with_*` methods for full control.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub(super) gateway: Gateway,
    pub(super) settings: AuthSettings,
}

impl AuthConfig {
    /// Create config with the required `Gateway`.
    ///
    /// Cookies default to `Secure`; the route table defaults to
    /// [`RouteTable::default`].
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            settings: AuthSettings::defaults(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `BACKEND_URL`: base URL of the identity API
    ///
    /// # Optional env vars
    /// - `BACKEND_TIMEOUT_SECS`: per-request timeout in seconds (default 10)
    /// - `APP_ENV`: anything other than `production` disables `Secure` cookies
    /// - `AUTH_PATH`: mount point of the auth action routes (default `/api/auth`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `BACKEND_URL` is missing or a value is invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let base_url: Url = var("BACKEND_URL")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Config("backend URL not configured".into()))?
            .parse()
            .map_err(|e| Error::Config(format!("BACKEND_URL: {e}")))?;

        let mut gateway = GatewayConfig::new(base_url);
        if let Some(secs) = var("BACKEND_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|e| Error::Config(format!("BACKEND_TIMEOUT_SECS: {e}")))?;
            gateway = gateway.with_timeout(Duration::from_secs(secs));
        }

        let production = var("APP_ENV").as_deref() == Some("production");

        let mut config = Self::new(Gateway::new(gateway)).with_secure_cookies(production);
        if let Some(path) = var("AUTH_PATH") {
            config = config.with_auth_path(path);
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.settings.cookie_policy = CookiePolicy { secure };
        self
    }

    #[must_use]
    pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
        self.settings.auth_path = path.into();
        self
    }

    #[must_use]
    pub fn with_route_table(mut self, routes: RouteTable) -> Self {
        self.settings.routes = Arc::new(routes);
        self
    }

    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    #[must_use]
    pub fn cookie_policy(&self) -> CookiePolicy {
        self.settings.cookie_policy
    }

    #[must_use]
    pub fn route_table(&self) -> &RouteTable {
        &self.settings.routes
    }

    /// State for [`route_guard`](super::route_guard) backed by this config's gateway.
    #[must_use]
    pub fn guard_state(&self) -> GuardState<Gateway> {
        GuardState {
            backend: Arc::new(self.gateway.clone()),
            routes: self.settings.routes.clone(),
            cookie_policy: self.settings.cookie_policy,
        }
    }
}
