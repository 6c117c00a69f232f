//! Axum integration: route guard layer and auth action routes.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tenant_auth::middleware::{AuthConfig, auth_routes, route_guard};
//!
//! // 1. Configure from environment (BACKEND_URL, APP_ENV, ...)
//! let config = AuthConfig::from_env()?;
//!
//! // 2. Gate every page behind the route guard
//! let pages = axum::Router::new()
//!     .route("/home", get(home))
//!     .layer(axum::middleware::from_fn_with_state(
//!         config.guard_state(),
//!         route_guard::<Gateway>,
//!     ));
//!
//! // 3. Mount the login / instance / logout actions
//! let app = pages.merge(auth_routes(config));
//! ```

mod config;
pub(crate) mod cookies;
mod guard;
mod routes;
mod state;
mod types;

pub use config::AuthConfig;
pub use cookies::{
    ACCESS_TOKEN_COOKIE, BOUND_ACCESS_TTL, REFRESH_TOKEN_COOKIE, REFRESH_TTL,
    REMEMBER_ME_COOKIE, UNBOUND_ACCESS_TTL,
};
pub use guard::route_guard;
pub use routes::auth_routes;
pub use state::GuardState;
pub use types::{
    ActionResponse, InstancesResponse, PreRegistrationResponse, RecoveryResponse,
    UserUpdateResponse,
};
