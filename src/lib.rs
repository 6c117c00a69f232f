#![doc = include_str!("../README.md")]

pub mod account;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod middleware;
pub mod recovery;
pub mod resolver;
pub mod routing;
pub mod session_hook;
pub mod tokens;
pub mod traits;
pub mod types;

// Re-exports for convenient access
pub use account::{ProfileUpdate, UserData};
pub use error::Error;
pub use gateway::{Gateway, GatewayConfig};
pub use guard::{GuardDecision, GuardOutcome, evaluate, login_redirect};
pub use middleware::{AuthConfig, GuardState, auth_routes, route_guard};
pub use recovery::{PasswordUpdate, ResetTokenCheck};
pub use resolver::{Resolution, resolve};
pub use routing::{RoleRule, RouteTable, has_required_role};
pub use session_hook::{SessionHook, SessionState};
pub use tokens::{
    CookiePolicy, IssuedTokens, TokenSet, TokenUpdate, clear_tokens, get_tokens, set_tokens,
};
pub use traits::IdentityBackend;
pub use types::{
    AuthStage, Credentials, DbId, Identity, Role, Session, SessionData, TenantBinding,
    TokenKind, TokenResponse, UserId, UserInstance, active_instances,
};
