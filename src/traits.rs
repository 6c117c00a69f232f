use std::future::Future;

use crate::error::Error;
use crate::types::{SessionData, TokenResponse};

/// The two backend calls session resolution depends on.
///
/// [`Gateway`](crate::gateway::Gateway) is the HTTP implementation; tests and
/// embedders can supply their own to drive the resolver and route guard
/// without a live backend.
///
/// # Example
///
/// ```rust,ignore
/// impl IdentityBackend for FakeBackend {
///     async fn fetch_session(&self, access_token: &str) -> Result<Option<SessionData>, Error> {
///         Ok(self.sessions.get(access_token).cloned())
///     }
///
///     async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, Error> {
///         self.rotate(refresh_token)
///     }
/// }
/// ```
pub trait IdentityBackend: Send + Sync + 'static {
    /// Look up the session behind an access token.
    ///
    /// `Ok(None)` means the backend answered but did not recognise the token;
    /// `Err` means the backend could not be asked.
    fn fetch_session(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<Option<SessionData>, Error>> + Send;

    /// Exchange a refresh token for a new token pair.
    fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<TokenResponse, Error>> + Send;
}
