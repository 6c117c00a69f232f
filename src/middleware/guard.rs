use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use super::state::GuardState;
use crate::guard::{GuardDecision, evaluate};
use crate::tokens::get_tokens;
use crate::traits::IdentityBackend;

/// Route guard middleware.
///
/// Runs before every navigable request. Cookie mutations decided by the
/// guard (refreshed tokens, cleared tokens) ride on whichever response is
/// returned, redirect or forwarded.
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/home", get(home))
///     .layer(axum::middleware::from_fn_with_state(
///         config.guard_state(),
///         route_guard::<Gateway>,
///     ));
/// ```
pub async fn route_guard<B: IdentityBackend>(
    State(state): State<GuardState<B>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let tokens = get_tokens(&jar);
    let path = request.uri().path().to_owned();

    let outcome = evaluate(state.backend.as_ref(), &state.routes, &path, &tokens).await;

    let jar = match outcome.token_update {
        Some(update) => update.apply(jar, state.cookie_policy),
        None => jar,
    };

    match outcome.decision {
        GuardDecision::Allow => (jar, next.run(request).await).into_response(),
        GuardDecision::Redirect(location) => {
            tracing::debug!(%path, %location, "Route guard redirect");
            (jar, Redirect::temporary(&location)).into_response()
        }
    }
}
