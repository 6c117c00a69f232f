use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";
pub const REMEMBER_ME_COOKIE: &str = "rememberMe";

/// Access-token lifetime before a tenant instance is selected.
pub const UNBOUND_ACCESS_TTL: Duration = Duration::minutes(15);
/// Access-token lifetime once a refresh token exists.
pub const BOUND_ACCESS_TTL: Duration = Duration::hours(3);
pub const REFRESH_TTL: Duration = Duration::days(7);

fn base(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .build()
}

/// Create the access-token cookie; its age depends on the login stage.
pub(crate) fn access_cookie(token: &str, has_refresh: bool, secure: bool) -> Cookie<'static> {
    let mut cookie = base(ACCESS_TOKEN_COOKIE, token.to_string(), secure);
    cookie.set_max_age(if has_refresh {
        BOUND_ACCESS_TTL
    } else {
        UNBOUND_ACCESS_TTL
    });
    cookie
}

/// Create the refresh-token cookie.
///
/// Without remember-me the cookie carries no Max-Age and dies with the browser session.
pub(crate) fn refresh_cookie(token: &str, remember_me: bool, secure: bool) -> Cookie<'static> {
    let mut cookie = base(REFRESH_TOKEN_COOKIE, token.to_string(), secure);
    if remember_me {
        cookie.set_max_age(REFRESH_TTL);
    }
    cookie
}

pub(crate) fn remember_me_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = base(REMEMBER_ME_COOKIE, "true".to_string(), secure);
    cookie.set_max_age(REFRESH_TTL);
    cookie
}

/// Create removal cookie for `name`.
pub(crate) fn removal_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    let mut cookie = base(name, String::new(), secure);
    cookie.set_max_age(Duration::ZERO);
    cookie
}
