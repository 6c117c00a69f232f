//! Cookie-backed token store.
//!
//! The store never touches an ambient request: callers pass the current
//! [`CookieJar`] in and get the mutated jar back, so the same functions serve
//! the route guard, the server actions and tests.

use axum_extra::extract::CookieJar;

use crate::middleware::cookies::{
    self, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, REMEMBER_ME_COOKIE,
};
use crate::types::TokenResponse;

/// Cookie attributes that vary by deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    /// Set the `Secure` attribute (production).
    pub secure: bool,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self { secure: true }
    }
}

/// Tokens as currently held by the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    pub access: Option<String>,
    pub refresh: Option<String>,
    pub remember_me: bool,
}

impl TokenSet {
    #[must_use]
    pub fn access(&self) -> Option<&str> {
        self.access.as_deref()
    }

    #[must_use]
    pub fn refresh(&self) -> Option<&str> {
        self.refresh.as_deref()
    }
}

/// A complete token state to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTokens {
    pub access: String,
    pub refresh: Option<String>,
    pub remember_me: bool,
}

impl IssuedTokens {
    /// Build from a backend token response, keeping `previous_refresh` when
    /// the backend did not rotate the refresh token.
    #[must_use]
    pub fn from_response(
        response: TokenResponse,
        previous_refresh: Option<&str>,
        remember_me: bool,
    ) -> Self {
        Self {
            access: response.access_token,
            refresh: response
                .refresh_token
                .or_else(|| previous_refresh.map(str::to_owned)),
            remember_me,
        }
    }
}

impl From<IssuedTokens> for TokenSet {
    fn from(t: IssuedTokens) -> Self {
        Self {
            access: Some(t.access),
            refresh: t.refresh,
            remember_me: t.remember_me,
        }
    }
}

/// Cookie mutation requested by a gateway operation or the resolver.
///
/// Only the component holding the response applies it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum TokenUpdate {
    Store(IssuedTokens),
    Clear,
}

impl TokenUpdate {
    pub fn apply(self, jar: CookieJar, policy: CookiePolicy) -> CookieJar {
        match self {
            Self::Store(tokens) => set_tokens(jar, policy, &tokens),
            Self::Clear => clear_tokens(jar, policy),
        }
    }

    /// Token set the browser will hold after this update.
    pub fn into_token_set(self) -> TokenSet {
        match self {
            Self::Store(tokens) => tokens.into(),
            Self::Clear => TokenSet::default(),
        }
    }
}

/// Write all three cookies for `tokens`.
///
/// A missing refresh token removes any stale refresh cookie, so a refresh
/// cookie only ever exists alongside an instance-bound access token.
pub fn set_tokens(jar: CookieJar, policy: CookiePolicy, tokens: &IssuedTokens) -> CookieJar {
    let secure = policy.secure;
    let jar = jar.add(cookies::access_cookie(
        &tokens.access,
        tokens.refresh.is_some(),
        secure,
    ));

    let jar = match &tokens.refresh {
        Some(refresh) => jar.add(cookies::refresh_cookie(refresh, tokens.remember_me, secure)),
        None => jar.add(cookies::removal_cookie(REFRESH_TOKEN_COOKIE, secure)),
    };

    if tokens.remember_me {
        jar.add(cookies::remember_me_cookie(secure))
    } else {
        jar.add(cookies::removal_cookie(REMEMBER_ME_COOKIE, secure))
    }
}

#[must_use]
pub fn get_tokens(jar: &CookieJar) -> TokenSet {
    let value = |name: &str| {
        jar.get(name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    };

    TokenSet {
        access: value(ACCESS_TOKEN_COOKIE),
        refresh: value(REFRESH_TOKEN_COOKIE),
        remember_me: value(REMEMBER_ME_COOKIE).as_deref() == Some("true"),
    }
}

/// Remove all three cookies. Idempotent.
pub fn clear_tokens(jar: CookieJar, policy: CookiePolicy) -> CookieJar {
    [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, REMEMBER_ME_COOKIE]
        .into_iter()
        .fold(jar, |jar, name| {
            jar.add(cookies::removal_cookie(name, policy.secure))
        })
}
