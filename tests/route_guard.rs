mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use axum::routing::get;
use axum_extra::extract::cookie::Cookie;
use tenant_auth::middleware::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, REMEMBER_ME_COOKIE};
use tenant_auth::{AuthConfig, Gateway, route_guard};
use tower::ServiceExt;

use common::{
    BOUND_TOKEN, FakeBackend, REFRESH_TOKEN, ROTATED_REFRESH_TOKEN, UNBOUND_TOKEN, spawn_backend,
};

async fn guarded_app() -> (Router, FakeBackend) {
    let backend = spawn_backend().await;
    let config = AuthConfig::new(backend.gateway.clone()).with_secure_cookies(false);

    let app = Router::new()
        .route("/", get(|| async { "index" }))
        .route("/auth/login", get(|| async { "login" }))
        .route("/privacy-policy", get(|| async { "privacy" }))
        .route("/home", get(|| async { "home" }))
        .route("/saler/orders", get(|| async { "orders" }))
        .route("/buyer/catalog", get(|| async { "catalog" }))
        .route("/super/clients", get(|| async { "clients" }))
        .layer(axum::middleware::from_fn_with_state(
            config.guard_state(),
            route_guard::<Gateway>,
        ));
    (app, backend)
}

async fn visit(app: Router, path: &str, cookies: &str) -> Response {
    let mut builder = Request::builder().uri(path);
    if !cookies.is_empty() {
        builder = builder.header(header::COOKIE, cookies);
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn set_cookies(response: &Response) -> Vec<Cookie<'static>> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| Cookie::parse(v.to_str().unwrap().to_owned()).unwrap())
        .collect()
}

fn cookie_value(cookies: &[Cookie<'static>], name: &str) -> Option<String> {
    cookies
        .iter()
        .find(|c| c.name() == name)
        .map(|c| c.value().to_owned())
}

#[tokio::test]
async fn public_paths_need_no_token() {
    let (app, backend) = guarded_app().await;
    for path in ["/", "/auth/login", "/privacy-policy"] {
        let response = visit(app.clone(), path, "").await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }
    assert_eq!(backend.calls.session(), 0);
}

#[tokio::test]
async fn anonymous_visit_redirects_to_login_with_return_path() {
    let (app, backend) = guarded_app().await;
    let response = visit(app, "/saler/orders", "").await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/auth/login?redirect=%2Fsaler%2Forders");
    assert_eq!(backend.calls.session(), 0);
}

#[tokio::test]
async fn bound_buyer_reaches_buyer_routes() {
    let (app, _backend) = guarded_app().await;
    let response = visit(
        app,
        "/buyer/catalog",
        &format!("{ACCESS_TOKEN_COOKIE}={BOUND_TOKEN}"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn wrong_role_goes_home() {
    let (app, _backend) = guarded_app().await;
    let response = visit(
        app,
        "/super/clients",
        &format!("{ACCESS_TOKEN_COOKIE}={BOUND_TOKEN}"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/home");
}

#[tokio::test]
async fn unbound_session_is_sent_to_instance_selection() {
    let (app, _backend) = guarded_app().await;
    let cookies = format!("{ACCESS_TOKEN_COOKIE}={UNBOUND_TOKEN}");

    let response = visit(app.clone(), "/saler/orders", &cookies).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/home");

    let response = visit(app, "/home", &cookies).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn expired_access_is_refreshed_once() {
    let (app, backend) = guarded_app().await;
    let response = visit(
        app,
        "/buyer/catalog",
        &format!("{ACCESS_TOKEN_COOKIE}=expired; {REFRESH_TOKEN_COOKIE}={REFRESH_TOKEN}"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(backend.calls.refresh(), 1);

    let cookies = set_cookies(&response);
    assert_eq!(
        cookie_value(&cookies, ACCESS_TOKEN_COOKIE).as_deref(),
        Some(BOUND_TOKEN)
    );
    assert_eq!(
        cookie_value(&cookies, REFRESH_TOKEN_COOKIE).as_deref(),
        Some(ROTATED_REFRESH_TOKEN)
    );
}

#[tokio::test]
async fn failed_refresh_clears_cookies_and_redirects() {
    let (app, backend) = guarded_app().await;
    let response = visit(
        app,
        "/buyer/catalog",
        &format!("{ACCESS_TOKEN_COOKIE}=expired; {REFRESH_TOKEN_COOKIE}=revoked"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/auth/login?redirect=%2Fbuyer%2Fcatalog");
    assert_eq!(backend.calls.refresh(), 1);

    let cookies = set_cookies(&response);
    for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, REMEMBER_ME_COOKIE] {
        assert_eq!(cookie_value(&cookies, name).as_deref(), Some(""), "{name}");
    }
}

#[tokio::test]
async fn remembered_bound_session_skips_login_page() {
    let (app, _backend) = guarded_app().await;
    let response = visit(
        app.clone(),
        "/auth/login",
        &format!("{ACCESS_TOKEN_COOKIE}={BOUND_TOKEN}; {REMEMBER_ME_COOKIE}=true"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/home");

    let response = visit(
        app,
        "/auth/login",
        &format!("{ACCESS_TOKEN_COOKIE}={UNBOUND_TOKEN}; {REMEMBER_ME_COOKIE}=true"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}
