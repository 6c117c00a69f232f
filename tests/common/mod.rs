//! Fake identity backend served on an ephemeral port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tenant_auth::{Gateway, GatewayConfig};

pub const PASSWORD: &str = "secret";
pub const UNBOUND_TOKEN: &str = "unbound-token";
pub const BOUND_TOKEN: &str = "bound-token";
pub const REFRESH_TOKEN: &str = "refresh-1";
pub const ROTATED_REFRESH_TOKEN: &str = "refresh-2";
pub const SLOW_TOKEN: &str = "slow-token";

#[derive(Default)]
pub struct Calls {
    pub login: AtomicUsize,
    pub session: AtomicUsize,
    pub refresh: AtomicUsize,
    pub logout: AtomicUsize,
    pub instances: AtomicUsize,
}

impl Calls {
    pub fn refresh(&self) -> usize {
        self.refresh.load(Ordering::SeqCst)
    }

    pub fn session(&self) -> usize {
        self.session.load(Ordering::SeqCst)
    }

    pub fn logout(&self) -> usize {
        self.logout.load(Ordering::SeqCst)
    }

    pub fn instances(&self) -> usize {
        self.instances.load(Ordering::SeqCst)
    }
}

pub struct FakeBackend {
    pub gateway: Gateway,
    pub calls: Arc<Calls>,
}

/// Start the fake backend and return a gateway pointed at it.
pub async fn spawn_backend() -> FakeBackend {
    let calls = Arc::new(Calls::default());
    let router = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/instance", post(select_instance))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/backend/session", get(session))
        .route("/user-instances/user/{user_id}", get(instances))
        .route("/users/{user_id}", get(user).patch(update_user))
        .route("/auth/reset-password", post(reset_request))
        .route("/auth/reset-password/check", get(reset_check))
        .route("/auth/reset-password/update", post(reset_update))
        .route("/user-pre/check", get(pre_check))
        .with_state(calls.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let config = GatewayConfig::new(format!("http://{addr}").parse().unwrap())
        .with_timeout(Duration::from_millis(500));
    FakeBackend {
        gateway: Gateway::new(config),
        calls,
    }
}

/// Gateway pointed at a port nothing listens on.
pub fn unreachable_gateway() -> Gateway {
    let config = GatewayConfig::new("http://127.0.0.1:9".parse().unwrap())
        .with_timeout(Duration::from_millis(500));
    Gateway::new(config)
}

pub fn bound_session() -> Value {
    json!({
        "userId": "u-1",
        "email": "ana@example.com",
        "isRoot": false,
        "dbId": "db-7",
        "instanceName": "Acme",
        "roleBack": "admin",
        "roleFront": "buyer",
    })
}

pub fn unbound_session() -> Value {
    json!({
        "userId": "u-1",
        "email": "ana@example.com",
        "isRoot": false,
    })
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn rejected(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

async fn login(State(calls): State<Arc<Calls>>, Json(body): Json<Value>) -> Response {
    calls.login.fetch_add(1, Ordering::SeqCst);
    if body["password"] == PASSWORD {
        Json(json!({
            "accessToken": UNBOUND_TOKEN,
            "tokenType": "Bearer",
            "expiresIn": 900,
        }))
        .into_response()
    } else {
        rejected(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }
}

async fn select_instance(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if bearer(&headers) != Some(UNBOUND_TOKEN) {
        return rejected(StatusCode::UNAUTHORIZED, "Invalid token");
    }
    if body["dbId"] != "db-7" {
        return rejected(StatusCode::FORBIDDEN, "Instance not available");
    }
    Json(json!({
        "accessToken": BOUND_TOKEN,
        "refreshToken": REFRESH_TOKEN,
        "tokenType": "Bearer",
        "expiresIn": 10800,
    }))
    .into_response()
}

async fn refresh(State(calls): State<Arc<Calls>>, Json(body): Json<Value>) -> Response {
    calls.refresh.fetch_add(1, Ordering::SeqCst);
    if body["refreshToken"] != REFRESH_TOKEN {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "accessToken": BOUND_TOKEN,
        "refreshToken": ROTATED_REFRESH_TOKEN,
        "tokenType": "Bearer",
        "expiresIn": 10800,
    }))
    .into_response()
}

async fn logout(State(calls): State<Arc<Calls>>) -> Response {
    calls.logout.fetch_add(1, Ordering::SeqCst);
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

async fn session(State(calls): State<Arc<Calls>>, headers: HeaderMap) -> Response {
    calls.session.fetch_add(1, Ordering::SeqCst);
    match bearer(&headers) {
        Some(BOUND_TOKEN) => Json(bound_session()).into_response(),
        Some(UNBOUND_TOKEN) => Json(unbound_session()).into_response(),
        Some(SLOW_TOKEN) => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(bound_session()).into_response()
        }
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn instances(State(calls): State<Arc<Calls>>, Path(user_id): Path<String>) -> Response {
    calls.instances.fetch_add(1, Ordering::SeqCst);
    match user_id.as_str() {
        "nobody" => StatusCode::NOT_FOUND.into_response(),
        "broken" => rejected(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable"),
        _ => Json(json!([
            {
                "id": 1, "userId": user_id, "dbId": "db-7",
                "roleback": "admin", "rolefront": "buyer", "isActive": true,
                "instanceName": "Acme", "instanceDbName": "acme", "instanceDbHost": "10.0.0.4",
            },
            {
                "id": 2, "userId": user_id, "dbId": "db-8",
                "roleback": "admin", "rolefront": "saler", "isActive": false,
                "instanceName": "Old Co", "instanceDbName": "oldco", "instanceDbHost": "10.0.0.5",
            },
        ]))
        .into_response(),
    }
}

pub fn user_data() -> Value {
    json!({
        "userId": "u-1",
        "email": "ana@example.com",
        "phone": "11987654321",
        "name": "Ana",
        "isRoot": false,
        "isActive": true,
    })
}

async fn user(headers: HeaderMap, Path(user_id): Path<String>) -> Response {
    if bearer(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if user_id != "u-1" {
        return rejected(StatusCode::NOT_FOUND, "User not found");
    }
    Json(user_data()).into_response()
}

async fn update_user(
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if bearer(&headers).is_none() {
        return rejected(StatusCode::UNAUTHORIZED, "Invalid token");
    }
    if user_id != "u-1" {
        return rejected(StatusCode::NOT_FOUND, "User not found");
    }
    if let Some(password) = body["password"].as_str() {
        if password.len() < 8 {
            return rejected(StatusCode::BAD_REQUEST, "Password too short");
        }
        return Json(user_data()).into_response();
    }
    if body["name"].as_str().is_none_or(str::is_empty) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": ["name should not be empty"] })),
        )
            .into_response();
    }

    let mut user = user_data();
    for field in ["name", "email", "phone"] {
        user[field] = body[field].clone();
    }
    Json(user).into_response()
}

async fn reset_request(Json(body): Json<Value>) -> StatusCode {
    match body["email"].as_str() {
        Some("missing@example.com") => StatusCode::NOT_FOUND,
        Some("crash@example.com") => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    }
}

async fn reset_check(Query(query): Query<HashMap<String, String>>) -> Response {
    if query.get("token").map(String::as_str) == Some("good") {
        Json(json!({ "isValid": true, "name": "Ana", "email": query.get("email") }))
            .into_response()
    } else {
        StatusCode::BAD_REQUEST.into_response()
    }
}

async fn reset_update(Json(body): Json<Value>) -> Response {
    if body["token"] == "good" {
        Json(json!({ "passwordUpdated": true, "name": "Ana", "email": body["email"] }))
            .into_response()
    } else {
        StatusCode::GONE.into_response()
    }
}

async fn pre_check(Query(query): Query<HashMap<String, String>>) -> Response {
    if query.get("token").map(String::as_str) == Some("invite") {
        Json(json!({ "email": query.get("email"), "name": "Ana" })).into_response()
    } else {
        rejected(StatusCode::UNAUTHORIZED, "Token expired")
    }
}
