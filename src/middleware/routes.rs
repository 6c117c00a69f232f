use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use axum_extra::extract::CookieJar;

use super::config::AuthConfig;
use super::state::ActionState;
use super::types::{
    ActionResponse, InstancesQuery, InstancesResponse, LoginRequest, LostPasswordRequest,
    PasswordChangeRequest, PasswordUpdateRequest, PreRegistrationResponse, RecoveryResponse,
    SelectInstanceRequest, TokenEmailQuery, UserUpdateResponse,
};
use crate::account::{ProfileUpdate, UserData};
use crate::error::Error;
use crate::recovery::{PasswordUpdate, ResetTokenCheck};
use crate::tokens::{CookiePolicy, TokenUpdate, get_tokens};
use crate::types::{Credentials, SessionData, UserId};

/// Create the auth action router.
///
/// Every handler answers with JSON and carries the resulting cookie
/// mutation on the response. None of them redirect: after a successful
/// action the caller refetches its session and navigates itself.
pub fn auth_routes(config: AuthConfig) -> Router {
    let auth_path = config.settings.auth_path.clone();

    let state = ActionState {
        gateway: Arc::new(config.gateway),
        settings: config.settings,
    };

    Router::new()
        .route(&format!("{auth_path}/login"), post(login))
        .route(&format!("{auth_path}/instance"), post(select_instance))
        .route(&format!("{auth_path}/refresh"), post(refresh))
        .route(&format!("{auth_path}/logout"), get(logout).post(logout))
        .route(&format!("{auth_path}/session"), get(session))
        .route(&format!("{auth_path}/instances/{{user_id}}"), get(instances))
        .route(
            &format!("{auth_path}/users/{{user_id}}"),
            get(get_user).patch(update_user),
        )
        .route(
            &format!("{auth_path}/users/{{user_id}}/password"),
            patch(change_password),
        )
        .route(&format!("{auth_path}/lost-password"), post(lost_password))
        .route(
            &format!("{auth_path}/reset-password/check"),
            get(check_reset_token),
        )
        .route(
            &format!("{auth_path}/reset-password/update"),
            post(update_password),
        )
        .route(&format!("{auth_path}/user-pre/check"), get(check_pre_registration))
        .with_state(state)
}

// ── Login ──────────────────────────────────────────────────────────

async fn login(
    State(state): State<ActionState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> (CookieJar, Json<ActionResponse>) {
    let credentials = Credentials::new(body.email, body.password);
    let result = state.gateway.login(&credentials, body.remember_me).await;
    respond(jar, state.settings.cookie_policy, result, "Login failed")
}

async fn select_instance(
    State(state): State<ActionState>,
    jar: CookieJar,
    Json(body): Json<SelectInstanceRequest>,
) -> (CookieJar, Json<ActionResponse>) {
    let tokens = get_tokens(&jar);
    let result = state.gateway.select_instance(&tokens, &body.db_id).await;
    respond(
        jar,
        state.settings.cookie_policy,
        result,
        "Instance selection failed",
    )
}

async fn refresh(
    State(state): State<ActionState>,
    jar: CookieJar,
) -> (CookieJar, Json<ActionResponse>) {
    let tokens = get_tokens(&jar);
    let result = state.gateway.refresh(&tokens).await;
    respond(jar, state.settings.cookie_policy, result, "Token refresh failed")
}

// ── Logout ─────────────────────────────────────────────────────────

async fn logout(
    State(state): State<ActionState>,
    jar: CookieJar,
) -> (CookieJar, Json<ActionResponse>) {
    let tokens = get_tokens(&jar);
    let update = state.gateway.logout(&tokens).await;
    (
        update.apply(jar, state.settings.cookie_policy),
        Json(ActionResponse::ok()),
    )
}

// ── Session & instances ────────────────────────────────────────────

async fn session(State(state): State<ActionState>, jar: CookieJar) -> Json<Option<SessionData>> {
    Json(state.gateway.get_session(&get_tokens(&jar)).await)
}

async fn instances(
    State(state): State<ActionState>,
    jar: CookieJar,
    Path(user_id): Path<String>,
    Query(query): Query<InstancesQuery>,
) -> Json<InstancesResponse> {
    let tokens = get_tokens(&jar);
    let user_id = UserId(user_id);
    let result = if query.active {
        state.gateway.list_active_instances(&tokens, &user_id).await
    } else {
        state.gateway.list_instances(&tokens, &user_id).await
    };
    Json(result.into())
}

// ── Account ────────────────────────────────────────────────────────

async fn get_user(
    State(state): State<ActionState>,
    jar: CookieJar,
    Path(user_id): Path<String>,
) -> Json<Option<UserData>> {
    Json(
        state
            .gateway
            .get_user(&get_tokens(&jar), &UserId(user_id))
            .await,
    )
}

async fn update_user(
    State(state): State<ActionState>,
    jar: CookieJar,
    Path(user_id): Path<String>,
    Json(profile): Json<ProfileUpdate>,
) -> Json<UserUpdateResponse> {
    let result = state
        .gateway
        .update_user(&get_tokens(&jar), &UserId(user_id), &profile)
        .await;
    Json(result.into())
}

async fn change_password(
    State(state): State<ActionState>,
    jar: CookieJar,
    Path(user_id): Path<String>,
    Json(body): Json<PasswordChangeRequest>,
) -> Json<ActionResponse> {
    let result = state
        .gateway
        .change_password(&get_tokens(&jar), &UserId(user_id), &body.password)
        .await;
    Json(match result {
        Ok(()) => ActionResponse::ok(),
        Err(e) => ActionResponse::failed(&e, "Failed to change password"),
    })
}

// ── Recovery ───────────────────────────────────────────────────────

async fn lost_password(
    State(state): State<ActionState>,
    Json(body): Json<LostPasswordRequest>,
) -> Json<RecoveryResponse> {
    let response = match state.gateway.request_password_reset(&body.email).await {
        Ok(()) => RecoveryResponse {
            success: true,
            error: None,
            message: Some("Recovery email sent".into()),
        },
        Err(e) => RecoveryResponse {
            success: false,
            error: Some(e.user_message("Unexpected error, please try again")),
            message: None,
        },
    };
    Json(response)
}

async fn check_reset_token(
    State(state): State<ActionState>,
    Query(query): Query<TokenEmailQuery>,
) -> Json<ResetTokenCheck> {
    Json(
        state
            .gateway
            .check_reset_token(&query.token, &query.email)
            .await,
    )
}

async fn update_password(
    State(state): State<ActionState>,
    Json(body): Json<PasswordUpdateRequest>,
) -> Json<PasswordUpdate> {
    Json(
        state
            .gateway
            .update_password(&body.token, &body.email, &body.password)
            .await,
    )
}

async fn check_pre_registration(
    State(state): State<ActionState>,
    Query(query): Query<TokenEmailQuery>,
) -> Json<PreRegistrationResponse> {
    let response = match state
        .gateway
        .check_pre_registration(&query.email, &query.token)
        .await
    {
        Ok(data) => PreRegistrationResponse {
            success: true,
            status: 200,
            message: "Valid token".into(),
            data: Some(data),
        },
        Err(e) => PreRegistrationResponse {
            success: false,
            status: e.status().unwrap_or(500),
            message: e.user_message("Invalid or expired token"),
            data: None,
        },
    };
    Json(response)
}

// ── Helpers ────────────────────────────────────────────────────────

fn respond(
    jar: CookieJar,
    policy: CookiePolicy,
    result: Result<TokenUpdate, Error>,
    fallback: &str,
) -> (CookieJar, Json<ActionResponse>) {
    match result {
        Ok(update) => (update.apply(jar, policy), Json(ActionResponse::ok())),
        Err(e) => (jar, Json(ActionResponse::failed(&e, fallback))),
    }
}
