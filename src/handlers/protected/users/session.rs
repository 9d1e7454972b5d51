use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, AuthContext};
use crate::state::AppState;

/// POST /users/logout - revoke the token used for this request
#[utoipa::path(
    post,
    path = "/users/logout",
    tag = "users",
    responses(
        (status = 200, description = "Token revoked"),
        (status = 401, description = "Missing or revoked token")
    ),
    security(("bearer" = []))
)]
pub async fn logout_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Value> {
    state.users.revoke_token(&auth.user, &auth.token).await?;

    Ok(ApiResponse::success(json!({
        "message": "Logged out",
    })))
}

/// POST /users/logoutAll - revoke every token the caller holds
#[utoipa::path(
    post,
    path = "/users/logoutAll",
    tag = "users",
    responses(
        (status = 200, description = "Every token revoked"),
        (status = 401, description = "Missing or revoked token")
    ),
    security(("bearer" = []))
)]
pub async fn logout_all_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Value> {
    state.users.revoke_all_tokens(&auth.user).await?;

    Ok(ApiResponse::success(json!({
        "message": "Logged out of all sessions",
    })))
}
