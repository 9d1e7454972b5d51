use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, AuthContext};
use crate::services::PasswordChange;
use crate::state::AppState;

/// GET /users/me
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "users",
    responses(
        (status = 200, description = "The caller's account"),
        (status = 401, description = "Missing or revoked token")
    ),
    security(("bearer" = []))
)]
pub async fn me_get(Extension(auth): Extension<AuthContext>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "user": auth.user,
    })))
}

/// PATCH /users/me - password change, requires the current password
#[utoipa::path(
    patch,
    path = "/users/me",
    tag = "users",
    request_body = PasswordChange,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "New password too weak"),
        (status = 401, description = "Wrong current password or missing token")
    ),
    security(("bearer" = []))
)]
pub async fn me_patch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<PasswordChange>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(change) = payload?;

    let user = state
        .users
        .change_password(&auth.user, &change.old_password, &change.new_password)
        .await?;

    Ok(ApiResponse::success(json!({
        "message": "Password updated",
        "user": user,
    })))
}

/// DELETE /users/me
#[utoipa::path(
    delete,
    path = "/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Account deleted"),
        (status = 401, description = "Missing or revoked token")
    ),
    security(("bearer" = []))
)]
pub async fn me_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Value> {
    state.users.delete(&auth.user).await?;

    Ok(ApiResponse::success(json!({
        "message": "User deleted",
        "user": auth.user,
    })))
}
