use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::Credentials;
use crate::state::AppState;

/// POST /users/login
#[utoipa::path(
    post,
    path = "/users/login",
    tag = "users",
    request_body = Credentials,
    responses(
        (status = 200, description = "Credentials accepted, token issued"),
        (status = 401, description = "Unknown username or wrong password")
    )
)]
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(credentials) = payload?;

    let user = state
        .users
        .authenticate(&credentials.username, &credentials.password)
        .await?;
    let token = state.users.issue_token(&user).await?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(ApiResponse::success(json!({
        "user": user,
        "token": token,
    })))
}
