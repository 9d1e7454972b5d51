use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::Credentials;
use crate::state::AppState;

/// POST /users - create an account and sign the first token for it
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = Credentials,
    responses(
        (status = 201, description = "Account created, first token issued"),
        (status = 400, description = "Invalid credentials or username taken")
    )
)]
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(credentials) = payload?;

    let user = state
        .users
        .create(&credentials.username, &credentials.password)
        .await?;
    let token = state.users.issue_token(&user).await?;

    Ok(ApiResponse::created(json!({
        "user": user,
        "token": token,
    })))
}
