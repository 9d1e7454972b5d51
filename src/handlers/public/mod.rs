// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Welcome and health endpoints, account acquisition (signup/login), and
// read-only catalogue access.

use axum::extract::State;
use serde_json::{json, Value};

use crate::database::RecordStore;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub mod movies;
pub mod users;

/// GET / - welcome message and route summary
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Welcome message and route summary"))
)]
pub async fn root() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "message": "Welcome to the movies API",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/ping (public)",
            "documentation": "/documentation (public), OpenAPI document at /api-docs/openapi.json",
            "users": "POST /users, POST /users/login (public); /users/logout, /users/logoutAll, /users/me (protected)",
            "movies": "GET /movies (public); POST /movies, PATCH|DELETE /movies/:id (protected)",
            "posters": "GET /movies/:id/poster (public); POST|DELETE /movies/:id/poster (protected)",
        }
    }))
}

/// GET /ping - liveness plus a record store round trip
#[utoipa::path(
    get,
    path = "/ping",
    tag = "health",
    responses(
        (status = 200, description = "Service and record store are reachable"),
        (status = 503, description = "Record store unavailable")
    )
)]
pub async fn ping(State(state): State<AppState>) -> ApiResult<Value> {
    match state.store.health_check().await {
        Ok(()) => Ok(ApiResponse::success(json!({
            "ping": "pong",
            "store": state.store.backend(),
        }))),
        Err(e) => {
            tracing::error!("Record store health check failed: {}", e);
            Err(ApiError::service_unavailable("Record store unavailable"))
        }
    }
}
