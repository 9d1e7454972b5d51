use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
};
use serde_json::{json, Value};

use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /movies/:id/poster - raw image body, replaces any existing poster
#[utoipa::path(
    post,
    path = "/movies/{id}/poster",
    tag = "posters",
    params(("id" = String, Path, description = "Movie id")),
    request_body(content = Vec<u8>, content_type = "image/jpeg", description = "Raw image bytes"),
    responses(
        (status = 200, description = "Poster stored"),
        (status = 400, description = "Empty body or malformed id"),
        (status = 401, description = "Missing or revoked token"),
        (status = 404, description = "No such movie"),
        (status = 413, description = "Image over the size limit")
    ),
    security(("bearer" = []))
)]
pub async fn poster_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let body = body?;
    let movie = state.movies.attach_poster(&id, &body).await?;

    Ok(ApiResponse::success(json!({
        "message": "Poster uploaded. Use GET on this route to check it out.",
        "movie": movie,
    })))
}

/// DELETE /movies/:id/poster
#[utoipa::path(
    delete,
    path = "/movies/{id}/poster",
    tag = "posters",
    params(("id" = String, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Poster removed"),
        (status = 401, description = "Missing or revoked token"),
        (status = 404, description = "No such movie or no poster")
    ),
    security(("bearer" = []))
)]
pub async fn poster_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let movie = state.movies.remove_poster(&id).await?;

    Ok(ApiResponse::success(json!({
        "message": "Poster removed",
        "movie": movie,
    })))
}
