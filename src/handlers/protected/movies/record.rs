use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::database::models::MovieInput;
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// PATCH /movies/:id - partial update of title, plot and genre
#[utoipa::path(
    patch,
    path = "/movies/{id}",
    tag = "movies",
    params(("id" = String, Path, description = "Movie id")),
    request_body = MovieInput,
    responses(
        (status = 200, description = "Movie updated"),
        (status = 400, description = "Empty patch, malformed id or title taken"),
        (status = 401, description = "Missing or revoked token"),
        (status = 404, description = "No such movie")
    ),
    security(("bearer" = []))
)]
pub async fn movie_patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MovieInput>, JsonRejection>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let Json(input) = payload?;
    if input.is_empty() {
        return Err(ApiError::validation_error(
            "Provide at least one of title, plot or genre",
            None,
        ));
    }

    let movie = state.movies.update(&id, input).await?;

    Ok(ApiResponse::success(json!({
        "message": format!("The record for '{}' has been updated", movie.title),
        "movie": movie,
    })))
}

/// DELETE /movies/:id - removes the record and its poster file
#[utoipa::path(
    delete,
    path = "/movies/{id}",
    tag = "movies",
    params(("id" = String, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Movie and poster deleted"),
        (status = 401, description = "Missing or revoked token"),
        (status = 404, description = "No such movie")
    ),
    security(("bearer" = []))
)]
pub async fn movie_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let movie = state.movies.remove(&id).await?;

    Ok(ApiResponse::success(json!({
        "message": format!("The movie '{}' has been deleted", movie.title),
        "movie": movie,
    })))
}
