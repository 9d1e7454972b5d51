use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::database::models::MovieInput;
use crate::middleware::{ApiResponse, ApiResult, AuthContext};
use crate::state::AppState;

/// POST /movies - the caller becomes the movie's creator
#[utoipa::path(
    post,
    path = "/movies",
    tag = "movies",
    request_body = MovieInput,
    responses(
        (status = 201, description = "Movie added"),
        (status = 400, description = "Missing title or title taken"),
        (status = 401, description = "Missing or revoked token")
    ),
    security(("bearer" = []))
)]
pub async fn movies_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<MovieInput>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(input) = payload?;
    let movie = state.movies.create(input, &auth.user.id).await?;

    Ok(ApiResponse::created(json!({
        "message": format!("The film '{}' has been added to the catalogue", movie.title),
        "movie": movie,
    })))
}
