use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::services::POSTER_CONTENT_TYPE;
use crate::state::AppState;

/// GET /movies/:id/poster - raw image bytes
#[utoipa::path(
    get,
    path = "/movies/{id}/poster",
    tag = "posters",
    params(("id" = String, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Poster image", content_type = "image/jpeg", body = Vec<u8>),
        (status = 404, description = "No such movie or no poster")
    )
)]
pub async fn poster_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let bytes = state.movies.fetch_poster(&id).await?;

    Ok(([(header::CONTENT_TYPE, POSTER_CONTENT_TYPE)], bytes).into_response())
}
