use axum::extract::{rejection::QueryRejection, Query, State};
use serde_json::{json, Value};

use crate::filter::MovieQuery;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /movies?name=&letter=&genre=&limit=&skip=
///
/// Answers 204 with no body when nothing matches.
#[utoipa::path(
    get,
    path = "/movies",
    tag = "movies",
    params(MovieQuery),
    responses(
        (status = 200, description = "Matching movies in insertion order"),
        (status = 204, description = "Nothing matched"),
        (status = 400, description = "Malformed query")
    )
)]
pub async fn movies_get(
    State(state): State<AppState>,
    query: Result<Query<MovieQuery>, QueryRejection>,
) -> ApiResult<Value> {
    let Query(query) = query?;
    let movies = state.movies.list(&query).await?;

    if movies.is_empty() {
        tracing::debug!(?query, "No movies matched");
        return Ok(ApiResponse::no_content());
    }

    Ok(ApiResponse::success(json!({
        "message": "These are the movies you were looking for",
        "count": movies.len(),
        "movies": movies,
    })))
}
