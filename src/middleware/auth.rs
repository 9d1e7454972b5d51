use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

pub const QUERY_TOKEN_PARAM: &str = "access_token";

/// Caller identity resolved from a live bearer token
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user: User,
    pub token: String,
}

/// Rejects the request with 401 unless it carries a token that verifies and is
/// still in the owner's token list.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_token(
        request.headers(),
        request.uri().query(),
        state.config.security.allow_query_token,
    ) {
        Ok(token) => token,
        Err(reason) => {
            tracing::warn!(path = %request.uri().path(), "Authentication failed: {}", reason);
            return ApiError::unauthorized("Please authenticate").into_response();
        }
    };

    match state.users.resolve_token(&token).await {
        Ok(user) => {
            tracing::debug!(user_id = %user.id, "Request authenticated");
            request.extensions_mut().insert(AuthContext { user, token });
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(path = %request.uri().path(), "Authentication failed: {}", e);
            let err: ApiError = e.into();
            match err {
                ApiError::Unauthorized(_) => ApiError::unauthorized("Please authenticate").into_response(),
                other => other.into_response(),
            }
        }
    }
}

/// Bearer token from the Authorization header, falling back to the query string
fn extract_token(
    headers: &HeaderMap,
    query: Option<&str>,
    allow_query_token: bool,
) -> Result<String, &'static str> {
    if let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| "Invalid Authorization header format")?;
        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or("Authorization header must use Bearer token format")?
            .trim();
        if token.is_empty() {
            return Err("Empty bearer token");
        }
        return Ok(token.to_string());
    }

    if allow_query_token {
        if let Some(token) = query.and_then(query_token) {
            return Ok(token);
        }
    }

    Err("Missing bearer token")
}

fn query_token(query: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == QUERY_TOKEN_PARAM)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}
