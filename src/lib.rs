pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod docs;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod types;

#[cfg(test)]
pub mod testing;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::middleware::require_auth;
use crate::state::AppState;

/// Build the full HTTP surface over the given application state
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/ping", get(handlers::public::ping))
        .merge(public_routes())
        // Protected
        .merge(protected_routes(&state))
        // Documentation
        .merge(docs::swagger_ui())
        .fallback(|| async { ApiError::not_found("Route not found") });

    if let Some(cors) = cors_layer(&state.config.security) {
        router = router.layer(cors);
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Serve the application until the listener fails
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, app(state)).await
}

fn public_routes() -> Router<AppState> {
    use handlers::public::{movies, users};

    Router::new()
        .route("/users", post(users::register_post))
        .route("/users/login", post(users::login_post))
        .route("/movies", get(movies::movies_get))
        .route("/movies/:id/poster", get(movies::poster_get))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    use handlers::protected::{movies, users};

    let poster_limit = DefaultBodyLimit::max(state.config.posters.max_bytes);

    Router::new()
        // Sessions and the caller's account
        .route("/users/logout", post(users::logout_post))
        .route("/users/logoutAll", post(users::logout_all_post))
        .route(
            "/users/me",
            get(users::me_get)
                .patch(users::me_patch)
                .delete(users::me_delete),
        )
        // Catalogue writes
        .route("/movies", post(movies::movies_post))
        .route(
            "/movies/:id",
            patch(movies::movie_patch).delete(movies::movie_delete),
        )
        .route(
            "/movies/:id/poster",
            post(movies::poster_post)
                .delete(movies::poster_delete)
                .layer(poster_limit),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
            .allow_headers(Any),
    )
}
