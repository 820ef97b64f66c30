use axum::{
    extract::State,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    models::HealthResponse,
};

pub mod ml;
pub mod movies;
pub mod recommendations;
pub mod state;

pub use state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    Router::new()
        .nest("/api", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(cors),
        )
}

/// API routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/movies/popular", get(movies::popular))
        .route("/movies/search", get(movies::search))
        .route("/movies/:movie_id", get(movies::detail))
        .route("/ml/movies", get(ml::list_movies))
        .route("/recommendations", post(recommendations::recommend))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match origin.parse::<HeaderValue>() {
        Ok(value) if origin != "*" => layer.allow_origin(AllowOrigin::exact(value)),
        Ok(_) => layer.allow_origin(Any),
        Err(e) => {
            tracing::warn!(origin = %origin, error = %e, "Invalid CORS origin, allowing any");
            layer.allow_origin(Any)
        }
    }
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.dataset.snapshot().await;
    tracing::debug!(
        cached_movies = snapshot.len,
        fresh = snapshot.is_fresh,
        fetched_at = ?snapshot.fetched_at,
        "Health check"
    );

    Json(HealthResponse {
        status: "ok",
        service: "reel-api",
        tmdb_configured: state.metadata.is_configured(),
        ml_service: state.recommender.base_url().to_string(),
    })
}

/// Lenient numeric query parameter: missing or malformed values fall back
/// to `default`
pub(crate) fn parse_param(value: Option<&str>, default: usize) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param_falls_back_to_default() {
        assert_eq!(parse_param(None, 20), 20);
        assert_eq!(parse_param(Some("abc"), 20), 20);
        assert_eq!(parse_param(Some("-3"), 1), 1);
        assert_eq!(parse_param(Some(" 7 "), 1), 7);
    }
}
