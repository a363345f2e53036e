//! Router configuration for the HTTP API.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Prefix shared by every entity endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let api_v1 = Router::new()
        .route("/birds", get(handlers::list_birds).post(handlers::create_bird))
        .route("/birds/query", get(handlers::query_birds))
        .route(
            "/birds/{id}",
            get(handlers::get_bird)
                .put(handlers::update_bird)
                .delete(handlers::delete_bird),
        )
        .route(
            "/sightings",
            get(handlers::list_sightings).post(handlers::create_sighting),
        )
        .route("/sightings/query", get(handlers::query_sightings))
        .route(
            "/sightings/{id}",
            get(handlers::get_sighting).delete(handlers::delete_sighting),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest(API_PREFIX, api_v1)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
