use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Persona catalogue
        .route("/personas", get(handlers::list_personas))
        // Session lifecycle
        .route(
            "/calls",
            post(handlers::create_call).get(handlers::list_calls),
        )
        .route(
            "/calls/:call_id",
            get(handlers::get_call).delete(handlers::delete_call),
        )
        .route("/calls/:call_id/events", post(handlers::ingest_event))
        .route("/calls/:call_id/live", get(handlers::live_snapshot))
        .route("/calls/:call_id/complete", post(handlers::complete_call))
        // Analysis
        .route("/calls/:call_id/analyze", post(handlers::analyze_call))
        .route("/calls/:call_id/report", get(handlers::get_report))
        // Browser clients poll the report endpoint directly
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
