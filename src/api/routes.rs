//! API Routes
//!
//! Configures the Axum router with the cache diagnostics endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cleanup_handler, clear_handler, delete_handler, health_handler, metadata_handler,
    stats_handler, AppState,
};

/// Creates the diagnostics router for a cache.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /stats` - Counters and live keys
/// - `GET /metadata` - Per-entry diagnostics without payloads
/// - `POST /cleanup` - Run an expiry sweep now
/// - `DELETE /cache` - Clear the cache and reset counters
/// - `DELETE /cache/:key` - Invalidate one key
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router<V>(state: AppState<V>) -> Router
where
    V: Clone + Send + Sync + 'static,
{
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with the diagnostics endpoints
    Router::new()
        .route("/health", get(health_handler::<V>))
        .route("/stats", get(stats_handler::<V>))
        .route("/metadata", get(metadata_handler::<V>))
        .route("/cleanup", post(cleanup_handler::<V>))
        .route("/cache", delete(clear_handler::<V>))
        .route("/cache/:key", delete(delete_handler::<V>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
