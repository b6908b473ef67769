//! API Handlers
//!
//! HTTP request handlers for the cache diagnostics endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{Cache, CleanupReport, EntryMetadata, StatsSnapshot};
use crate::error::{CacheError, Result};
use crate::models::{ClearResponse, DeleteResponse, HealthResponse};

/// Application state shared across all handlers.
///
/// Holds a handle to the process cache; the handle is cheap to clone and
/// every clone sees the same entries.
#[derive(Clone)]
pub struct AppState<V> {
    pub cache: Cache<V>,
}

impl<V> AppState<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a new AppState around an existing cache handle.
    pub fn new(cache: Cache<V>) -> Self {
        Self { cache }
    }
}

/// Handler for GET /stats
pub async fn stats_handler<V>(State(state): State<AppState<V>>) -> Json<StatsSnapshot>
where
    V: Clone + Send + Sync + 'static,
{
    Json(state.cache.stats())
}

/// Handler for GET /metadata
///
/// Per-entry diagnostics without the cached payloads.
pub async fn metadata_handler<V>(State(state): State<AppState<V>>) -> Json<Vec<EntryMetadata>>
where
    V: Clone + Send + Sync + 'static,
{
    Json(state.cache.metadata())
}

/// Handler for POST /cleanup
///
/// Runs an expiry sweep immediately.
pub async fn cleanup_handler<V>(State(state): State<AppState<V>>) -> Json<CleanupReport>
where
    V: Clone + Send + Sync + 'static,
{
    Json(state.cache.cleanup_detailed())
}

/// Handler for DELETE /cache
pub async fn clear_handler<V>(State(state): State<AppState<V>>) -> Json<ClearResponse>
where
    V: Clone + Send + Sync + 'static,
{
    let cleared = state.cache.len();
    state.cache.clear();
    Json(ClearResponse::new(cleared))
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler<V>(
    State(state): State<AppState<V>>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>>
where
    V: Clone + Send + Sync + 'static,
{
    if state.cache.delete(&key) {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(CacheError::NotFound(key))
    }
}

/// Handler for GET /health
pub async fn health_handler<V>(State(state): State<AppState<V>>) -> Json<HealthResponse>
where
    V: Clone + Send + Sync + 'static,
{
    Json(HealthResponse::healthy(state.cache.loading_count()))
}
