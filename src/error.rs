//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
///
/// The type is `Clone` because a single coalesced load hands its outcome to
/// every caller that joined it.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// The caller-supplied loader failed; the message is passed through as-is
    #[error("{0}")]
    Loader(Arc<anyhow::Error>),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),
}

impl CacheError {
    /// Wraps a loader failure so it can be shared between waiters.
    pub fn loader(err: impl Into<anyhow::Error>) -> Self {
        CacheError::Loader(Arc::new(err.into()))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Loader(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_error_is_verbatim() {
        let err = CacheError::loader(anyhow::anyhow!("budget service unavailable"));
        assert_eq!(err.to_string(), "budget service unavailable");
    }

    #[test]
    fn test_loader_error_clones_share_source() {
        let err = CacheError::loader(anyhow::anyhow!("boom"));
        let cloned = err.clone();
        match (err, cloned) {
            (CacheError::Loader(a), CacheError::Loader(b)) => assert!(Arc::ptr_eq(&a, &b)),
            _ => panic!("expected loader errors"),
        }
    }

    #[test]
    fn test_error_status_codes() {
        let test_cases = vec![
            (CacheError::NotFound("key".to_string()), StatusCode::NOT_FOUND),
            (CacheError::loader(anyhow::anyhow!("down")), StatusCode::BAD_GATEWAY),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }
}
