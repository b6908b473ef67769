//! Response models for the diagnostics API
//!
//! DTOs used for serializing HTTP response bodies.

pub mod responses;

// Re-export commonly used types
pub use responses::{ClearResponse, DeleteResponse, HealthResponse};
