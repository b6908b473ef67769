//! API Module
//!
//! HTTP handlers and routing for the cache diagnostics surface.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Cache statistics
//! - `GET /metadata` - Per-entry diagnostics
//! - `POST /cleanup` - Expiry sweep
//! - `DELETE /cache` - Clear the cache
//! - `DELETE /cache/:key` - Delete a key

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
