//! API Module
//!
//! HTTP handlers and routing for the cache observability server.
//!
//! # Endpoints
//! - `GET /topics` - Cached topic generation
//! - `DELETE /keys/:key` - Invalidate a cache key
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
