//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `GET /items` - Snapshot of all live entries
//! - `PUT /items/:key` - Store a value
//! - `POST /items/:key` - Store a value if the key is absent
//! - `GET /items/:key` - Retrieve a value by key
//! - `DELETE /items/:key` - Delete a key
//! - `POST /save` / `POST /load` - Snapshot persistence
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
