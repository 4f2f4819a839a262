//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_handler, delete_handler, get_handler, health_handler, items_handler, load_handler,
    save_handler, set_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /items` - Snapshot of all live entries
/// - `PUT /items/:key` - Store a value (upsert)
/// - `POST /items/:key` - Store a value only if the key is absent
/// - `GET /items/:key` - Retrieve a value by key
/// - `DELETE /items/:key` - Delete a key
/// - `POST /save` - Write the snapshot file
/// - `POST /load` - Merge the snapshot file into the cache
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/items", get(items_handler))
        .route(
            "/items/:key",
            get(get_handler)
                .put(set_handler)
                .post(add_handler)
                .delete(delete_handler),
        )
        .route("/save", post(save_handler))
        .route("/load", post(load_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
