//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info};

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    items_response, validate_key, DeleteResponse, GetResponse, HealthResponse, ItemsResponse,
    SetResponse, SnapshotResponse, StatsResponse, WriteRequest,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: Arc<CacheStore>,
    /// File used by the save and load endpoints
    pub snapshot_path: Arc<PathBuf>,
}

impl AppState {
    /// Creates a new AppState with the given cache store and snapshot path.
    pub fn new(cache: CacheStore, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            cache: Arc::new(cache),
            snapshot_path: Arc::new(snapshot_path.into()),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheStore::from_config(config), config.snapshot_file.clone())
    }
}

/// Runs blocking snapshot I/O off the async worker threads.
async fn run_blocking<T, F>(state: &AppState, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&CacheStore, &std::path::Path) -> Result<T> + Send + 'static,
{
    let cache = Arc::clone(&state.cache);
    let path = Arc::clone(&state.snapshot_path);

    tokio::task::spawn_blocking(move || op(cache.as_ref(), path.as_path()))
        .await
        .map_err(|e| CacheError::Internal(format!("Snapshot task failed: {}", e)))?
}

/// Handler for PUT /items/:key
///
/// Stores a value, replacing any existing entry.
pub async fn set_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<WriteRequest>,
) -> Result<Json<SetResponse>> {
    validate_key(&key)?;
    let (value, expiration) = req.into_parts()?;

    state.cache.set(key.clone(), value, expiration);

    Ok(Json(SetResponse::new(key)))
}

/// Handler for POST /items/:key
///
/// Stores a value only if the key is absent; 409 otherwise.
pub async fn add_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<WriteRequest>,
) -> Result<(StatusCode, Json<SetResponse>)> {
    validate_key(&key)?;
    let (value, expiration) = req.into_parts()?;

    state.cache.add(key.clone(), value, expiration)?;

    Ok((StatusCode::CREATED, Json(SetResponse::new(key))))
}

/// Handler for GET /items/:key
///
/// Retrieves a live value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get(&key) {
        Some(value) => Ok(Json(GetResponse::new(key, &value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /items/:key
///
/// Deletes a key from the cache.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if state.cache.delete(&key) {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(CacheError::NotFound(key))
    }
}

/// Handler for GET /items
///
/// Returns every live entry with its kind and expiry.
pub async fn items_handler(State(state): State<AppState>) -> Json<ItemsResponse> {
    Json(items_response(state.cache.items()))
}

/// Handler for POST /save
///
/// Writes the live entries to the configured snapshot file.
pub async fn save_handler(State(state): State<AppState>) -> Result<Json<SnapshotResponse>> {
    let saved = run_blocking(&state, |cache, path| cache.save_to_file(path))
        .await
        .map_err(|e| {
            error!("Saving snapshot to {} failed: {}", state.snapshot_path.display(), e);
            e
        })?;

    info!("Saved {} entries to {}", saved, state.snapshot_path.display());
    Ok(Json(SnapshotResponse::saved(saved)))
}

/// Handler for POST /load
///
/// Merges the configured snapshot file into the cache. Answers 204 when
/// there is no snapshot file yet.
pub async fn load_handler(State(state): State<AppState>) -> Result<Response> {
    match run_blocking(&state, |cache, path| cache.load_from_file(path)).await {
        Ok(loaded) => {
            info!("Loaded {} entries from {}", loaded, state.snapshot_path.display());
            Ok(Json(SnapshotResponse::loaded(loaded)).into_response())
        }
        Err(CacheError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        Err(e) => {
            error!("Loading snapshot from {} failed: {}", state.snapshot_path.display(), e);
            Err(e)
        }
    }
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().into())
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
