//! Error types for the cache server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine and its HTTP boundary.
///
/// Absence (`get` miss, `delete` of an unknown key) is not an error inside
/// the cache; `NotFound` only exists so handlers can answer with a 404.
#[derive(Error, Debug)]
pub enum CacheError {
    /// `add` on a key that is already stored, expired or not
    #[error("Key already exists: {0}")]
    AlreadyExists(String),

    /// Filesystem failure while saving or loading a snapshot
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot bytes could not be decoded
    #[error("Corrupt snapshot data: {0}")]
    CorruptData(String),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<bincode::Error> for CacheError {
    fn from(err: bincode::Error) -> Self {
        CacheError::CorruptData(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::AlreadyExists(_) => StatusCode::CONFLICT,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Io(_) | CacheError::CorruptData(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, CacheError>;
