//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::Serialize;

use crate::cache::{CacheEntry, CacheStats, Value};

/// Response body for `GET /items/:key`
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: serde_json::Value,
    /// Runtime type tag of the stored value
    pub kind: &'static str,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: &Value) -> Self {
        Self {
            key: key.into(),
            value: value.to_json(),
            kind: value.kind(),
        }
    }
}

/// Response body for `PUT /items/:key` and `POST /items/:key`
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for `DELETE /items/:key`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// One entry of the `GET /items` snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    pub value: serde_json::Value,
    pub kind: &'static str,
    /// Absolute expiry in Unix nanoseconds, null = never
    pub expires_at: Option<i64>,
    /// Milliseconds left before expiry, null = never
    pub ttl_remaining_ms: Option<u64>,
}

/// Response body for `GET /items`, keyed and sorted by cache key
pub type ItemsResponse = BTreeMap<String, ItemView>;

/// Builds the `GET /items` body from a cache snapshot.
pub fn items_response(items: HashMap<String, CacheEntry>) -> ItemsResponse {
    items
        .into_iter()
        .map(|(key, entry)| {
            let view = ItemView {
                value: entry.value.to_json(),
                kind: entry.value.kind(),
                expires_at: entry.expires_at,
                ttl_remaining_ms: entry.ttl_remaining_ms(),
            };
            (key, view)
        })
        .collect()
}

/// Response body for `POST /save` and `POST /load`
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotResponse {
    /// Success message
    pub message: String,
    /// Number of entries written or merged
    pub entries: usize,
}

impl SnapshotResponse {
    pub fn saved(entries: usize) -> Self {
        Self {
            message: format!("Saved {} entries", entries),
            entries,
        }
    }

    pub fn loaded(entries: usize) -> Self {
        Self {
            message: format!("Loaded {} entries", entries),
            entries,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of expired entries removed by sweeps
    pub expired_removed: u64,
    /// Raw number of entries in the cache, expired ones included
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expired_removed: stats.expired_removed,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
