//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::cache::{Expiration, Value, MAX_KEY_LENGTH};
use crate::error::{CacheError, Result};

/// Request body for `PUT /items/:key` and `POST /items/:key`
///
/// # Fields
/// - `value`: Any JSON value except an object
/// - `ttl_ms`: Optional TTL in milliseconds; absent or 0 uses the default,
///   negative values never expire
#[derive(Debug, Clone, Deserialize)]
pub struct WriteRequest {
    /// The value to store
    pub value: serde_json::Value,
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl_ms: Option<i64>,
}

impl WriteRequest {
    /// Requested lifetime for the write.
    pub fn expiration(&self) -> Expiration {
        Expiration::from_millis(self.ttl_ms.unwrap_or(0))
    }

    /// Splits the request into a cache value and its expiration.
    pub fn into_parts(self) -> Result<(Value, Expiration)> {
        let expiration = self.expiration();
        Ok((Value::from_json(self.value)?, expiration))
    }
}

/// Validates a key taken from the request path.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
