//! KV Storage - An in-memory key-value cache server
//!
//! Provides TTL expiration, a background janitor and snapshot persistence
//! behind a small HTTP API.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheStore, Expiration, Value};
pub use config::Config;
pub use error::CacheError;
