//! Cache Store Module
//!
//! Main cache engine: a HashMap behind a single reader/writer lock, with
//! lazy expiration on reads and a background janitor for sweeps.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::error;

use crate::cache::entry::{compute_expiry, current_timestamp_nanos};
use crate::cache::stats::StatsCounters;
use crate::cache::{snapshot, CacheEntry, CacheStats, Expiration, Value};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::Janitor;

// == Store Inner ==
/// State shared between the store handle and its janitor task.
#[derive(Debug)]
pub(crate) struct StoreInner {
    /// Key-value storage
    items: RwLock<HashMap<String, CacheEntry>>,
    /// TTL applied for `Expiration::Default`, None = never expire
    default_ttl: Option<Duration>,
    /// Lookup and sweep counters
    stats: StatsCounters,
}

impl StoreInner {
    pub(crate) fn new(default_ttl: Option<Duration>, capacity_hint: usize) -> Self {
        Self {
            items: RwLock::new(HashMap::with_capacity(capacity_hint)),
            default_ttl: default_ttl.filter(|ttl| !ttl.is_zero()),
            stats: StatsCounters::default(),
        }
    }

    // == Delete Expired ==
    /// Removes every entry expired as of the start of the scan.
    ///
    /// Returns the number of entries removed.
    pub(crate) fn delete_expired(&self) -> usize {
        let now = current_timestamp_nanos();
        let removed = {
            let mut items = self.items.write();
            let before = items.len();
            items.retain(|_, entry| !entry.is_expired_at(now));
            before - items.len()
        };

        self.stats.record_expired_removed(removed);
        removed
    }
}

// == Cache Store ==
/// Thread-safe in-memory key-value store with TTL support.
///
/// Reads (`get`, `items`, `item_count`) share the lock; writes (`set`,
/// `add`, `delete`, `delete_expired`, snapshot loads) hold it exclusively.
#[derive(Debug)]
pub struct CacheStore {
    inner: Arc<StoreInner>,
    /// Background sweeper, None when disabled or already stopped
    janitor: Mutex<Option<Janitor>>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL for writes using `Expiration::Default` (None = never)
    /// * `cleanup_interval` - Janitor period; zero disables the janitor
    /// * `capacity_hint` - Number of entries to pre-allocate room for
    ///
    /// A non-zero `cleanup_interval` starts a janitor on its own thread;
    /// call [`CacheStore::shutdown`] before dropping the store.
    pub fn new(
        default_ttl: Option<Duration>,
        cleanup_interval: Duration,
        capacity_hint: usize,
    ) -> Self {
        let inner = Arc::new(StoreInner::new(default_ttl, capacity_hint));
        let janitor = Janitor::start(Arc::clone(&inner), cleanup_interval);

        Self {
            inner,
            janitor: Mutex::new(janitor),
        }
    }

    /// Creates a CacheStore from the server configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.default_ttl(),
            config.cleanup_interval(),
            config.capacity_hint,
        )
    }

    /// Returns the TTL used for `Expiration::Default` writes.
    pub fn default_ttl(&self) -> Option<Duration> {
        self.inner.default_ttl
    }

    fn entry_for(&self, value: Value, expiration: Expiration) -> CacheEntry {
        let expires_at = compute_expiry(
            current_timestamp_nanos(),
            expiration,
            self.inner.default_ttl,
        );
        CacheEntry::new(value, expires_at)
    }

    // == Set ==
    /// Stores a value, replacing any existing entry and its expiry.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>, expiration: Expiration) {
        let entry = self.entry_for(value.into(), expiration);
        self.inner.items.write().insert(key.into(), entry);
    }

    // == Add ==
    /// Stores a value only if the key is not present.
    ///
    /// Presence is checked against the table, not liveness: an expired
    /// entry that has not been swept yet still blocks the insert.
    pub fn add(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
        expiration: Expiration,
    ) -> Result<()> {
        let key = key.into();
        let entry = self.entry_for(value.into(), expiration);

        let mut items = self.inner.items.write();
        if items.contains_key(&key) {
            return Err(CacheError::AlreadyExists(key));
        }
        items.insert(key, entry);
        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Expired entries read as absent but stay in the table until a sweep
    /// or an explicit delete removes them.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = current_timestamp_nanos();
        let value = {
            let items = self.inner.items.read();
            items
                .get(key)
                .filter(|entry| !entry.is_expired_at(now))
                .map(|entry| entry.value.clone())
        };

        match value {
            Some(_) => self.inner.stats.record_hit(),
            None => self.inner.stats.record_miss(),
        }
        value
    }

    // == Delete ==
    /// Removes an entry by key, returning whether anything was removed.
    pub fn delete(&self, key: &str) -> bool {
        self.inner.items.write().remove(key).is_some()
    }

    // == Items ==
    /// Returns a copy of every entry still live at the time of the call.
    pub fn items(&self) -> HashMap<String, CacheEntry> {
        let now = current_timestamp_nanos();
        let items = self.inner.items.read();
        items
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }

    // == Item Count ==
    /// Returns the raw number of stored entries, expired ones included.
    pub fn item_count(&self) -> usize {
        self.inner.items.read().len()
    }

    // == Delete Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn delete_expired(&self) -> usize {
        self.inner.delete_expired()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.inner.stats.snapshot(self.item_count())
    }

    // == Save To File ==
    /// Writes a snapshot of the live entries to `path`, truncating any
    /// existing file.
    ///
    /// Returns the number of entries written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let items = self.items();
        let bytes = snapshot::encode(&items)?;
        std::fs::write(path, bytes)?;
        Ok(items.len())
    }

    // == Load From File ==
    /// Merges the snapshot stored at `path` into the table.
    ///
    /// Every key in the file overwrites the stored entry of the same key;
    /// keys absent from the file are left alone. Returns the number of
    /// entries merged.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let bytes = std::fs::read(path)?;
        let loaded = snapshot::decode(&bytes)?;
        let count = loaded.len();

        self.inner.items.write().extend(loaded);
        Ok(count)
    }

    // == Shutdown ==
    /// Stops the janitor and waits for its thread to exit. Calling it
    /// again is a no-op.
    pub fn shutdown(&self) {
        let janitor = self.janitor.lock().take();
        if let Some(handle) = janitor.and_then(Janitor::stop) {
            if handle.join().is_err() {
                error!("Janitor thread panicked");
            }
        }
    }

    /// Sweep interval of the running janitor, None when disabled or stopped.
    pub fn janitor_interval(&self) -> Option<Duration> {
        self.janitor.lock().as_ref().map(Janitor::interval)
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> Arc<StoreInner> {
        Arc::clone(&self.inner)
    }
}
