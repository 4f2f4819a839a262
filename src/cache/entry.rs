//! Cache Entry Module
//!
//! Defines cache entries and the rule that turns a relative lifetime into
//! an absolute expiration instant.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::cache::Value;

// == Expiration ==
/// Lifetime requested for a single write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Use the cache's configured default TTL
    Default,
    /// Never expire, whatever the default is
    Never,
    /// Expire once this much time has passed
    After(Duration),
}

impl Expiration {
    /// Maps the numeric convention used on the wire: `0` means default,
    /// any negative value means never, positive values are milliseconds.
    pub fn from_millis(ms: i64) -> Self {
        match ms {
            0 => Expiration::Default,
            ms if ms < 0 => Expiration::Never,
            ms => Expiration::After(Duration::from_millis(ms as u64)),
        }
    }
}

impl From<Duration> for Expiration {
    fn from(duration: Duration) -> Self {
        Expiration::After(duration)
    }
}

// == Compute Expiry ==
/// Resolves `expiration` against `default_ttl` (`None` = never) into an
/// absolute Unix-nanosecond instant, or `None` when the entry never expires.
pub fn compute_expiry(
    now: i64,
    expiration: Expiration,
    default_ttl: Option<Duration>,
) -> Option<i64> {
    let ttl = match expiration {
        Expiration::Default => default_ttl?,
        Expiration::Never => return None,
        Expiration::After(ttl) => ttl,
    };
    let ttl_nanos = i64::try_from(ttl.as_nanos()).unwrap_or(i64::MAX);
    Some(now.saturating_add(ttl_nanos))
}

// == Cache Entry ==
/// A stored value and the absolute instant after which it is stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Expiration timestamp (Unix nanoseconds), None = no expiration
    pub expires_at: Option<i64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry expiring at the given absolute instant.
    pub fn new(value: Value, expires_at: Option<i64>) -> Self {
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// The boundary is exclusive: an entry whose expiry equals `now` is
    /// still live and turns stale on the next instant.
    pub fn is_expired_at(&self, now: i64) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at.map(|expires| {
            let now = current_timestamp_nanos();
            if expires > now {
                ((expires - now) / 1_000_000) as u64
            } else {
                0
            }
        })
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in nanoseconds.
pub fn current_timestamp_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    const NOW: i64 = 1_700_000_000_000_000_000;

    #[test]
    fn test_from_millis_sentinels() {
        assert_eq!(Expiration::from_millis(0), Expiration::Default);
        assert_eq!(Expiration::from_millis(-1), Expiration::Never);
        assert_eq!(Expiration::from_millis(-500), Expiration::Never);
        assert_eq!(
            Expiration::from_millis(250),
            Expiration::After(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_compute_expiry_explicit_duration() {
        let expiry = compute_expiry(NOW, Duration::from_secs(2).into(), None);
        assert_eq!(expiry, Some(NOW + 2_000_000_000));
    }

    #[test]
    fn test_compute_expiry_uses_default() {
        let default = Some(Duration::from_millis(7));
        assert_eq!(
            compute_expiry(NOW, Expiration::Default, default),
            Some(NOW + 7_000_000)
        );
    }

    #[test]
    fn test_compute_expiry_default_never() {
        assert_eq!(compute_expiry(NOW, Expiration::Default, None), None);
    }

    #[test]
    fn test_compute_expiry_never_ignores_default() {
        let default = Some(Duration::from_secs(1));
        assert_eq!(compute_expiry(NOW, Expiration::Never, default), None);
    }

    #[test]
    fn test_compute_expiry_saturates() {
        let expiry = compute_expiry(NOW, Duration::MAX.into(), None);
        assert_eq!(expiry, Some(i64::MAX));
    }

    #[test]
    fn test_entry_no_ttl_never_expires() {
        let entry = CacheEntry::new(Value::from("v"), None);
        assert!(!entry.is_expired_at(i64::MAX));
        assert!(entry.ttl_remaining_ms().is_none());
    }

    #[test]
    fn test_expiration_boundary_is_exclusive() {
        let entry = CacheEntry::new(Value::from("v"), Some(NOW));

        assert!(!entry.is_expired_at(NOW - 1));
        assert!(!entry.is_expired_at(NOW), "Entry is still live at its expiry instant");
        assert!(entry.is_expired_at(NOW + 1));
    }

    #[test]
    fn test_entry_expiration_wall_clock() {
        let now = current_timestamp_nanos();
        let expires_at = compute_expiry(now, Duration::from_millis(20).into(), None);
        let entry = CacheEntry::new(Value::Int(1), expires_at);

        assert!(!entry.is_expired_at(current_timestamp_nanos()));

        sleep(Duration::from_millis(40));

        assert!(entry.is_expired_at(current_timestamp_nanos()));
        assert_eq!(entry.ttl_remaining_ms(), Some(0));
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let now = current_timestamp_nanos();
        let expires_at = compute_expiry(now, Duration::from_secs(10).into(), None);
        let entry = CacheEntry::new(Value::Int(1), expires_at);

        let remaining_ms = entry.ttl_remaining_ms().unwrap();
        assert!(remaining_ms <= 10_000);
        assert!(remaining_ms >= 9_000);
    }
}
