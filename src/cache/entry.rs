//! Cache Entry Module
//!
//! Defines a single cached value with its temporal metadata.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::Value;

// == Cache Entry ==
/// A single cached value plus timing metadata.
///
/// Timestamps are Unix milliseconds. The temporal fields are private: the
/// store is the sole mutator of entry timing, callers only observe it.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    value: Value,
    created_at: u64,
    updated_at: u64,
    ttl_ms: u64,
    expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry holding `value`.
    ///
    /// Creation and update timestamps start out equal, and the expiry
    /// instant is `created_at + ttl`. A zero `ttl` means the entry never
    /// expires.
    pub fn new(value: Value, ttl: Duration) -> Self {
        let now = current_timestamp_ms();
        let ttl_ms = ttl.as_millis() as u64;

        Self {
            value,
            created_at: now,
            updated_at: now,
            ttl_ms,
            expires_at: now.saturating_add(ttl_ms),
        }
    }

    // == Update ==
    /// Replaces the value and refreshes `updated_at`.
    ///
    /// When `refresh_expiry` is true the expiry instant is pushed forward
    /// to `updated_at + ttl`; otherwise the entry keeps its current
    /// deadline. This distinguishes "touch the value" from "touch the
    /// value and extend its life."
    pub fn update(&mut self, value: Value, refresh_expiry: bool) {
        self.value = value;
        self.updated_at = current_timestamp_ms();
        if refresh_expiry {
            self.expires_at = self.updated_at.saturating_add(self.ttl_ms);
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired as of `now_ms`.
    ///
    /// An entry with a zero TTL never expires. The comparison is strict:
    /// an entry is still live at exactly `expires_at`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.ttl_ms > 0 && now_ms > self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining life in milliseconds as of `now_ms`.
    ///
    /// # Returns
    /// - `Some(remaining_ms)` while the entry is live
    /// - `Some(0)` once the entry has expired
    /// - `None` if the entry has no expiration
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> Option<u64> {
        if self.ttl_ms == 0 {
            None
        } else {
            Some(self.expires_at.saturating_sub(now_ms))
        }
    }

    // == Accessors ==
    /// The stored value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Creation timestamp (Unix milliseconds), fixed for the entry's life.
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Timestamp of the most recent write (Unix milliseconds).
    pub fn updated_at(&self) -> u64 {
        self.updated_at
    }

    /// Expiry instant (Unix milliseconds). Meaningless when the TTL is zero.
    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    /// The entry's fixed time-to-live.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(json!("test_value"), Duration::from_secs(60));

        assert_eq!(entry.value(), &json!("test_value"));
        assert_eq!(entry.created_at(), entry.updated_at());
        assert_eq!(entry.expires_at(), entry.created_at() + 60_000);
        assert_eq!(entry.ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_zero_ttl_never_expires() {
        let entry = CacheEntry::new(json!(1), Duration::ZERO);

        assert!(!entry.is_expired(entry.created_at()));
        assert!(!entry.is_expired(entry.created_at() + 1));
        assert!(!entry.is_expired(u64::MAX));
    }

    #[test]
    fn test_expiry_boundary() {
        let entry = CacheEntry::new(json!(1), Duration::from_millis(1000));
        let deadline = entry.created_at() + 1000;

        assert!(!entry.is_expired(deadline - 1));
        // Still live at exactly the deadline
        assert!(!entry.is_expired(deadline));
        assert!(entry.is_expired(deadline + 1));
    }

    #[test]
    fn test_update_replaces_value_and_touches_timestamp() {
        let mut entry = CacheEntry::new(json!("old"), Duration::from_secs(60));
        let created = entry.created_at();

        entry.update(json!("new"), false);

        assert_eq!(entry.value(), &json!("new"));
        assert_eq!(entry.created_at(), created);
        assert!(entry.updated_at() >= created);
    }

    #[test]
    fn test_update_without_refresh_keeps_deadline() {
        let mut entry = CacheEntry::new(json!(0), Duration::from_secs(60));
        let deadline = entry.expires_at();

        std::thread::sleep(Duration::from_millis(30));
        entry.update(json!(1), false);

        assert_eq!(entry.expires_at(), deadline);
    }

    #[test]
    fn test_update_with_refresh_extends_deadline() {
        let mut entry = CacheEntry::new(json!(0), Duration::from_secs(60));
        let deadline = entry.expires_at();

        std::thread::sleep(Duration::from_millis(30));
        entry.update(json!(1), true);

        assert!(entry.expires_at() > deadline);
        assert_eq!(entry.expires_at(), entry.updated_at() + 60_000);
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new(json!(1), Duration::from_millis(1000));
        let t0 = entry.created_at();

        assert_eq!(entry.ttl_remaining_ms(t0), Some(1000));
        assert_eq!(entry.ttl_remaining_ms(t0 + 400), Some(600));
        assert_eq!(entry.ttl_remaining_ms(t0 + 5000), Some(0));
    }

    #[test]
    fn test_ttl_remaining_no_expiration() {
        let entry = CacheEntry::new(json!(1), Duration::ZERO);
        assert_eq!(entry.ttl_remaining_ms(u64::MAX), None);
    }
}
