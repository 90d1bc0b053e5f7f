//! Cache Store Module
//!
//! Main cache engine: a schema-checked key/value map with TTL expiration
//! and two-mode write-through persistence.

use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats};
use crate::durability::{DurabilityLayer, NullDurability};
use crate::error::{CacheError, Result};
use crate::schema::{CommitMode, KeyMeta, Schema, ValueKind};

// == Write Outcome ==
/// Result of a write operation, shaped by the key's commit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Apply-mode write: in-memory state updated, durable write dispatched
    /// fire-and-forget.
    Applied,
    /// Commit-mode write acknowledged by the durability layer.
    Committed,
    /// Commit-mode write refused by the durability layer; no state changed.
    Rejected,
}

impl WriteOutcome {
    /// True unless the durability layer refused a commit-mode write.
    pub fn is_success(self) -> bool {
        !matches!(self, WriteOutcome::Rejected)
    }
}

// == Cache Store ==
/// Schema-driven cache store with per-key TTL and commit semantics.
///
/// The store exclusively owns every entry it holds and is the only mutator
/// of entry timestamps. Expiry is lazy: an expired entry is
/// indistinguishable from an absent one until a write, a read-with-default,
/// or a purge replaces it.
pub struct CacheStore {
    schema: Schema,
    entries: HashMap<String, CacheEntry>,
    durability: Arc<dyn DurabilityLayer>,
    stats: CacheStats,
}

impl CacheStore {
    // == Constructors ==
    /// Creates a store over `schema`, persisting through `durability`.
    pub fn new(schema: Schema, durability: Arc<dyn DurabilityLayer>) -> Self {
        Self {
            schema,
            entries: HashMap::new(),
            durability,
            stats: CacheStats::new(),
        }
    }

    /// Creates a purely in-memory store with no durable backing.
    pub fn in_memory(schema: Schema) -> Self {
        Self::new(schema, Arc::new(NullDurability))
    }

    // == Get ==
    /// Retrieves the current value for `key`.
    ///
    /// If a live (non-expired) entry exists its value is returned. Otherwise
    /// the schema default is inserted as a fresh entry and returned; absent
    /// and expired keys are observationally identical here. Reading never
    /// refreshes an entry's expiry.
    pub fn get(&mut self, key: &str) -> Result<Value> {
        let (default, ttl) = {
            let meta = self.meta(key)?;
            (meta.default.clone(), meta.ttl)
        };
        let now = current_timestamp_ms();

        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                self.stats.record_hit();
                return Ok(entry.value().clone());
            }
        }

        debug!("No live entry for '{}', synthesizing default", key);
        self.entries
            .insert(key.to_string(), CacheEntry::new(default.clone(), ttl));
        self.stats.record_miss();
        self.stats.set_total_entries(self.entries.len());
        Ok(default)
    }

    /// Retrieves the current value for `key`, decoded into `T`.
    pub fn get_as<T: DeserializeOwned>(&mut self, key: &str) -> Result<T> {
        let value = self.get(key)?;
        serde_json::from_value(value).map_err(|source| CacheError::Conversion {
            key: key.to_string(),
            source,
        })
    }

    // == Set ==
    /// Writes `value` to `key` under the key's declared commit mode.
    ///
    /// Apply-mode writes always land in memory and hand the value to the
    /// durability layer fire-and-forget. Commit-mode writes ask the
    /// durability layer first; a refusal leaves the prior value (or absence)
    /// completely untouched. Schema violations surface as errors before
    /// anything is written.
    pub fn set(&mut self, key: &str, value: Value) -> Result<WriteOutcome> {
        let (kind, ttl, commit_mode, refresh) = {
            let meta = self.meta(key)?;
            (
                meta.kind,
                meta.ttl,
                meta.commit_mode,
                meta.refresh_expiry_on_write,
            )
        };

        let actual = ValueKind::of(&value);
        if actual != kind {
            return Err(CacheError::TypeMismatch {
                key: key.to_string(),
                expected: kind,
                actual,
            });
        }

        match commit_mode {
            CommitMode::Apply => {
                self.durability.persist_async(key, &value);
                self.upsert(key, value, ttl, refresh);
                Ok(WriteOutcome::Applied)
            }
            CommitMode::Commit => {
                if self.durability.persist(key, &value) {
                    self.upsert(key, value, ttl, refresh);
                    Ok(WriteOutcome::Committed)
                } else {
                    self.stats.record_rejected_commit();
                    warn!(
                        "Durability layer rejected write to '{}', in-memory value unchanged",
                        key
                    );
                    Ok(WriteOutcome::Rejected)
                }
            }
        }
    }

    /// Serializes `value` and writes it to `key`.
    pub fn set_as<T: Serialize>(&mut self, key: &str, value: &T) -> Result<WriteOutcome> {
        let value = serde_json::to_value(value).map_err(|source| CacheError::Conversion {
            key: key.to_string(),
            source,
        })?;
        self.set(key, value)
    }

    // == Remove ==
    /// Deletes the entry for `key` under the key's declared commit mode.
    ///
    /// A key with no live entry is a no-op that reports success in both
    /// modes. Commit-mode removal of a live entry asks the durability layer
    /// first; a refusal leaves the entry in place.
    pub fn remove(&mut self, key: &str) -> Result<WriteOutcome> {
        let commit_mode = self.meta(key)?.commit_mode;
        let now = current_timestamp_ms();

        let live = self
            .entries
            .get(key)
            .map(|entry| !entry.is_expired(now))
            .unwrap_or(false);

        if !live {
            // Drop an expired husk in passing; it already counts as gone.
            self.entries.remove(key);
            self.stats.set_total_entries(self.entries.len());
            return Ok(match commit_mode {
                CommitMode::Apply => WriteOutcome::Applied,
                CommitMode::Commit => WriteOutcome::Committed,
            });
        }

        match commit_mode {
            CommitMode::Apply => {
                self.durability.remove_async(key);
                self.entries.remove(key);
                self.stats.set_total_entries(self.entries.len());
                Ok(WriteOutcome::Applied)
            }
            CommitMode::Commit => {
                if self.durability.remove(key) {
                    self.entries.remove(key);
                    self.stats.set_total_entries(self.entries.len());
                    Ok(WriteOutcome::Committed)
                } else {
                    self.stats.record_rejected_commit();
                    warn!(
                        "Durability layer rejected removal of '{}', entry kept",
                        key
                    );
                    Ok(WriteOutcome::Rejected)
                }
            }
        }
    }

    // == Remove All ==
    /// Clears every entry in the store.
    ///
    /// Always fire-and-forget toward the durability layer.
    pub fn remove_all(&mut self) {
        let removed = self.entries.len();
        self.entries.clear();
        self.durability.clear_async();
        self.stats.set_total_entries(0);
        debug!("Cleared {} entries", removed);
    }

    // == Purge Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Purely an eager complement to lazy expiry; get/set/remove behave
    /// identically whether or not this ever runs. Returns the number of
    /// entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in expired_keys {
            self.entries.remove(&key);
        }

        if count > 0 {
            self.stats.record_purged(count as u64);
        }
        self.stats.set_total_entries(self.entries.len());
        count
    }

    // == Observers ==
    /// Returns the entry for `key`, live or expired, if one exists.
    pub fn entry(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// The schema this store was built over.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Internals ==
    fn meta(&self, key: &str) -> Result<&KeyMeta> {
        self.schema
            .get(key)
            .ok_or_else(|| CacheError::UnknownKey(key.to_string()))
    }

    /// Updates a live entry in place (preserving its creation time) or
    /// replaces an expired/absent one with a brand-new entry.
    fn upsert(&mut self, key: &str, value: Value, ttl: Duration, refresh_expiry: bool) {
        let now = current_timestamp_ms();
        match self.entries.entry(key.to_string()) {
            MapEntry::Occupied(mut slot) => {
                if slot.get().is_expired(now) {
                    slot.insert(CacheEntry::new(value, ttl));
                } else {
                    slot.get_mut().update(value, refresh_expiry);
                }
            }
            MapEntry::Vacant(slot) => {
                slot.insert(CacheEntry::new(value, ttl));
            }
        }
        self.stats.set_total_entries(self.entries.len());
    }
}
