//! Durability Layer
//!
//! Seam between the in-memory cache and whatever persists values beyond
//! process memory. Commit-mode writes block on the acknowledged operations
//! for a definitive outcome; Apply-mode writes go through the `_async`
//! variants and never hear back.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

// == Durability Trait ==
/// External persistence collaborator for a cache store.
///
/// The store never retries: a rejected acknowledged write is reported to
/// the caller once, and fire-and-forget writes are handed over exactly
/// once. Retry policy, if any, lives behind this trait.
pub trait DurabilityLayer: Send + Sync {
    /// Acknowledged write. Blocks until the backing store accepts or rejects.
    fn persist(&self, key: &str, value: &Value) -> bool;

    /// Fire-and-forget write. The outcome is never reported to the caller;
    /// implementations are expected to log their own failures.
    fn persist_async(&self, key: &str, value: &Value);

    /// Acknowledged deletion.
    fn remove(&self, key: &str) -> bool;

    /// Fire-and-forget deletion.
    fn remove_async(&self, key: &str);

    /// Fire-and-forget bulk deletion.
    fn clear_async(&self);
}

// == Null Durability ==
/// Accepts every operation and keeps nothing. The layer behind purely
/// in-memory stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDurability;

impl DurabilityLayer for NullDurability {
    fn persist(&self, _key: &str, _value: &Value) -> bool {
        true
    }

    fn persist_async(&self, _key: &str, _value: &Value) {}

    fn remove(&self, _key: &str) -> bool {
        true
    }

    fn remove_async(&self, _key: &str) {}

    fn clear_async(&self) {}
}

// == Memory Durability ==
/// Accepts every operation into an inspectable in-memory mirror.
///
/// Useful in tests and for embedders that snapshot durable state without
/// a real backing store.
#[derive(Debug, Default)]
pub struct MemoryDurability {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryDurability {
    /// Creates an empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the durably stored value for `key`, if any.
    pub fn stored(&self, key: &str) -> Option<Value> {
        self.values
            .lock()
            .expect("durability mirror poisoned")
            .get(key)
            .cloned()
    }

    /// Returns the number of durably stored values.
    pub fn len(&self) -> usize {
        self.values.lock().expect("durability mirror poisoned").len()
    }

    /// Returns true if nothing has been persisted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the whole mirror out.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.values
            .lock()
            .expect("durability mirror poisoned")
            .clone()
    }

    fn insert(&self, key: &str, value: &Value) {
        self.values
            .lock()
            .expect("durability mirror poisoned")
            .insert(key.to_string(), value.clone());
    }

    fn delete(&self, key: &str) {
        self.values
            .lock()
            .expect("durability mirror poisoned")
            .remove(key);
    }
}

impl DurabilityLayer for MemoryDurability {
    fn persist(&self, key: &str, value: &Value) -> bool {
        self.insert(key, value);
        true
    }

    fn persist_async(&self, key: &str, value: &Value) {
        self.insert(key, value);
    }

    fn remove(&self, key: &str) -> bool {
        self.delete(key);
        true
    }

    fn remove_async(&self, key: &str) {
        self.delete(key);
    }

    fn clear_async(&self) {
        self.values
            .lock()
            .expect("durability mirror poisoned")
            .clear();
    }
}
