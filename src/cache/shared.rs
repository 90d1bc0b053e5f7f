//! Shared Store Handle
//!
//! Cloneable, thread-safe handle over a cache store. A single exclusive
//! lock guards the whole key map, so concurrent callers never observe a
//! half-applied write. Commit-mode calls hold the lock across the
//! durability round-trip, keeping writes all-or-nothing per key; a slow
//! durability layer therefore throttles the store.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::cache::{CacheStats, CacheStore, WriteOutcome};
use crate::error::Result;

// == Shared Cache Store ==
/// Thread-safe handle shared across concurrent callers.
#[derive(Clone)]
pub struct SharedCacheStore {
    store: Arc<RwLock<CacheStore>>,
}

impl SharedCacheStore {
    /// Wraps a store for shared access.
    pub fn new(store: CacheStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Retrieves the current value for `key`.
    ///
    /// Takes the write lock: a miss synthesizes and inserts the default
    /// entry.
    pub async fn get(&self, key: &str) -> Result<Value> {
        self.store.write().await.get(key)
    }

    /// Retrieves the current value for `key`, decoded into `T`.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.store.write().await.get_as(key)
    }

    /// Writes `value` to `key` under the key's declared commit mode.
    pub async fn set(&self, key: &str, value: Value) -> Result<WriteOutcome> {
        self.store.write().await.set(key, value)
    }

    /// Serializes `value` and writes it to `key`.
    pub async fn set_as<T: Serialize>(&self, key: &str, value: &T) -> Result<WriteOutcome> {
        self.store.write().await.set_as(key, value)
    }

    /// Deletes the entry for `key` under the key's declared commit mode.
    pub async fn remove(&self, key: &str) -> Result<WriteOutcome> {
        self.store.write().await.remove(key)
    }

    /// Clears every entry in the store.
    pub async fn remove_all(&self) {
        self.store.write().await.remove_all();
    }

    /// Removes all expired entries, returning the count.
    pub async fn purge_expired(&self) -> usize {
        self.store.write().await.purge_expired()
    }

    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    /// Returns the current number of entries in the store.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Returns true if the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{KeySpec, Schema};
    use serde_json::json;

    fn shared_store() -> SharedCacheStore {
        let schema = Schema::builder()
            .key("count", KeySpec::new(json!(0)))
            .key("name", KeySpec::new(json!("anon")))
            .build()
            .unwrap();
        SharedCacheStore::new(CacheStore::in_memory(schema))
    }

    #[tokio::test]
    async fn test_shared_get_and_set() {
        let store = shared_store();

        assert_eq!(store.get("count").await.unwrap(), json!(0));
        store.set("count", json!(3)).await.unwrap();
        assert_eq!(store.get("count").await.unwrap(), json!(3));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = shared_store();
        let other = store.clone();

        store.set("name", json!("alice")).await.unwrap();
        assert_eq!(other.get("name").await.unwrap(), json!("alice"));
        assert_eq!(other.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_all_resets_to_defaults() {
        let store = shared_store();

        store.set("count", json!(3)).await.unwrap();
        store.set("name", json!("alice")).await.unwrap();
        store.remove_all().await;

        assert!(store.is_empty().await);
        assert_eq!(store.get("count").await.unwrap(), json!(0));
        assert_eq!(store.get("name").await.unwrap(), json!("anon"));
    }

    #[tokio::test]
    async fn test_concurrent_writers_stay_consistent() {
        let store = shared_store();

        let mut handles = Vec::new();
        for i in 0..16_i64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.set("count", json!(i)).await.unwrap();
                store.get("count").await.unwrap()
            }));
        }

        for handle in handles {
            let value = handle.await.unwrap();
            let n = value.as_i64().unwrap();
            assert!((0..16).contains(&n), "observed torn value {}", n);
        }

        let final_value = store.get("count").await.unwrap();
        assert!((0..16).contains(&final_value.as_i64().unwrap()));
    }

    #[test]
    fn test_handle_usable_from_block_on() {
        tokio_test::block_on(async {
            let store = shared_store();
            store.set("count", json!(1)).await.unwrap();
            let stats = store.stats().await;
            assert_eq!(stats.total_entries, 1);
        });
    }

    #[tokio::test]
    async fn test_typed_accessors() {
        let store = shared_store();

        store.set_as("count", &7_i64).await.unwrap();
        let count: i64 = store.get_as("count").await.unwrap();
        assert_eq!(count, 7);
    }
}
