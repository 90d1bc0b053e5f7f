//! Prefcache - a schema-driven in-memory preference cache
//!
//! Provides TTL expiration and two-mode write-through persistence behind a
//! static per-key schema: every key declares a default value, a time-to-live,
//! and whether writes are fire-and-forget (Apply) or acknowledged (Commit).

pub mod cache;
pub mod config;
pub mod durability;
pub mod error;
pub mod schema;
pub mod tasks;

pub use cache::{CacheEntry, CacheStats, CacheStore, SharedCacheStore, StatsReport, WriteOutcome};
pub use config::Config;
pub use durability::{DurabilityLayer, MemoryDurability, NullDurability};
pub use error::{CacheError, Result};
pub use schema::{CommitMode, KeyMeta, KeySpec, Schema, SchemaBuilder, ValueKind};
pub use tasks::spawn_cleanup_task;
