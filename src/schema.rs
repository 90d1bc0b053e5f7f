//! Schema Module
//!
//! Static per-key metadata consumed by the store: default value, TTL,
//! commit mode, and expiry-refresh policy. A schema is built once at
//! startup through [`SchemaBuilder`] and validated before any store exists.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde_json::Value;

use crate::error::{CacheError, Result};

// == Commit Mode ==
/// Write semantics carried by each key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// Write-through: the in-memory entry always updates and the durable
    /// write is dispatched fire-and-forget.
    Apply,
    /// Transactional: the durable write is acknowledged first; a refused
    /// write leaves the in-memory entry untouched.
    Commit,
}

// == Value Kind ==
/// Shape of a JSON value. Each key's declared kind is derived from its
/// default value, and every write is checked against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Classifies a JSON value.
    pub fn of(value: &Value) -> ValueKind {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        };
        f.write_str(name)
    }
}

// == Key Spec ==
/// Declaration of a single key, fed to [`SchemaBuilder::key`].
///
/// A key without an explicit TTL inherits the builder default. A zero TTL
/// means the key's entries never expire.
#[derive(Debug, Clone)]
pub struct KeySpec {
    default: Value,
    ttl: Option<Duration>,
    commit_mode: CommitMode,
    refresh_expiry_on_write: bool,
}

impl KeySpec {
    /// Declares a key with the given default value.
    ///
    /// Starts out in Apply mode with writes refreshing expiry.
    pub fn new(default: Value) -> Self {
        Self {
            default,
            ttl: None,
            commit_mode: CommitMode::Apply,
            refresh_expiry_on_write: true,
        }
    }

    /// Sets this key's TTL, overriding the builder default.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets this key's commit mode.
    pub fn commit_mode(mut self, mode: CommitMode) -> Self {
        self.commit_mode = mode;
        self
    }

    /// Controls whether successful writes push the expiry instant forward.
    pub fn refresh_expiry_on_write(mut self, refresh: bool) -> Self {
        self.refresh_expiry_on_write = refresh;
        self
    }
}

// == Key Meta ==
/// Fully resolved per-key metadata held by a built schema.
#[derive(Debug, Clone)]
pub struct KeyMeta {
    /// Value returned (and inserted) when no live entry exists
    pub default: Value,
    /// Declared shape, derived from the default
    pub kind: ValueKind,
    /// Time-to-live; zero means entries for this key never expire
    pub ttl: Duration,
    /// Write semantics for this key
    pub commit_mode: CommitMode,
    /// Whether successful writes push the expiry instant forward
    pub refresh_expiry_on_write: bool,
}

// == Schema ==
/// Immutable key -> metadata table backing a store.
#[derive(Debug, Clone)]
pub struct Schema {
    keys: HashMap<String, KeyMeta>,
}

impl Schema {
    /// Starts building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Looks up the metadata for `key`.
    pub fn get(&self, key: &str) -> Option<&KeyMeta> {
        self.keys.get(key)
    }

    /// Returns true if `key` is declared.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// Returns the number of declared keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false: empty schemas are rejected at build time.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates over the declared key names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }
}

// == Schema Builder ==
/// Collects key declarations and validates them into a [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    default_ttl: Duration,
    keys: Vec<(String, KeySpec)>,
}

impl SchemaBuilder {
    /// Creates an empty builder with a zero (never expires) default TTL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the TTL applied to keys that do not declare their own.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Declares a key. Duplicates are rejected at build time.
    pub fn key(mut self, name: impl Into<String>, spec: KeySpec) -> Self {
        self.keys.push((name.into(), spec));
        self
    }

    /// Validates the declarations and produces the schema.
    ///
    /// Fails on an empty schema, duplicate key names, or a null default
    /// (a key's kind is derived from its default, so null declares nothing).
    /// Negative TTLs are unrepresentable: `Duration` is unsigned.
    pub fn build(self) -> Result<Schema> {
        if self.keys.is_empty() {
            return Err(CacheError::InvalidSchema(
                "schema declares no keys".to_string(),
            ));
        }

        let mut keys = HashMap::with_capacity(self.keys.len());
        for (name, spec) in self.keys {
            let kind = ValueKind::of(&spec.default);
            if kind == ValueKind::Null {
                return Err(CacheError::InvalidSchema(format!(
                    "key '{}' has a null default",
                    name
                )));
            }

            let meta = KeyMeta {
                default: spec.default,
                kind,
                ttl: spec.ttl.unwrap_or(self.default_ttl),
                commit_mode: spec.commit_mode,
                refresh_expiry_on_write: spec.refresh_expiry_on_write,
            };

            if keys.insert(name.clone(), meta).is_some() {
                return Err(CacheError::InvalidSchema(format!(
                    "duplicate key '{}'",
                    name
                )));
            }
        }

        Ok(Schema { keys })
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_single_key() {
        let schema = Schema::builder()
            .key("count", KeySpec::new(json!(0)))
            .build()
            .unwrap();

        assert_eq!(schema.len(), 1);
        assert!(schema.contains("count"));

        let meta = schema.get("count").unwrap();
        assert_eq!(meta.kind, ValueKind::Number);
        assert_eq!(meta.ttl, Duration::ZERO);
        assert_eq!(meta.commit_mode, CommitMode::Apply);
        assert!(meta.refresh_expiry_on_write);
    }

    #[test]
    fn test_build_empty_schema_rejected() {
        let result = Schema::builder().build();
        assert!(matches!(result, Err(CacheError::InvalidSchema(_))));
    }

    #[test]
    fn test_build_duplicate_key_rejected() {
        let result = Schema::builder()
            .key("count", KeySpec::new(json!(0)))
            .key("count", KeySpec::new(json!(1)))
            .build();
        assert!(matches!(result, Err(CacheError::InvalidSchema(_))));
    }

    #[test]
    fn test_build_null_default_rejected() {
        let result = Schema::builder()
            .key("broken", KeySpec::new(json!(null)))
            .build();
        assert!(matches!(result, Err(CacheError::InvalidSchema(_))));
    }

    #[test]
    fn test_default_ttl_fallback_and_override() {
        let schema = Schema::builder()
            .default_ttl(Duration::from_secs(60))
            .key("inherited", KeySpec::new(json!("")))
            .key(
                "explicit",
                KeySpec::new(json!("")).ttl(Duration::from_secs(5)),
            )
            .build()
            .unwrap();

        assert_eq!(schema.get("inherited").unwrap().ttl, Duration::from_secs(60));
        assert_eq!(schema.get("explicit").unwrap().ttl, Duration::from_secs(5));
    }

    #[test]
    fn test_key_spec_chaining() {
        let schema = Schema::builder()
            .key(
                "token",
                KeySpec::new(json!(""))
                    .commit_mode(CommitMode::Commit)
                    .refresh_expiry_on_write(false),
            )
            .build()
            .unwrap();

        let meta = schema.get("token").unwrap();
        assert_eq!(meta.commit_mode, CommitMode::Commit);
        assert!(!meta.refresh_expiry_on_write);
    }

    #[test]
    fn test_value_kind_classification() {
        assert_eq!(ValueKind::of(&json!(null)), ValueKind::Null);
        assert_eq!(ValueKind::of(&json!(true)), ValueKind::Bool);
        assert_eq!(ValueKind::of(&json!(7)), ValueKind::Number);
        assert_eq!(ValueKind::of(&json!(1.5)), ValueKind::Number);
        assert_eq!(ValueKind::of(&json!("s")), ValueKind::String);
        assert_eq!(ValueKind::of(&json!([1, 2])), ValueKind::Array);
        assert_eq!(ValueKind::of(&json!({"a": 1})), ValueKind::Object);
    }

    #[test]
    fn test_value_kind_display() {
        assert_eq!(ValueKind::Number.to_string(), "number");
        assert_eq!(ValueKind::Object.to_string(), "object");
    }

    #[test]
    fn test_keys_iterator() {
        let schema = Schema::builder()
            .key("a", KeySpec::new(json!(0)))
            .key("b", KeySpec::new(json!(1)))
            .build()
            .unwrap();

        let mut names: Vec<&str> = schema.keys().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["a", "b"]);
    }
}
