use async_trait::async_trait;
use serde_json::Value;

use super::{StoreError, StoreResult};

/// Longest key any backend accepts. MySQL stores keys as `VARCHAR(255)`.
pub const MAX_KEY_LEN: usize = 255;

/// Rejects keys no backend can store. Every store calls this before touching
/// its connection, so all dialects agree on what a valid key is.
pub fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("key cannot be empty".to_string()));
    }
    let len = key.chars().count();
    if len > MAX_KEY_LEN {
        return Err(StoreError::InvalidKey(format!(
            "key is {len} characters, limit is {MAX_KEY_LEN}"
        )));
    }
    Ok(())
}

/// A key/value store produced by a backend family.
///
/// The caller owns the store: nothing is connected until [`open`] and the
/// connection is released by [`close`]. Keys are checked with
/// [`validate_key`]: non-empty and at most [`MAX_KEY_LEN`] characters.
///
/// [`open`]: KeyValueStore::open
/// [`close`]: KeyValueStore::close
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// The connection string the store was constructed from.
    fn url(&self) -> &str;

    /// Short label of the concrete backend, e.g. `anysql/sqlite`.
    fn backend(&self) -> &str;

    async fn open(&self) -> StoreResult<()>;
    async fn close(&self) -> StoreResult<()>;

    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;
    async fn put(&self, key: &str, value: &Value) -> StoreResult<()>;

    /// Returns true when a value was stored under `key`.
    async fn delete(&self, key: &str) -> StoreResult<bool>;
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("k" ; "single character")]
    #[test_case("user:1" ; "with separator")]
    fn ordinary_keys_pass(key: &str) {
        assert!(validate_key(key).is_ok());
    }

    #[test]
    fn key_at_limit_passes_and_one_more_fails() {
        assert!(validate_key(&"k".repeat(MAX_KEY_LEN)).is_ok());
        let err = validate_key(&"k".repeat(MAX_KEY_LEN + 1)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        assert!(validate_key(&"é".repeat(MAX_KEY_LEN)).is_ok());
    }

    #[test]
    fn empty_key_fails() {
        assert!(matches!(validate_key(""), Err(StoreError::InvalidKey(_))));
    }
}
