//! Volatile in-process store backend.

use std::collections::HashMap;
use std::sync::RwLock;

use super::errors::{StoreError, StoreResult};
use super::Store;

/// In-memory store keyed by string.
///
/// An optional byte quota bounds the combined size of keys and values, the
/// way quota-limited platform stores behave: a write that would exceed the
/// quota fails and leaves the store unchanged.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose entries may occupy at most `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn used_bytes(entries: &HashMap<String, String>) -> usize {
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.read().map_err(StoreError::from_poison)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(StoreError::from_poison)?;

        if let Some(limit) = self.quota_bytes {
            let current = Self::used_bytes(&entries);
            let replaced = entries
                .get(key)
                .map(|existing| key.len() + existing.len())
                .unwrap_or(0);
            let projected = current - replaced + key.len() + value.len();
            if projected > limit {
                return Err(StoreError::QuotaExceeded { limit });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        // Removing a missing key is a no-op, not an error.
        let mut entries = self.entries.write().map_err(StoreError::from_poison)?;
        entries.remove(key);
        Ok(())
    }
}
