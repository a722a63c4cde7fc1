//! Session Store Backends
//!
//! The key-value string store the session cache writes its entries into.

use std::collections::HashMap;

use crate::error::StoreError;

// == Session Store Trait ==
/// Session-scoped string store consumed by [`SessionCache`](super::SessionCache).
pub trait SessionStore: Send + Sync {
    /// Whether the store can be used at all. The cache does nothing when false.
    fn is_available(&self) -> bool {
        true
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn put(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    fn delete(&mut self, key: &str) -> Result<(), StoreError>;

    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Bytes held by the store, for stores that track them.
    fn used_bytes(&self) -> Option<usize> {
        None
    }
}

// == Memory Store ==
/// In-process store living as long as the server process.
///
/// An optional quota caps the summed byte length of keys and values, the
/// way browser session storage rejects writes once full.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
    quota_bytes: Option<usize>,
    used_bytes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let previous = self
            .items
            .get(key)
            .map(|old| key.len() + old.len())
            .unwrap_or(0);
        let needed = self.used_bytes - previous + key.len() + value.len();

        if let Some(quota) = self.quota_bytes {
            if needed > quota {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }

        self.items.insert(key.to_string(), value);
        self.used_bytes = needed;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        if let Some(old) = self.items.remove(key) {
            self.used_bytes -= key.len() + old.len();
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.items.keys().cloned().collect())
    }

    /// Summed byte length of keys and values, the figure the quota caps.
    fn used_bytes(&self) -> Option<usize> {
        Some(self.used_bytes)
    }
}

// == Null Store ==
/// A store that is never available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl SessionStore for NullStore {
    fn is_available(&self) -> bool {
        false
    }

    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable)
    }

    fn put(&mut self, _key: &str, _value: String) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    fn delete(&mut self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Unavailable)
    }
}
