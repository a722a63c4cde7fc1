//! Cache Entry Module
//!
//! Defines the serialized envelope stored under each canonical key.

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A cached payload with its write and expiry timestamps.
///
/// Stored as JSON: `{"payload": ..., "createdAt": ..., "expiresAt": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// The cached value
    pub payload: T,
    /// Write timestamp (Unix milliseconds)
    pub created_at: i64,
    /// Expiry timestamp (Unix milliseconds)
    pub expires_at: i64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry written at `now_ms` that lives for `ttl_ms`.
    pub fn new(payload: T, now_ms: i64, ttl_ms: i64) -> Self {
        Self {
            payload,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_ms),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// The entry is readable only while `now_ms < expires_at`, so it is
    /// already expired at exactly `expires_at`.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }

    /// Remaining lifetime in milliseconds, zero once expired.
    pub fn ttl_remaining_ms(&self, now_ms: i64) -> i64 {
        (self.expires_at - now_ms).max(0)
    }
}
