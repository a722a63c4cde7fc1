//! Response DTOs for the catalog API
//!
//! Defines the structure of outgoing HTTP response bodies other than the
//! upstream payloads, which are passed through untouched.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the stats endpoint (GET /api/cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Whether the session store is usable
    pub enabled: bool,
    /// Entry lifetime in seconds
    pub ttl_seconds: i64,
    /// Bytes held by the session store, null when it does not track them
    pub stored_bytes: Option<usize>,
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub writes: u64,
    pub failed_writes: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(
        enabled: bool,
        ttl_seconds: i64,
        stored_bytes: Option<usize>,
        stats: &CacheStats,
    ) -> Self {
        Self {
            enabled,
            ttl_seconds,
            stored_bytes,
            hits: stats.hits,
            misses: stats.misses,
            expired: stats.expired,
            writes: stats.writes,
            failed_writes: stats.failed_writes,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the clear operation (DELETE /api/cache)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Success message
    pub message: String,
    /// Number of cached entries removed
    pub removed: usize,
}

impl ClearResponse {
    pub fn new(removed: usize) -> Self {
        Self {
            message: format!("Cleared {} cached entries", removed),
            removed,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
