//! API Handlers
//!
//! HTTP request handlers for the catalog endpoints. Listing and detail
//! handlers consult the session cache before calling upstream.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Duration;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::cache::{MemoryStore, SessionCache, SystemClock};
use crate::config::Config;
use crate::error::{CatalogError, Result};
use crate::models::{ClearResponse, HealthResponse, ListQuery, StatsResponse};
use crate::upstream::{UpstreamClient, UpstreamError};

/// Header reporting whether a response came from the cache
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session cache, serialized behind a lock
    pub cache: Arc<RwLock<SessionCache>>,
    /// Auction data API client
    pub upstream: UpstreamClient,
}

impl AppState {
    /// Creates a new AppState with the given cache and upstream client.
    pub fn new(cache: SessionCache, upstream: UpstreamClient) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            upstream,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Uses an in-memory session store and the wall clock.
    pub fn from_config(config: &Config) -> std::result::Result<Self, UpstreamError> {
        let store = match config.store_quota {
            0 => MemoryStore::new(),
            quota => MemoryStore::with_quota(quota),
        };
        let ttl_secs = i64::try_from(config.cache_ttl)
            .unwrap_or(i64::MAX)
            .min(i64::MAX / 1000);
        let ttl = Duration::seconds(ttl_secs);
        let cache = SessionCache::new(store, SystemClock).with_ttl(ttl);

        Ok(Self::new(cache, UpstreamClient::from_config(config)?))
    }
}

fn json_with_cache_status(data: Value, hit: bool) -> Response {
    let status = if hit { "HIT" } else { "MISS" };
    ([(CACHE_STATUS_HEADER, status)], Json(data)).into_response()
}

/// Handler for GET /api/cars
///
/// Returns a page of listings for the given filters.
pub async fn list_cars_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    if let Some(error_msg) = query.validate() {
        return Err(CatalogError::InvalidRequest(error_msg));
    }

    let params = query.cache_params();

    if !query.refresh {
        let cached: Option<Value> = state.cache.write().await.get_cars_list(&params);
        if let Some(data) = cached {
            debug!("Using cached cars data");
            return Ok(json_with_cache_status(data, true));
        }
    }

    info!(refresh = query.refresh, "Fetching fresh cars data");
    let data = state
        .upstream
        .fetch_listings(&query.filters())
        .await
        .map_err(|e| {
            error!(error = %e, "Error fetching car data");
            CatalogError::Upstream {
                message: "Failed to fetch car data",
                source: e,
            }
        })?;

    state.cache.write().await.set_cars_list(&params, &data);
    Ok(json_with_cache_status(data, false))
}

/// Handler for GET /api/cars/lot/:lot/:domain
///
/// Returns one vehicle looked up by lot number and auction domain.
pub async fn car_details_handler(
    State(state): State<AppState>,
    Path((lot, domain)): Path<(String, String)>,
) -> Result<Response> {
    let cached: Option<Value> = state.cache.write().await.get_car_details(&lot, &domain);
    if let Some(data) = cached {
        debug!(lot = %lot, domain = %domain, "Using cached car details");
        return Ok(json_with_cache_status(data, true));
    }

    let data = match state.upstream.fetch_lot(&lot, &domain).await {
        Ok(data) => data,
        Err(UpstreamError::NotFound) => {
            info!(lot = %lot, domain = %domain, "Vehicle not found upstream");
            return Err(CatalogError::NotFound("Vehicle not found".to_string()));
        }
        Err(e) => {
            error!(lot = %lot, domain = %domain, error = %e, "Error fetching car details by lot");
            return Err(CatalogError::Upstream {
                message: "Failed to fetch vehicle details",
                source: e,
            });
        }
    };

    state
        .cache
        .write()
        .await
        .set_car_details(&lot, &domain, &data);
    Ok(json_with_cache_status(data, false))
}

/// Handler for DELETE /api/cache
///
/// Drops every cached listing and vehicle.
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let removed = state.cache.write().await.clear();
    info!(removed, "Cache cleared");
    Json(ClearResponse::new(removed))
}

/// Handler for GET /api/cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    Json(StatsResponse::new(
        cache.is_enabled(),
        cache.ttl().num_seconds(),
        cache.store().used_bytes(),
        &cache.stats(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
