//! Configuration Module
//!
//! Loads and validates server configuration from environment variables.

use std::env;

use reqwest::Url;

use crate::cache::{DEFAULT_STORE_QUOTA_BYTES, DEFAULT_TTL_SECS};
use crate::error::ConfigError;

/// Server configuration parameters.
///
/// The upstream endpoint and key are required; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the auction data API
    pub api_url: Url,
    /// Key sent as `x-api-key` on every upstream call
    pub api_key: String,
    /// HTTP server port
    pub server_port: u16,
    /// Lifetime of cached responses in seconds
    pub cache_ttl: u64,
    /// Byte quota of the session store, 0 for unbounded
    pub store_quota: usize,
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// # Environment Variables
    /// - `CARSTAT_API_URL` - Upstream base URL (required)
    /// - `CARSTAT_API_KEY` - Upstream API key (required)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_TTL_SECS` - Cache entry lifetime (default: 600)
    /// - `STORE_QUOTA_BYTES` - Session store quota (default: 5 MiB)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = required(&lookup, "CARSTAT_API_URL")?;
        let api_url = Url::parse(&api_url).map_err(|_| ConfigError::Invalid {
            var: "CARSTAT_API_URL",
            value: api_url.clone(),
        })?;

        Ok(Self {
            api_url,
            api_key: required(&lookup, "CARSTAT_API_KEY")?,
            server_port: optional(&lookup, "SERVER_PORT", 3000)?,
            cache_ttl: optional(&lookup, "CACHE_TTL_SECS", DEFAULT_TTL_SECS as u64)?,
            store_quota: optional(&lookup, "STORE_QUOTA_BYTES", DEFAULT_STORE_QUOTA_BYTES)?,
        })
    }
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::Missing(var)),
    }
}

fn optional<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}
