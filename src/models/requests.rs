//! Request DTOs for the catalog API
//!
//! Defines the query parameters accepted by the listing endpoint.

use serde::{de, Deserialize, Deserializer};

use crate::cache::Params;

/// Query string of `GET /api/cars`
///
/// Blank or missing values fall back to the defaults the upstream expects.
/// `refresh` skips the cache read but still repopulates the cache.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Look-back window in minutes (default "10")
    pub minutes: Option<String>,
    /// Page size (default "50")
    pub per_page: Option<String>,
    /// Include price history (default "1")
    pub prices_history: Option<String>,
    /// Page number (default "1")
    pub page: Option<String>,
    /// Country code (default "US")
    pub country: Option<String>,
    pub manufacturer_id: Option<String>,
    pub vehicle_type: Option<String>,
    /// Bypass the cached copy; accepts `true`/`false` and `1`/`0`
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub refresh: bool,
}

impl ListQuery {
    /// The effective filter set, in the order forwarded upstream.
    pub fn filters(&self) -> Vec<(&'static str, String)> {
        let mut filters = vec![
            ("minutes", or_default(&self.minutes, "10")),
            ("per_page", or_default(&self.per_page, "50")),
            ("prices_history", or_default(&self.prices_history, "1")),
            ("page", or_default(&self.page, "1")),
            ("country", or_default(&self.country, "US")),
        ];

        if let Some(id) = present(&self.manufacturer_id) {
            filters.push(("manufacturer_id", id));
        }
        if let Some(kind) = present(&self.vehicle_type) {
            filters.push(("vehicle_type", kind));
        }

        filters
    }

    /// The filter set as a cache key parameter set.
    pub fn cache_params(&self) -> Params {
        self.filters().into_iter().collect()
    }

    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        for (name, value) in [
            ("minutes", &self.minutes),
            ("per_page", &self.per_page),
            ("page", &self.page),
        ] {
            if let Some(value) = present(value) {
                match value.parse::<u32>() {
                    Ok(n) if n > 0 => {}
                    _ => return Some(format!("{} must be a positive integer", name)),
                }
            }
        }
        None
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "1" | "true" => Ok(true),
        "" | "0" | "false" => Ok(false),
        other => Err(de::Error::invalid_value(
            de::Unexpected::Str(other),
            &"true, false, 1 or 0",
        )),
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn or_default(value: &Option<String>, default: &str) -> String {
    present(value).unwrap_or_else(|| default.to_string())
}
