//! Auction data API client
//!
//! Forwards listing and lot queries to the carstat API, attaching the API key.
//! Responses are passed through as raw JSON; their shape is not interpreted
//! beyond unwrapping the lot search envelope.

use std::time::Duration;

use reqwest::{header, Client, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::config::Config;

/// Timeout applied to every upstream request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors that can occur when calling the upstream API
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("API responded with status: {0}")]
    Status(u16),

    /// Lot search found nothing
    #[error("Vehicle not found")]
    NotFound,

    /// Response body was not the expected JSON
    #[error("Failed to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Missing expected field in response
    #[error("Missing expected field in response: {0}")]
    MissingField(&'static str),

    /// Base URL cannot carry path segments
    #[error("Invalid upstream base URL: {0}")]
    InvalidUrl(String),
}

/// Client for the auction data API
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl UpstreamClient {
    /// Create a client for `base_url` authenticating with `api_key`
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Result<Self, UpstreamError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, UpstreamError> {
        Self::new(config.api_url.clone(), config.api_key.clone())
    }

    /// Fetch one page of listings
    ///
    /// `filters` become query parameters of `GET {base}/cars` in the given order.
    pub async fn fetch_listings(&self, filters: &[(&str, String)]) -> Result<Value, UpstreamError> {
        let mut url = self.endpoint(&["cars"])?;
        url.query_pairs_mut()
            .extend_pairs(filters.iter().map(|(k, v)| (*k, v.as_str())));

        let response = self.send(url).await?;
        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status().as_u16()));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Fetch a single vehicle by lot number and auction domain
    ///
    /// Returns the `data` member of the lot search response.
    pub async fn fetch_lot(&self, lot: &str, domain: &str) -> Result<Value, UpstreamError> {
        let mut url = self.endpoint(&["search-lot", lot, domain])?;
        url.query_pairs_mut().append_pair("prices_history", "1");

        let response = self.send(url).await?;
        match response.status() {
            StatusCode::NOT_FOUND => return Err(UpstreamError::NotFound),
            status if !status.is_success() => {
                return Err(UpstreamError::Status(status.as_u16()));
            }
            _ => {}
        }

        let text = response.text().await?;
        let mut body: Value = serde_json::from_str(&text)?;
        match body.get_mut("data") {
            Some(data) => Ok(data.take()),
            None => Err(UpstreamError::MissingField("data")),
        }
    }

    /// Base URL with `segments` appended as escaped path segments
    fn endpoint(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, url: Url) -> Result<reqwest::Response, UpstreamError> {
        info!(path = %url.path(), "Fetching from upstream");
        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "*/*")
            .header("x-api-key", &self.api_key)
            .send()
            .await?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> UpstreamClient {
        UpstreamClient::new(Url::parse(base).unwrap(), "key").unwrap()
    }

    #[test]
    fn test_endpoint_appends_segments() {
        let url = client("https://carstat.dev/api").endpoint(&["cars"]).unwrap();
        assert_eq!(url.as_str(), "https://carstat.dev/api/cars");
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let url = client("https://carstat.dev/api/")
            .endpoint(&["search-lot", "123", "copart_com"])
            .unwrap();
        assert_eq!(url.as_str(), "https://carstat.dev/api/search-lot/123/copart_com");
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let url = client("https://carstat.dev/api")
            .endpoint(&["search-lot", "12/3", "x"])
            .unwrap();
        assert_eq!(url.as_str(), "https://carstat.dev/api/search-lot/12%2F3/x");
    }

    #[test]
    fn test_endpoint_rejects_opaque_base() {
        let result = client("mailto:someone@example.com").endpoint(&["cars"]);
        assert!(matches!(result, Err(UpstreamError::InvalidUrl(_))));
    }
}
