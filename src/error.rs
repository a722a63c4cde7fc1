//! Error types for the catalog server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::upstream::UpstreamError;

// == Catalog Error Enum ==
/// Errors surfaced by the HTTP handlers.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Requested vehicle does not exist upstream
    #[error("{0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream call failed; the message is what the client sees
    #[error("{message}")]
    Upstream {
        message: &'static str,
        #[source]
        source: UpstreamError,
    },
}

// == IntoResponse Implementation ==
impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = match &self {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CatalogError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the catalog handlers.
pub type Result<T> = std::result::Result<T, CatalogError>;

// == Store Error Enum ==
/// Failures reported by a session store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Write would push the store past its byte quota
    #[error("Quota exceeded writing '{key}': {needed} bytes needed, quota is {quota}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },

    /// Store cannot be used in this context
    #[error("Session store unavailable")]
    Unavailable,
}

// == Config Error Enum ==
/// Problems found while loading configuration.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// Required variable is unset or empty
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    /// Variable is set but cannot be parsed
    #[error("Invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}
