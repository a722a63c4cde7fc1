//! Upstream Module
//!
//! HTTP client for the third-party auction data API.

mod client;

pub use client::{UpstreamClient, UpstreamError};
