//! Auction Catalog - proxy for vehicle auction listings
//!
//! Forwards listing and lot queries to the carstat API and keeps responses
//! in a session-scoped cache with fixed-duration expiry.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod upstream;

pub use api::{create_router, AppState};
pub use cache::SessionCache;
pub use config::Config;
