//! API Module
//!
//! HTTP handlers and routing for the catalog REST API.
//!
//! # Endpoints
//! - `GET /api/cars` - Listing page, cached per filter set
//! - `GET /api/cars/lot/:lot/:domain` - Vehicle details, cached per lot
//! - `DELETE /api/cache` - Clear the session cache
//! - `GET /api/cache/stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
