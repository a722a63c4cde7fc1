//! Cache Module
//!
//! Session-scoped response cache with fixed-duration expiry and lazy eviction.

mod backend;
mod clock;
mod entry;
mod key;
mod session;
mod stats;


// Re-export public types
pub use backend::{MemoryStore, NullStore, SessionStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use key::{canonical_key, ParamValue, Params};
pub use session::SessionCache;
pub use stats::CacheStats;

// == Public Constants ==
/// Namespace for listing pages, keyed by filter set
pub const CARS_LIST: &str = "cars_list";

/// Namespace for single vehicles, keyed by lot and auction domain
pub const CAR_DETAILS: &str = "car_details";

/// Default entry lifetime in seconds
pub const DEFAULT_TTL_SECS: i64 = 10 * 60;

/// Default byte quota for the in-memory session store
pub const DEFAULT_STORE_QUOTA_BYTES: usize = 5 * 1024 * 1024; // 5 MiB
