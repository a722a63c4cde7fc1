//! Session Cache Module
//!
//! Expiring key-value cache over an injected session store and clock.
//! Every failure degrades to a cache miss; nothing is ever raised to callers.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Duration;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::key::{belongs_to, canonical_key, Params};
use crate::cache::{
    CacheEntry, CacheStats, Clock, SessionStore, CARS_LIST, CAR_DETAILS, DEFAULT_TTL_SECS,
};

// == Session Cache ==
/// Time-boxed cache of JSON-serializable values.
///
/// Entries are keyed by a namespace plus an optional parameter set and live
/// for a fixed TTL. Expired entries are removed lazily on the read that
/// finds them.
pub struct SessionCache {
    /// Backing string store
    store: Box<dyn SessionStore>,
    /// Time source
    clock: Arc<dyn Clock>,
    /// Lifetime of every entry in milliseconds
    ttl_ms: i64,
    /// Namespaces swept by `clear`
    namespaces: BTreeSet<String>,
    /// Usage counters
    stats: CacheStats,
}

impl SessionCache {
    // == Constructor ==
    /// Creates a cache with the default ten minute TTL.
    pub fn new(store: impl SessionStore + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            store: Box::new(store),
            clock: Arc::new(clock),
            ttl_ms: DEFAULT_TTL_SECS * 1000,
            namespaces: [CARS_LIST, CAR_DETAILS]
                .into_iter()
                .map(String::from)
                .collect(),
            stats: CacheStats::new(),
        }
    }

    /// Overrides the entry lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_ms = ttl.num_milliseconds();
        self
    }

    /// Entry lifetime.
    pub fn ttl(&self) -> Duration {
        Duration::milliseconds(self.ttl_ms)
    }

    /// False when the backing store is unavailable and every call is a no-op.
    pub fn is_enabled(&self) -> bool {
        self.store.is_available()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    /// The backing store, for inspection.
    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    // == Set ==
    /// Stores `value` under the canonical key, replacing any prior entry.
    ///
    /// Encoding or store failures are logged and leave prior state as it was.
    pub fn set<T>(&mut self, namespace: &str, params: Option<&Params>, value: &T)
    where
        T: Serialize + ?Sized,
    {
        if !self.is_enabled() {
            return;
        }

        let key = canonical_key(namespace, params);
        let entry = CacheEntry::new(value, self.clock.now_ms(), self.ttl_ms);

        let encoded = match serde_json::to_string(&entry) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to encode cache entry");
                self.stats.record_failed_write();
                return;
            }
        };

        match self.store.put(&key, encoded) {
            Ok(()) => {
                debug!(key = %key, "Cached entry");
                self.namespaces.insert(namespace.to_string());
                self.stats.record_write();
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to cache data");
                self.stats.record_failed_write();
            }
        }
    }

    // == Get ==
    /// Returns the live payload stored under the canonical key.
    ///
    /// Absent, expired, corrupt or unreadable entries all come back as `None`.
    /// An expired entry is deleted from the store on the way out.
    pub fn get<T>(&mut self, namespace: &str, params: Option<&Params>) -> Option<T>
    where
        T: DeserializeOwned,
    {
        if !self.is_enabled() {
            return None;
        }

        let key = canonical_key(namespace, params);

        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %key, "Cache miss");
                self.stats.record_miss();
                return None;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read from cache");
                self.stats.record_miss();
                return None;
            }
        };

        let entry: CacheEntry<Value> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring unreadable cache entry");
                self.stats.record_miss();
                return None;
            }
        };

        let now_ms = self.clock.now_ms();
        if entry.is_expired(now_ms) {
            debug!(key = %key, "Cache entry expired");
            self.delete_key(&key);
            self.stats.record_expired();
            return None;
        }

        let ttl_remaining_ms = entry.ttl_remaining_ms(now_ms);
        match serde_json::from_value(entry.payload) {
            Ok(payload) => {
                debug!(key = %key, ttl_remaining_ms, "Cache hit");
                self.stats.record_hit();
                Some(payload)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cached payload has unexpected shape");
                self.stats.record_miss();
                None
            }
        }
    }

    // == Remove ==
    /// Deletes the entry under the canonical key, if any.
    pub fn remove(&mut self, namespace: &str, params: Option<&Params>) {
        if !self.is_enabled() {
            return;
        }
        let key = canonical_key(namespace, params);
        self.delete_key(&key);
    }

    // == Clear ==
    /// Deletes every entry of every known namespace and returns how many
    /// keys were removed. Keys outside those namespaces are untouched.
    pub fn clear(&mut self) -> usize {
        if !self.is_enabled() {
            return 0;
        }

        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Failed to clear cache");
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys {
            if self.namespaces.iter().any(|ns| belongs_to(&key, ns)) {
                match self.store.delete(&key) {
                    Ok(()) => removed += 1,
                    Err(e) => warn!(key = %key, error = %e, "Failed to remove from cache"),
                }
            }
        }

        debug!(removed, "Cleared cache");
        removed
    }

    // == Listing Cache ==
    /// Caches a listing page under its filter set.
    pub fn set_cars_list<T: Serialize + ?Sized>(&mut self, filters: &Params, data: &T) {
        self.set(CARS_LIST, Some(filters), data);
    }

    pub fn get_cars_list<T: DeserializeOwned>(&mut self, filters: &Params) -> Option<T> {
        self.get(CARS_LIST, Some(filters))
    }

    // == Details Cache ==
    /// Caches a single vehicle under its lot and auction domain.
    pub fn set_car_details<T: Serialize + ?Sized>(&mut self, lot: &str, domain: &str, data: &T) {
        self.set(CAR_DETAILS, Some(&details_params(lot, domain)), data);
    }

    pub fn get_car_details<T: DeserializeOwned>(&mut self, lot: &str, domain: &str) -> Option<T> {
        self.get(CAR_DETAILS, Some(&details_params(lot, domain)))
    }

    fn delete_key(&mut self, key: &str) {
        if let Err(e) = self.store.delete(key) {
            warn!(key = %key, error = %e, "Failed to remove from cache");
        }
    }
}

fn details_params(lot: &str, domain: &str) -> Params {
    Params::new().with("lot", lot).with("domain", domain)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ManualClock, MemoryStore, NullStore};
    use crate::error::StoreError;
    use serde_json::json;
    use std::sync::{Arc as StdArc, Mutex};

    /// Store whose contents the test can inspect after handing it to the cache.
    #[derive(Clone, Default)]
    struct SharedStore {
        inner: StdArc<Mutex<MemoryStore>>,
        fail_reads: bool,
    }

    impl SharedStore {
        fn raw(&self, key: &str) -> Option<String> {
            self.inner.lock().unwrap().get(key).unwrap()
        }

        fn seed(&self, key: &str, value: &str) {
            self.inner
                .lock()
                .unwrap()
                .put(key, value.to_string())
                .unwrap();
        }
    }

    impl SessionStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            if self.fail_reads {
                return Err(StoreError::Unavailable);
            }
            self.inner.lock().unwrap().get(key)
        }

        fn put(&mut self, key: &str, value: String) -> Result<(), StoreError> {
            self.inner.lock().unwrap().put(key, value)
        }

        fn delete(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.lock().unwrap().delete(key)
        }

        fn keys(&self) -> Result<Vec<String>, StoreError> {
            self.inner.lock().unwrap().keys()
        }
    }

    fn test_cache() -> (SessionCache, SharedStore, ManualClock) {
        let store = SharedStore::default();
        let clock = ManualClock::new(1_000_000);
        let cache = SessionCache::new(store.clone(), clock.clone());
        (cache, store, clock)
    }

    fn details(lot: &str, domain: &str) -> Params {
        details_params(lot, domain)
    }

    #[test]
    fn test_set_and_get() {
        let (mut cache, _, _) = test_cache();
        let params = Params::new().with("page", 1i64);

        cache.set("cars_list", Some(&params), &json!({"data": [1, 2]}));

        let value: Option<Value> = cache.get("cars_list", Some(&params));
        assert_eq!(value, Some(json!({"data": [1, 2]})));
    }

    #[test]
    fn test_get_missing() {
        let (mut cache, _, _) = test_cache();
        let value: Option<Value> = cache.get("cars_list", None);
        assert!(value.is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_details_expire_and_are_evicted() {
        let (mut cache, store, clock) = test_cache();

        cache.set(CAR_DETAILS, Some(&details("123", "copart_com")), &json!({"vin": "ABC"}));
        let key = canonical_key(CAR_DETAILS, Some(&details("123", "copart_com")));
        assert_eq!(key, "car_details_domain:copart_com|lot:123");

        let hit: Option<Value> = cache.get_car_details("123", "copart_com");
        assert_eq!(hit, Some(json!({"vin": "ABC"})));

        clock.advance(Duration::minutes(10) + Duration::milliseconds(1));

        let miss: Option<Value> = cache.get_car_details("123", "copart_com");
        assert!(miss.is_none());
        assert!(store.raw(&key).is_none(), "Expired entry should be removed");
        assert_eq!(cache.stats().expired, 1);
    }

    #[test]
    fn test_expiry_boundaries() {
        let (mut cache, _, clock) = test_cache();
        cache.set("n", None, &1);

        clock.advance(Duration::minutes(10) - Duration::milliseconds(1));
        assert_eq!(cache.get::<i32>("n", None), Some(1));

        clock.advance(Duration::milliseconds(1));
        assert_eq!(cache.get::<i32>("n", None), None);
    }

    #[test]
    fn test_overwrite_resets_expiry() {
        let (mut cache, _, clock) = test_cache();

        cache.set("n", None, &"v1");
        clock.advance(Duration::minutes(8));
        cache.set("n", None, &"v2");
        clock.advance(Duration::minutes(8));

        assert_eq!(cache.get::<String>("n", None), Some("v2".to_string()));
    }

    #[test]
    fn test_custom_ttl() {
        let (cache, _, clock) = test_cache();
        let mut cache = cache.with_ttl(Duration::seconds(5));
        assert_eq!(cache.ttl(), Duration::seconds(5));

        cache.set("n", None, &true);
        clock.advance(Duration::seconds(5));
        assert_eq!(cache.get::<bool>("n", None), None);
    }

    #[test]
    fn test_remove() {
        let (mut cache, _, _) = test_cache();
        let filters = Params::new().with("country", "US");

        cache.set_cars_list(&filters, &json!([]));
        cache.remove(CARS_LIST, Some(&filters));
        cache.remove(CARS_LIST, Some(&filters));

        assert!(cache.get_cars_list::<Value>(&filters).is_none());
    }

    #[test]
    fn test_clear_keeps_unrelated_keys() {
        let (mut cache, store, _) = test_cache();
        store.seed("theme", "dark");
        store.seed("cars_listing_draft", "keep");

        cache.set_cars_list(&Params::new().with("page", 1i64), &json!([]));
        cache.set_car_details("1", "iaai_com", &json!({}));
        cache.set("watchlist", None, &json!(["1"]));

        assert_eq!(cache.clear(), 3);

        assert!(cache.get::<Value>("watchlist", None).is_none());
        assert!(cache.get_car_details::<Value>("1", "iaai_com").is_none());
        assert_eq!(store.raw("theme"), Some("dark".to_string()));
        assert_eq!(store.raw("cars_listing_draft"), Some("keep".to_string()));
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let (mut cache, store, _) = test_cache();
        let key = canonical_key(CAR_DETAILS, Some(&details("9", "copart_com")));
        store.seed(&key, "{not json");

        assert!(cache.get_car_details::<Value>("9", "copart_com").is_none());
        assert_eq!(store.raw(&key), Some("{not json".to_string()));
    }

    #[test]
    fn test_smuggled_filter_does_not_hit_other_entry() {
        let (mut cache, _, _) = test_cache();
        let smuggled = Params::new().with("country", "US|manufacturer_id:5");
        let genuine = Params::new()
            .with("country", "US")
            .with("manufacturer_id", "5");

        cache.set_cars_list(&smuggled, &json!({"data": ["planted"]}));

        assert!(cache.get_cars_list::<Value>(&genuine).is_none());
        assert_eq!(
            cache.get_cars_list::<Value>(&smuggled),
            Some(json!({"data": ["planted"]}))
        );
    }

    #[test]
    fn test_store_usage_follows_writes() {
        let mut cache = SessionCache::new(MemoryStore::new(), ManualClock::new(0));
        assert_eq!(cache.store().used_bytes(), Some(0));

        cache.set("n", None, &1);
        let used = cache.store().used_bytes().unwrap();
        assert!(used > 0);

        cache.clear();
        assert_eq!(cache.store().used_bytes(), Some(0));
    }

    #[test]
    fn test_payload_shape_mismatch_is_a_miss() {
        let (mut cache, _, _) = test_cache();
        cache.set("n", None, &json!({"vin": "ABC"}));

        assert_eq!(cache.get::<u64>("n", None), None);
    }

    #[test]
    fn test_read_failure_is_a_miss() {
        let store = SharedStore {
            fail_reads: true,
            ..SharedStore::default()
        };
        let mut cache = SessionCache::new(store, ManualClock::new(0));

        cache.set("n", None, &1);
        assert_eq!(cache.get::<i32>("n", None), None);
    }

    #[test]
    fn test_quota_failure_keeps_prior_entry() {
        let mut cache = SessionCache::new(MemoryStore::with_quota(200), ManualClock::new(0));

        cache.set("n", None, &"small");
        cache.set("n", None, &"x".repeat(500));

        assert_eq!(cache.get::<String>("n", None), Some("small".to_string()));
        assert_eq!(cache.stats().failed_writes, 1);
    }

    #[test]
    fn test_null_store_disables_cache() {
        let mut cache = SessionCache::new(NullStore, ManualClock::new(0));

        assert!(!cache.is_enabled());
        cache.set("n", None, &1);
        assert_eq!(cache.get::<i32>("n", None), None);
        cache.remove("n", None);
        assert_eq!(cache.clear(), 0);
        assert_eq!(cache.stats().writes, 0);
    }
}
