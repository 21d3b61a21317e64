use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use lru::LruCache;
use tracing::debug;

use crate::error::DirectoryError;
use crate::normalize::city_key;
use crate::types::CityRecord;

use super::CityDirectory;

/// Default entry capacity of each cache.
pub const DEFAULT_DIRECTORY_CACHE_CAPACITY: usize = 2_048;

/// Radius query key: raw bit patterns of `(lat, lon, miles)`.
type RadiusKey = (u64, u64, u64);

/// Hit/miss counters of a [`CachedCityDirectory`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// LRU-cached wrapper around any [`CityDirectory`].
///
/// Name lookups are keyed by the normalized `name|STATE` identity, radius queries
/// by the exact `(lat, lon, miles)` triple. Only successful results are cached;
/// errors go straight back to the caller and the next call retries the inner
/// directory.
pub struct CachedCityDirectory<D> {
    inner: D,
    by_name: Mutex<LruCache<String, Option<CityRecord>>>,
    by_radius: Mutex<LruCache<RadiusKey, Vec<CityRecord>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<D: CityDirectory> CachedCityDirectory<D> {
    pub fn new(inner: D, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            by_name: Mutex::new(LruCache::new(capacity)),
            by_radius: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn with_default_capacity(inner: D) -> Self {
        Self::new(inner, DEFAULT_DIRECTORY_CACHE_CAPACITY)
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }
}

impl<D: CityDirectory> CityDirectory for CachedCityDirectory<D> {
    fn find_by_name_state(
        &self,
        name: &str,
        state: &str,
    ) -> Result<Option<CityRecord>, DirectoryError> {
        let key = city_key(name, state);

        // Fast path: cache hit
        if let Ok(mut cache) = self.by_name.lock() {
            if let Some(cached) = cache.get(&key) {
                self.record_hit();
                debug!(target: "lane_core::directory", %key, "name lookup cache hit");
                return Ok(cached.clone());
            }
        }

        self.record_miss();
        let result = self.inner.find_by_name_state(name, state)?;
        if let Ok(mut cache) = self.by_name.lock() {
            cache.put(key, result.clone());
        }
        Ok(result)
    }

    fn find_within_radius(
        &self,
        lat: f64,
        lon: f64,
        miles: f64,
    ) -> Result<Vec<CityRecord>, DirectoryError> {
        let key = (lat.to_bits(), lon.to_bits(), miles.to_bits());

        if let Ok(mut cache) = self.by_radius.lock() {
            if let Some(cached) = cache.get(&key) {
                self.record_hit();
                debug!(target: "lane_core::directory", lat, lon, miles, "radius query cache hit");
                return Ok(cached.clone());
            }
        }

        self.record_miss();
        let result = self.inner.find_within_radius(lat, lon, miles)?;
        if let Ok(mut cache) = self.by_radius.lock() {
            cache.put(key, result.clone());
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// Fails the first `failures` radius calls, then answers with one city.
    struct Flaky {
        failures: AtomicUsize,
        calls: AtomicUsize,
    }

    impl Flaky {
        fn new(failures: usize) -> Self {
            Self {
                failures: AtomicUsize::new(failures),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl CityDirectory for Flaky {
        fn find_by_name_state(
            &self,
            name: &str,
            state: &str,
        ) -> Result<Option<CityRecord>, DirectoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(CityRecord::new(name, state)))
        }

        fn find_within_radius(
            &self,
            _lat: f64,
            _lon: f64,
            _miles: f64,
        ) -> Result<Vec<CityRecord>, DirectoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err("gateway timeout".into());
            }
            Ok(vec![CityRecord::new("Joliet", "IL")])
        }
    }

    #[test]
    fn repeated_lookups_hit_the_cache() {
        let cached = CachedCityDirectory::new(Flaky::new(0), 8);
        cached.find_by_name_state("St. Louis", "MO").unwrap();
        cached.find_by_name_state("Saint Louis", "mo").unwrap();
        cached.find_within_radius(41.0, -88.0, 75.0).unwrap();
        cached.find_within_radius(41.0, -88.0, 75.0).unwrap();
        cached.find_within_radius(41.0, -88.0, 100.0).unwrap();

        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 3);
        assert_eq!(cached.stats(), CacheStats { hits: 2, misses: 3 });
    }

    #[test]
    fn errors_are_not_cached() {
        let cached = CachedCityDirectory::new(Flaky::new(1), 8);
        let err = cached.find_within_radius(41.0, -88.0, 75.0).unwrap_err();
        assert_eq!(err.to_string(), "gateway timeout");
        let cities = cached.find_within_radius(41.0, -88.0, 75.0).unwrap();
        assert_eq!(cities.len(), 1);
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let cached = CachedCityDirectory::new(Flaky::new(0), 1);
        cached.find_within_radius(41.0, -88.0, 75.0).unwrap();
        cached.find_within_radius(42.0, -88.0, 75.0).unwrap();
        cached.find_within_radius(41.0, -88.0, 75.0).unwrap();
        assert_eq!(cached.stats().hits, 0);
    }
}
