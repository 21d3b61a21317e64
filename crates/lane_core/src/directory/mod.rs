//! City directory gateway: the engine's only source of city records.
//!
//! The engine only reads through [`CityDirectory`]. Persistence, retries and
//! timeouts belong to implementations. Two are provided here:
//!
//! - **`InMemoryCityDirectory`**: a city list scanned with a bounding-box pre-filter.
//! - **`CachedCityDirectory`**: LRU-cached wrapper around any other directory.

pub mod cached;
pub mod memory;

use std::sync::Arc;

use crate::error::DirectoryError;
use crate::types::CityRecord;

pub use cached::{CacheStats, CachedCityDirectory};
pub use memory::{InMemoryCityDirectory, SnapshotError};

/// Read-only city lookups. Implementations must be `Send + Sync` so one directory
/// can serve concurrent crawls.
pub trait CityDirectory: Send + Sync {
    /// Exact lookup by city name and state; spelling variants may be normalized.
    fn find_by_name_state(
        &self,
        name: &str,
        state: &str,
    ) -> Result<Option<CityRecord>, DirectoryError>;

    /// Cities within roughly `miles` of a point. Results need not be exact; the engine
    /// re-checks every distance.
    fn find_within_radius(
        &self,
        lat: f64,
        lon: f64,
        miles: f64,
    ) -> Result<Vec<CityRecord>, DirectoryError>;
}

impl<D: CityDirectory + ?Sized> CityDirectory for &D {
    fn find_by_name_state(
        &self,
        name: &str,
        state: &str,
    ) -> Result<Option<CityRecord>, DirectoryError> {
        (**self).find_by_name_state(name, state)
    }

    fn find_within_radius(
        &self,
        lat: f64,
        lon: f64,
        miles: f64,
    ) -> Result<Vec<CityRecord>, DirectoryError> {
        (**self).find_within_radius(lat, lon, miles)
    }
}

impl<D: CityDirectory + ?Sized> CityDirectory for Arc<D> {
    fn find_by_name_state(
        &self,
        name: &str,
        state: &str,
    ) -> Result<Option<CityRecord>, DirectoryError> {
        (**self).find_by_name_state(name, state)
    }

    fn find_within_radius(
        &self,
        lat: f64,
        lon: f64,
        miles: f64,
    ) -> Result<Vec<CityRecord>, DirectoryError> {
        (**self).find_within_radius(lat, lon, miles)
    }
}

impl<D: CityDirectory + ?Sized> CityDirectory for Box<D> {
    fn find_by_name_state(
        &self,
        name: &str,
        state: &str,
    ) -> Result<Option<CityRecord>, DirectoryError> {
        (**self).find_by_name_state(name, state)
    }

    fn find_within_radius(
        &self,
        lat: f64,
        lon: f64,
        miles: f64,
    ) -> Result<Vec<CityRecord>, DirectoryError> {
        (**self).find_within_radius(lat, lon, miles)
    }
}
