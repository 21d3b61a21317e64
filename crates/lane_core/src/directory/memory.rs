use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::error::DirectoryError;
use crate::geo::{bounding_box_from_radius, haversine_miles};
use crate::normalize::city_key;
use crate::types::CityRecord;

use super::CityDirectory;

/// Errors raised while loading a JSON city snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read city snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse city snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Directory over an in-memory city list.
///
/// Radius queries apply the bounding box first, then exact haversine. Name lookups
/// compare normalized `name|STATE` keys and prefer verified records with coordinates
/// when several spellings match.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCityDirectory {
    cities: Vec<CityRecord>,
}

impl InMemoryCityDirectory {
    pub fn new(cities: Vec<CityRecord>) -> Self {
        Self { cities }
    }

    /// Load a JSON array of [`CityRecord`]s.
    pub fn from_json_reader(reader: impl Read) -> Result<Self, SnapshotError> {
        let cities: Vec<CityRecord> = serde_json::from_reader(reader)?;
        Ok(Self::new(cities))
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SnapshotError> {
        let cities: Vec<CityRecord> = serde_json::from_str(raw)?;
        Ok(Self::new(cities))
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }

    pub fn insert(&mut self, city: CityRecord) {
        self.cities.push(city);
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn cities(&self) -> &[CityRecord] {
        &self.cities
    }
}

impl CityDirectory for InMemoryCityDirectory {
    fn find_by_name_state(
        &self,
        name: &str,
        state: &str,
    ) -> Result<Option<CityRecord>, DirectoryError> {
        let key = city_key(name, state);
        let best = self
            .cities
            .iter()
            .filter(|city| city.key() == key)
            .max_by_key(|city| (city.coordinates().is_some(), city.is_verified()));
        Ok(best.cloned())
    }

    fn find_within_radius(
        &self,
        lat: f64,
        lon: f64,
        miles: f64,
    ) -> Result<Vec<CityRecord>, DirectoryError> {
        let bbox = bounding_box_from_radius(lat, lon, miles)?;
        let mut found = Vec::new();
        for city in &self.cities {
            let Some((city_lat, city_lon)) = city.coordinates() else {
                continue;
            };
            if !bbox.contains(city_lat, city_lon) {
                continue;
            }
            if haversine_miles(lat, lon, city_lat, city_lon)? <= miles {
                found.push(city.clone());
            }
        }
        Ok(found)
    }
}
