//! Records flowing through the engine: directory cities, candidates, pairs and the
//! caller-owned used-city set.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{LaneError, Result};
use crate::normalize::{city_key, normalize_city_name};

/// Group key for cities whose market area is unknown.
pub const UNKNOWN_MARKET: &str = "UNKNOWN";

/// A city as returned by the directory gateway. Owned by the gateway, consumed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: String,
    pub state: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub market_area_code: Option<String>,
    #[serde(default)]
    pub market_area_name: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
}

impl CityRecord {
    pub fn new(name: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
            latitude: None,
            longitude: None,
            market_area_code: None,
            market_area_name: None,
            verified: None,
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn with_market(mut self, code: impl Into<String>, name: impl Into<String>) -> Self {
        self.market_area_code = Some(code.into());
        self.market_area_name = Some(name.into());
        self
    }

    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = Some(verified);
        self
    }

    /// Both coordinates, if present and finite. Low-quality records yield `None`.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }

    /// Normalized `name|STATE` identity.
    pub fn key(&self) -> String {
        city_key(&self.name, &self.state)
    }

    /// Market area grouping key; `UNKNOWN` when the code is missing or blank.
    pub fn market_key(&self) -> &str {
        self.market_area_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .unwrap_or(UNKNOWN_MARKET)
    }

    /// True when this city is the canonical anchor of its own market area.
    pub fn is_market_anchor(&self) -> bool {
        match self.market_area_name.as_deref() {
            Some(market_name) => {
                let market = normalize_city_name(market_name);
                !market.is_empty() && market == normalize_city_name(&self.name)
            }
            None => false,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.verified == Some(true)
    }
}

/// City name + state as supplied by the caller of a crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRef {
    pub city: String,
    pub state: String,
}

impl CityRef {
    pub fn new(city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
        }
    }
}

/// Center of a radius search: the resolved base city of one lane endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub name: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ReferencePoint {
    pub fn new(
        name: impl Into<String>,
        state: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
            latitude,
            longitude,
        }
    }

    pub fn key(&self) -> String {
        city_key(&self.name, &self.state)
    }
}

impl TryFrom<&CityRecord> for ReferencePoint {
    type Error = LaneError;

    fn try_from(record: &CityRecord) -> Result<Self> {
        let (latitude, longitude) = record.coordinates().ok_or_else(|| {
            LaneError::invalid_input(format!(
                "{}, {} has no usable coordinates",
                record.name, record.state
            ))
        })?;
        Ok(Self::new(
            record.name.clone(),
            record.state.clone(),
            latitude,
            longitude,
        ))
    }
}

/// A directory city plus its distance from the search center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateCity {
    #[serde(flatten)]
    pub city: CityRecord,
    pub distance_miles: f64,
}

impl CandidateCity {
    pub fn key(&self) -> String {
        self.city.key()
    }

    pub fn market_key(&self) -> &str {
        self.city.market_key()
    }
}

/// One posting variation: an origin alternate paired with a destination alternate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairCandidate {
    pub origin: CandidateCity,
    pub destination: CandidateCity,
    pub score: f64,
}

/// Caller-owned set of normalized city identities already used by earlier crawls.
///
/// The crawler reads it to skip repeats and appends every alternate it returns. It
/// performs no locking; callers sharing a set across threads must serialize access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedCities(HashSet<String>);

impl UsedCities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str, state: &str) -> bool {
        self.0.contains(&city_key(name, state))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    /// Record a city; returns false if it was already present.
    pub fn insert(&mut self, name: &str, state: &str) -> bool {
        self.0.insert(city_key(name, state))
    }

    pub fn insert_key(&mut self, key: String) -> bool {
        self.0.insert(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_require_both_finite_values() {
        let city = CityRecord::new("Joliet", "IL").with_coordinates(41.525, -88.0817);
        assert_eq!(city.coordinates(), Some((41.525, -88.0817)));

        let mut partial = CityRecord::new("Nowhere", "IL");
        partial.latitude = Some(41.0);
        assert_eq!(partial.coordinates(), None);

        let nan = CityRecord::new("Bad", "IL").with_coordinates(f64::NAN, -88.0);
        assert_eq!(nan.coordinates(), None);
    }

    #[test]
    fn blank_market_codes_group_as_unknown() {
        let mut city = CityRecord::new("Joliet", "IL");
        assert_eq!(city.market_key(), UNKNOWN_MARKET);
        city.market_area_code = Some("  ".to_string());
        assert_eq!(city.market_key(), UNKNOWN_MARKET);
        city.market_area_code = Some("JOL".to_string());
        assert_eq!(city.market_key(), "JOL");
    }

    #[test]
    fn anchor_detection_uses_normalized_names() {
        let anchor = CityRecord::new("St. Louis", "MO").with_market("STL", "Saint Louis Mkt");
        assert!(anchor.is_market_anchor());
        let member = CityRecord::new("Belleville", "IL").with_market("STL", "Saint Louis Mkt");
        assert!(!member.is_market_anchor());
        assert!(!CityRecord::new("Joliet", "IL").is_market_anchor());
    }

    #[test]
    fn reference_point_requires_coordinates() {
        let missing = CityRecord::new("Joliet", "IL");
        assert!(matches!(
            ReferencePoint::try_from(&missing),
            Err(LaneError::InvalidInput(_))
        ));
    }

    #[test]
    fn used_cities_match_spelling_variants() {
        let mut used = UsedCities::new();
        assert!(used.insert("St. Louis", "MO"));
        assert!(!used.insert("Saint Louis", "mo"));
        assert!(used.contains("ST LOUIS", "MO"));
        assert_eq!(used.len(), 1);
    }

    #[test]
    fn city_record_deserializes_with_missing_optionals() {
        let city: CityRecord = serde_json::from_str(r#"{"name":"Joliet","state":"IL"}"#).unwrap();
        assert_eq!(city.market_key(), UNKNOWN_MARKET);
        assert_eq!(city.verified, None);
    }
}
