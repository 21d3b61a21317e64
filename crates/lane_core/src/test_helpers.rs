//! Test helpers: fixture directories and call-recording gateways.
//!
//! Shared by unit tests, integration tests, benches and the demo.

use std::sync::Mutex;

use crate::directory::{CityDirectory, InMemoryCityDirectory};
use crate::error::DirectoryError;
use crate::geo::offset_point;
use crate::types::CityRecord;

pub const CHICAGO: (f64, f64) = (41.8781, -87.6298);
pub const ATLANTA: (f64, f64) = (33.7488, -84.3877);

fn city(name: &str, state: &str, lat: f64, lon: f64, code: &str, market: &str) -> CityRecord {
    CityRecord::new(name, state)
        .with_coordinates(lat, lon)
        .with_market(code, market)
        .with_verified(true)
}

/// Chicago-area cities: eight market areas within 100 miles of Chicago.
pub fn chicago_area_cities() -> Vec<CityRecord> {
    vec![
        city("Chicago", "IL", CHICAGO.0, CHICAGO.1, "CHI", "Chicago"),
        city("Aurora", "IL", 41.7606, -88.3201, "CHI", "Chicago"),
        city("Elgin", "IL", 42.0354, -88.2826, "CHI", "Chicago"),
        city("Gary", "IN", 41.5934, -87.3464, "GRY", "Gary"),
        city("Joliet", "IL", 41.5250, -88.0817, "JOL", "Joliet"),
        city("Kenosha", "WI", 42.5847, -87.8212, "KEN", "Kenosha"),
        city("Kankakee", "IL", 41.1200, -87.8612, "KNK", "Kankakee"),
        city("Racine", "WI", 42.7261, -87.7829, "MKE", "Milwaukee Mkt"),
        city("Milwaukee", "WI", 43.0389, -87.9065, "MKE", "Milwaukee Mkt"),
        city("South Bend", "IN", 41.6764, -86.2520, "SBN", "South Bend"),
        city("Rockford", "IL", 42.2711, -89.0940, "RFD", "Rockford"),
        CityRecord::new("Ghost Town", "IL").with_market("GHO", "Ghost Town"),
    ]
}

/// Atlanta-area cities: seven market areas within 100 miles of Atlanta.
pub fn atlanta_area_cities() -> Vec<CityRecord> {
    vec![
        city("Atlanta", "GA", ATLANTA.0, ATLANTA.1, "ATL", "Atlanta"),
        city("Marietta", "GA", 33.9526, -84.5499, "ATL", "Atlanta"),
        city("Newnan", "GA", 33.3807, -84.7997, "LGC", "LaGrange"),
        city("LaGrange", "GA", 33.0393, -85.0313, "LGC", "LaGrange"),
        city("Gainesville", "GA", 34.2979, -83.8241, "GVL", "Gainesville"),
        city("Rome", "GA", 34.2570, -85.1647, "RMG", "Rome"),
        city("Athens", "GA", 33.9519, -83.3576, "AHN", "Athens"),
        city("Macon", "GA", 32.8407, -83.6324, "MCN", "Macon"),
        city("Anniston", "AL", 33.6598, -85.8316, "ANB", "Anniston"),
    ]
}

/// Directory holding both the Chicago and Atlanta fixtures.
pub fn chicago_atlanta_directory() -> InMemoryCityDirectory {
    let mut cities = chicago_area_cities();
    cities.extend(atlanta_area_cities());
    InMemoryCityDirectory::new(cities)
}

/// `count` cities evenly spaced on a circle of `miles` around a center, each in its
/// own market area (`{prefix}-{i}`).
pub fn ring_of_markets(
    center: (f64, f64),
    miles: f64,
    count: usize,
    prefix: &str,
    state: &str,
) -> Vec<CityRecord> {
    (0..count)
        .map(|i| {
            let bearing = i as f64 * 360.0 / count.max(1) as f64;
            let (lat, lon) = offset_point(center.0, center.1, bearing, miles);
            CityRecord::new(format!("{prefix} {i}"), state)
                .with_coordinates(lat, lon)
                .with_market(format!("{prefix}-{i}"), format!("{prefix} Area {i}"))
        })
        .collect()
}

/// A gateway call observed by [`RecordingDirectory`].
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryCall {
    ByName { name: String, state: String },
    WithinRadius { lat: f64, lon: f64, miles: f64 },
}

/// Wraps a directory and records every call in order.
pub struct RecordingDirectory<D> {
    inner: D,
    calls: Mutex<Vec<DirectoryCall>>,
}

impl<D: CityDirectory> RecordingDirectory<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<DirectoryCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Radii queried around `(lat, lon)`, in call order.
    pub fn radii_around(&self, center_lat: f64, center_lon: f64) -> Vec<f64> {
        let center = (center_lat, center_lon);
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DirectoryCall::WithinRadius { lat, lon, miles } if (lat, lon) == center => {
                    Some(miles)
                }
                _ => None,
            })
            .collect()
    }

    pub fn radius_call_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, DirectoryCall::WithinRadius { .. }))
            .count()
    }

    fn record(&self, call: DirectoryCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl<D: CityDirectory> CityDirectory for RecordingDirectory<D> {
    fn find_by_name_state(
        &self,
        name: &str,
        state: &str,
    ) -> Result<Option<CityRecord>, DirectoryError> {
        self.record(DirectoryCall::ByName {
            name: name.to_string(),
            state: state.to_string(),
        });
        self.inner.find_by_name_state(name, state)
    }

    fn find_within_radius(
        &self,
        lat: f64,
        lon: f64,
        miles: f64,
    ) -> Result<Vec<CityRecord>, DirectoryError> {
        self.record(DirectoryCall::WithinRadius { lat, lon, miles });
        self.inner.find_within_radius(lat, lon, miles)
    }
}

/// Directory answering radius queries from a fixed script keyed by center and radius.
///
/// Name lookups search the registered base cities. Unscripted radius queries return
/// no cities.
#[derive(Debug, Default)]
pub struct ScriptedDirectory {
    bases: InMemoryCityDirectory,
    responses: Vec<((f64, f64), f64, Vec<CityRecord>)>,
}

impl ScriptedDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(mut self, city: CityRecord) -> Self {
        self.bases.insert(city);
        self
    }

    pub fn respond(mut self, center: (f64, f64), miles: f64, cities: Vec<CityRecord>) -> Self {
        self.responses.push((center, miles, cities));
        self
    }
}

impl CityDirectory for ScriptedDirectory {
    fn find_by_name_state(
        &self,
        name: &str,
        state: &str,
    ) -> Result<Option<CityRecord>, DirectoryError> {
        self.bases.find_by_name_state(name, state)
    }

    fn find_within_radius(
        &self,
        lat: f64,
        lon: f64,
        miles: f64,
    ) -> Result<Vec<CityRecord>, DirectoryError> {
        Ok(self
            .responses
            .iter()
            .find(|((la, lo), radius, _)| *la == lat && *lo == lon && *radius == miles)
            .map(|(_, _, cities)| cities.clone())
            .unwrap_or_default())
    }
}
