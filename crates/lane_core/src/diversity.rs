//! Market-area diversity selection around one lane endpoint.
//!
//! Candidates are filtered to the search radius, grouped by market area and ranked
//! inside each group. A city named after its own market (the anchor, e.g. "Joliet" in
//! the "Joliet Mkt" area) always leads its group, even when a closer city exists.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LaneError, Result};
use crate::geo::haversine_miles;
use crate::types::{CandidateCity, CityRecord, ReferencePoint};

/// Default number of cities kept per market area.
pub const DEFAULT_PER_GROUP_CAP: usize = 20;

/// Caps applied when assembling a [`DiverseSelection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionOptions {
    pub per_group_cap: usize,
    pub total_cap: Option<usize>,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            per_group_cap: DEFAULT_PER_GROUP_CAP,
            total_cap: None,
        }
    }
}

/// Cities of one market area, anchor first, then nearest first.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketGroup {
    pub market: String,
    pub cities: Vec<CandidateCity>,
}

/// Alternate cities for one endpoint, grouped by market area.
///
/// Groups are ordered by their nearest member. Within a group the order is the
/// ranking rule of [`select_diverse`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiverseSelection {
    groups: Vec<MarketGroup>,
}

impl DiverseSelection {
    pub fn groups(&self) -> &[MarketGroup] {
        &self.groups
    }

    /// Every selected city, group by group.
    pub fn iter(&self) -> impl Iterator<Item = &CandidateCity> {
        self.groups.iter().flat_map(|group| group.cities.iter())
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.cities.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn unique_markets(&self) -> usize {
        self.groups.len()
    }

    pub fn into_vec(self) -> Vec<CandidateCity> {
        self.groups
            .into_iter()
            .flat_map(|group| group.cities)
            .collect()
    }

    /// Up to `limit` cities taken one per market per round.
    ///
    /// The first round takes the head (anchor or nearest) of every market, the next
    /// round every market's second city, and so on. The first `min(limit, markets)`
    /// entries therefore come from distinct market areas.
    pub fn round_robin(&self, limit: usize) -> Vec<CandidateCity> {
        let mut picked = Vec::with_capacity(limit.min(self.len()));
        let mut rank = 0;
        while picked.len() < limit {
            let mut took_any = false;
            for group in &self.groups {
                if picked.len() == limit {
                    break;
                }
                if let Some(city) = group.cities.get(rank) {
                    picked.push(city.clone());
                    took_any = true;
                }
            }
            if !took_any {
                break;
            }
            rank += 1;
        }
        picked
    }
}

/// Ascending distance; exact ties prefer verified records, then name/state for a
/// stable order.
fn rank_candidates(a: &CandidateCity, b: &CandidateCity) -> Ordering {
    a.distance_miles
        .total_cmp(&b.distance_miles)
        .then_with(|| b.city.is_verified().cmp(&a.city.is_verified()))
        .then_with(|| a.city.name.cmp(&b.city.name))
        .then_with(|| a.city.state.cmp(&b.city.state))
}

/// Select market-diverse alternates within `radius_miles` of `center`.
///
/// Records without coordinates, the center itself (same normalized name and state)
/// and anything farther than the radius by exact haversine are dropped. Spelling
/// variants of the same city keep only their best-ranked record. An empty result is
/// not an error.
pub fn select_diverse(
    center: &ReferencePoint,
    candidates: &[CityRecord],
    radius_miles: f64,
    opts: &SelectionOptions,
) -> Result<DiverseSelection> {
    if !radius_miles.is_finite() || radius_miles < 0.0 {
        return Err(LaneError::invalid_input(format!(
            "search radius must be a non-negative finite number, got {radius_miles}"
        )));
    }
    let center_key = center.key();

    let mut within = Vec::with_capacity(candidates.len());
    for record in candidates {
        let Some((lat, lon)) = record.coordinates() else {
            continue;
        };
        if record.key() == center_key {
            continue;
        }
        let distance_miles = haversine_miles(center.latitude, center.longitude, lat, lon)?;
        if distance_miles > radius_miles {
            continue;
        }
        within.push(CandidateCity {
            city: record.clone(),
            distance_miles,
        });
    }
    within.sort_by(rank_candidates);

    let mut seen = HashSet::new();
    let mut by_market: BTreeMap<String, Vec<CandidateCity>> = BTreeMap::new();
    for candidate in within {
        if !seen.insert(candidate.key()) {
            continue;
        }
        by_market
            .entry(candidate.market_key().to_string())
            .or_default()
            .push(candidate);
    }

    let mut groups: Vec<(f64, MarketGroup)> = by_market
        .into_iter()
        .filter_map(|(market, mut cities)| {
            let nearest = cities.first()?.distance_miles;
            if let Some(anchor_idx) = cities.iter().position(|c| c.city.is_market_anchor()) {
                let anchor = cities.remove(anchor_idx);
                cities.insert(0, anchor);
            }
            cities.truncate(opts.per_group_cap);
            if cities.is_empty() {
                return None;
            }
            Some((nearest, MarketGroup { market, cities }))
        })
        .collect();
    groups.sort_by(|(da, a), (db, b)| da.total_cmp(db).then_with(|| a.market.cmp(&b.market)));

    let mut remaining = opts.total_cap.unwrap_or(usize::MAX);
    let mut selected = Vec::with_capacity(groups.len());
    for (_, mut group) in groups {
        if remaining == 0 {
            break;
        }
        group.cities.truncate(remaining);
        remaining -= group.cities.len();
        selected.push(group);
    }

    let selection = DiverseSelection { groups: selected };
    debug!(
        target: "lane_core::diversity",
        center = %center_key,
        radius_miles,
        input = candidates.len(),
        selected = selection.len(),
        markets = selection.unique_markets(),
        "selected diverse alternates"
    );
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::offset_point;

    fn center() -> ReferencePoint {
        ReferencePoint::new("Chicago", "IL", 41.8781, -87.6298)
    }

    fn city_at(name: &str, miles: f64, bearing: f64, market: Option<(&str, &str)>) -> CityRecord {
        let c = center();
        let (lat, lon) = offset_point(c.latitude, c.longitude, bearing, miles);
        let record = CityRecord::new(name, "IL").with_coordinates(lat, lon);
        match market {
            Some((code, label)) => record.with_market(code, label),
            None => record,
        }
    }

    /// Default options at 75 miles around Chicago.
    fn select(candidates: &[CityRecord]) -> DiverseSelection {
        select_diverse(&center(), candidates, 75.0, &SelectionOptions::default()).unwrap()
    }

    fn names(group: &MarketGroup) -> Vec<&str> {
        group.cities.iter().map(|c| c.city.name.as_str()).collect()
    }

    #[test]
    fn empty_candidates_yield_empty_selection() {
        let selection = select(&[]);
        assert!(selection.is_empty());
        assert_eq!(selection.unique_markets(), 0);
    }

    #[test]
    fn drops_self_missing_coordinates_and_out_of_radius() {
        let candidates = vec![
            CityRecord::new("CHICAGO", "il").with_coordinates(41.88, -87.63),
            CityRecord::new("Ghost Town", "IL"),
            city_at("Far Away", 80.0, 90.0, None),
            city_at("Joliet", 34.0, 225.0, Some(("JOL", "Joliet"))),
        ];
        let selection = select(&candidates);
        let picked: Vec<_> = selection.iter().map(|c| c.city.name.clone()).collect();
        assert_eq!(picked, vec!["Joliet".to_string()]);
    }

    #[test]
    fn anchor_city_leads_its_group_even_when_farther() {
        let market = Some(("MKE", "Milwaukee Mkt"));
        let candidates = vec![
            city_at("Racine", 60.0, 0.0, market),
            city_at("Milwaukee", 70.0, 0.0, market),
            city_at("Kenosha", 50.0, 0.0, market),
        ];
        let selection = select(&candidates);
        let groups = selection.groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(names(&groups[0]), vec!["Milwaukee", "Kenosha", "Racine"]);
    }

    #[test]
    fn anchor_outside_radius_is_not_offered() {
        let market = Some(("MKE", "Milwaukee"));
        let candidates = vec![
            city_at("Racine", 60.0, 0.0, market),
            city_at("Milwaukee", 81.0, 0.0, market),
        ];
        let selection = select(&candidates);
        assert_eq!(names(&selection.groups()[0]), vec!["Racine"]);
    }

    #[test]
    fn verified_records_win_exact_distance_ties() {
        let (lat, lon) = offset_point(41.8781, -87.6298, 180.0, 30.0);
        let candidates = vec![
            CityRecord::new("Alpha", "IL")
                .with_coordinates(lat, lon)
                .with_market("X", "Xville"),
            CityRecord::new("Beta", "IL")
                .with_coordinates(lat, lon)
                .with_market("X", "Xville")
                .with_verified(true),
        ];
        let selection = select(&candidates);
        assert_eq!(names(&selection.groups()[0]), vec!["Beta", "Alpha"]);
    }

    #[test]
    fn spelling_variants_are_deduplicated() {
        let candidates = vec![
            city_at("St. Charles", 40.0, 270.0, Some(("STC", "Saint Charles"))),
            city_at("Saint Charles", 41.0, 270.0, Some(("STC", "Saint Charles"))),
        ];
        let selection = select(&candidates);
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn caps_per_group_and_in_total() {
        let north = Some(("N", "North"));
        let south = Some(("S", "South"));
        let mut candidates = Vec::new();
        for i in 0..5 {
            let offset = i as f64;
            candidates.push(city_at(&format!("North {i}"), 10.0 + offset, 0.0, north));
            candidates.push(city_at(&format!("South {i}"), 20.0 + offset, 180.0, south));
        }
        let opts = SelectionOptions {
            per_group_cap: 3,
            total_cap: Some(4),
        };
        let selection = select_diverse(&center(), &candidates, 75.0, &opts).unwrap();
        let groups = selection.groups();
        assert_eq!(selection.len(), 4);
        assert_eq!(names(&groups[0]), vec!["North 0", "North 1", "North 2"]);
        assert_eq!(names(&groups[1]), vec!["South 0"]);
    }

    #[test]
    fn missing_market_codes_share_the_unknown_group() {
        let candidates = vec![
            city_at("A", 10.0, 0.0, None),
            city_at("B", 12.0, 90.0, None),
        ];
        let selection = select(&candidates);
        assert_eq!(selection.unique_markets(), 1);
        assert_eq!(selection.groups()[0].market, crate::types::UNKNOWN_MARKET);
    }

    #[test]
    fn round_robin_takes_one_city_per_market_first() {
        let candidates = vec![
            city_at("A1", 10.0, 0.0, Some(("A", "Aville"))),
            city_at("A2", 11.0, 0.0, Some(("A", "Aville"))),
            city_at("B1", 20.0, 90.0, Some(("B", "Bville"))),
            city_at("C1", 30.0, 180.0, Some(("C", "Cville"))),
        ];
        let selection = select(&candidates);
        let picked: Vec<_> = selection
            .round_robin(4)
            .into_iter()
            .map(|c| c.city.name)
            .collect();
        assert_eq!(picked, vec!["A1", "B1", "C1", "A2"]);
        assert_eq!(selection.round_robin(10).len(), 4);
        assert!(selection.round_robin(0).is_empty());
    }

    #[test]
    fn rejects_invalid_radius() {
        let opts = SelectionOptions::default();
        let err = select_diverse(&center(), &[], f64::NAN, &opts).unwrap_err();
        assert!(matches!(err, LaneError::InvalidInput(_)));
    }
}
