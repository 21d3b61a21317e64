//! Lane crawl: resolve both base cities, search each endpoint with an expanding
//! radius until enough market areas show up, then pair the alternates.
//!
//! Flow per call:
//!
//! 1. Exact name+state lookup of the origin and destination (fatal if missing).
//! 2. Per endpoint, query the directory at each radius of the ladder, drop cities in
//!    the caller's [`UsedCities`] and the other endpoint's base city, and run
//!    [`select_diverse`]; stop at the first radius whose selection reaches the market
//!    target. The destination search also drops the shortlisted origin alternates, so
//!    no city is offered on both sides of a lane.
//! 3. Shortlist alternates one market at a time, score every origin/destination
//!    combination and solve the assignment.
//! 4. Append every returned alternate to [`UsedCities`].
//!
//! A diversity shortfall after the last radius is reported in [`CrawlMetadata`], never
//! raised as an error, and missing alternates are never invented.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::assignment::{build_pairing_algorithm, PairingAlgorithm};
use crate::config::CrawlConfig;
use crate::directory::CityDirectory;
use crate::diversity::{select_diverse, DiverseSelection};
use crate::error::{ConfigError, LaneError, Result};
use crate::scoring::{build_score_matrix, DistanceDiversityScorer, PairScorer};
use crate::types::{CandidateCity, CityRecord, CityRef, PairCandidate, ReferencePoint, UsedCities};

/// One lane to crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRequest {
    pub origin: CityRef,
    pub destination: CityRef,
    /// Equipment code (e.g. `FD`, `V`); echoed back for the export layer.
    pub equipment: String,
    /// Raise the market and pair targets so the lane can fill ten postings.
    #[serde(default)]
    pub prefer_fill_to_10: bool,
}

impl CrawlRequest {
    pub fn new(origin: CityRef, destination: CityRef, equipment: impl Into<String>) -> Self {
        Self {
            origin,
            destination,
            equipment: equipment.into(),
            prefer_fill_to_10: false,
        }
    }

    pub fn with_prefer_fill_to_10(mut self, prefer: bool) -> Self {
        self.prefer_fill_to_10 = prefer;
        self
    }
}

/// How the expanding-radius search went for one endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointSearch {
    /// Radii queried, in order.
    pub radii_attempted: Vec<f64>,
    /// Radius whose selection was kept.
    pub radius_used_miles: Option<f64>,
    /// Directory records returned at that radius, before filtering.
    pub candidates_found: usize,
    /// Size of the kept selection.
    pub alternates_selected: usize,
    /// Market areas in the kept selection.
    pub unique_markets: usize,
    /// The market target was not reached at any radius.
    pub insufficient_diversity: bool,
}

/// Counts the caller uses for its own diversity validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlMetadata {
    pub pair_count: usize,
    pub unique_origin_markets: usize,
    pub unique_dest_markets: usize,
    pub target_pairs: usize,
    pub market_target: usize,
    pub origin_search: EndpointSearch,
    pub destination_search: EndpointSearch,
}

impl CrawlMetadata {
    /// Fewer pairs than the target came back.
    pub fn is_short(&self) -> bool {
        self.pair_count < self.target_pairs
    }
}

/// Result of one crawl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlResult {
    /// Pairs in assignment order (by origin row), not sorted by score.
    pub pairs: Vec<PairCandidate>,
    pub base_origin: CityRecord,
    pub base_destination: CityRecord,
    pub equipment: String,
    pub metadata: CrawlMetadata,
}

/// Generates market-diverse alternate pairs for freight lanes.
pub struct LaneCrawler<D> {
    directory: D,
    config: CrawlConfig,
    scorer: Box<dyn PairScorer>,
    pairing: Box<dyn PairingAlgorithm>,
}

impl<D: CityDirectory> LaneCrawler<D> {
    /// Build a crawler with the scorer and pairing algorithm named by `config`.
    pub fn new(directory: D, config: CrawlConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            scorer: Box::new(DistanceDiversityScorer::new(config.diversity_bonus)),
            pairing: build_pairing_algorithm(config.pairing),
            directory,
            config,
        })
    }

    /// Replace the pair scorer.
    pub fn with_scorer(mut self, scorer: Box<dyn PairScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Replace the pairing algorithm.
    pub fn with_pairing_algorithm(mut self, pairing: Box<dyn PairingAlgorithm>) -> Self {
        self.pairing = pairing;
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Generate alternate origin/destination pairs for one lane.
    ///
    /// Fails with [`LaneError::CityNotFound`] if either base city is unknown and
    /// passes directory errors through. Every other shortfall only shrinks the
    /// result. Returned alternates are appended to `used_cities`.
    pub fn generate_diverse_pairs(
        &self,
        request: &CrawlRequest,
        used_cities: &mut UsedCities,
    ) -> Result<CrawlResult> {
        let base_origin = self.resolve(&request.origin)?;
        let base_destination = self.resolve(&request.destination)?;
        let origin_center = ReferencePoint::try_from(&base_origin)?;
        let destination_center = ReferencePoint::try_from(&base_destination)?;

        let market_target = self.config.market_target(request.prefer_fill_to_10);
        let target_pairs = self.config.pair_target(request.prefer_fill_to_10);

        // Neither side may offer the other side's base city.
        let mut excluded = HashSet::from([destination_center.key()]);
        let (origin_selection, origin_search) =
            self.search_endpoint(&origin_center, market_target, used_cities, &excluded)?;
        let origins = origin_selection.round_robin(target_pairs);

        // Origin alternates are taken first on short lanes where the areas overlap.
        excluded.clear();
        excluded.insert(origin_center.key());
        excluded.extend(origins.iter().map(CandidateCity::key));
        let (destination_selection, destination_search) =
            self.search_endpoint(&destination_center, market_target, used_cities, &excluded)?;
        let destinations = destination_selection.round_robin(target_pairs);
        let pairs = self.pair_alternates(&origins, &destinations);

        for pair in &pairs {
            used_cities.insert_key(pair.origin.key());
            used_cities.insert_key(pair.destination.key());
        }

        let metadata = CrawlMetadata {
            pair_count: pairs.len(),
            unique_origin_markets: count_markets(pairs.iter().map(|p| &p.origin)),
            unique_dest_markets: count_markets(pairs.iter().map(|p| &p.destination)),
            target_pairs,
            market_target,
            origin_search,
            destination_search,
        };

        if metadata.is_short() {
            warn!(
                target: "lane_core::crawl",
                origin = %origin_center.key(),
                destination = %destination_center.key(),
                pairs = metadata.pair_count,
                target = target_pairs,
                "fewer pairs than requested"
            );
        }
        info!(
            target: "lane_core::crawl",
            origin = %origin_center.key(),
            destination = %destination_center.key(),
            equipment = %request.equipment,
            pairs = metadata.pair_count,
            origin_markets = metadata.unique_origin_markets,
            dest_markets = metadata.unique_dest_markets,
            "lane crawl complete"
        );

        Ok(CrawlResult {
            pairs,
            base_origin,
            base_destination,
            equipment: request.equipment.clone(),
            metadata,
        })
    }

    fn resolve(&self, city: &CityRef) -> Result<CityRecord> {
        self.directory
            .find_by_name_state(&city.city, &city.state)
            .map_err(LaneError::Directory)?
            .ok_or_else(|| LaneError::city_not_found(city.city.clone(), city.state.clone()))
    }

    /// Walk the radius ladder until the selection covers `market_target` markets.
    ///
    /// Cities in `used_cities` or `excluded` never count toward the target.
    fn search_endpoint(
        &self,
        center: &ReferencePoint,
        market_target: usize,
        used_cities: &UsedCities,
        excluded: &HashSet<String>,
    ) -> Result<(DiverseSelection, EndpointSearch)> {
        let opts = self.config.selection_options();
        let mut search = EndpointSearch::default();
        let mut selection = DiverseSelection::default();

        for &radius in &self.config.radii_miles {
            let records = self
                .directory
                .find_within_radius(center.latitude, center.longitude, radius)
                .map_err(LaneError::Directory)?;
            search.radii_attempted.push(radius);
            let found = records.len();
            let fresh: Vec<CityRecord> = records
                .into_iter()
                .filter(|record| {
                    let key = record.key();
                    !used_cities.contains_key(&key) && !excluded.contains(&key)
                })
                .collect();

            selection = select_diverse(center, &fresh, radius, &opts)?;
            search.radius_used_miles = Some(radius);
            search.candidates_found = found;
            debug!(
                target: "lane_core::crawl",
                center = %center.key(),
                radius,
                found,
                markets = selection.unique_markets(),
                "radius attempt"
            );
            if selection.unique_markets() >= market_target {
                break;
            }
        }

        search.alternates_selected = selection.len();
        search.unique_markets = selection.unique_markets();
        search.insufficient_diversity = search.unique_markets < market_target;
        if search.insufficient_diversity {
            warn!(
                target: "lane_core::crawl",
                center = %center.key(),
                markets = search.unique_markets,
                target = market_target,
                "insufficient market diversity after widest radius"
            );
        }
        Ok((selection, search))
    }

    fn pair_alternates(
        &self,
        origins: &[CandidateCity],
        destinations: &[CandidateCity],
    ) -> Vec<PairCandidate> {
        if origins.is_empty() || destinations.is_empty() {
            return Vec::new();
        }

        let scores = build_score_matrix(origins, destinations, self.scorer.as_ref());
        let mut used_rows = HashSet::new();
        let mut used_cols = HashSet::new();

        self.pairing
            .assign(&scores)
            .into_iter()
            .filter(|&(row, col)| used_rows.insert(row) && used_cols.insert(col))
            .filter_map(|(row, col)| {
                Some(PairCandidate {
                    origin: origins.get(row)?.clone(),
                    destination: destinations.get(col)?.clone(),
                    score: *scores.get(row)?.get(col)?,
                })
            })
            .collect()
    }
}

fn count_markets<'a>(cities: impl Iterator<Item = &'a CandidateCity>) -> usize {
    cities
        .map(|city| city.market_key())
        .collect::<HashSet<_>>()
        .len()
}
