//! Pair quality scores feeding the assignment step.
//!
//! A pair is better when both alternates sit close to their base city and when it
//! introduces market areas that earlier shortlisted alternates did not cover.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::CandidateCity;

/// Default multiplicative bonus for an alternate in a not-yet-used market area.
pub const DEFAULT_DIVERSITY_BONUS: f64 = 0.5;

/// Market freshness of both sides of a candidate pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairContext {
    /// The origin's market area does not appear in any earlier origin row.
    pub origin_market_fresh: bool,
    /// The destination's market area does not appear in any earlier destination column.
    pub destination_market_fresh: bool,
}

/// Scores one origin/destination alternate pair. Higher is better; must be finite.
pub trait PairScorer: Send + Sync {
    fn score(&self, origin: &CandidateCity, destination: &CandidateCity, ctx: PairContext) -> f64;
}

/// `1 / (1 + origin_miles + destination_miles)`, multiplied by
/// `1 + diversity_bonus` for each side whose market is fresh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceDiversityScorer {
    pub diversity_bonus: f64,
}

impl DistanceDiversityScorer {
    pub fn new(diversity_bonus: f64) -> Self {
        Self { diversity_bonus }
    }
}

impl Default for DistanceDiversityScorer {
    fn default() -> Self {
        Self::new(DEFAULT_DIVERSITY_BONUS)
    }
}

impl PairScorer for DistanceDiversityScorer {
    fn score(&self, origin: &CandidateCity, destination: &CandidateCity, ctx: PairContext) -> f64 {
        let miles = origin.distance_miles.max(0.0) + destination.distance_miles.max(0.0);
        let base = 1.0 / (1.0 + miles);
        let multiplier = 1.0 + self.diversity_bonus;
        let mut score = base;
        if ctx.origin_market_fresh {
            score *= multiplier;
        }
        if ctx.destination_market_fresh {
            score *= multiplier;
        }
        score
    }
}

/// For each city, whether its market area is the first occurrence in the list.
pub fn market_freshness(cities: &[CandidateCity]) -> Vec<bool> {
    let mut seen = HashSet::new();
    cities
        .iter()
        .map(|city| seen.insert(city.market_key().to_string()))
        .collect()
}

/// Build the `origins.len() x destinations.len()` score matrix.
pub fn build_score_matrix(
    origins: &[CandidateCity],
    destinations: &[CandidateCity],
    scorer: &dyn PairScorer,
) -> Vec<Vec<f64>> {
    let origin_fresh = market_freshness(origins);
    let destination_fresh = market_freshness(destinations);

    origins
        .iter()
        .zip(&origin_fresh)
        .map(|(origin, &origin_market_fresh)| {
            destinations
                .iter()
                .zip(&destination_fresh)
                .map(|(destination, &destination_market_fresh)| {
                    let ctx = PairContext {
                        origin_market_fresh,
                        destination_market_fresh,
                    };
                    scorer.score(origin, destination, ctx)
                })
                .collect()
        })
        .collect()
}
