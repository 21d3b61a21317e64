//! One-to-one pairing of origin alternates (rows) with destination alternates (columns).
//!
//! [`assign_max_weight`] is the optimal Hungarian solver. [`GreedyPairing`] is a cheaper
//! row-by-row alternative selectable through [`PairingStrategy`].

pub mod greedy;
pub mod hungarian;

use serde::{Deserialize, Serialize};

pub use greedy::GreedyPairing;
pub use hungarian::{assign_max_weight, HungarianPairing};

/// Score marking a pair that must never be selected.
///
/// Any finite score at or below this value is treated as forbidden. Pairs landing on
/// a forbidden cell are dropped from the output.
pub const FORBIDDEN: f64 = -1.0e12;

/// Assigns rows to columns of a score matrix so that no row or column is reused.
pub trait PairingAlgorithm: Send + Sync {
    /// Returns `(row, col)` pairs ordered by row.
    ///
    /// Rows may be ragged; missing cells count as score 0. An empty matrix yields no
    /// pairs.
    fn assign(&self, scores: &[Vec<f64>]) -> Vec<(usize, usize)>;
}

/// Which pairing algorithm a crawl uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingStrategy {
    /// Maximum-weight matching (Hungarian algorithm).
    #[default]
    Optimal,
    /// Each row in turn takes its best unused column.
    Greedy,
}

/// Construct a boxed [`PairingAlgorithm`] for a [`PairingStrategy`].
pub fn build_pairing_algorithm(strategy: PairingStrategy) -> Box<dyn PairingAlgorithm> {
    match strategy {
        PairingStrategy::Optimal => Box::new(HungarianPairing),
        PairingStrategy::Greedy => Box::new(GreedyPairing),
    }
}

/// NaN and infinities mean "no preference" and score as 0.
pub(crate) fn sanitize_score(score: f64) -> f64 {
    if score.is_finite() { score } else { 0.0 }
}

pub(crate) fn is_forbidden(score: f64) -> bool {
    score.is_finite() && score <= FORBIDDEN
}

/// Score at `(row, col)` after sanitizing; missing cells are 0.
pub(crate) fn cell(scores: &[Vec<f64>], row: usize, col: usize) -> f64 {
    scores
        .get(row)
        .and_then(|r| r.get(col))
        .copied()
        .map_or(0.0, sanitize_score)
}

/// Width of a possibly ragged matrix.
pub(crate) fn column_count(scores: &[Vec<f64>]) -> usize {
    scores.iter().map(Vec::len).max().unwrap_or(0)
}

/// Sum of the selected cells.
pub fn total_score(scores: &[Vec<f64>], pairs: &[(usize, usize)]) -> f64 {
    pairs.iter().map(|&(row, col)| cell(scores, row, col)).sum()
}
