//! Hungarian (Kuhn-Munkres) maximum-weight assignment.
//!
//! The score matrix is padded to a square with zero-score dummy rows/columns so that
//! unequal alternate counts need no special casing; pairs touching padding are
//! discarded afterwards.

use pathfinding::kuhn_munkres::{kuhn_munkres, Weights};

use super::{cell, column_count, is_forbidden, PairingAlgorithm};

/// Weight given to the largest absolute score; every other score is scaled
/// relative to it, so resolution does not depend on the magnitude of the scores.
const MAX_FEASIBLE_WEIGHT: i64 = 1_000_000_000; // 1e9

/// Weight for forbidden pairs (never selected while any alternative exists).
/// Kept well below every feasible weight but small enough that negating and summing
/// inside pathfinding cannot overflow i64.
const INFEASIBLE: i64 = -1_000_000_000_000_000; // -1e15

/// Simple matrix type implementing pathfinding's Weights for i64.
struct I64Weights(Vec<Vec<i64>>);

impl Weights<i64> for I64Weights {
    fn rows(&self) -> usize {
        self.0.len()
    }

    fn columns(&self) -> usize {
        self.0.first().map_or(0, |r| r.len())
    }

    fn at(&self, row: usize, col: usize) -> i64 {
        self.0[row][col]
    }

    fn neg(&self) -> Self {
        I64Weights(
            self.0
                .iter()
                .map(|r| r.iter().map(|&x| x.saturating_neg()).collect())
                .collect(),
        )
    }
}

/// Multiplier mapping the largest absolute feasible score to `MAX_FEASIBLE_WEIGHT`.
fn weight_scale(scores: &[Vec<f64>], rows: usize, cols: usize) -> f64 {
    let max_abs = (0..rows)
        .flat_map(|i| (0..cols).map(move |j| (i, j)))
        .map(|(i, j)| cell(scores, i, j))
        .filter(|&score| !is_forbidden(score))
        .fold(0.0_f64, |acc, score| acc.max(score.abs()));
    if max_abs > 0.0 {
        MAX_FEASIBLE_WEIGHT as f64 / max_abs
    } else {
        1.0
    }
}

/// Convert a sanitized f64 score to an i64 weight.
fn score_to_weight(score: f64, scale: f64) -> i64 {
    if is_forbidden(score) {
        return INFEASIBLE;
    }
    let w = (score * scale).round();
    w.clamp(-(MAX_FEASIBLE_WEIGHT as f64), MAX_FEASIBLE_WEIGHT as f64) as i64
}

/// Maximum-weight one-to-one assignment over an `M x N` score matrix.
///
/// Returns `(row, col)` pairs ordered by row, with `row < M` and `col < N`. When
/// every score is non-negative exactly `min(M, N)` pairs come back. NaN/infinite or
/// missing cells score 0; cells at or below [`FORBIDDEN`](super::FORBIDDEN) are never
/// returned. The same input always produces the same output.
///
/// Scores are compared relative to the largest absolute score in the matrix, at a
/// resolution of `1e-9` of it.
pub fn assign_max_weight(scores: &[Vec<f64>]) -> Vec<(usize, usize)> {
    let rows = scores.len();
    let cols = column_count(scores);
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    let scale = weight_scale(scores, rows, cols);
    let n = rows.max(cols);
    let mut matrix = vec![vec![0_i64; n]; n];
    for (i, row) in matrix.iter_mut().enumerate().take(rows) {
        for (j, weight) in row.iter_mut().enumerate().take(cols) {
            *weight = score_to_weight(cell(scores, i, j), scale);
        }
    }
    let weights = I64Weights(matrix);

    let (_total, assignments) = kuhn_munkres(&weights);

    assignments
        .iter()
        .enumerate()
        .filter(|&(row, &col)| row < rows && col < cols && weights.at(row, col) > INFEASIBLE)
        .map(|(row, &col)| (row, col))
        .collect()
}

/// [`PairingAlgorithm`] backed by [`assign_max_weight`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HungarianPairing;

impl PairingAlgorithm for HungarianPairing {
    fn assign(&self, scores: &[Vec<f64>]) -> Vec<(usize, usize)> {
        assign_max_weight(scores)
    }
}
