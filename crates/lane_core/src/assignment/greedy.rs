use std::collections::HashSet;

use super::{cell, column_count, is_forbidden, PairingAlgorithm};

/// Greedy pairing (O(M*N)): each row in order takes its highest-scoring unused
/// column. Not optimal, but never reuses a row or column.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyPairing;

impl PairingAlgorithm for GreedyPairing {
    fn assign(&self, scores: &[Vec<f64>]) -> Vec<(usize, usize)> {
        let cols = column_count(scores);
        let mut used_cols = HashSet::new();
        let mut pairs = Vec::new();

        for row in 0..scores.len() {
            let mut best: Option<(usize, f64)> = None;
            for col in 0..cols {
                if used_cols.contains(&col) {
                    continue;
                }
                let score = cell(scores, row, col);
                if is_forbidden(score) {
                    continue;
                }
                // Strict comparison keeps the lowest column on ties.
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((col, score));
                }
            }
            if let Some((col, _)) = best {
                used_cols.insert(col);
                pairs.push((row, col));
            }
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::FORBIDDEN;

    #[test]
    fn takes_best_unused_column_row_by_row() {
        let scores = vec![vec![9.0, 8.0], vec![7.0, 1.0]];
        assert_eq!(GreedyPairing.assign(&scores), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn skips_forbidden_cells_and_exhausted_columns() {
        let scores = vec![vec![FORBIDDEN, 2.0], vec![3.0, 1.0], vec![4.0, 4.0]];
        assert_eq!(GreedyPairing.assign(&scores), vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn ties_resolve_to_lowest_column() {
        let scores = vec![vec![1.0, 1.0, 1.0]];
        assert_eq!(GreedyPairing.assign(&scores), vec![(0, 0)]);
    }
}
