//! 2-Opt neighborhood: reverse a run of consecutive stops.

use rayon::prelude::*;

use crate::matrix::DistanceMatrix;

use super::utils::{arc, path_cost, reversed_path_cost};
use super::LocalSearch;

impl LocalSearch {
    /// Apply the best improving segment reversal, if any.
    ///
    /// Every candidate is evaluated (optionally in parallel) and the single
    /// best move is applied: lowest delta, then lowest positions.
    pub fn two_opt_neighborhood(&mut self, sequence: &mut [usize], matrix: &DistanceMatrix) -> bool {
        let n = sequence.len();
        if n < 4 {
            // Need at least two interior stops to reverse
            return false;
        }

        let candidates: Vec<(usize, usize)> = (1..n - 2)
            .flat_map(|i| (i + 1..n - 1).map(move |j| (i, j)))
            .collect();

        let view: &[usize] = sequence;
        let evaluate = |&(i, j): &(usize, usize)| {
            let delta = evaluate_two_opt(view, matrix, i, j);
            (delta < 0).then_some((delta, i, j))
        };

        let best = if self.parallel_evaluation {
            candidates.par_iter().filter_map(evaluate).min()
        } else {
            candidates.iter().filter_map(evaluate).min()
        };

        match best {
            Some((delta, i, j)) => {
                sequence[i..=j].reverse();
                self.moves_applied += 1;
                log::trace!("2-opt reversed positions {}..={} (delta {})", i, j, delta);
                true
            }
            None => false,
        }
    }
}

/// Cost change of reversing `sequence[i..=j]`, with direction-aware arc costs.
pub fn evaluate_two_opt(sequence: &[usize], matrix: &DistanceMatrix, i: usize, j: usize) -> i64 {
    let before = arc(matrix, sequence[i - 1], sequence[i])
        + path_cost(sequence, i, j, matrix)
        + arc(matrix, sequence[j], sequence[j + 1]);

    let after = arc(matrix, sequence[i - 1], sequence[j])
        + reversed_path_cost(sequence, i, j, matrix)
        + arc(matrix, sequence[i], sequence[j + 1]);

    after - before
}
