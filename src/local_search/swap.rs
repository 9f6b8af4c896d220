//! Swap neighborhood for local search.

use rand::seq::SliceRandom;

use crate::matrix::DistanceMatrix;

use super::utils::arc;
use super::LocalSearch;

impl LocalSearch {
    /// Implement the Swap neighborhood (first improvement).
    pub fn swap_neighborhood(&mut self, sequence: &mut [usize], matrix: &DistanceMatrix) -> bool {
        let n = sequence.len();
        if n < 4 {
            return false;
        }

        let mut positions: Vec<usize> = (1..n - 1).collect();
        positions.shuffle(&mut self.rng);

        for &i in &positions {
            for j in i + 1..n - 1 {
                let delta = evaluate_swap(sequence, matrix, i, j);

                if delta < 0 {
                    sequence.swap(i, j);
                    self.moves_applied += 1;
                    log::trace!("swap exchanged positions {} and {} (delta {})", i, j, delta);
                    return true;
                }
            }
        }

        false
    }
}

/// Cost change of exchanging the stops at positions `i < j`.
///
/// Only the arcs leaving positions `i - 1`, `i`, `j - 1` and `j` change; for
/// adjacent positions some of them coincide.
pub fn evaluate_swap(sequence: &[usize], matrix: &DistanceMatrix, i: usize, j: usize) -> i64 {
    let mut arcs = [i - 1, i, j - 1, j];
    arcs.sort_unstable();

    let swapped = |k: usize| {
        if k == i {
            sequence[j]
        } else if k == j {
            sequence[i]
        } else {
            sequence[k]
        }
    };

    let mut delta = 0;
    let mut last = None;
    for &k in &arcs {
        if last == Some(k) {
            continue;
        }
        last = Some(k);
        delta += arc(matrix, swapped(k), swapped(k + 1)) - arc(matrix, sequence[k], sequence[k + 1]);
    }

    delta
}
