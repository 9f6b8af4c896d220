//! Or-opt neighborhood: move a short run of stops elsewhere in the tour.

use rand::seq::SliceRandom;

use crate::matrix::DistanceMatrix;

use super::utils::arc;
use super::LocalSearch;

impl LocalSearch {
    /// Implement the Or-opt neighborhood (first improvement).
    pub fn or_opt_neighborhood(&mut self, sequence: &mut Vec<usize>, matrix: &DistanceMatrix) -> bool {
        let n = sequence.len();
        let interior = n.saturating_sub(2);
        if interior < 2 {
            return false;
        }

        let max_len = self.or_opt_max_segment.min(interior - 1);
        let mut starts: Vec<usize> = (1..=interior).collect();
        starts.shuffle(&mut self.rng);

        for len in 1..=max_len {
            for &i in &starts {
                if i + len > n - 1 {
                    continue;
                }

                // Arcs (p, p + 1) touching the segment would reinsert it in place
                for p in (0..n - 1).filter(|&p| p + 1 < i || p >= i + len) {
                    let delta = evaluate_or_opt(sequence, matrix, i, len, p);

                    if delta < 0 {
                        apply_or_opt(sequence, i, len, p);
                        self.moves_applied += 1;
                        log::trace!(
                            "or-opt moved {} stop(s) from position {} after position {} (delta {})",
                            len,
                            i,
                            p,
                            delta
                        );
                        return true;
                    }
                }
            }
        }

        false
    }
}

/// Cost change of moving `sequence[i..i + len]` between positions `p` and `p + 1`.
pub fn evaluate_or_opt(
    sequence: &[usize],
    matrix: &DistanceMatrix,
    i: usize,
    len: usize,
    p: usize,
) -> i64 {
    let prev = sequence[i - 1];
    let first = sequence[i];
    let last = sequence[i + len - 1];
    let next = sequence[i + len];

    let removal = arc(matrix, prev, next) - arc(matrix, prev, first) - arc(matrix, last, next);

    let (a, b) = (sequence[p], sequence[p + 1]);
    let insertion = arc(matrix, a, first) + arc(matrix, last, b) - arc(matrix, a, b);

    removal + insertion
}

/// Move `sequence[i..i + len]` between the stops at positions `p` and `p + 1`.
pub fn apply_or_opt(sequence: &mut Vec<usize>, i: usize, len: usize, p: usize) {
    let segment: Vec<usize> = sequence.drain(i..i + len).collect();
    let insert_at = if p < i { p + 1 } else { p + 1 - len };
    sequence.splice(insert_at..insert_at, segment);
}
