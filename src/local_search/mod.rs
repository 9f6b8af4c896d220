//! Local search operators for the tour solver.
//!
//! All neighborhoods operate on the closed stop sequence `[start, .., start]`
//! and never move the first or last entry.

pub mod or_opt;
pub mod swap;
pub mod two_opt;
pub mod utils;

use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

use crate::config::Config;
use crate::matrix::DistanceMatrix;

/// Tours with fewer interior stops get a segment reversal instead of a double bridge.
const DOUBLE_BRIDGE_MIN_STOPS: usize = 8;

/// Manages the local search phase of the tour solver.
pub struct LocalSearch {
    /// Longest segment relocated by or-opt
    pub or_opt_max_segment: usize,
    /// Upper bound on neighborhood passes per run
    pub max_passes: usize,
    /// Evaluate 2-opt candidates on the rayon pool
    pub parallel_evaluation: bool,
    /// Improving moves applied so far
    pub moves_applied: usize,
    /// Seeded generator for move ordering and perturbation
    rng: ChaCha8Rng,
}

impl LocalSearch {
    /// Create a new local search instance.
    pub fn new(config: &Config) -> Self {
        LocalSearch {
            or_opt_max_segment: config.or_opt_max_segment,
            max_passes: config.max_local_search_passes,
            parallel_evaluation: config.parallel_move_evaluation,
            moves_applied: 0,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }

    /// Run local search until no neighborhood improves the tour, the pass
    /// budget is spent, or `deadline` passes.
    ///
    /// Returns `true` if the sequence was improved.
    pub fn educate(
        &mut self,
        sequence: &mut Vec<usize>,
        matrix: &DistanceMatrix,
        deadline: Option<Instant>,
    ) -> bool {
        let mut improved = false;
        let mut passes = 0;

        // Main local search loop
        let mut improvement = true;
        while improvement && passes < self.max_passes {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                log::debug!("Local search stopped by deadline after {} passes", passes);
                break;
            }
            improvement = false;

            // Try all neighborhoods
            improvement |= self.or_opt_neighborhood(sequence, matrix);
            improvement |= self.swap_neighborhood(sequence, matrix);
            improvement |= self.two_opt_neighborhood(sequence, matrix);

            improved |= improvement;
            passes += 1;
        }

        improved
    }

    /// Kick the sequence out of its local optimum.
    ///
    /// Long tours get a double bridge (interior `A B C D` becomes `A C B D`),
    /// shorter ones a random segment reversal.
    pub fn perturb(&mut self, sequence: &mut Vec<usize>) {
        let n = sequence.len();
        let interior = n.saturating_sub(2);
        if interior < 2 {
            return;
        }

        if interior >= DOUBLE_BRIDGE_MIN_STOPS {
            let mut cuts = sample(&mut self.rng, interior - 1, 3).into_vec();
            cuts.sort_unstable();
            let (a, b, c) = (cuts[0] + 2, cuts[1] + 2, cuts[2] + 2);

            let mut bridged = Vec::with_capacity(n);
            bridged.extend_from_slice(&sequence[..a]);
            bridged.extend_from_slice(&sequence[b..c]);
            bridged.extend_from_slice(&sequence[a..b]);
            bridged.extend_from_slice(&sequence[c..]);
            *sequence = bridged;
        } else {
            let i = self.rng.gen_range(1..n - 2);
            let j = self.rng.gen_range(i + 1..n - 1);
            sequence[i..=j].reverse();
        }
    }
}
