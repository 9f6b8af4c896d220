//! Closed-tour solver over an asymmetric distance matrix.
//!
//! A greedy construction seeds the search, local search drives it to a local
//! optimum, and seeded perturbation rounds try to escape it until the
//! iteration or time budget runs out.

use std::time::Instant;

use crate::config::Config;
use crate::construction;
use crate::error::{PlannerError, PlannerResult};
use crate::local_search::utils::sequence_cost;
use crate::local_search::LocalSearch;
use crate::matrix::DistanceMatrix;
use crate::tour::Tour;
use crate::utils::SearchStatistics;

/// Up to this many waypoints, start included, education alone reaches the
/// optimum and perturbation is skipped.
const MIN_PERTURBED_STOPS: usize = 4;

/// Solves the fixed-start closed tour for a distance matrix.
#[derive(Debug, Clone, Default)]
pub struct TourSolver {
    pub config: Config,
}

impl TourSolver {
    pub fn new(config: Config) -> Self {
        TourSolver { config }
    }

    /// Compute a minimum-cost tour that starts and ends at `start`.
    pub fn solve(&self, matrix: &DistanceMatrix, start: usize) -> PlannerResult<Tour> {
        self.solve_with_statistics(matrix, start)
            .map(|(tour, _)| tour)
    }

    /// Like [`solve`](Self::solve), also reporting how the search went.
    pub fn solve_with_statistics(
        &self,
        matrix: &DistanceMatrix,
        start: usize,
    ) -> PlannerResult<(Tour, SearchStatistics)> {
        let start_time = Instant::now();
        let size = matrix.size();

        if size == 0 {
            return Err(PlannerError::Infeasible(
                "distance matrix is empty".to_string(),
            ));
        }
        if start >= size {
            return Err(PlannerError::Infeasible(format!(
                "start index {} is out of range for {} waypoints",
                start, size
            )));
        }
        if size == 1 {
            let tour = Tour::trivial(start);
            let statistics = SearchStatistics {
                runtime: start_time.elapsed(),
                ..SearchStatistics::default()
            };
            return Ok((tour, statistics));
        }

        let deadline = self.config.time_limit.map(|limit| start_time + limit);

        // Initial tour
        let order = construction::construct(matrix, start, self.config.construction);
        let mut best = Tour::from_order(start, &order, size)?.stops().to_vec();
        let initial_cost = sequence_cost(&best, matrix);
        log::info!(
            "Initial tour ({:?}) over {} waypoints costs {} m",
            self.config.construction,
            size,
            initial_cost
        );

        let mut local_search = LocalSearch::new(&self.config);
        local_search.educate(&mut best, matrix, deadline);
        let mut best_cost = sequence_cost(&best, matrix);
        log::debug!("Local search improved the initial tour to {} m", best_cost);

        // Iterated local search
        let mut iterations = 0;
        let mut iterations_without_improvement = 0;
        if size > MIN_PERTURBED_STOPS {
            while !self.should_terminate(iterations_without_improvement, deadline) {
                let mut candidate = best.clone();
                local_search.perturb(&mut candidate);
                local_search.educate(&mut candidate, matrix, deadline);

                let cost = sequence_cost(&candidate, matrix);
                iterations += 1;

                if cost < best_cost {
                    log::debug!("Iteration {}: new best tour {} m", iterations, cost);
                    best = candidate;
                    best_cost = cost;
                    iterations_without_improvement = 0;
                } else {
                    iterations_without_improvement += 1;
                }
            }
        }

        let tour = Tour::from_stops(best, size)?;
        let statistics = SearchStatistics {
            iterations,
            improving_moves: local_search.moves_applied,
            runtime: start_time.elapsed(),
            initial_cost: initial_cost as u64,
            best_cost: tour.cost(matrix),
        };

        log::info!(
            "Tour solved: {} m after {} iterations ({} improving moves)",
            statistics.best_cost,
            statistics.iterations,
            statistics.improving_moves
        );

        Ok((tour, statistics))
    }

    /// Check if the termination criteria are met.
    fn should_terminate(&self, iterations_without_improvement: u32, deadline: Option<Instant>) -> bool {
        // Terminate if we've reached max iterations without improvement
        if iterations_without_improvement >= self.config.max_iterations_without_improvement {
            return true;
        }

        // Terminate if we've reached the time limit
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return true;
            }
        }

        false
    }
}

/// Solve with the default configuration.
pub fn solve(matrix: &DistanceMatrix, start: usize) -> PlannerResult<Tour> {
    TourSolver::default().solve(matrix, start)
}
