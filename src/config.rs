//! Configuration parameters for the tour planner.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::PlannerResult;
use crate::graph::DEFAULT_COVERAGE_RADIUS_M;

/// Strategy used to build the first tour before local search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ConstructionStrategy {
    /// Insert the waypoint with the smallest marginal detour, anywhere in the tour.
    CheapestInsertion,
    /// Extend the path from its last stop along the cheapest outgoing arc.
    PathCheapestArc,
}

/// Configuration settings for the tour planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial tour construction
    pub construction: ConstructionStrategy,
    /// Consecutive perturbation rounds without improvement before stopping
    pub max_iterations_without_improvement: u32,
    /// Upper bound on neighborhood passes in one local search run
    pub max_local_search_passes: usize,
    /// Optional time limit for the tour search
    pub time_limit: Option<Duration>,
    /// Seed for move ordering and perturbation
    pub seed: u64,
    /// Longest segment moved by or-opt
    pub or_opt_max_segment: usize,
    /// Compute distance matrix rows on the rayon pool
    pub parallel_matrix: bool,
    /// Evaluate 2-opt candidates on the rayon pool
    pub parallel_move_evaluation: bool,
    /// Maximum distance between a waypoint and its snapped road node
    pub coverage_radius_m: f64,
    /// Radius of road network requested around the waypoint center
    pub network_radius_m: f64,
    /// Allowed gap between the assembled route length and the matrix tour cost
    pub consistency_tolerance_m: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            construction: ConstructionStrategy::CheapestInsertion,
            max_iterations_without_improvement: 100,
            max_local_search_passes: 1000,
            time_limit: None,
            seed: 42,
            or_opt_max_segment: 3,
            parallel_matrix: true,
            parallel_move_evaluation: false,
            coverage_radius_m: DEFAULT_COVERAGE_RADIUS_M,
            network_radius_m: 8_000.0,
            consistency_tolerance_m: 1.0,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> PlannerResult<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Set the construction strategy.
    pub fn with_construction(mut self, strategy: ConstructionStrategy) -> Self {
        self.construction = strategy;
        self
    }

    /// Set the maximum iterations without improvement.
    pub fn with_max_iterations_without_improvement(mut self, iterations: u32) -> Self {
        self.max_iterations_without_improvement = iterations;
        self
    }

    /// Set the local search pass budget.
    pub fn with_max_local_search_passes(mut self, passes: usize) -> Self {
        self.max_local_search_passes = passes;
        self
    }

    /// Set the time limit.
    pub fn with_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = Some(duration);
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the longest or-opt segment.
    pub fn with_or_opt_max_segment(mut self, length: usize) -> Self {
        self.or_opt_max_segment = length;
        self
    }

    /// Enable or disable the parallel distance matrix.
    pub fn with_parallel_matrix(mut self, parallel: bool) -> Self {
        self.parallel_matrix = parallel;
        self
    }

    /// Enable or disable parallel 2-opt evaluation.
    pub fn with_parallel_move_evaluation(mut self, parallel: bool) -> Self {
        self.parallel_move_evaluation = parallel;
        self
    }

    /// Set the snapping radius.
    pub fn with_coverage_radius(mut self, radius_m: f64) -> Self {
        self.coverage_radius_m = radius_m;
        self
    }

    /// Set the road network radius.
    pub fn with_network_radius(mut self, radius_m: f64) -> Self {
        self.network_radius_m = radius_m;
        self
    }

    /// Set the consistency tolerance.
    pub fn with_consistency_tolerance(mut self, tolerance_m: f64) -> Self {
        self.consistency_tolerance_m = tolerance_m;
        self
    }
}
