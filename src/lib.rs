//! # road_tour
//!
//! Closed-tour planning over a road network.
//!
//! Waypoints are snapped to a directed road graph, a pairwise shortest-path
//! distance matrix is built, a fixed-start tour is solved over it, and the
//! per-leg shortest paths are stitched into one concrete route.
//!
//! ```
//! use road_tour::config::Config;
//! use road_tour::graph::RoadNetworkBuilder;
//! use road_tour::problem::{Coordinate, Problem, Waypoint};
//! use road_tour::TourPlanner;
//!
//! let mut b = RoadNetworkBuilder::new();
//! let a = b.add_node(1, Coordinate::new(0.0, 0.0));
//! let c = b.add_node(2, Coordinate::new(0.0, 0.001));
//! b.add_road(a, c, 111.0).unwrap();
//! let network = b.build();
//!
//! let problem = Problem::new(
//!     "pair",
//!     vec![Waypoint::new("home", 0.0, 0.0), Waypoint::new("shop", 0.0, 0.001)],
//! )
//! .unwrap();
//!
//! let plan = TourPlanner::new(Config::default()).plan(&problem, &network).unwrap();
//! assert_eq!(plan.tour.stops(), &[0, 1, 0]);
//! assert_eq!(plan.route.total_distance_m, 222.0);
//! ```

pub mod assembler;
pub mod config;
pub mod construction;
pub mod error;
pub mod geocode;
pub mod graph;
pub mod local_search;
pub mod matrix;
pub mod network_source;
pub mod problem;
pub mod solver;
pub mod tour;
pub mod utils;

use crate::assembler::{AssembledRoute, ConsistencyCheck};
use crate::config::Config;
use crate::error::PlannerResult;
use crate::graph::{GraphAccessor, GraphNode, RoadNetwork};
use crate::matrix::DistanceMatrix;
use crate::network_source::NetworkSource;
use crate::problem::{Problem, START_INDEX};
use crate::solver::TourSolver;
use crate::tour::Tour;
use crate::utils::{SearchStatistics, TourStop};

use std::time::Instant;

/// Everything the pipeline produced for one problem.
#[derive(Debug, Clone)]
pub struct PlannedTour {
    pub tour: Tour,
    pub matrix: DistanceMatrix,
    /// Snapped graph node of every waypoint, indexed by waypoint
    pub nodes: Vec<GraphNode>,
    pub route: AssembledRoute,
    pub consistency: ConsistencyCheck,
    pub statistics: SearchStatistics,
}

impl PlannedTour {
    /// The tour stops in visiting order, with their labels and coordinates.
    pub fn stops(&self, problem: &Problem) -> Vec<TourStop> {
        self.tour
            .stops()
            .iter()
            .enumerate()
            .filter_map(|(position, &index)| {
                problem.waypoints.get(index).map(|waypoint| TourStop {
                    position,
                    waypoint_index: index,
                    label: waypoint.label.clone(),
                    coordinate: waypoint.coordinate,
                })
            })
            .collect()
    }
}

/// The main structure that runs the planning pipeline.
#[derive(Debug, Clone, Default)]
pub struct TourPlanner {
    pub config: Config,
}

impl TourPlanner {
    /// Create a new planner with the given configuration.
    pub fn new(config: Config) -> Self {
        TourPlanner { config }
    }

    /// Fetch the road network around the problem's waypoints.
    pub fn fetch_network<S: NetworkSource>(
        &self,
        problem: &Problem,
        source: &S,
    ) -> PlannerResult<RoadNetwork> {
        let network = source.fetch(problem.center(), self.config.network_radius_m)?;
        Ok(network.with_coverage_radius(self.config.coverage_radius_m))
    }

    /// Run matrix construction, tour solving and route assembly.
    pub fn plan<G: GraphAccessor>(&self, problem: &Problem, accessor: &G) -> PlannerResult<PlannedTour> {
        let start_time = Instant::now();
        log::info!(
            "Planning tour '{}' over {} waypoints",
            problem.name,
            problem.waypoint_count()
        );

        let (matrix, nodes) =
            matrix::build(&problem.waypoints, accessor, self.config.parallel_matrix)?;

        let solver = TourSolver::new(self.config.clone());
        let (tour, statistics) = solver.solve_with_statistics(&matrix, START_INDEX)?;

        let route = assembler::assemble(&tour, &nodes, accessor)?;
        let consistency = assembler::verify_consistency(
            &route,
            &tour,
            &matrix,
            self.config.consistency_tolerance_m,
        );

        log::info!(
            "Planned tour '{}': {:.3} km in {} ms",
            problem.name,
            route.total_distance_km(),
            start_time.elapsed().as_millis()
        );

        Ok(PlannedTour {
            tour,
            matrix,
            nodes,
            route,
            consistency,
            statistics,
        })
    }
}
