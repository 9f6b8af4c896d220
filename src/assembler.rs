//! Route assembly: stitch per-leg shortest paths into one node sequence.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};
use crate::graph::{GraphAccessor, GraphNode};
use crate::matrix::DistanceMatrix;
use crate::problem::Coordinate;
use crate::tour::Tour;

/// Matrix cells are rounded to whole meters, so each leg may drift by this much.
const ROUNDING_SLACK_PER_LEG_M: f64 = 0.5;

/// The concrete road route of a tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledRoute {
    /// Every graph node driven through, junctions listed once
    pub nodes: Vec<GraphNode>,
    /// Index into `nodes` of each tour stop, in visiting order
    pub stop_positions: Vec<usize>,
    /// Length recomputed from the edges of `nodes`
    pub total_distance_m: f64,
}

impl AssembledRoute {
    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_m / 1000.0
    }

    /// Coordinates of every node on the route, for rendering.
    pub fn coordinates<G: GraphAccessor>(&self, accessor: &G) -> PlannerResult<Vec<Coordinate>> {
        self.nodes
            .iter()
            .map(|&node| accessor.node_coordinate(node).map_err(PlannerError::from))
            .collect()
    }
}

/// Concatenate the shortest paths of every tour leg.
///
/// `nodes` maps each waypoint index to its snapped graph node. When a leg
/// starts at the node the route currently ends on, that node is not repeated.
pub fn assemble<G: GraphAccessor>(
    tour: &Tour,
    nodes: &[GraphNode],
    accessor: &G,
) -> PlannerResult<AssembledRoute> {
    let node_of = |waypoint: usize| {
        nodes.get(waypoint).copied().ok_or_else(|| {
            PlannerError::InvalidProblem(format!("waypoint {} has no snapped node", waypoint))
        })
    };

    let mut route = vec![node_of(tour.start())?];
    let mut stop_positions = vec![0];

    for (from, to) in tour.legs() {
        let path = accessor.shortest_path(node_of(from)?, node_of(to)?)?;
        log::debug!("Leg {} -> {}: {} node(s)", from, to, path.len());

        let mut leg = path.into_iter().peekable();
        if leg.peek() == route.last() {
            leg.next();
        }
        route.extend(leg);
        stop_positions.push(route.len() - 1);
    }

    let total_distance_m = route
        .iter()
        .tuple_windows()
        .map(|(&a, &b)| accessor.edge_length(a, b))
        .sum::<Result<f64, _>>()?;

    log::info!(
        "Assembled route: {} nodes, {:.1} m",
        route.len(),
        total_distance_m
    );

    Ok(AssembledRoute {
        nodes: route,
        stop_positions,
        total_distance_m,
    })
}

/// Outcome of comparing the assembled route length against the matrix tour cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyCheck {
    pub matrix_cost: u64,
    pub recomputed_m: f64,
    /// Configured tolerance, before the per-leg rounding slack
    pub tolerance_m: f64,
    /// Largest gap accepted as consistent
    pub allowed_gap_m: f64,
    pub consistent: bool,
}

/// Check that the route length agrees with the matrix cost of `tour`.
///
/// A mismatch is logged, never raised.
pub fn verify_consistency(
    route: &AssembledRoute,
    tour: &Tour,
    matrix: &DistanceMatrix,
    tolerance_m: f64,
) -> ConsistencyCheck {
    let matrix_cost = tour.cost(matrix);
    let legs = tour.legs().count() as f64;
    let allowed_gap_m = tolerance_m + ROUNDING_SLACK_PER_LEG_M * legs;
    let gap = (route.total_distance_m - matrix_cost as f64).abs();
    let consistent = gap <= allowed_gap_m;

    if !consistent {
        log::warn!(
            "Route length {:.1} m differs from matrix tour cost {} m by {:.1} m (allowed {:.1} m)",
            route.total_distance_m,
            matrix_cost,
            gap,
            allowed_gap_m
        );
    }

    ConsistencyCheck {
        matrix_cost,
        recomputed_m: route.total_distance_m,
        tolerance_m,
        allowed_gap_m,
        consistent,
    }
}
