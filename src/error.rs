//! Error types for the graph layer and the planning pipeline.

use std::fmt;

use thiserror::Error;

use crate::graph::GraphNode;
use crate::problem::Coordinate;

/// Errors produced by road network queries and construction.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("no path from {from} to {to}")]
    Unreachable { from: GraphNode, to: GraphNode },

    #[error("node {0} not found in network")]
    NodeNotFound(GraphNode),

    #[error("no edge from {from} to {to}")]
    MissingEdge { from: GraphNode, to: GraphNode },

    #[error("road network has no nodes")]
    EmptyNetwork,

    #[error(
        "nearest node {nearest} is {distance_m:.0} m away from {coordinate}, beyond the {limit_m:.0} m coverage radius"
    )]
    OutOfCoverage {
        coordinate: Coordinate,
        nearest: GraphNode,
        distance_m: f64,
        limit_m: f64,
    },

    #[error("edge {from} -> {to} has invalid length {length_m}")]
    InvalidEdge {
        from: GraphNode,
        to: GraphNode,
        length_m: f64,
    },

    #[error("snapshot edge references unknown node id {0}")]
    UnknownSnapshotNode(i64),
}

/// A waypoint pair with no road connection, by waypoint index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnreachablePair {
    pub from: usize,
    pub to: usize,
}

impl fmt::Display for UnreachablePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Errors produced by the planning pipeline.
///
/// Every variant is fatal: the pipeline aborts and returns no partial result.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("geocoding failed for {address:?}: {reason}")]
    Geocode { address: String, reason: String },

    #[error("waypoint {index} ({label}) is not covered by the road network: {source}")]
    Coverage {
        index: usize,
        label: String,
        #[source]
        source: GraphError,
    },

    #[error("routing infeasible, no road path for waypoint pair(s): {}", join_pairs(.pairs))]
    RoutingInfeasible { pairs: Vec<UnreachablePair> },

    #[error("no closed tour could be constructed: {0}")]
    Infeasible(String),

    #[error("invalid problem: {0}")]
    InvalidProblem(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlannerError {
    /// The pipeline stage that failed, for user-facing messages.
    pub fn stage(&self) -> &'static str {
        match self {
            PlannerError::Geocode { .. } => "geocoding",
            PlannerError::Coverage { .. } => "coverage",
            PlannerError::RoutingInfeasible { .. } => "distance matrix",
            PlannerError::Infeasible(_) => "tour solver",
            PlannerError::InvalidProblem(_) | PlannerError::Io(_) | PlannerError::Json(_) => {
                "input"
            }
            PlannerError::Graph(_) => "graph",
        }
    }
}

fn join_pairs(pairs: &[UnreachablePair]) -> String {
    pairs
        .iter()
        .map(|pair| pair.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type PlannerResult<T> = Result<T, PlannerError>;
