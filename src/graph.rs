//! Road network representation and the [`GraphAccessor`] query interface.
//!
//! The network is a directed petgraph [`DiGraph`] whose edge weights are
//! lengths in meters. Two-way roads are stored as a pair of directed edges,
//! and parallel edges between the same pair of nodes are allowed.
//!
//! Nearest-node lookups go through an R-tree over node positions projected
//! with a local equirectangular scale (`lon * cos(reference latitude)`), which
//! keeps the metric close to ground distance at city scale.

use petgraph::algo::astar;
use petgraph::graph::{DiGraph, NodeIndex};
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GraphError;
use crate::problem::Coordinate;

/// Default bound for snapping a coordinate to its nearest node.
pub const DEFAULT_COVERAGE_RADIUS_M: f64 = 1_000.0;

/// Opaque identifier of a node in a [`RoadNetwork`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphNode(pub u32);

impl GraphNode {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    fn node_index(self) -> NodeIndex {
        NodeIndex::new(self.index())
    }
}

impl From<NodeIndex> for GraphNode {
    fn from(index: NodeIndex) -> Self {
        GraphNode(index.index() as u32)
    }
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only shortest-path queries against a fixed road network snapshot.
///
/// Implementations must be `Send + Sync`: the distance matrix builder shares
/// one accessor across rayon workers.
pub trait GraphAccessor: Send + Sync {
    /// The node closest to `coordinate`.
    fn nearest_node(&self, coordinate: Coordinate) -> Result<GraphNode, GraphError>;

    /// Shortest-path length from `from` to `to`, rounded to whole meters.
    fn shortest_distance(&self, from: GraphNode, to: GraphNode) -> Result<u64, GraphError>;

    /// Node sequence of a shortest path, both endpoints included.
    ///
    /// Repeated queries for the same pair return the same sequence.
    fn shortest_path(&self, from: GraphNode, to: GraphNode) -> Result<Vec<GraphNode>, GraphError>;

    /// Length of the edge `from -> to`, taking the shortest of any parallel edges.
    fn edge_length(&self, from: GraphNode, to: GraphNode) -> Result<f64, GraphError>;

    /// Geographic position of a node.
    fn node_coordinate(&self, node: GraphNode) -> Result<Coordinate, GraphError>;
}

#[derive(Debug, Clone)]
struct NodeData {
    /// Identifier from the source data (e.g. an OSM node id).
    external_id: i64,
    coordinate: Coordinate,
}

#[derive(Debug, Clone)]
struct EdgeData {
    length_m: f64,
}

/// R-tree entry: projected `[lat, lon * lon_scale]` point plus its node.
#[derive(Debug, Clone)]
struct NodeEntry {
    point: [f64; 2],
    node: GraphNode,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let d_lat = self.point[0] - point[0];
        let d_lon = self.point[1] - point[1];
        d_lat * d_lat + d_lon * d_lon
    }
}

/// Directed road graph plus a spatial index for node snapping.
///
/// Construct with [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    graph: DiGraph<NodeData, EdgeData>,
    spatial_idx: RTree<NodeEntry>,
    lon_scale: f64,
    coverage_radius_m: f64,
}

impl RoadNetwork {
    /// A network with no nodes. Every snap against it fails.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Set the maximum snapping distance used by [`GraphAccessor::nearest_node`].
    pub fn with_coverage_radius(mut self, radius_m: f64) -> Self {
        self.coverage_radius_m = radius_m;
        self
    }

    pub fn coverage_radius_m(&self) -> f64 {
        self.coverage_radius_m
    }

    /// Identifier the node carried in the source data.
    pub fn external_id(&self, node: GraphNode) -> Result<i64, GraphError> {
        self.node_data(node).map(|data| data.external_id)
    }

    /// Shortest path together with its unrounded length in meters.
    pub fn shortest_path_with_length(
        &self,
        from: GraphNode,
        to: GraphNode,
    ) -> Result<(f64, Vec<GraphNode>), GraphError> {
        self.node_data(from)?;
        self.node_data(to)?;

        let goal = to.node_index();
        astar(
            &self.graph,
            from.node_index(),
            |n| n == goal,
            |e| e.weight().length_m,
            |_| 0.0,
        )
        .map(|(length, path)| (length, path.into_iter().map(GraphNode::from).collect()))
        .ok_or(GraphError::Unreachable { from, to })
    }

    fn node_data(&self, node: GraphNode) -> Result<&NodeData, GraphError> {
        self.graph
            .node_weight(node.node_index())
            .ok_or(GraphError::NodeNotFound(node))
    }

    fn project(&self, coordinate: Coordinate) -> [f64; 2] {
        [coordinate.lat, coordinate.lon * self.lon_scale]
    }
}

impl fmt::Debug for RoadNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoadNetwork")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .field("coverage_radius_m", &self.coverage_radius_m)
            .finish()
    }
}

impl GraphAccessor for RoadNetwork {
    fn nearest_node(&self, coordinate: Coordinate) -> Result<GraphNode, GraphError> {
        let entry = self
            .spatial_idx
            .nearest_neighbor(&self.project(coordinate))
            .ok_or(GraphError::EmptyNetwork)?;

        let distance_m = coordinate.distance_m(&self.node_data(entry.node)?.coordinate);
        if distance_m > self.coverage_radius_m {
            return Err(GraphError::OutOfCoverage {
                coordinate,
                nearest: entry.node,
                distance_m,
                limit_m: self.coverage_radius_m,
            });
        }

        Ok(entry.node)
    }

    fn shortest_distance(&self, from: GraphNode, to: GraphNode) -> Result<u64, GraphError> {
        let (length, _) = self.shortest_path_with_length(from, to)?;
        Ok(length.round() as u64)
    }

    fn shortest_path(&self, from: GraphNode, to: GraphNode) -> Result<Vec<GraphNode>, GraphError> {
        self.shortest_path_with_length(from, to).map(|(_, path)| path)
    }

    fn edge_length(&self, from: GraphNode, to: GraphNode) -> Result<f64, GraphError> {
        self.graph
            .edges_connecting(from.node_index(), to.node_index())
            .map(|e| e.weight().length_m)
            .min_by(|a, b| a.total_cmp(b))
            .ok_or(GraphError::MissingEdge { from, to })
    }

    fn node_coordinate(&self, node: GraphNode) -> Result<Coordinate, GraphError> {
        self.node_data(node).map(|data| data.coordinate)
    }
}

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use road_tour::graph::{GraphAccessor, RoadNetworkBuilder};
/// use road_tour::problem::Coordinate;
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(1, Coordinate::new(-23.56, -46.65));
/// let c = b.add_node(2, Coordinate::new(-23.55, -46.64));
/// b.add_road(a, c, 1_450.0).unwrap();
/// let net = b.build();
/// assert_eq!(net.edge_count(), 2); // both directions
/// assert_eq!(net.shortest_distance(a, c).unwrap(), 1_450);
/// ```
#[derive(Debug, Default)]
pub struct RoadNetworkBuilder {
    graph: DiGraph<NodeData, EdgeData>,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        RoadNetworkBuilder {
            graph: DiGraph::new(),
        }
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        RoadNetworkBuilder {
            graph: DiGraph::with_capacity(nodes, edges),
        }
    }

    /// Add a node and return its handle (sequential from 0).
    pub fn add_node(&mut self, external_id: i64, coordinate: Coordinate) -> GraphNode {
        GraphNode::from(self.graph.add_node(NodeData {
            external_id,
            coordinate,
        }))
    }

    /// Add a one-way edge. Lengths must be finite and non-negative.
    pub fn add_directed_edge(
        &mut self,
        from: GraphNode,
        to: GraphNode,
        length_m: f64,
    ) -> Result<(), GraphError> {
        if !length_m.is_finite() || length_m < 0.0 {
            return Err(GraphError::InvalidEdge { from, to, length_m });
        }
        for node in [from, to] {
            if node.index() >= self.graph.node_count() {
                return Err(GraphError::NodeNotFound(node));
            }
        }

        self.graph
            .add_edge(from.node_index(), to.node_index(), EdgeData { length_m });
        Ok(())
    }

    /// Add edges in both directions for a two-way road segment.
    pub fn add_road(&mut self, a: GraphNode, b: GraphNode, length_m: f64) -> Result<(), GraphError> {
        self.add_directed_edge(a, b, length_m)?;
        self.add_directed_edge(b, a, length_m)
    }

    /// Position of a node added earlier.
    pub fn node_coordinate(&self, node: GraphNode) -> Option<Coordinate> {
        self.graph
            .node_weight(node.node_index())
            .map(|data| data.coordinate)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Consume the builder and bulk-load the spatial index.
    pub fn build(self) -> RoadNetwork {
        let node_count = self.graph.node_count();
        let lon_scale = if node_count == 0 {
            1.0
        } else {
            let mean_lat = self
                .graph
                .raw_nodes()
                .iter()
                .map(|node| node.weight.coordinate.lat)
                .sum::<f64>()
                / node_count as f64;
            mean_lat.to_radians().cos()
        };

        let entries: Vec<NodeEntry> = self
            .graph
            .node_indices()
            .map(|index| {
                let coordinate = self.graph[index].coordinate;
                NodeEntry {
                    point: [coordinate.lat, coordinate.lon * lon_scale],
                    node: GraphNode::from(index),
                }
            })
            .collect();

        log::debug!(
            "Built road network with {} nodes and {} edges",
            node_count,
            self.graph.edge_count()
        );

        RoadNetwork {
            graph: self.graph,
            spatial_idx: RTree::bulk_load(entries),
            lon_scale,
            coverage_radius_m: DEFAULT_COVERAGE_RADIUS_M,
        }
    }
}
