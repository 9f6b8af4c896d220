//! Road network acquisition.
//!
//! The planner asks a [`NetworkSource`] for the roads around the waypoints.
//! [`SnapshotSource`] serves them from a JSON export of a road network,
//! keeping only the nodes within the requested radius.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{GraphError, PlannerResult};
use crate::graph::{GraphNode, RoadNetwork, RoadNetworkBuilder};
use crate::problem::Coordinate;

/// Supplies the road network around a center point.
pub trait NetworkSource {
    fn fetch(&self, center: Coordinate, radius_m: f64) -> PlannerResult<RoadNetwork>;
}

/// A node of a network snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}

/// A road segment of a network snapshot, referencing nodes by `id`.
///
/// Without `length_m` the great-circle distance between the endpoints is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEdge {
    pub from: i64,
    pub to: i64,
    #[serde(default)]
    pub length_m: Option<f64>,
    #[serde(default)]
    pub oneway: bool,
}

/// Serialized road network.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub nodes: Vec<SnapshotNode>,
    pub edges: Vec<SnapshotEdge>,
}

impl NetworkSnapshot {
    /// Load a snapshot from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> PlannerResult<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Save the snapshot as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> PlannerResult<()> {
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }
}

/// [`NetworkSource`] backed by an in-memory [`NetworkSnapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    snapshot: NetworkSnapshot,
}

impl SnapshotSource {
    pub fn new(snapshot: NetworkSnapshot) -> Self {
        SnapshotSource { snapshot }
    }

    /// Load the snapshot behind this source from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> PlannerResult<Self> {
        NetworkSnapshot::from_file(path).map(SnapshotSource::new)
    }

    pub fn snapshot(&self) -> &NetworkSnapshot {
        &self.snapshot
    }
}

impl NetworkSource for SnapshotSource {
    fn fetch(&self, center: Coordinate, radius_m: f64) -> PlannerResult<RoadNetwork> {
        let snapshot = &self.snapshot;

        let positions: HashMap<i64, Coordinate> = snapshot
            .nodes
            .iter()
            .map(|node| (node.id, Coordinate::new(node.lat, node.lon)))
            .collect();

        let mut builder =
            RoadNetworkBuilder::with_capacity(snapshot.nodes.len(), snapshot.edges.len() * 2);
        let mut handles: HashMap<i64, GraphNode> = HashMap::new();

        for node in &snapshot.nodes {
            let coordinate = positions[&node.id];
            if center.distance_m(&coordinate) <= radius_m && !handles.contains_key(&node.id) {
                handles.insert(node.id, builder.add_node(node.id, coordinate));
            }
        }

        let mut outside = 0;
        for edge in &snapshot.edges {
            let from_pos = positions
                .get(&edge.from)
                .ok_or(GraphError::UnknownSnapshotNode(edge.from))?;
            let to_pos = positions
                .get(&edge.to)
                .ok_or(GraphError::UnknownSnapshotNode(edge.to))?;

            let (Some(&from), Some(&to)) = (handles.get(&edge.from), handles.get(&edge.to)) else {
                outside += 1;
                continue;
            };

            let length_m = edge.length_m.unwrap_or_else(|| from_pos.distance_m(to_pos));
            if edge.oneway {
                builder.add_directed_edge(from, to, length_m)?;
            } else {
                builder.add_road(from, to, length_m)?;
            }
        }

        log::info!(
            "Loaded road network within {:.0} m of {}: {} nodes, {} edges ({} segments outside the radius)",
            radius_m,
            center,
            builder.node_count(),
            builder.edge_count(),
            outside
        );

        Ok(builder.build())
    }
}
