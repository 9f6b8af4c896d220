//! Pairwise road distances between waypoints.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, PlannerError, PlannerResult, UnreachablePair};
use crate::graph::{GraphAccessor, GraphNode};
use crate::problem::Waypoint;

/// Square matrix of shortest-path distances in meters, stored row-major.
///
/// `get(i, j)` is the distance from waypoint `i` to waypoint `j`. The diagonal
/// is zero and the matrix is not assumed to be symmetric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MatrixData")]
pub struct DistanceMatrix {
    size: usize,
    cells: Vec<u64>,
}

#[derive(Deserialize)]
struct MatrixData {
    size: usize,
    cells: Vec<u64>,
}

impl TryFrom<MatrixData> for DistanceMatrix {
    type Error = PlannerError;

    fn try_from(data: MatrixData) -> PlannerResult<Self> {
        if data.size.checked_mul(data.size) != Some(data.cells.len()) {
            return Err(PlannerError::InvalidProblem(format!(
                "distance matrix of size {} has {} cells",
                data.size,
                data.cells.len()
            )));
        }
        let rows = data.cells.chunks(data.size.max(1)).map(<[u64]>::to_vec).collect();
        DistanceMatrix::from_rows(rows)
    }
}

impl DistanceMatrix {
    /// Build a matrix from explicit rows.
    ///
    /// Rows must form a square with a zero diagonal.
    pub fn from_rows(rows: Vec<Vec<u64>>) -> PlannerResult<Self> {
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(PlannerError::InvalidProblem(format!(
                    "distance matrix row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    size
                )));
            }
            if row[i] != 0 {
                return Err(PlannerError::InvalidProblem(format!(
                    "distance matrix diagonal entry {} is {}, expected 0",
                    i, row[i]
                )));
            }
            cells.extend(row);
        }

        Ok(DistanceMatrix { size, cells })
    }

    /// Number of waypoints covered by the matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Distance from waypoint `from` to waypoint `to`.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> u64 {
        self.cells[from * self.size + to]
    }

    /// All distances leaving waypoint `from`.
    pub fn row(&self, from: usize) -> &[u64] {
        &self.cells[from * self.size..(from + 1) * self.size]
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| (i + 1..self.size).all(|j| self.get(i, j) == self.get(j, i)))
    }
}

/// Snap every waypoint to its nearest node and compute all pairwise distances.
///
/// Returns the matrix and the node each waypoint was snapped to, indexed by
/// waypoint. Unreachable pairs are collected over the whole matrix and
/// reported together as [`PlannerError::RoutingInfeasible`].
pub fn build<G: GraphAccessor>(
    waypoints: &[Waypoint],
    accessor: &G,
    parallel: bool,
) -> PlannerResult<(DistanceMatrix, Vec<GraphNode>)> {
    let nodes = snap_waypoints(waypoints, accessor)?;
    let size = nodes.len();

    log::info!(
        "Computing {}x{} distance matrix ({} shortest-path queries)",
        size,
        size,
        size * size.saturating_sub(1)
    );

    let row_for = |from: usize| compute_row(&nodes, from, accessor);
    let rows: Vec<RowResult> = if parallel {
        (0..size).into_par_iter().map(row_for).collect::<Result<Vec<_>, _>>()?
    } else {
        (0..size).map(row_for).collect::<Result<Vec<_>, _>>()?
    };

    let unreachable: Vec<UnreachablePair> = rows
        .iter()
        .flat_map(|row| row.unreachable.iter().copied())
        .collect();
    if !unreachable.is_empty() {
        log::error!("{} waypoint pair(s) have no road path", unreachable.len());
        return Err(PlannerError::RoutingInfeasible { pairs: unreachable });
    }

    let cells = rows.into_iter().flat_map(|row| row.distances).collect();
    Ok((DistanceMatrix { size, cells }, nodes))
}

/// Resolve the nearest node of every waypoint, once.
pub fn snap_waypoints<G: GraphAccessor>(
    waypoints: &[Waypoint],
    accessor: &G,
) -> PlannerResult<Vec<GraphNode>> {
    waypoints
        .iter()
        .enumerate()
        .map(|(index, waypoint)| {
            accessor
                .nearest_node(waypoint.coordinate)
                .map_err(|source| PlannerError::Coverage {
                    index,
                    label: waypoint.label.clone(),
                    source,
                })
        })
        .collect()
}

/// One matrix row plus the unreachable targets found while computing it.
struct RowResult {
    distances: Vec<u64>,
    unreachable: Vec<UnreachablePair>,
}

fn compute_row<G: GraphAccessor>(
    nodes: &[GraphNode],
    from: usize,
    accessor: &G,
) -> Result<RowResult, GraphError> {
    let mut distances = vec![0; nodes.len()];
    let mut unreachable = Vec::new();

    for (to, &target) in nodes.iter().enumerate() {
        if to == from {
            continue;
        }
        match accessor.shortest_distance(nodes[from], target) {
            Ok(distance) => distances[to] = distance,
            Err(GraphError::Unreachable { .. }) => {
                log::debug!("No road path from waypoint {} to waypoint {}", from, to);
                unreachable.push(UnreachablePair { from, to });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(RowResult {
        distances,
        unreachable,
    })
}
