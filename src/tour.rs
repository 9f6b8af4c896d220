//! Closed tour representation.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};
use crate::matrix::DistanceMatrix;

/// A closed tour over waypoint indices.
///
/// Holds `size + 1` stops: the start, every other waypoint exactly once, and
/// the start again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TourData")]
pub struct Tour {
    stops: Vec<usize>,
}

/// Unchecked serialized form of a [`Tour`].
#[derive(Deserialize)]
struct TourData {
    stops: Vec<usize>,
}

impl TryFrom<TourData> for Tour {
    type Error = PlannerError;

    fn try_from(data: TourData) -> PlannerResult<Self> {
        let size = data.stops.len().saturating_sub(1);
        Tour::from_stops(data.stops, size)
    }
}

impl Tour {
    /// The tour of a single waypoint: `[start, start]`.
    pub fn trivial(start: usize) -> Self {
        Tour {
            stops: vec![start, start],
        }
    }

    /// Create a tour from its full stop sequence, checking that it is a
    /// permutation cycle over `size` waypoints.
    pub fn from_stops(stops: Vec<usize>, size: usize) -> PlannerResult<Self> {
        check_cycle(&stops, size).map_err(PlannerError::Infeasible)?;
        Ok(Tour { stops })
    }

    /// Create a tour from the visiting order of every waypoint except `start`.
    pub fn from_order(start: usize, order: &[usize], size: usize) -> PlannerResult<Self> {
        let mut stops = Vec::with_capacity(order.len() + 2);
        stops.push(start);
        stops.extend_from_slice(order);
        stops.push(start);
        Tour::from_stops(stops, size)
    }

    /// All stops, including the closing return to the start.
    pub fn stops(&self) -> &[usize] {
        &self.stops
    }

    /// The stops between leaving and returning to the start.
    pub fn interior(&self) -> &[usize] {
        &self.stops[1..self.stops.len() - 1]
    }

    pub fn start(&self) -> usize {
        self.stops[0]
    }

    /// Number of distinct waypoints visited.
    pub fn waypoint_count(&self) -> usize {
        self.stops.len() - 1
    }

    /// Consecutive `(from, to)` waypoint pairs in visiting order.
    pub fn legs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.stops.iter().copied().tuple_windows()
    }

    /// Total matrix distance along the tour.
    pub fn cost(&self, matrix: &DistanceMatrix) -> u64 {
        self.legs().map(|(from, to)| matrix.get(from, to)).sum()
    }
}

/// Check the permutation-cycle invariant, describing the first violation.
fn check_cycle(stops: &[usize], size: usize) -> Result<(), String> {
    if size == 0 {
        return Err("tour over zero waypoints".to_string());
    }
    if stops.len() != size + 1 {
        return Err(format!(
            "tour has {} stops, expected {}",
            stops.len(),
            size + 1
        ));
    }

    let start = stops[0];
    if stops[stops.len() - 1] != start {
        return Err(format!(
            "tour ends at {} instead of its start {}",
            stops[stops.len() - 1],
            start
        ));
    }

    let mut seen = vec![false; size];
    for &stop in &stops[..stops.len() - 1] {
        if stop >= size {
            return Err(format!("stop {} is out of range for {} waypoints", stop, size));
        }
        if seen[stop] {
            return Err(format!("waypoint {} is visited twice", stop));
        }
        seen[stop] = true;
    }

    Ok(())
}
