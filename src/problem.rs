//! Problem definition: the waypoints to visit and their coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{PlannerError, PlannerResult};
use crate::geocode::Geocoder;

/// Index of the waypoint every tour starts and ends at.
pub const START_INDEX: usize = 0;

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS-84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(lat: f64, lon: f64) -> Self {
        Coordinate { lat, lon }
    }

    /// Haversine great-circle distance in meters.
    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_M * c
    }

    /// Check that the coordinate is finite and within WGS-84 bounds.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// A named point to be visited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub label: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
}

impl Waypoint {
    /// Create a new waypoint.
    pub fn new(label: impl Into<String>, lat: f64, lon: f64) -> Self {
        Waypoint {
            label: label.into(),
            coordinate: Coordinate::new(lat, lon),
        }
    }
}

/// On-disk layout of a waypoint file.
#[derive(Debug, Deserialize)]
struct WaypointFile {
    #[serde(default)]
    name: Option<String>,
    waypoints: Vec<Waypoint>,
}

/// Represents a closed-tour planning instance.
///
/// Waypoint [`START_INDEX`] is the fixed start and end of the tour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ProblemData")]
pub struct Problem {
    pub name: String,
    pub waypoints: Vec<Waypoint>,
}

#[derive(Deserialize)]
struct ProblemData {
    name: String,
    waypoints: Vec<Waypoint>,
}

impl TryFrom<ProblemData> for Problem {
    type Error = PlannerError;

    fn try_from(data: ProblemData) -> PlannerResult<Self> {
        Problem::new(data.name, data.waypoints)
    }
}

impl Problem {
    /// Create a new problem, rejecting empty lists and invalid coordinates.
    pub fn new(name: impl Into<String>, waypoints: Vec<Waypoint>) -> PlannerResult<Self> {
        if waypoints.is_empty() {
            return Err(PlannerError::InvalidProblem(
                "at least one waypoint is required".to_string(),
            ));
        }

        if let Some((index, waypoint)) = waypoints
            .iter()
            .enumerate()
            .find(|(_, w)| !w.coordinate.is_valid())
        {
            return Err(PlannerError::InvalidProblem(format!(
                "waypoint {} ({}) has invalid coordinate {}",
                index, waypoint.label, waypoint.coordinate
            )));
        }

        Ok(Problem {
            name: name.into(),
            waypoints,
        })
    }

    /// Load a problem from a JSON waypoint file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> PlannerResult<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)?;
        let file: WaypointFile = serde_json::from_str(&data)?;

        let name = file.name.unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "tour".to_string())
        });

        Problem::new(name, file.waypoints)
    }

    /// Build a problem by geocoding free-text addresses, in order.
    ///
    /// The first failing address aborts with [`PlannerError::Geocode`].
    pub fn from_addresses<G: Geocoder>(
        name: impl Into<String>,
        addresses: &[String],
        geocoder: &G,
    ) -> PlannerResult<Self> {
        let mut waypoints = Vec::with_capacity(addresses.len());

        for address in addresses {
            let coordinate = geocoder.geocode(address)?;
            log::debug!("Geocoded {:?} to {}", address, coordinate);
            waypoints.push(Waypoint {
                label: address.clone(),
                coordinate,
            });
        }

        Problem::new(name, waypoints)
    }

    /// Get the number of waypoints, including the start.
    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    /// Get the start waypoint.
    pub fn start(&self) -> &Waypoint {
        &self.waypoints[START_INDEX]
    }

    /// Coordinates of all waypoints in index order.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.waypoints.iter().map(|w| w.coordinate).collect()
    }

    /// Calculate the mean coordinate of all waypoints.
    pub fn center(&self) -> Coordinate {
        let count = self.waypoints.len() as f64;
        let (sum_lat, sum_lon) = self
            .waypoints
            .iter()
            .fold((0.0, 0.0), |(lat, lon), w| {
                (lat + w.coordinate.lat, lon + w.coordinate.lon)
            });

        Coordinate::new(sum_lat / count, sum_lon / count)
    }
}
