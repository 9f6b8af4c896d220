//! Geocoding: resolving free-text addresses to coordinates.
//!
//! The planner only depends on the [`Geocoder`] trait. [`Gazetteer`] is a
//! local lookup table so the pipeline runs without a network service.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{PlannerError, PlannerResult};
use crate::problem::Coordinate;

/// Resolves an address to a coordinate.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> PlannerResult<Coordinate>;
}

/// Address table loaded from a JSON object of `"name": {"lat": .., "lon": ..}`.
///
/// Lookups ignore case and repeated whitespace. Literal `"lat, lon"` strings
/// resolve directly without a table entry.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    entries: HashMap<String, Coordinate>,
}

impl Gazetteer {
    /// Create an empty gazetteer.
    pub fn new() -> Self {
        Gazetteer::default()
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, address: &str, coordinate: Coordinate) {
        self.entries.insert(normalize(address), coordinate);
    }

    /// Set an entry, builder style.
    pub fn with_entry(mut self, address: &str, coordinate: Coordinate) -> Self {
        self.insert(address, coordinate);
        self
    }

    /// Load a gazetteer from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> PlannerResult<Self> {
        let data = fs::read_to_string(path)?;
        let raw: HashMap<String, Coordinate> = serde_json::from_str(&data)?;

        let mut gazetteer = Gazetteer::new();
        for (address, coordinate) in raw {
            gazetteer.insert(&address, coordinate);
        }
        Ok(gazetteer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Geocoder for Gazetteer {
    fn geocode(&self, address: &str) -> PlannerResult<Coordinate> {
        if let Some(coordinate) = parse_lat_lon(address) {
            return Ok(coordinate);
        }

        self.entries
            .get(&normalize(address))
            .copied()
            .ok_or_else(|| PlannerError::Geocode {
                address: address.to_string(),
                reason: "address not found in gazetteer".to_string(),
            })
    }
}

/// Read one address per line, skipping blank lines and `#` comments.
pub fn read_address_list<P: AsRef<Path>>(path: P) -> PlannerResult<Vec<String>> {
    let data = fs::read_to_string(path)?;
    Ok(data
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn normalize(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn parse_lat_lon(text: &str) -> Option<Coordinate> {
    let (lat, lon) = text.split_once(',')?;
    let coordinate = Coordinate::new(lat.trim().parse().ok()?, lon.trim().parse().ok()?);
    coordinate.is_valid().then_some(coordinate)
}
