//! Reporting helpers: search statistics, tour reports and an ASCII route map.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

use crate::error::PlannerResult;
use crate::graph::GraphAccessor;
use crate::problem::{Coordinate, Problem, START_INDEX};
use crate::PlannedTour;

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Statistics about the tour search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchStatistics {
    /// Perturbation rounds run after the first local search
    pub iterations: u32,
    pub improving_moves: usize,
    pub runtime: Duration,
    /// Matrix cost of the constructed tour, before local search
    pub initial_cost: u64,
    pub best_cost: u64,
}

impl SearchStatistics {
    /// Format the statistics as a string.
    pub fn format(&self) -> String {
        let saved = self.initial_cost.saturating_sub(self.best_cost);
        format!(
            "Search Statistics:
- Iterations: {}
- Improving Moves: {}
- Runtime: {} ({} ms)
- Initial Tour Cost: {} m
- Best Tour Cost: {} m
- Saved by Local Search: {} m",
            self.iterations,
            self.improving_moves,
            format_duration(self.runtime),
            self.runtime.as_millis(),
            self.initial_cost,
            self.best_cost,
            saved
        )
    }
}

/// One stop of the tour in visiting order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourStop {
    /// Position in the visiting order; the closing return to the start is last
    pub position: usize,
    pub waypoint_index: usize,
    pub label: String,
    pub coordinate: Coordinate,
}

/// Serializable result of a planned tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourReport {
    pub name: String,
    pub stops: Vec<TourStop>,
    pub total_distance_m: f64,
    pub total_distance_km: f64,
    pub matrix_cost_m: u64,
    /// Coordinates of every road node on the route
    pub polyline: Vec<Coordinate>,
    pub consistent: bool,
}

impl TourReport {
    pub fn from_plan<G: GraphAccessor>(
        problem: &Problem,
        plan: &PlannedTour,
        accessor: &G,
    ) -> PlannerResult<Self> {
        Ok(TourReport {
            name: problem.name.clone(),
            stops: plan.stops(problem),
            total_distance_m: plan.route.total_distance_m,
            total_distance_km: plan.route.total_distance_km(),
            matrix_cost_m: plan.consistency.matrix_cost,
            polyline: plan.route.coordinates(accessor)?,
            consistent: plan.consistency.consistent,
        })
    }

    /// Waypoint indices in visiting order, closing return included.
    pub fn visiting_order(&self) -> Vec<usize> {
        self.stops.iter().map(|stop| stop.waypoint_index).collect()
    }
}

/// Save a report as pretty-printed JSON.
pub fn save_report<P: AsRef<Path>>(report: &TourReport, path: P) -> PlannerResult<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// Render the text summary printed by the command line tool.
pub fn format_report(report: &TourReport) -> String {
    let mut out = format!("Tour for {}\n", report.name);
    out.push_str(&format!(
        "Total Distance: {:.3} km ({:.1} m)\n",
        report.total_distance_km, report.total_distance_m
    ));

    let order: Vec<String> = report
        .visiting_order()
        .iter()
        .map(|index| index.to_string())
        .collect();
    out.push_str(&format!("Visiting Order: {}\n", order.join(" -> ")));
    out.push('\n');

    for stop in &report.stops {
        out.push_str(&format!(
            "{:>3}. [{}] {} {}\n",
            stop.position, stop.waypoint_index, stop.label, stop.coordinate
        ));
    }

    if !report.consistent {
        out.push_str(&format!(
            "\nWarning: route length differs from the matrix tour cost ({} m)\n",
            report.matrix_cost_m
        ));
    }

    out
}

/// Draw the route on a character grid.
///
/// The start is `S`, other stops show the last digit of their waypoint index
/// and the road polyline is drawn with `.`. North is up.
pub fn render_route_map(report: &TourReport, width: usize, height: usize) -> String {
    let points = report
        .polyline
        .iter()
        .chain(report.stops.iter().map(|stop| &stop.coordinate));

    // Find max and min coordinates for scaling
    let mut min_lat = f64::MAX;
    let mut min_lon = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut max_lon = f64::MIN;
    for point in points {
        min_lat = min_lat.min(point.lat);
        min_lon = min_lon.min(point.lon);
        max_lat = max_lat.max(point.lat);
        max_lon = max_lon.max(point.lon);
    }
    if width == 0 || height == 0 || min_lat > max_lat {
        return String::new();
    }

    let lat_span = (max_lat - min_lat).max(f64::EPSILON);
    let lon_span = (max_lon - min_lon).max(f64::EPSILON);
    let cell = |coordinate: &Coordinate| {
        let x = ((coordinate.lon - min_lon) / lon_span * (width as f64 - 1.0)).round() as usize;
        let y = ((max_lat - coordinate.lat) / lat_span * (height as f64 - 1.0)).round() as usize;
        (x.min(width - 1), y.min(height - 1))
    };

    let mut grid = vec![vec![' '; width]; height];

    for coordinate in &report.polyline {
        let (x, y) = cell(coordinate);
        grid[y][x] = '.';
    }

    for stop in &report.stops {
        let (x, y) = cell(&stop.coordinate);
        grid[y][x] = if stop.waypoint_index == START_INDEX {
            'S'
        } else {
            char::from_digit((stop.waypoint_index % 10) as u32, 10).unwrap_or('*')
        };
    }

    grid.iter()
        .map(|row| row.iter().collect::<String>().trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print route visualization to console.
pub fn print_route_visualization(report: &TourReport) {
    println!("Route Visualization for {}", report.name);
    println!("Total Distance: {:.3} km", report.total_distance_km);
    println!();
    println!("{}", render_route_map(report, 80, 25));
    println!();

    // Print legend
    println!("Legend:");
    println!("S - Start / end");
    println!("0-9 - Stop (last digit of waypoint index)");
    println!(". - Road");
    println!();
}
