//! # road-tour CLI
//!
//! Plans a closed tour over a road network snapshot and prints the visiting
//! order, the stop coordinates and the total distance.

use clap::Parser;
use log::error;
use std::path::PathBuf;
use std::time::Duration;

use road_tour::config::{Config, ConstructionStrategy};
use road_tour::error::{PlannerError, PlannerResult};
use road_tour::geocode::{read_address_list, Gazetteer};
use road_tour::network_source::SnapshotSource;
use road_tour::problem::Problem;
use road_tour::utils::{format_report, print_route_visualization, save_report, TourReport};
use road_tour::TourPlanner;

/// Command-line interface for road-tour
#[derive(Parser)]
#[command(name = "road-tour")]
#[command(about = "Shortest closed tour through a set of waypoints over a road network")]
#[command(long_about = "Plans a closed tour that starts and ends at the first waypoint:
  road-tour --network city.json --waypoints stops.json
  road-tour --network city.json --addresses stops.txt --gazetteer places.json

Waypoints are snapped to the nearest road node, a shortest-path distance matrix
is built, the tour is solved over it and the legs are stitched into one route.")]
#[command(version)]
struct Cli {
    /// Road network snapshot (JSON nodes and edges)
    #[arg(long)]
    network: PathBuf,

    /// Waypoint file: {"name", "waypoints": [{"label", "lat", "lon"}]}
    #[arg(long, conflicts_with = "addresses", required_unless_present = "addresses")]
    waypoints: Option<PathBuf>,

    /// Address list, one per line; the first address is the start
    #[arg(long, requires = "gazetteer")]
    addresses: Option<PathBuf>,

    /// Address to coordinate table used with --addresses
    #[arg(long)]
    gazetteer: Option<PathBuf>,

    /// Planner configuration (JSON); flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the tour report as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Time limit for the tour search, in seconds
    #[arg(long)]
    time_limit: Option<u64>,

    /// Seed for the tour search
    #[arg(long)]
    seed: Option<u64>,

    /// Initial tour construction
    #[arg(long, value_enum)]
    construction: Option<ConstructionStrategy>,

    /// Compute the distance matrix on a single thread
    #[arg(long)]
    no_parallel: bool,

    /// Draw the route as an ASCII map
    #[arg(long)]
    plot: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(&cli) {
        error!("{} failed: {}", e.stage(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> PlannerResult<()> {
    let config = load_config(cli)?;
    let problem = load_problem(cli)?;
    println!(
        "Loaded problem: {} with {} waypoints",
        problem.name,
        problem.waypoint_count()
    );

    let planner = TourPlanner::new(config);
    let source = SnapshotSource::from_file(&cli.network)?;
    let network = planner.fetch_network(&problem, &source)?;

    let plan = planner.plan(&problem, &network)?;
    let report = TourReport::from_plan(&problem, &plan, &network)?;

    println!();
    print!("{}", format_report(&report));
    println!();
    println!("{}", plan.statistics.format());

    if let Some(path) = &cli.output {
        println!("Saving report to: {}", path.display());
        save_report(&report, path)?;
    }

    if cli.plot {
        println!();
        print_route_visualization(&report);
    }

    Ok(())
}

fn load_config(cli: &Cli) -> PlannerResult<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::new(),
    };

    if let Some(seconds) = cli.time_limit {
        config = config.with_time_limit(Duration::from_secs(seconds));
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Some(strategy) = cli.construction {
        config = config.with_construction(strategy);
    }
    if cli.no_parallel {
        config = config.with_parallel_matrix(false);
    }

    Ok(config)
}

fn load_problem(cli: &Cli) -> PlannerResult<Problem> {
    match (&cli.waypoints, &cli.addresses, &cli.gazetteer) {
        (Some(path), _, _) => Problem::from_file(path),
        (None, Some(addresses), Some(gazetteer)) => {
            let gazetteer = Gazetteer::from_file(gazetteer)?;
            let name = addresses
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "addresses".to_string());
            let addresses = read_address_list(addresses)?;
            Problem::from_addresses(name, &addresses, &gazetteer)
        }
        _ => Err(PlannerError::InvalidProblem(
            "either --waypoints or --addresses with --gazetteer is required".to_string(),
        )),
    }
}
