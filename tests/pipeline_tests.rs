//! Integration tests for the full planning pipeline.

use road_tour::config::Config;
use road_tour::error::PlannerError;
use road_tour::graph::{GraphNode, RoadNetwork, RoadNetworkBuilder};
use road_tour::network_source::{NetworkSnapshot, SnapshotEdge, SnapshotNode, SnapshotSource};
use road_tour::problem::{Coordinate, Problem, Waypoint};
use road_tour::TourPlanner;

/// Corner `k` of a pentagon roughly 110 m around the origin.
fn pentagon_corner(k: usize) -> (f64, f64) {
    let angle = (k as f64 * 72.0).to_radians();
    (0.001 * angle.cos(), 0.001 * angle.sin())
}

/// Ring roads of 100 m between neighbouring corners, 200 m diagonals.
fn pentagon_roads(with_first_side: bool) -> Vec<(usize, usize, f64)> {
    let mut roads = vec![
        (1, 2, 100.0),
        (2, 3, 100.0),
        (3, 4, 100.0),
        (4, 0, 100.0),
        (0, 2, 200.0),
        (0, 3, 200.0),
        (1, 3, 200.0),
        (1, 4, 200.0),
        (2, 4, 200.0),
    ];
    if with_first_side {
        roads.push((0, 1, 100.0));
    }
    roads
}

fn create_pentagon_network(with_first_side: bool) -> RoadNetwork {
    let mut builder = RoadNetworkBuilder::new();
    let nodes: Vec<GraphNode> = (0..5)
        .map(|k| {
            let (lat, lon) = pentagon_corner(k);
            builder.add_node(k as i64, Coordinate::new(lat, lon))
        })
        .collect();

    for (a, b, length) in pentagon_roads(with_first_side) {
        builder.add_road(nodes[a], nodes[b], length).unwrap();
    }

    builder.build()
}

fn create_pentagon_problem() -> Problem {
    let waypoints = (0..5)
        .map(|k| {
            let (lat, lon) = pentagon_corner(k);
            Waypoint::new(format!("Corner {}", k), lat, lon)
        })
        .collect();
    Problem::new("pentagon", waypoints).unwrap()
}

#[test]
fn test_full_ring_tour() {
    let network = create_pentagon_network(true);
    let problem = create_pentagon_problem();

    let plan = TourPlanner::default().plan(&problem, &network).unwrap();

    assert_eq!(plan.tour.cost(&plan.matrix), 500);
    assert_eq!(plan.route.total_distance_m, 500.0);
    assert!(plan.consistency.consistent);
}

#[test]
fn test_missing_road_forces_detour() {
    let network = create_pentagon_network(false);
    let problem = create_pentagon_problem();

    let plan = TourPlanner::default().plan(&problem, &network).unwrap();

    // Corner 0 to corner 1 now goes around through a diagonal
    assert_eq!(plan.matrix.get(0, 1), 300);
    assert_eq!(plan.matrix.get(1, 0), 300);

    let stops = plan.tour.stops();
    assert_eq!(stops.len(), 6);
    assert_eq!(stops[0], 0);
    assert_eq!(stops[5], 0);
    let mut visited = stops[..5].to_vec();
    visited.sort_unstable();
    assert_eq!(visited, vec![0, 1, 2, 3, 4]);

    assert_eq!(plan.tour.cost(&plan.matrix), 700);
    assert_eq!(plan.route.total_distance_m, 700.0);
    assert!(plan.consistency.consistent);

    for pair in plan.route.nodes.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
}

#[test]
fn test_plan_is_idempotent() {
    let network = create_pentagon_network(false);
    let problem = create_pentagon_problem();
    let planner = TourPlanner::new(Config::new().with_seed(3));

    let first = planner.plan(&problem, &network).unwrap();
    let second = planner.plan(&problem, &network).unwrap();

    assert_eq!(first.tour, second.tour);
    assert_eq!(first.nodes, second.nodes);
    assert_eq!(first.route, second.route);
    assert_eq!(first.matrix, second.matrix);
}

#[test]
fn test_single_waypoint_plan() {
    let network = create_pentagon_network(true);
    let (lat, lon) = pentagon_corner(2);
    let problem = Problem::new("alone", vec![Waypoint::new("home", lat, lon)]).unwrap();

    let plan = TourPlanner::default().plan(&problem, &network).unwrap();

    assert_eq!(plan.tour.stops(), &[0, 0]);
    assert_eq!(plan.route.nodes.len(), 1);
    assert_eq!(plan.route.total_distance_m, 0.0);
    assert!(plan.consistency.consistent);

    let stops = plan.stops(&problem);
    assert_eq!(stops.len(), 2);
    assert_eq!(stops[1].label, "home");
}

#[test]
fn test_disconnected_waypoint() {
    let mut builder = RoadNetworkBuilder::new();
    let nodes: Vec<GraphNode> = (0..5)
        .map(|k| {
            let (lat, lon) = pentagon_corner(k);
            builder.add_node(k as i64, Coordinate::new(lat, lon))
        })
        .collect();
    for (a, b, length) in pentagon_roads(true) {
        builder.add_road(nodes[a], nodes[b], length).unwrap();
    }
    // A dead-end pair nobody can reach
    let island = builder.add_node(10, Coordinate::new(0.0, 0.003));
    let island_end = builder.add_node(11, Coordinate::new(0.0, 0.004));
    builder.add_road(island, island_end, 100.0).unwrap();
    let network = builder.build();

    let mut problem = create_pentagon_problem();
    problem.waypoints.push(Waypoint::new("island", 0.0, 0.003));

    let err = TourPlanner::default().plan(&problem, &network).unwrap_err();
    match &err {
        PlannerError::RoutingInfeasible { pairs } => {
            // Five pairs in each direction
            assert_eq!(pairs.len(), 10);
            assert!(pairs.iter().all(|pair| pair.from == 5 || pair.to == 5));
        }
        other => panic!("expected RoutingInfeasible, got {:?}", other),
    }
    assert_eq!(err.stage(), "distance matrix");
}

#[test]
fn test_waypoint_outside_coverage() {
    let network = create_pentagon_network(true);
    let mut problem = create_pentagon_problem();
    problem.waypoints.push(Waypoint::new("far", 0.05, 0.05));

    let err = TourPlanner::default().plan(&problem, &network).unwrap_err();

    assert!(matches!(err, PlannerError::Coverage { index: 5, .. }));
}

#[test]
fn test_plan_from_snapshot_source() {
    let nodes = (0..5)
        .map(|k| {
            let (lat, lon) = pentagon_corner(k);
            SnapshotNode {
                id: 1000 + k as i64,
                lat,
                lon,
            }
        })
        .collect();
    let edges = pentagon_roads(false)
        .into_iter()
        .map(|(a, b, length)| SnapshotEdge {
            from: 1000 + a as i64,
            to: 1000 + b as i64,
            length_m: Some(length),
            oneway: false,
        })
        .collect();
    let source = SnapshotSource::new(NetworkSnapshot { nodes, edges });

    let problem = create_pentagon_problem();
    let planner = TourPlanner::default();
    let network = planner.fetch_network(&problem, &source).unwrap();
    assert_eq!(network.node_count(), 5);

    let plan = planner.plan(&problem, &network).unwrap();
    assert_eq!(plan.route.total_distance_m, 700.0);
}

#[test]
fn test_sequential_matrix_gives_same_plan() {
    let network = create_pentagon_network(false);
    let problem = create_pentagon_problem();

    let parallel = TourPlanner::default().plan(&problem, &network).unwrap();
    let sequential = TourPlanner::new(Config::new().with_parallel_matrix(false))
        .plan(&problem, &network)
        .unwrap();

    assert_eq!(parallel.matrix, sequential.matrix);
    assert_eq!(parallel.tour, sequential.tour);
}

#[test]
fn test_fractional_road_lengths_stay_consistent() {
    // Ring roads only, with lengths taken from node positions
    let nodes = (0..5)
        .map(|k| {
            let (lat, lon) = pentagon_corner(k);
            SnapshotNode {
                id: k as i64,
                lat,
                lon,
            }
        })
        .collect();
    let edges = (0..5)
        .map(|k| SnapshotEdge {
            from: k as i64,
            to: ((k + 1) % 5) as i64,
            length_m: None,
            oneway: false,
        })
        .collect();
    let source = SnapshotSource::new(NetworkSnapshot { nodes, edges });

    let problem = create_pentagon_problem();
    let planner = TourPlanner::default();
    let network = planner.fetch_network(&problem, &source).unwrap();
    let plan = planner.plan(&problem, &network).unwrap();

    // Five sides of about 130.7 m each
    assert!(plan.route.total_distance_m.fract() != 0.0);
    assert!((plan.route.total_distance_m - 653.6).abs() < 2.0);
    assert!(plan.consistency.consistent);
    assert!(
        (plan.consistency.recomputed_m - plan.consistency.matrix_cost as f64).abs()
            <= plan.consistency.allowed_gap_m
    );
}
