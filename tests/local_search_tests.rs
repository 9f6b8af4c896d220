//! Unit tests for the local search neighborhoods.

use road_tour::config::Config;
use road_tour::local_search::or_opt::{apply_or_opt, evaluate_or_opt};
use road_tour::local_search::swap::evaluate_swap;
use road_tour::local_search::two_opt::evaluate_two_opt;
use road_tour::local_search::utils::{path_cost, reversed_path_cost, sequence_cost};
use road_tour::local_search::LocalSearch;
use road_tour::matrix::DistanceMatrix;

/// Creates waypoints on a line, 10 m apart: d(i, j) = 10 * |i - j|.
fn create_line_matrix(size: usize) -> DistanceMatrix {
    let rows = (0..size)
        .map(|i| (0..size).map(|j| 10 * (i as i64 - j as i64).unsigned_abs()).collect())
        .collect();
    DistanceMatrix::from_rows(rows).unwrap()
}

/// Creates an asymmetric matrix where going "up" costs less than going "down".
fn create_asymmetric_matrix(size: usize) -> DistanceMatrix {
    let rows = (0..size)
        .map(|i| {
            (0..size)
                .map(|j| {
                    if i < j {
                        (j - i) as u64 * 10 + (i * 3 % 7) as u64
                    } else if i > j {
                        (i - j) as u64 * 25 + (j * 5 % 11) as u64
                    } else {
                        0
                    }
                })
                .collect()
        })
        .collect();
    DistanceMatrix::from_rows(rows).unwrap()
}

fn create_local_search() -> LocalSearch {
    LocalSearch::new(&Config::default())
}

fn assert_closed_permutation(sequence: &[usize], size: usize) {
    assert_eq!(sequence.len(), size + 1);
    assert_eq!(sequence[0], 0);
    assert_eq!(sequence[size], 0);
    let mut interior = sequence[1..size].to_vec();
    interior.sort_unstable();
    assert_eq!(interior, (1..size).collect::<Vec<_>>());
}

#[test]
fn test_path_costs_follow_direction() {
    let matrix = create_asymmetric_matrix(5);
    let sequence = vec![0, 1, 2, 3, 4, 0];

    assert_eq!(
        path_cost(&sequence, 1, 3, &matrix),
        (matrix.get(1, 2) + matrix.get(2, 3)) as i64
    );
    assert_eq!(
        reversed_path_cost(&sequence, 1, 3, &matrix),
        (matrix.get(3, 2) + matrix.get(2, 1)) as i64
    );
    assert_eq!(path_cost(&sequence, 2, 2, &matrix), 0);
}

#[test]
fn test_two_opt_delta_matches_recomputed_cost() {
    let matrix = create_asymmetric_matrix(7);
    let sequence = vec![0, 3, 1, 5, 2, 6, 4, 0];
    let base = sequence_cost(&sequence, &matrix);

    for i in 1..sequence.len() - 2 {
        for j in i + 1..sequence.len() - 1 {
            let mut reversed = sequence.clone();
            reversed[i..=j].reverse();
            assert_eq!(
                evaluate_two_opt(&sequence, &matrix, i, j),
                sequence_cost(&reversed, &matrix) - base,
                "reversal {}..={}",
                i,
                j
            );
        }
    }
}

#[test]
fn test_swap_delta_matches_recomputed_cost() {
    let matrix = create_asymmetric_matrix(7);
    let sequence = vec![0, 3, 1, 5, 2, 6, 4, 0];
    let base = sequence_cost(&sequence, &matrix);

    // Includes adjacent positions, where the changed arcs overlap
    for i in 1..sequence.len() - 1 {
        for j in i + 1..sequence.len() - 1 {
            let mut swapped = sequence.clone();
            swapped.swap(i, j);
            assert_eq!(
                evaluate_swap(&sequence, &matrix, i, j),
                sequence_cost(&swapped, &matrix) - base,
                "swap {} <-> {}",
                i,
                j
            );
        }
    }
}

#[test]
fn test_or_opt_delta_matches_recomputed_cost() {
    let matrix = create_asymmetric_matrix(7);
    let sequence = vec![0, 3, 1, 5, 2, 6, 4, 0];
    let base = sequence_cost(&sequence, &matrix);
    let n = sequence.len();

    for len in 1..=3 {
        for i in 1..n - len {
            for p in (0..n - 1).filter(|&p| p + 1 < i || p >= i + len) {
                let mut moved = sequence.clone();
                apply_or_opt(&mut moved, i, len, p);

                assert_closed_permutation(&moved, 7);
                assert_eq!(
                    evaluate_or_opt(&sequence, &matrix, i, len, p),
                    sequence_cost(&moved, &matrix) - base,
                    "segment {}+{} after {}",
                    i,
                    len,
                    p
                );
            }
        }
    }
}

#[test]
fn test_apply_or_opt_moves_segment() {
    // Move [1, 2] after 4
    let mut forward = vec![0, 1, 2, 3, 4, 0];
    apply_or_opt(&mut forward, 1, 2, 4);
    assert_eq!(forward, vec![0, 3, 4, 1, 2, 0]);

    // Move [3] to the front
    let mut backward = vec![0, 1, 2, 3, 4, 0];
    apply_or_opt(&mut backward, 3, 1, 0);
    assert_eq!(backward, vec![0, 3, 1, 2, 4, 0]);
}

#[test]
fn test_two_opt_neighborhood() {
    let matrix = create_line_matrix(4);
    let mut sequence = vec![0, 2, 1, 3, 0];
    let mut local_search = create_local_search();

    let improved = local_search.two_opt_neighborhood(&mut sequence, &matrix);

    assert!(improved);
    assert_eq!(sequence, vec![0, 1, 2, 3, 0]);
    assert_eq!(sequence_cost(&sequence, &matrix), 60);
    assert_eq!(local_search.moves_applied, 1);

    // Nothing left to improve
    assert!(!local_search.two_opt_neighborhood(&mut sequence, &matrix));
}

#[test]
fn test_two_opt_respects_asymmetry() {
    // One-way ring: reversing the tour would use only expensive arcs
    let rows = (0..4)
        .map(|i| {
            (0..4)
                .map(|j| match j {
                    _ if i == j => 0,
                    _ if j == (i + 1) % 4 => 10,
                    _ => 100,
                })
                .collect()
        })
        .collect();
    let matrix = DistanceMatrix::from_rows(rows).unwrap();
    let mut sequence = vec![0, 1, 2, 3, 0];

    assert_eq!(evaluate_two_opt(&sequence, &matrix, 1, 3), 360);
    assert!(!create_local_search().two_opt_neighborhood(&mut sequence, &matrix));
    assert_eq!(sequence, vec![0, 1, 2, 3, 0]);
}

#[test]
fn test_swap_neighborhood() {
    let matrix = create_line_matrix(5);
    let mut sequence = vec![0, 4, 2, 3, 1, 0];
    let initial_cost = sequence_cost(&sequence, &matrix);
    let mut local_search = create_local_search();

    let improved = local_search.swap_neighborhood(&mut sequence, &matrix);

    assert!(improved);
    assert!(sequence_cost(&sequence, &matrix) < initial_cost);
    assert_closed_permutation(&sequence, 5);
}

#[test]
fn test_or_opt_neighborhood() {
    let matrix = create_line_matrix(6);
    let mut sequence = vec![0, 1, 4, 5, 2, 3, 0];
    let initial_cost = sequence_cost(&sequence, &matrix);
    let mut local_search = create_local_search();

    let improved = local_search.or_opt_neighborhood(&mut sequence, &matrix);

    assert!(improved);
    assert!(sequence_cost(&sequence, &matrix) < initial_cost);
    assert_closed_permutation(&sequence, 6);
}

#[test]
fn test_neighborhoods_skip_tiny_tours() {
    let matrix = create_line_matrix(2);
    let mut local_search = create_local_search();

    let mut sequence = vec![0, 1, 0];
    assert!(!local_search.or_opt_neighborhood(&mut sequence, &matrix));
    assert!(!local_search.swap_neighborhood(&mut sequence, &matrix));
    assert!(!local_search.two_opt_neighborhood(&mut sequence, &matrix));
    assert!(!local_search.educate(&mut sequence, &matrix, None));
    assert_eq!(sequence, vec![0, 1, 0]);
}

#[test]
fn test_educate_reaches_line_optimum() {
    let matrix = create_line_matrix(8);
    let mut sequence = vec![0, 5, 2, 7, 1, 6, 3, 4, 0];
    let mut local_search = create_local_search();

    let improved = local_search.educate(&mut sequence, &matrix, None);

    assert!(improved);
    assert_closed_permutation(&sequence, 8);
    // Out to the far end and back
    assert_eq!(sequence_cost(&sequence, &matrix), 140);
}

#[test]
fn test_educate_respects_pass_budget() {
    let matrix = create_line_matrix(8);
    let mut sequence = vec![0, 5, 2, 7, 1, 6, 3, 4, 0];
    let mut local_search = LocalSearch::new(&Config::new().with_max_local_search_passes(0));

    assert!(!local_search.educate(&mut sequence, &matrix, None));
    assert_eq!(sequence, vec![0, 5, 2, 7, 1, 6, 3, 4, 0]);
}

#[test]
fn test_perturb_keeps_tour_valid() {
    let mut local_search = create_local_search();

    // Double bridge on long tours
    let mut long: Vec<usize> = (0..12).chain(std::iter::once(0)).collect();
    for _ in 0..50 {
        local_search.perturb(&mut long);
        assert_closed_permutation(&long, 12);
    }

    // Segment reversal on short ones
    let mut short = vec![0, 1, 2, 3, 0];
    for _ in 0..50 {
        local_search.perturb(&mut short);
        assert_closed_permutation(&short, 4);
    }

    // Too short to perturb
    let mut tiny = vec![0, 1, 0];
    local_search.perturb(&mut tiny);
    assert_eq!(tiny, vec![0, 1, 0]);
}

#[test]
fn test_perturb_changes_long_tours() {
    let mut local_search = create_local_search();
    let original: Vec<usize> = (0..12).chain(std::iter::once(0)).collect();

    let mut sequence = original.clone();
    local_search.perturb(&mut sequence);

    assert_ne!(sequence, original);
}

#[test]
fn test_same_seed_same_moves() {
    let matrix = create_asymmetric_matrix(9);
    let start = vec![0, 8, 3, 6, 1, 7, 2, 5, 4, 0];

    let mut first = start.clone();
    create_local_search().educate(&mut first, &matrix, None);
    let mut second = start.clone();
    create_local_search().educate(&mut second, &matrix, None);

    assert_eq!(first, second);
}
