//! Greedy construction of the initial tour.
//!
//! Both strategies are deterministic: ties go to the lowest waypoint index,
//! then to the earliest insertion position.

use crate::config::ConstructionStrategy;
use crate::matrix::DistanceMatrix;

/// Build the visiting order of every waypoint except `start`.
pub fn construct(matrix: &DistanceMatrix, start: usize, strategy: ConstructionStrategy) -> Vec<usize> {
    match strategy {
        ConstructionStrategy::CheapestInsertion => cheapest_insertion(matrix, start),
        ConstructionStrategy::PathCheapestArc => path_cheapest_arc(matrix, start),
    }
}

/// Repeatedly insert the unrouted waypoint whose cheapest insertion between two
/// consecutive routed stops adds the least distance.
pub fn cheapest_insertion(matrix: &DistanceMatrix, start: usize) -> Vec<usize> {
    let n = matrix.size();
    let mut route = vec![start, start];
    let mut unrouted: Vec<usize> = (0..n).filter(|&w| w != start).collect();

    while !unrouted.is_empty() {
        // (added distance, position in `unrouted`, insertion position in `route`)
        let mut best: Option<(i64, usize, usize)> = None;

        for (u_pos, &waypoint) in unrouted.iter().enumerate() {
            for k in 0..route.len() - 1 {
                let delta = insertion_delta(matrix, route[k], waypoint, route[k + 1]);
                if best.map_or(true, |(best_delta, _, _)| delta < best_delta) {
                    best = Some((delta, u_pos, k + 1));
                }
            }
        }

        let Some((_, u_pos, insert_at)) = best else {
            break;
        };
        let waypoint = unrouted.remove(u_pos);
        route.insert(insert_at, waypoint);
    }

    route[1..route.len() - 1].to_vec()
}

/// Extend the path from its last stop to the nearest unvisited waypoint.
pub fn path_cheapest_arc(matrix: &DistanceMatrix, start: usize) -> Vec<usize> {
    let n = matrix.size();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n.saturating_sub(1));
    let mut current = start;

    if start < n {
        visited[start] = true;
    }

    while order.len() + 1 < n {
        let next = (0..n)
            .filter(|&w| !visited[w])
            .min_by_key(|&w| (matrix.get(current, w), w));

        let Some(next) = next else {
            break;
        };
        visited[next] = true;
        order.push(next);
        current = next;
    }

    order
}

#[inline]
fn insertion_delta(matrix: &DistanceMatrix, prev: usize, waypoint: usize, next: usize) -> i64 {
    matrix.get(prev, waypoint) as i64 + matrix.get(waypoint, next) as i64 - matrix.get(prev, next) as i64
}
