//! Cost helpers shared by the neighborhoods.
//!
//! Neighborhoods work on the closed stop sequence `[start, .., start]`.
//! Costs are signed so move deltas can be negative.

use crate::matrix::DistanceMatrix;

/// Matrix distance of the arc `from -> to`.
#[inline]
pub fn arc(matrix: &DistanceMatrix, from: usize, to: usize) -> i64 {
    matrix.get(from, to) as i64
}

/// Total cost of a closed stop sequence.
pub fn sequence_cost(sequence: &[usize], matrix: &DistanceMatrix) -> i64 {
    sequence.windows(2).map(|w| arc(matrix, w[0], w[1])).sum()
}

/// Cost of travelling forward from position `from` to position `to`.
pub fn path_cost(sequence: &[usize], from: usize, to: usize, matrix: &DistanceMatrix) -> i64 {
    (from..to)
        .map(|k| arc(matrix, sequence[k], sequence[k + 1]))
        .sum()
}

/// Cost of travelling the same stops backwards, from position `to` to position `from`.
///
/// Differs from [`path_cost`] whenever the matrix is asymmetric.
pub fn reversed_path_cost(
    sequence: &[usize],
    from: usize,
    to: usize,
    matrix: &DistanceMatrix,
) -> i64 {
    (from..to)
        .map(|k| arc(matrix, sequence[k + 1], sequence[k]))
        .sum()
}
