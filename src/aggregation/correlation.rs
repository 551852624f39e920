//! Pooled pairwise correlation across expert decision matrices.

use super::stats::{abs_pearson, median};

/// Column `j` of an alternative × criterion matrix.
pub(crate) fn column(matrix: &[Vec<f64>], j: usize) -> Vec<f64> {
    matrix.iter().map(|row| row.get(j).copied().unwrap_or(0.0)).collect()
}

/// Median over experts of `|pearson(column i, column k)|`.
///
/// The median keeps a single outlying expert from dominating the pooled
/// value. No experts yields 0.0.
pub fn pooled_correlation(matrices: &[Vec<Vec<f64>>], i: usize, k: usize) -> f64 {
    let per_expert: Vec<f64> = matrices
        .iter()
        .map(|m| abs_pearson(&column(m, i), &column(m, k)))
        .collect();
    median(&per_expert)
}
