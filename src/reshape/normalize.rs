//! Normalization Module
//! Per-column z-scoring of a dense matrix for cross-indicator comparison.

use super::wide::DenseMatrix;
use rayon::prelude::*;

/// Z-score each column with its own population mean and standard deviation
/// (ddof = 0). Fill must happen before this step so filled cells normalize
/// to exactly zero.
///
/// A zero-variance column yields all zeros: centering removes the mean and
/// a zero scale is treated as one, so no cell is ever NaN or infinite.
pub fn zscore(matrix: &DenseMatrix) -> DenseMatrix {
    let cells: Vec<Vec<f64>> = (0..matrix.n_cols())
        .into_par_iter()
        .map(|col| zscore_column(matrix.column(col)))
        .collect();
    DenseMatrix::new(
        matrix.years().to_vec(),
        matrix.labels().to_vec(),
        cells,
    )
}

fn zscore_column(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let (mean, std) = population_mean_std(values);
    if std == 0.0 {
        return vec![0.0; n];
    }
    values.iter().map(|v| (v - mean) / std).collect()
}

/// Population mean and standard deviation (ddof = 0).
pub fn population_mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    if n == 0.0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
