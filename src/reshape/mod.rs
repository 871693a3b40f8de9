//! Reshape module - per-entity grouping, wide-matrix alignment,
//! normalization and paired-series gap computation

mod gap;
mod group;
mod normalize;
mod wide;

pub use gap::{align_pair, PairPoint, PairedSeries};
pub use group::{filter_year, group_by_entity};
pub use normalize::{population_mean_std, zscore};
pub use wide::{DenseMatrix, FillPolicy, WideMatrix};

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReshapeError {
    #[error("column not found: {0}")]
    MissingColumn(String),
    #[error("expected {expected} labels, got {got}")]
    LabelCount { expected: usize, got: usize },
    #[error("table error: {0}")]
    Polars(#[from] PolarsError),
}
