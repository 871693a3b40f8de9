//! Pipeline module - one entry point per analysis, explicit parameters in,
//! prepared chart out

pub mod area;
pub mod bars;
pub mod gap;
pub mod heatmap;
pub mod map;

use crate::data::CoerceError;
use crate::reshape::ReshapeError;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Coerce(#[from] CoerceError),
    #[error(transparent)]
    Reshape(#[from] ReshapeError),
    #[error("table error: {0}")]
    Polars(#[from] PolarsError),
}
