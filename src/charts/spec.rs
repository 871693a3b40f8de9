//! Render Spec Module
//! The handoff contract between prepared data and a renderer.

use crate::reshape::{DenseMatrix, PairedSeries};
use polars::prelude::{DataFrame, PolarsError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    Choropleth,
    GroupedBars,
    Heatmap,
    GapArea,
    StackedArea,
}

/// Names the columns/series a renderer should draw and the labels to put on
/// the artifact. For `GapArea`, `value_columns` holds the two series labels
/// plus, optionally, a third label for the shaded gap band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Column holding the x (or entity) values in table inputs.
    pub x_column: String,
    /// Value series, in draw order.
    pub value_columns: Vec<String>,
    /// Column holding color keys (ISO codes for the choropleth).
    pub color_column: Option<String>,
    /// Column holding group keys, when the chart groups rows.
    pub group_column: Option<String>,
}

/// A prepared table/matrix in the shape its chart kind expects.
#[derive(Debug, Clone)]
pub enum ChartInput {
    Table(DataFrame),
    Matrix(DenseMatrix),
    Pairs(PairedSeries),
}

/// A prepared chart: the reshaped data plus its render configuration.
#[derive(Debug, Clone)]
pub struct PreparedChart {
    pub input: ChartInput,
    pub spec: RenderSpec,
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("nothing to render")]
    EmptyInput,
    #[error("chart kind {0:?} is not supported by this renderer")]
    Unsupported(ChartKind),
    #[error("input shape does not match the chart kind")]
    InputMismatch,
    #[error("column not found: {0}")]
    MissingColumn(String),
    #[error("drawing backend: {0}")]
    Backend(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("serialization: {0}")]
    Json(#[from] serde_json::Error),
    #[error("table error: {0}")]
    Polars(#[from] PolarsError),
}

/// Consumes a prepared chart and produces a visual artifact at `out`.
pub trait Renderer {
    fn render(&self, input: &ChartInput, spec: &RenderSpec, out: &Path) -> Result<(), RenderError>;
}
