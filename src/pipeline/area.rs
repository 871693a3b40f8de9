//! Stacked Area Pipeline
//! One indicator across many entities, zero-filled and pruned for stacking.

use super::PipelineError;
use crate::charts::{ChartInput, ChartKind, PreparedChart, RenderSpec};
use crate::config::{AreaParams, COUNTRY, YEAR};
use crate::reshape::{group_by_entity, FillPolicy, WideMatrix};
use polars::prelude::*;
use tracing::info;

/// Align the indicator across the requested entities on the union of their
/// years, zero-fill the gaps and drop entities that stay at zero
/// throughout.
pub fn prepare(df: &DataFrame, params: &AreaParams) -> Result<PreparedChart, PipelineError> {
    let groups = group_by_entity(df, COUNTRY, YEAR, &params.entities)?;
    let wide = WideMatrix::from_entity_tables(&groups, YEAR, params.indicator.as_str())?;
    let dense = wide.fill(FillPolicy::Zero).prune_zero_columns();
    info!(
        entities = dense.n_cols(),
        years = dense.n_rows(),
        indicator = params.indicator.as_str(),
        "prepared stacked-area matrix"
    );

    let labels = dense.labels().to_vec();
    Ok(PreparedChart {
        input: ChartInput::Matrix(dense),
        spec: RenderSpec {
            kind: ChartKind::StackedArea,
            title: params.title.clone(),
            x_label: params.x_label.clone(),
            y_label: params.y_label.clone(),
            x_column: YEAR.to_string(),
            value_columns: labels,
            color_column: None,
            group_column: Some(COUNTRY.to_string()),
        },
    })
}
