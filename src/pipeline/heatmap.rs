//! Heatmap Pipeline
//! One entity's indicators over time, mean-filled and z-scored.

use super::PipelineError;
use crate::charts::{ChartInput, ChartKind, PreparedChart, RenderSpec};
use crate::config::{HeatmapParams, COUNTRY, YEAR};
use crate::data::coerce_numeric;
use crate::reshape::{group_by_entity, zscore, FillPolicy, WideMatrix};
use crate::stats::describe;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Build the entity's year × indicator matrix, fill gaps with each column's
/// mean, then z-score per indicator. Filling precedes normalization so
/// filled cells land at exactly zero.
pub fn prepare(df: &DataFrame, params: &HeatmapParams) -> Result<PreparedChart, PipelineError> {
    let groups = group_by_entity(df, COUNTRY, YEAR, std::slice::from_ref(&params.entity))?;
    let frame = match groups.into_iter().next() {
        Some((_, frame)) => frame,
        None => DataFrame::empty(),
    };
    if frame.height() == 0 {
        warn!(entity = params.entity.as_str(), "no rows for heatmap entity");
    }

    let keys: Vec<String> = params.indicators.iter().map(|i| i.key.clone()).collect();
    let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    let frame = coerce_numeric(&frame, &key_refs)?;

    let wide = WideMatrix::from_indicators(&frame, YEAR, &keys)?;
    let dense = wide.fill(FillPolicy::ColumnMean);
    for (col, label) in dense.labels().iter().enumerate() {
        let summary = describe(dense.column(col));
        debug!(
            indicator = label.as_str(),
            count = summary.count,
            mean = summary.mean,
            std = summary.std,
            "indicator summary before normalization"
        );
    }

    let mut normalized = zscore(&dense);
    normalized.relabel(params.indicators.iter().map(|i| i.label.clone()).collect())?;
    info!(
        entity = params.entity.as_str(),
        years = normalized.n_rows(),
        indicators = normalized.n_cols(),
        "prepared normalized heatmap matrix"
    );

    Ok(PreparedChart {
        input: ChartInput::Matrix(normalized),
        spec: RenderSpec {
            kind: ChartKind::Heatmap,
            title: params.title.clone(),
            x_label: params.x_label.clone(),
            y_label: String::new(),
            x_column: YEAR.to_string(),
            value_columns: params.indicators.iter().map(|i| i.label.clone()).collect(),
            color_column: None,
            group_column: None,
        },
    })
}
