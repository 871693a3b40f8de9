//! Treatment Gap Pipeline
//! Two aligned indicator series for one entity, with gap rows marked.

use super::PipelineError;
use crate::charts::{ChartInput, ChartKind, PreparedChart, RenderSpec};
use crate::config::{GapParams, COUNTRY, YEAR};
use crate::reshape::{align_pair, group_by_entity};
use polars::prelude::*;
use tracing::{info, warn};

/// Align the two indicators on the entity's year axis. The gap region is
/// wherever the first series exceeds the second, pointwise per row.
pub fn prepare(df: &DataFrame, params: &GapParams) -> Result<PreparedChart, PipelineError> {
    let groups = group_by_entity(df, COUNTRY, YEAR, std::slice::from_ref(&params.entity))?;
    let frame = match groups.into_iter().next() {
        Some((_, frame)) => frame,
        None => DataFrame::empty(),
    };
    if frame.height() == 0 {
        warn!(entity = params.entity.as_str(), "no rows for gap entity");
    }

    let pair = align_pair(
        &frame,
        YEAR,
        params.a.key.as_str(),
        params.b.key.as_str(),
        params.a.label.as_str(),
        params.b.label.as_str(),
    )?;
    info!(
        entity = params.entity.as_str(),
        points = pair.points().len(),
        gap_rows = pair.gap_rows().len(),
        "prepared gap series"
    );

    Ok(PreparedChart {
        input: ChartInput::Pairs(pair),
        spec: RenderSpec {
            kind: ChartKind::GapArea,
            title: params.title.clone(),
            x_label: params.x_label.clone(),
            y_label: params.y_label.clone(),
            x_column: YEAR.to_string(),
            value_columns: vec![
                params.a.label.clone(),
                params.b.label.clone(),
                params.gap_label.clone(),
            ],
            color_column: None,
            group_column: None,
        },
    })
}
