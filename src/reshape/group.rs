//! Per-Entity Grouping Module
//! Splits the observation table into independent, year-sorted frames.

use super::ReshapeError;
use polars::prelude::*;
use tracing::debug;

/// Build one independent frame per requested entity, in request order.
///
/// Rows without a parseable year are dropped and the remainder is sorted
/// ascending by year. An entity absent from the source yields an empty
/// frame, not an error; callers decide what absence means downstream.
pub fn group_by_entity(
    df: &DataFrame,
    entity_col: &str,
    year_col: &str,
    entities: &[String],
) -> Result<Vec<(String, DataFrame)>, ReshapeError> {
    let year = df
        .column(year_col)
        .map_err(|_| ReshapeError::MissingColumn(year_col.to_string()))?
        .cast(&DataType::Float64)?;
    if df.column(entity_col).is_err() {
        return Err(ReshapeError::MissingColumn(entity_col.to_string()));
    }
    let mut base = df.clone();
    base.with_column(year)?;

    let mut groups = Vec::with_capacity(entities.len());
    for entity in entities {
        let frame = base
            .clone()
            .lazy()
            .filter(col(entity_col).eq(lit(entity.as_str())))
            .filter(col(year_col).is_not_null())
            .sort([year_col], SortMultipleOptions::default())
            .collect()?;
        if frame.height() == 0 {
            debug!(entity = entity.as_str(), "no rows for entity");
        }
        groups.push((entity.clone(), frame));
    }
    Ok(groups)
}

/// Exact-match filter on the year column (numeric equality after coercion).
///
/// A year with no matching rows yields an empty frame.
pub fn filter_year(df: &DataFrame, year_col: &str, year: i32) -> Result<DataFrame, ReshapeError> {
    let casted = df
        .column(year_col)
        .map_err(|_| ReshapeError::MissingColumn(year_col.to_string()))?
        .cast(&DataType::Float64)?;
    let mut base = df.clone();
    base.with_column(casted)?;
    Ok(base
        .lazy()
        .filter(col(year_col).eq(lit(f64::from(year))))
        .collect()?)
}
