//! Choropleth Map Pipeline
//! One indicator across all countries at a target year, keyed by ISO code.

use super::PipelineError;
use crate::charts::{ChartInput, ChartKind, PreparedChart, RenderSpec};
use crate::config::{MapParams, CODE, COUNTRY, YEAR};
use crate::data::coerce_numeric;
use crate::reshape::filter_year;
use polars::prelude::*;
use tracing::info;

/// Filter the observation table to the target year and keep the rows where
/// country, code and the indicator are all present.
pub fn prepare(df: &DataFrame, params: &MapParams) -> Result<PreparedChart, PipelineError> {
    let observed = filter_year(df, YEAR, params.year)?;
    let observed = coerce_numeric(&observed, &[params.indicator.as_str()])?;
    let table = observed
        .lazy()
        .filter(col(COUNTRY).is_not_null())
        .filter(col(CODE).is_not_null())
        .filter(col(params.indicator.as_str()).is_not_null())
        .select([
            col(COUNTRY),
            col(CODE),
            col(params.indicator.as_str()),
        ])
        .collect()?;
    info!(
        year = params.year,
        countries = table.height(),
        "prepared choropleth table"
    );

    Ok(PreparedChart {
        input: ChartInput::Table(table),
        spec: RenderSpec {
            kind: ChartKind::Choropleth,
            title: params.title.clone(),
            x_label: String::new(),
            y_label: String::new(),
            x_column: COUNTRY.to_string(),
            value_columns: vec![params.indicator.clone()],
            color_column: Some(CODE.to_string()),
            group_column: None,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapParams;

    #[test]
    fn rows_missing_code_or_value_are_dropped() {
        let df = DataFrame::new(vec![
            Column::new(
                "country".into(),
                vec![Some("Colombia"), Some("Peru"), Some("Chile")],
            ),
            Column::new("code".into(), vec![Some("COL"), None, Some("CHL")]),
            Column::new("year".into(), vec!["2024", "2024", "2024"]),
            Column::new("prevalence".into(), vec![Some("10.5"), Some("7.0"), None]),
        ])
        .unwrap();
        let params = MapParams {
            year: 2024,
            indicator: "prevalence".to_string(),
            title: String::new(),
        };

        let prepared = prepare(&df, &params).unwrap();
        let ChartInput::Table(table) = &prepared.input else {
            panic!("expected a table input");
        };
        assert_eq!(table.height(), 1);
        assert_eq!(
            table.column("country").unwrap().str().unwrap().get(0),
            Some("Colombia")
        );
    }
}
