//! Grouped Bar Pipeline
//! Two indicators per entity at a target year, sorted by the first.

use super::PipelineError;
use crate::charts::{ChartInput, ChartKind, PreparedChart, RenderSpec};
use crate::config::{BarsParams, COUNTRY, YEAR};
use crate::data::coerce_numeric;
use crate::reshape::{filter_year, group_by_entity};
use polars::prelude::*;
use tracing::{debug, info};

/// Look up both indicators for each requested entity at the target year.
/// Entities with no row at that year, or missing either value, are skipped
/// rather than plotted as zero. Rows sort descending by the first indicator.
pub fn prepare(df: &DataFrame, params: &BarsParams) -> Result<PreparedChart, PipelineError> {
    let groups = group_by_entity(df, COUNTRY, YEAR, &params.entities)?;

    let mut rows: Vec<(String, f64, f64)> = Vec::new();
    for (entity, frame) in &groups {
        let at_year = filter_year(frame, YEAR, params.year)?;
        if at_year.height() == 0 {
            debug!(entity = entity.as_str(), year = params.year, "no row at target year");
            continue;
        }
        let at_year =
            coerce_numeric(&at_year, &[params.a.key.as_str(), params.b.key.as_str()])?;
        let a = at_year.column(params.a.key.as_str())?.f64()?.get(0);
        let b = at_year.column(params.b.key.as_str())?.f64()?.get(0);
        match (a, b) {
            (Some(a), Some(b)) => rows.push((entity.clone(), a, b)),
            _ => debug!(entity = entity.as_str(), "missing indicator value, skipped"),
        }
    }
    rows.sort_by(|x, y| y.1.partial_cmp(&x.1).unwrap_or(std::cmp::Ordering::Equal));
    info!(
        year = params.year,
        entities = rows.len(),
        "prepared grouped-bar table"
    );

    let table = DataFrame::new(vec![
        Column::new(
            COUNTRY.into(),
            rows.iter().map(|r| r.0.clone()).collect::<Vec<String>>(),
        ),
        Column::new(
            params.a.label.as_str().into(),
            rows.iter().map(|r| r.1).collect::<Vec<f64>>(),
        ),
        Column::new(
            params.b.label.as_str().into(),
            rows.iter().map(|r| r.2).collect::<Vec<f64>>(),
        ),
    ])?;

    Ok(PreparedChart {
        input: ChartInput::Table(table),
        spec: RenderSpec {
            kind: ChartKind::GroupedBars,
            title: params.title.clone(),
            x_label: params.x_label.clone(),
            y_label: params.y_label.clone(),
            x_column: COUNTRY.to_string(),
            value_columns: vec![params.a.label.clone(), params.b.label.clone()],
            color_column: None,
            group_column: None,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndicatorLabel;

    fn params(entities: &[&str]) -> BarsParams {
        BarsParams {
            year: 2024,
            entities: entities.iter().map(|e| e.to_string()).collect(),
            a: IndicatorLabel {
                key: "men".to_string(),
                label: "Men (15+)".to_string(),
            },
            b: IndicatorLabel {
                key: "women".to_string(),
                label: "Women (15+)".to_string(),
            },
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
        }
    }

    #[test]
    fn entities_missing_either_value_are_skipped_and_rows_sort_descending() {
        let df = DataFrame::new(vec![
            Column::new(
                "country".into(),
                vec!["Peru", "Chile", "Haiti", "Cuba"],
            ),
            Column::new("year".into(), vec!["2024", "2024", "2024", "2023"]),
            Column::new(
                "men".into(),
                vec![Some("100"), Some("300"), None, Some("50")],
            ),
            Column::new(
                "women".into(),
                vec![Some("90"), Some("250"), Some("40"), Some("45")],
            ),
        ])
        .unwrap();
        let entities = ["Peru", "Chile", "Haiti", "Cuba"];

        let prepared = prepare(&df, &params(&entities)).unwrap();
        let ChartInput::Table(table) = &prepared.input else {
            panic!("expected a table input");
        };
        // Haiti lacks the men value, Cuba has no 2024 row
        assert_eq!(table.height(), 2);
        let countries: Vec<&str> = table
            .column("country")
            .unwrap()
            .str()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(countries, vec!["Chile", "Peru"]);
    }
}
