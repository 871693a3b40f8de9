//! Chart Export Module
//! Writes a prepared table plus its render spec as a JSON document, the
//! input format of external interactive renderers (choropleth maps).

use crate::charts::{ChartInput, RenderError, RenderSpec, Renderer};
use polars::prelude::*;
use serde_json::{json, Map, Value};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// Serializes prepared chart data instead of drawing it.
#[derive(Debug, Default)]
pub struct JsonExporter;

impl Renderer for JsonExporter {
    fn render(&self, input: &ChartInput, spec: &RenderSpec, out: &Path) -> Result<(), RenderError> {
        let table = match input {
            ChartInput::Table(table) => table,
            _ => return Err(RenderError::InputMismatch),
        };
        let rows = table_rows(table, spec)?;
        if rows.is_empty() {
            return Err(RenderError::EmptyInput);
        }

        let n_rows = rows.len();
        let doc = json!({ "spec": spec, "rows": rows });
        let file = BufWriter::new(File::create(out)?);
        serde_json::to_writer_pretty(file, &doc)?;
        info!(path = %out.display(), rows = n_rows, "exported chart data");
        Ok(())
    }
}

/// One JSON object per table row, restricted to the columns the spec names.
fn table_rows(table: &DataFrame, spec: &RenderSpec) -> Result<Vec<Value>, RenderError> {
    let mut columns: Vec<&str> = vec![spec.x_column.as_str()];
    if let Some(color) = &spec.color_column {
        columns.push(color.as_str());
    }
    if let Some(group) = &spec.group_column {
        columns.push(group.as_str());
    }
    columns.extend(spec.value_columns.iter().map(String::as_str));

    let mut rows = vec![Map::new(); table.height()];
    for name in columns {
        let column = table
            .column(name)
            .map_err(|_| RenderError::MissingColumn(name.to_string()))?;
        match column.dtype() {
            DataType::Float64 => {
                for (row, value) in column.f64()?.into_iter().enumerate() {
                    rows[row].insert(name.to_string(), json!(value));
                }
            }
            _ => {
                let casted = column.cast(&DataType::String)?;
                for (row, value) in casted.str()?.into_iter().enumerate() {
                    rows[row].insert(name.to_string(), json!(value));
                }
            }
        }
    }
    Ok(rows.into_iter().map(Value::Object).collect())
}
