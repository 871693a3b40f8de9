//! Table Loader Module
//! Reads a workbook sheet (or CSV file) into a Polars DataFrame and applies
//! the column mapping.

use crate::config::{ColumnMap, SheetRef, SheetSource, CODE, COUNTRY, YEAR};
use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("source file not found: {0}")]
    SourceNotFound(String),
    #[error("sheet not found: {0}")]
    SheetNotFound(String),
    #[error("expected column missing: {0}")]
    Schema(String),
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("table error: {0}")]
    Polars(#[from] PolarsError),
}

/// Load a workbook sheet and resolve raw headers into semantic names.
///
/// Each call re-reads the source; nothing is cached.
pub fn load(source: &SheetSource, map: &ColumnMap) -> Result<DataFrame, LoaderError> {
    let mut df = load_sheet(source)?;
    apply_column_map(&mut df, map)?;
    info!(
        rows = df.height(),
        columns = df.width(),
        path = %source.path.display(),
        "loaded observation table"
    );
    Ok(df)
}

/// Load a workbook sheet as an all-string DataFrame. Column types are left
/// to the explicit coercion step.
pub fn load_sheet(source: &SheetSource) -> Result<DataFrame, LoaderError> {
    if !source.path.is_file() {
        return Err(LoaderError::SourceNotFound(
            source.path.display().to_string(),
        ));
    }

    let mut workbook = open_workbook_auto(&source.path)?;
    let sheet_names = workbook.sheet_names();
    let sheet_name = match &source.sheet {
        SheetRef::Index(index) => sheet_names
            .get(*index)
            .cloned()
            .ok_or_else(|| LoaderError::SheetNotFound(format!("index {index}")))?,
        SheetRef::Name(name) => {
            if !sheet_names.iter().any(|n| n == name) {
                return Err(LoaderError::SheetNotFound(name.clone()));
            }
            name.clone()
        }
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut rows = range.rows().skip(source.header_row);

    let raw_headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .enumerate()
            .map(|(i, cell)| header_cell(cell, i))
            .collect(),
        None => return Ok(DataFrame::empty()),
    };
    let headers = dedup_headers(&raw_headers);

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    let mut dropped_headers = 0usize;
    for row in rows {
        // The source format repeats the header line mid-table; discard any
        // row whose cells reproduce it rather than assume a fixed offset.
        if is_header_row(row, &raw_headers) {
            dropped_headers += 1;
            continue;
        }
        for (i, column) in columns.iter_mut().enumerate() {
            column.push(row.get(i).and_then(cell_value));
        }
    }
    if dropped_headers > 0 {
        debug!(sheet = %sheet_name, count = dropped_headers, "dropped repeated header rows");
    }

    let columns: Vec<Column> = headers
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name.into(), values))
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Load a CSV file using Polars lazy reader.
pub fn load_csv(path: &str) -> Result<DataFrame, LoaderError> {
    if !std::path::Path::new(path).is_file() {
        return Err(LoaderError::SourceNotFound(path.to_string()));
    }

    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .finish()?
        .collect()?;
    Ok(df)
}

/// Rename raw spreadsheet headers to their semantic names. Fails with
/// `Schema` if a mapped header is absent.
pub fn apply_column_map(df: &mut DataFrame, map: &ColumnMap) -> Result<(), LoaderError> {
    rename_required(df, &map.country, COUNTRY)?;
    if let Some(code) = &map.code {
        rename_required(df, code, CODE)?;
    }
    rename_required(df, &map.year, YEAR)?;
    for (semantic, raw) in &map.indicators {
        rename_required(df, raw, semantic)?;
    }
    Ok(())
}

fn rename_required(df: &mut DataFrame, raw: &str, semantic: &str) -> Result<(), LoaderError> {
    if df.column(raw).is_err() {
        return Err(LoaderError::Schema(raw.to_string()));
    }
    df.rename(raw, semantic.into())?;
    Ok(())
}

fn header_cell(cell: &Data, index: usize) -> String {
    let name = cell.to_string();
    if name.trim().is_empty() {
        // Blank header cells get positional names, the convention the
        // source data itself uses ("Unnamed: 43").
        format!("Unnamed: {index}")
    } else {
        name
    }
}

/// Suffix duplicate headers with ".1", ".2", ... so each column name is
/// unique while the first occurrence keeps the original name.
fn dedup_headers(raw: &[String]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    raw.iter()
        .map(|name| {
            let count = seen.entry(name.as_str()).or_insert(0);
            let unique = if *count == 0 {
                name.clone()
            } else {
                format!("{name}.{count}")
            };
            *count += 1;
            unique
        })
        .collect()
}

fn is_header_row(row: &[Data], raw_headers: &[String]) -> bool {
    row.len() == raw_headers.len()
        && row
            .iter()
            .enumerate()
            .all(|(i, cell)| header_cell(cell, i) == raw_headers[i])
}

fn cell_value(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        other => {
            let value = other.to_string();
            if value.is_empty() {
                None
            } else {
                Some(value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_headers_get_positional_suffixes() {
        let raw = vec![
            "Country".to_string(),
            "All ages".to_string(),
            "All ages".to_string(),
            "All ages".to_string(),
        ];
        assert_eq!(
            dedup_headers(&raw),
            vec!["Country", "All ages", "All ages.1", "All ages.2"]
        );
    }

    #[test]
    fn blank_header_cells_are_named_by_position() {
        assert_eq!(header_cell(&Data::Empty, 43), "Unnamed: 43");
        assert_eq!(header_cell(&Data::String("Years".into()), 2), "Years");
    }

    #[test]
    fn header_row_detection_requires_exact_match() {
        let headers = vec!["Country".to_string(), "Years".to_string()];
        let dup = vec![
            Data::String("Country".into()),
            Data::String("Years".into()),
        ];
        let data = vec![Data::String("Colombia".into()), Data::Float(2024.0)];
        assert!(is_header_row(&dup, &headers));
        assert!(!is_header_row(&data, &headers));
    }
}
