//! Wide-Matrix Builder Module
//! Aligns per-entity (or per-indicator) series on a shared year axis.

use super::ReshapeError;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// How a `WideMatrix` is densified. Fill is always an explicit caller
/// choice; the builder itself never replaces a missing cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPolicy {
    /// Missing cells become 0.0 (stacked/area charts).
    Zero,
    /// Missing cells take their column's mean over present cells
    /// (heatmap normalization). An all-missing column fills with 0.0.
    ColumnMean,
}

/// Year-indexed rows, series-indexed columns, one indicator's values.
/// Cells are missing (`None`) until an explicit fill.
#[derive(Debug, Clone)]
pub struct WideMatrix {
    years: Vec<i32>,
    labels: Vec<String>,
    /// Column-major: `cells[col][row]`.
    cells: Vec<Vec<Option<f64>>>,
}

impl WideMatrix {
    /// Align one indicator across per-entity frames on the union of their
    /// years. Rows missing for an entity stay missing; rows where every
    /// entity is missing are dropped. Years sort ascending.
    pub fn from_entity_tables(
        tables: &[(String, DataFrame)],
        year_col: &str,
        indicator: &str,
    ) -> Result<Self, ReshapeError> {
        let mut series = Vec::with_capacity(tables.len());
        for (label, frame) in tables {
            if frame.column(indicator).is_err() {
                debug!(entity = label.as_str(), indicator, "indicator column absent, skipping");
                continue;
            }
            series.push((label.clone(), extract_series(frame, year_col, indicator)?));
        }
        Ok(Self::align(series))
    }

    /// Align several indicator columns of a single entity's frame on that
    /// frame's years (the heatmap orientation: columns are indicators).
    pub fn from_indicators(
        frame: &DataFrame,
        year_col: &str,
        indicators: &[String],
    ) -> Result<Self, ReshapeError> {
        let mut series = Vec::with_capacity(indicators.len());
        for indicator in indicators {
            if frame.column(indicator).is_err() {
                return Err(ReshapeError::MissingColumn(indicator.clone()));
            }
            series.push((indicator.clone(), extract_series(frame, year_col, indicator)?));
        }
        Ok(Self::align(series))
    }

    fn align(series: Vec<(String, BTreeMap<i32, Option<f64>>)>) -> Self {
        let mut all_years: BTreeSet<i32> = BTreeSet::new();
        for (_, map) in &series {
            all_years.extend(map.keys());
        }

        let mut years: Vec<i32> = all_years.into_iter().collect();
        let mut labels = Vec::with_capacity(series.len());
        let mut cells: Vec<Vec<Option<f64>>> = Vec::with_capacity(series.len());
        for (label, map) in &series {
            labels.push(label.clone());
            cells.push(
                years
                    .iter()
                    .map(|year| map.get(year).copied().flatten())
                    .collect(),
            );
        }

        // Drop rows where every series is missing.
        let keep: Vec<usize> = (0..years.len())
            .filter(|&row| cells.iter().any(|col| col[row].is_some()))
            .collect();
        if keep.len() != years.len() {
            years = keep.iter().map(|&row| years[row]).collect();
            for col in &mut cells {
                *col = keep.iter().map(|&row| col[row]).collect();
            }
        }

        WideMatrix { years, labels, cells }
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty() || self.labels.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<f64> {
        self.cells[col][row]
    }

    /// Densify with the given policy. The only place missing cells turn
    /// into concrete values.
    pub fn fill(&self, policy: FillPolicy) -> DenseMatrix {
        let cells = self
            .cells
            .iter()
            .map(|col| match policy {
                FillPolicy::Zero => col.iter().map(|cell| cell.unwrap_or(0.0)).collect(),
                FillPolicy::ColumnMean => {
                    let present: Vec<f64> = col.iter().filter_map(|cell| *cell).collect();
                    let fill = if present.is_empty() {
                        0.0
                    } else {
                        present.iter().sum::<f64>() / present.len() as f64
                    };
                    col.iter().map(|cell| cell.unwrap_or(fill)).collect()
                }
            })
            .collect();
        DenseMatrix {
            years: self.years.clone(),
            labels: self.labels.clone(),
            cells,
        }
    }
}

/// A filled wide matrix: no missing cells.
#[derive(Debug, Clone)]
pub struct DenseMatrix {
    years: Vec<i32>,
    labels: Vec<String>,
    /// Column-major: `cells[col][row]`.
    cells: Vec<Vec<f64>>,
}

impl DenseMatrix {
    pub fn new(years: Vec<i32>, labels: Vec<String>, cells: Vec<Vec<f64>>) -> Self {
        DenseMatrix { years, labels, cells }
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn n_rows(&self) -> usize {
        self.years.len()
    }

    pub fn n_cols(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty() || self.labels.is_empty()
    }

    pub fn column(&self, col: usize) -> &[f64] {
        &self.cells[col]
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.cells[col][row]
    }

    /// Replace series labels (e.g. semantic keys with display names).
    pub fn relabel(&mut self, labels: Vec<String>) -> Result<(), ReshapeError> {
        if labels.len() != self.labels.len() {
            return Err(ReshapeError::LabelCount {
                expected: self.labels.len(),
                got: labels.len(),
            });
        }
        self.labels = labels;
        Ok(())
    }

    /// Drop columns whose every value is zero. A stacked-area renderer must
    /// not draw a zero-width band with a legend entry.
    pub fn prune_zero_columns(self) -> DenseMatrix {
        let keep: Vec<usize> = (0..self.labels.len())
            .filter(|&col| self.cells[col].iter().any(|&v| v != 0.0))
            .collect();
        if keep.len() == self.labels.len() {
            return self;
        }
        debug!(pruned = self.labels.len() - keep.len(), "dropped all-zero columns");
        DenseMatrix {
            years: self.years,
            labels: keep.iter().map(|&col| self.labels[col].clone()).collect(),
            cells: keep.iter().map(|&col| self.cells[col].clone()).collect(),
        }
    }
}

/// Extract (year -> value) for one column, years rounded to integers.
/// Duplicate years keep the last value seen.
fn extract_series(
    frame: &DataFrame,
    year_col: &str,
    value_col: &str,
) -> Result<BTreeMap<i32, Option<f64>>, ReshapeError> {
    let years = frame
        .column(year_col)
        .map_err(|_| ReshapeError::MissingColumn(year_col.to_string()))?
        .cast(&DataType::Float64)?;
    let years = years.f64()?;
    let values = frame.column(value_col)?.cast(&DataType::Float64)?;
    let values = values.f64()?;

    let mut map = BTreeMap::new();
    for row in 0..frame.height() {
        if let Some(year) = years.get(row) {
            if year.is_finite() {
                map.insert(year as i32, values.get(row));
            }
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity_frame(years: &[&str], values: &[Option<&str>]) -> DataFrame {
        DataFrame::new(vec![
            Column::new("year".into(), years.to_vec()),
            Column::new("v".into(), values.to_vec()),
        ])
        .unwrap()
    }

    fn three_entities() -> Vec<(String, DataFrame)> {
        vec![
            (
                "A".to_string(),
                entity_frame(&["2010", "2011"], &[Some("1"), Some("2")]),
            ),
            ("B".to_string(), entity_frame(&["2010"], &[Some("3")])),
            ("C".to_string(), entity_frame(&["2011"], &[Some("4")])),
        ]
    }

    #[test]
    fn outer_join_aligns_on_union_of_years() {
        let wide = WideMatrix::from_entity_tables(&three_entities(), "year", "v").unwrap();
        assert_eq!(wide.years(), &[2010, 2011]);
        assert_eq!(wide.labels(), &["A", "B", "C"]);
        assert_eq!(wide.cell(0, 1), Some(3.0));
        assert_eq!(wide.cell(1, 1), None);
        assert_eq!(wide.cell(0, 2), None);
    }

    #[test]
    fn zero_fill_never_produces_nan() {
        let wide = WideMatrix::from_entity_tables(&three_entities(), "year", "v").unwrap();
        let dense = wide.fill(FillPolicy::Zero);
        for col in 0..dense.n_cols() {
            assert!(dense.column(col).iter().all(|v| !v.is_nan()));
        }
        assert_eq!(dense.value(1, 1), 0.0);
        assert_eq!(dense.value(0, 2), 0.0);
    }

    #[test]
    fn mean_fill_uses_present_cells_only() {
        let tables = vec![
            (
                "A".to_string(),
                entity_frame(&["2010", "2011", "2012"], &[Some("2"), None, Some("4")]),
            ),
            (
                "B".to_string(),
                entity_frame(&["2010", "2011", "2012"], &[Some("1"), Some("1"), Some("1")]),
            ),
        ];
        let wide = WideMatrix::from_entity_tables(&tables, "year", "v").unwrap();
        let dense = wide.fill(FillPolicy::ColumnMean);
        assert_eq!(dense.value(1, 0), 3.0);
    }

    #[test]
    fn all_missing_rows_are_dropped() {
        let tables = vec![
            (
                "A".to_string(),
                entity_frame(&["2010", "2011"], &[Some("1"), None]),
            ),
            (
                "B".to_string(),
                entity_frame(&["2010", "2011"], &[Some("2"), None]),
            ),
        ];
        let wide = WideMatrix::from_entity_tables(&tables, "year", "v").unwrap();
        assert_eq!(wide.years(), &[2010]);
    }

    #[test]
    fn prune_drops_all_zero_columns() {
        let dense = DenseMatrix::new(
            vec![2010, 2011],
            vec!["A".to_string(), "B".to_string()],
            vec![vec![1.0, 2.0], vec![0.0, 0.0]],
        );
        let pruned = dense.prune_zero_columns();
        assert_eq!(pruned.labels(), &["A"]);
        assert_eq!(pruned.n_cols(), 1);
    }
}
