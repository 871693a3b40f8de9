//! Gap/Comparison Series Module
//! Aligns two indicator columns on the year axis for gap-area charts.

use super::ReshapeError;
use polars::prelude::*;

/// One aligned row of a paired series. Either value may be missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairPoint {
    pub year: i32,
    pub a: Option<f64>,
    pub b: Option<f64>,
}

impl PairPoint {
    /// The gap `a - b`, defined only where both values are present and
    /// `a > b`.
    pub fn gap(&self) -> Option<f64> {
        match (self.a, self.b) {
            (Some(a), Some(b)) if a > b => Some(a - b),
            _ => None,
        }
    }
}

/// Two indicator series aligned ascending by year.
#[derive(Debug, Clone)]
pub struct PairedSeries {
    pub a_label: String,
    pub b_label: String,
    points: Vec<PairPoint>,
}

impl PairedSeries {
    pub fn points(&self) -> &[PairPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Indices of rows where `a > b`, computed pointwise per row (no
    /// interpolation between points).
    pub fn gap_rows(&self) -> Vec<usize> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.gap().is_some())
            .map(|(i, _)| i)
            .collect()
    }

    /// Maximal runs of consecutive gap rows as inclusive `(start, end)`
    /// index pairs, ready for shaded-region rendering.
    pub fn gap_segments(&self) -> Vec<(usize, usize)> {
        let mut segments = Vec::new();
        let mut current: Option<(usize, usize)> = None;
        for row in self.gap_rows() {
            current = match current {
                Some((start, end)) if row == end + 1 => Some((start, row)),
                Some(segment) => {
                    segments.push(segment);
                    Some((row, row))
                }
                None => Some((row, row)),
            };
        }
        if let Some(segment) = current {
            segments.push(segment);
        }
        segments
    }
}

/// Align two columns of one entity's frame into an ordered `(year, a, b)`
/// sequence, both values coerced to numeric. Rows without a parseable year
/// are dropped; missing values stay missing.
pub fn align_pair(
    frame: &DataFrame,
    year_col: &str,
    a_col: &str,
    b_col: &str,
    a_label: &str,
    b_label: &str,
) -> Result<PairedSeries, ReshapeError> {
    let years = frame
        .column(year_col)
        .map_err(|_| ReshapeError::MissingColumn(year_col.to_string()))?
        .cast(&DataType::Float64)?;
    let years = years.f64()?;
    let a = frame
        .column(a_col)
        .map_err(|_| ReshapeError::MissingColumn(a_col.to_string()))?
        .cast(&DataType::Float64)?;
    let a = a.f64()?;
    let b = frame
        .column(b_col)
        .map_err(|_| ReshapeError::MissingColumn(b_col.to_string()))?
        .cast(&DataType::Float64)?;
    let b = b.f64()?;

    let mut points = Vec::with_capacity(frame.height());
    for row in 0..frame.height() {
        if let Some(year) = years.get(row) {
            if year.is_finite() {
                points.push(PairPoint {
                    year: year as i32,
                    a: a.get(row),
                    b: b.get(row),
                });
            }
        }
    }
    points.sort_by_key(|p| p.year);

    Ok(PairedSeries {
        a_label: a_label.to_string(),
        b_label: b_label.to_string(),
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paired(values: &[(i32, Option<f64>, Option<f64>)]) -> PairedSeries {
        PairedSeries {
            a_label: "a".to_string(),
            b_label: "b".to_string(),
            points: values
                .iter()
                .map(|&(year, a, b)| PairPoint { year, a, b })
                .collect(),
        }
    }

    #[test]
    fn align_pair_sorts_by_year_and_coerces() {
        let frame = DataFrame::new(vec![
            Column::new("year".into(), vec!["2022", "2020", "2021"]),
            Column::new("need".into(), vec!["8", "5", "3"]),
            Column::new("treated".into(), vec!["2", "4", "bad"]),
        ])
        .unwrap();
        let pair = align_pair(&frame, "year", "need", "treated", "need", "treated").unwrap();
        let years: Vec<i32> = pair.points().iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2020, 2021, 2022]);
        assert_eq!(pair.points()[1].b, None);
    }

    #[test]
    fn gap_rows_are_pointwise_where_a_exceeds_b() {
        let pair = paired(&[
            (2020, Some(5.0), Some(4.0)),
            (2021, Some(3.0), Some(6.0)),
            (2022, Some(8.0), Some(2.0)),
        ]);
        assert_eq!(pair.gap_rows(), vec![0, 2]);
        assert_eq!(pair.points()[0].gap(), Some(1.0));
        assert_eq!(pair.points()[1].gap(), None);
    }

    #[test]
    fn missing_values_never_count_as_gaps() {
        let pair = paired(&[(2020, Some(5.0), None), (2021, None, Some(1.0))]);
        assert!(pair.gap_rows().is_empty());
    }

    #[test]
    fn gap_segments_are_maximal_runs() {
        let pair = paired(&[
            (2020, Some(5.0), Some(1.0)),
            (2021, Some(5.0), Some(1.0)),
            (2022, Some(1.0), Some(5.0)),
            (2023, Some(5.0), Some(1.0)),
        ]);
        assert_eq!(pair.gap_segments(), vec![(0, 1), (3, 3)]);
    }
}
