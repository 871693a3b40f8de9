//! Numeric Coercion Module
//! Converts string-typed columns to Float64; unparsable cells become nulls.

use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CoerceError {
    #[error("column not found: {0}")]
    MissingColumn(String),
    #[error("table error: {0}")]
    Polars(#[from] PolarsError),
}

/// Cast the named columns to `Float64`.
///
/// Values that cannot be parsed become nulls (the missing marker), not
/// errors; nulls never turn into zeros here. Re-applying to an already
/// numeric column is a no-op.
pub fn coerce_numeric(df: &DataFrame, columns: &[&str]) -> Result<DataFrame, CoerceError> {
    let mut out = df.clone();
    for &name in columns {
        let column = out
            .column(name)
            .map_err(|_| CoerceError::MissingColumn(name.to_string()))?;
        let nulls_before = column.null_count();
        let casted = column.cast(&DataType::Float64)?;
        let coerced = casted.null_count().saturating_sub(nulls_before);
        if coerced > 0 {
            debug!(column = name, cells = coerced, "non-numeric cells became null");
        }
        out.with_column(casted)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("x".into(), vec![Some("10.5"), Some("bad"), Some("12.0")]),
            Column::new("label".into(), vec!["a", "b", "c"]),
        ])
        .unwrap()
    }

    #[test]
    fn unparsable_values_become_null() {
        let coerced = coerce_numeric(&string_frame(), &["x"]).unwrap();
        let x = coerced.column("x").unwrap().f64().unwrap();
        assert_eq!(x.get(0), Some(10.5));
        assert_eq!(x.get(1), None);
        assert_eq!(x.get(2), Some(12.0));
    }

    #[test]
    fn coercion_is_idempotent_on_numeric_columns() {
        let once = coerce_numeric(&string_frame(), &["x"]).unwrap();
        let twice = coerce_numeric(&once, &["x"]).unwrap();
        let first: Vec<Option<f64>> = once.column("x").unwrap().f64().unwrap().into_iter().collect();
        let second: Vec<Option<f64>> = twice.column("x").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = coerce_numeric(&string_frame(), &["absent"]).unwrap_err();
        assert!(matches!(err, CoerceError::MissingColumn(_)));
    }
}
