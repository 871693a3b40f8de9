//! Data module - workbook/CSV loading and numeric coercion

mod coerce;
mod loader;

pub use coerce::{coerce_numeric, CoerceError};
pub use loader::{apply_column_map, load, load_csv, load_sheet, LoaderError};
