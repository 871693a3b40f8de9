//! Run Configuration Module
//! Column mapping and per-pipeline parameters, loaded from a JSON file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Semantic name of the entity (country) column after mapping.
pub const COUNTRY: &str = "country";
/// Semantic name of the ISO code column after mapping.
pub const CODE: &str = "code";
/// Semantic name of the year column after mapping.
pub const YEAR: &str = "year";

/// Sheet selector: 0-based index or sheet name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetRef {
    Index(usize),
    Name(String),
}

/// A workbook sheet to load: file path, sheet selector, header row offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetSource {
    pub path: PathBuf,
    pub sheet: SheetRef,
    /// Rows to skip before the header row (0 = first row is the header).
    #[serde(default)]
    pub header_row: usize,
}

/// Maps raw spreadsheet headers to semantic field names, resolved once at
/// load time. Downstream code never sees headers like "(Men, ages 15+).6".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMap {
    /// Raw header of the entity column (e.g. "Country").
    pub country: String,
    /// Raw header of the ISO code column, if the map pipeline is used.
    #[serde(default)]
    pub code: Option<String>,
    /// Raw header of the year column (e.g. "Years").
    pub year: String,
    /// Semantic indicator name -> raw header.
    #[serde(default)]
    pub indicators: BTreeMap<String, String>,
}

/// An indicator column plus the display label used on chart axes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorLabel {
    pub key: String,
    pub label: String,
}

/// Choropleth map preparation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapParams {
    pub year: i32,
    pub indicator: String,
    pub title: String,
}

/// Grouped bar chart parameters (two indicators per entity at one year).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarsParams {
    pub year: i32,
    pub entities: Vec<String>,
    pub a: IndicatorLabel,
    pub b: IndicatorLabel,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

/// Heatmap parameters (one entity, several indicators, z-scored).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapParams {
    pub entity: String,
    pub indicators: Vec<IndicatorLabel>,
    pub title: String,
    pub x_label: String,
}

/// Gap-area chart parameters (two indicators for one entity over time).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapParams {
    pub entity: String,
    pub a: IndicatorLabel,
    pub b: IndicatorLabel,
    pub gap_label: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

/// Stacked area chart parameters (one indicator across many entities).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaParams {
    pub entities: Vec<String>,
    pub indicator: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

/// Top-level run configuration: the source workbook, the column mapping and
/// the parameters of each requested pipeline. A pipeline left as `None` is
/// skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub source: SheetSource,
    /// Auxiliary area-grouping sheet; loaded when present, unused by the
    /// core pipelines.
    #[serde(default)]
    pub area_source: Option<SheetSource>,
    pub columns: ColumnMap,
    #[serde(default)]
    pub map: Option<MapParams>,
    #[serde(default)]
    pub bars: Option<BarsParams>,
    #[serde(default)]
    pub heatmap: Option<HeatmapParams>,
    #[serde(default)]
    pub gap: Option<GapParams>,
    #[serde(default)]
    pub area: Option<AreaParams>,
}
