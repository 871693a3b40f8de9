//! Static Chart Renderer
//! Draws grouped bars, heatmaps, gap-area and stacked-area charts to PNG
//! with Plotters.

use crate::charts::{ChartInput, ChartKind, RenderError, RenderSpec, Renderer};
use crate::reshape::{DenseMatrix, PairedSeries};
use plotters::prelude::*;
use polars::prelude::*;
use std::path::Path;
use tracing::info;

const STEEL_BLUE: RGBColor = RGBColor(70, 130, 180);
const LIGHT_CORAL: RGBColor = RGBColor(240, 128, 128);
const LINE_GREEN: RGBColor = RGBColor(0, 128, 0);
const CELL_BORDER: RGBColor = RGBColor(51, 51, 51);

/// Bar series colors, in series order.
const BAR_PALETTE: [RGBColor; 4] = [
    STEEL_BLUE,
    LIGHT_CORAL,
    RGBColor(44, 160, 44),
    RGBColor(255, 127, 14),
];

/// Stacked-area band colors.
const AREA_PALETTE: [RGBColor; 16] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
    RGBColor(57, 59, 121),
    RGBColor(99, 121, 57),
    RGBColor(140, 109, 49),
    RGBColor(132, 60, 57),
    RGBColor(214, 97, 107),
    RGBColor(82, 84, 163),
];

/// Diverging heatmap endpoints (cool / center / warm).
const COOL: RGBColor = RGBColor(59, 76, 192);
const CENTER: RGBColor = RGBColor(221, 221, 221);
const WARM: RGBColor = RGBColor(180, 4, 38);

/// Renders prepared charts to PNG files.
pub struct StaticRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for StaticRenderer {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 900,
        }
    }
}

impl Renderer for StaticRenderer {
    fn render(&self, input: &ChartInput, spec: &RenderSpec, out: &Path) -> Result<(), RenderError> {
        match (spec.kind, input) {
            (ChartKind::GroupedBars, ChartInput::Table(table)) => {
                self.draw_grouped_bars(table, spec, out)
            }
            (ChartKind::Heatmap, ChartInput::Matrix(matrix)) => {
                self.draw_heatmap(matrix, spec, out)
            }
            (ChartKind::GapArea, ChartInput::Pairs(pairs)) => self.draw_gap_area(pairs, spec, out),
            (ChartKind::StackedArea, ChartInput::Matrix(matrix)) => {
                self.draw_stacked_area(matrix, spec, out)
            }
            (ChartKind::Choropleth, _) => Err(RenderError::Unsupported(spec.kind)),
            _ => Err(RenderError::InputMismatch),
        }
    }
}

impl StaticRenderer {
    /// Grouped vertical bars: one slot per table row, one bar per value
    /// column inside the slot.
    fn draw_grouped_bars(
        &self,
        table: &DataFrame,
        spec: &RenderSpec,
        out: &Path,
    ) -> Result<(), RenderError> {
        let entities: Vec<String> = table
            .column(&spec.x_column)
            .map_err(|_| RenderError::MissingColumn(spec.x_column.clone()))?
            .str()?
            .into_iter()
            .map(|name| name.unwrap_or_default().to_string())
            .collect();
        if entities.is_empty() {
            return Err(RenderError::EmptyInput);
        }

        let mut series: Vec<Vec<f64>> = Vec::with_capacity(spec.value_columns.len());
        for name in &spec.value_columns {
            let values: Vec<f64> = table
                .column(name)
                .map_err(|_| RenderError::MissingColumn(name.clone()))?
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            series.push(values);
        }

        let n = entities.len();
        let y_max = series
            .iter()
            .flatten()
            .fold(1.0f64, |acc, &v| acc.max(v))
            * 1.1;

        let root = BitMapBackend::new(out, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(backend)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(&spec.title, ("sans-serif", 30))
            .margin(20)
            .x_label_area_size(140)
            .y_label_area_size(100)
            .build_cartesian_2d(-0.6f64..(n as f64 - 0.4), 0.0f64..y_max)
            .map_err(backend)?;

        let slot_label = |x: &f64| {
            let idx = x.round();
            if (x - idx).abs() > 0.3 || idx < 0.0 {
                return String::new();
            }
            entities.get(idx as usize).cloned().unwrap_or_default()
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&slot_label)
            .x_label_style(("sans-serif", 14).into_font().transform(FontTransform::Rotate90))
            .y_label_formatter(&|v| thousands(*v))
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .draw()
            .map_err(backend)?;

        let slot = 0.8;
        let bar = slot / series.len() as f64;
        for (s, values) in series.iter().enumerate() {
            let color = BAR_PALETTE[s % BAR_PALETTE.len()];
            chart
                .draw_series(values.iter().enumerate().map(|(i, &v)| {
                    let x0 = i as f64 - slot / 2.0 + s as f64 * bar;
                    Rectangle::new([(x0, 0.0), (x0 + bar * 0.92, v)], color.filled())
                }))
                .map_err(backend)?
                .label(spec.value_columns[s].as_str())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 6), (x + 12, y + 6)], color.filled())
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .border_style(BLACK)
            .background_style(WHITE.mix(0.85))
            .draw()
            .map_err(backend)?;
        root.present().map_err(backend)?;
        info!(path = %out.display(), "wrote grouped bar chart");
        Ok(())
    }

    /// Heatmap of a normalized matrix: years across, series down, diverging
    /// colors centered at zero and clamped to ±2.
    fn draw_heatmap(
        &self,
        matrix: &DenseMatrix,
        spec: &RenderSpec,
        out: &Path,
    ) -> Result<(), RenderError> {
        if matrix.is_empty() {
            return Err(RenderError::EmptyInput);
        }
        let years = matrix.years();
        let labels = matrix.labels();
        let (n_years, n_series) = (years.len() as i32, labels.len() as i32);

        let root = BitMapBackend::new(out, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(backend)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(&spec.title, ("sans-serif", 30))
            .margin(20)
            .x_label_area_size(80)
            .y_label_area_size(360)
            .build_cartesian_2d(0..n_years, 0..n_series)
            .map_err(backend)?;

        let year_label = |x: &i32| {
            years
                .get(*x as usize)
                .map(|y| y.to_string())
                .unwrap_or_default()
        };
        let series_label = |y: &i32| labels.get(*y as usize).cloned().unwrap_or_default();
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(years.len().min(40))
            .y_labels(labels.len())
            .x_label_formatter(&year_label)
            .y_label_formatter(&series_label)
            .x_label_style(("sans-serif", 12).into_font().transform(FontTransform::Rotate90))
            .y_label_style(("sans-serif", 13))
            .x_desc(spec.x_label.as_str())
            .draw()
            .map_err(backend)?;

        for col in 0..labels.len() {
            chart
                .draw_series((0..years.len()).map(|row| {
                    let color = diverging_color(matrix.value(row, col));
                    Rectangle::new(
                        [(row as i32, col as i32), (row as i32 + 1, col as i32 + 1)],
                        color.filled(),
                    )
                }))
                .map_err(backend)?;
            chart
                .draw_series((0..years.len()).map(|row| {
                    Rectangle::new(
                        [(row as i32, col as i32), (row as i32 + 1, col as i32 + 1)],
                        CELL_BORDER,
                    )
                }))
                .map_err(backend)?;
        }

        root.present().map_err(backend)?;
        info!(path = %out.display(), "wrote heatmap");
        Ok(())
    }

    /// Two lines plus shaded regions over the sub-intervals where the first
    /// series exceeds the second.
    fn draw_gap_area(
        &self,
        pairs: &PairedSeries,
        spec: &RenderSpec,
        out: &Path,
    ) -> Result<(), RenderError> {
        if pairs.is_empty() {
            return Err(RenderError::EmptyInput);
        }
        let points = pairs.points();
        let x_min = points.first().map(|p| p.year).unwrap_or(0) as f64;
        let x_max = points.last().map(|p| p.year).unwrap_or(0) as f64;
        let y_max = points
            .iter()
            .flat_map(|p| [p.a, p.b])
            .flatten()
            .fold(1.0f64, f64::max)
            * 1.1;

        let root = BitMapBackend::new(out, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(backend)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(&spec.title, ("sans-serif", 30))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(110)
            .build_cartesian_2d(x_min..x_max, 0.0f64..y_max)
            .map_err(backend)?;
        chart
            .configure_mesh()
            .x_label_formatter(&|x| format!("{}", x.round() as i64))
            .y_label_formatter(&|v| thousands(*v))
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .draw()
            .map_err(backend)?;

        // Shaded gap: one polygon per maximal run of gap rows (pointwise,
        // never interpolated into non-gap intervals).
        let fill = LIGHT_CORAL.mix(0.4);
        let gap_label = spec.value_columns.get(2);
        for (i, (start, end)) in pairs.gap_segments().into_iter().enumerate() {
            if end == start {
                continue;
            }
            let mut polygon: Vec<(f64, f64)> = Vec::with_capacity((end - start + 1) * 2);
            for p in &points[start..=end] {
                if let Some(a) = p.a {
                    polygon.push((p.year as f64, a));
                }
            }
            for p in points[start..=end].iter().rev() {
                if let Some(b) = p.b {
                    polygon.push((p.year as f64, b));
                }
            }
            let band = chart
                .draw_series(std::iter::once(Polygon::new(polygon, fill.filled())))
                .map_err(backend)?;
            if i == 0 {
                if let Some(label) = gap_label {
                    band.label(label.as_str()).legend(move |(x, y)| {
                        Rectangle::new([(x, y - 6), (x + 12, y + 6)], fill.filled())
                    });
                }
            }
        }

        let a_points: Vec<(f64, f64)> = points
            .iter()
            .filter_map(|p| p.a.map(|v| (p.year as f64, v)))
            .collect();
        let b_points: Vec<(f64, f64)> = points
            .iter()
            .filter_map(|p| p.b.map(|v| (p.year as f64, v)))
            .collect();
        chart
            .draw_series(LineSeries::new(a_points, RED.stroke_width(3)))
            .map_err(backend)?
            .label(pairs.a_label.as_str())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 14, y)], RED.stroke_width(3)));
        chart
            .draw_series(LineSeries::new(b_points, LINE_GREEN.stroke_width(3)))
            .map_err(backend)?
            .label(pairs.b_label.as_str())
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 14, y)], LINE_GREEN.stroke_width(3))
            });

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .border_style(BLACK)
            .background_style(WHITE.mix(0.85))
            .draw()
            .map_err(backend)?;
        root.present().map_err(backend)?;
        info!(path = %out.display(), "wrote gap-area chart");
        Ok(())
    }

    /// Stacked area: one cumulative band per matrix column, drawn in label
    /// order. Expects a zero-filled, pruned matrix.
    fn draw_stacked_area(
        &self,
        matrix: &DenseMatrix,
        spec: &RenderSpec,
        out: &Path,
    ) -> Result<(), RenderError> {
        if matrix.is_empty() {
            return Err(RenderError::EmptyInput);
        }
        let years = matrix.years();
        let x_min = years[0] as f64;
        let x_max = years[years.len() - 1] as f64;
        let totals: Vec<f64> = (0..matrix.n_rows())
            .map(|row| (0..matrix.n_cols()).map(|col| matrix.value(row, col)).sum())
            .collect();
        let y_max = totals.iter().fold(1.0f64, |acc, &v| acc.max(v)) * 1.05;

        let root = BitMapBackend::new(out, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(backend)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(&spec.title, ("sans-serif", 30))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(120)
            .build_cartesian_2d(x_min..x_max, 0.0f64..y_max)
            .map_err(backend)?;
        chart
            .configure_mesh()
            .x_label_formatter(&|x| format!("{}", x.round() as i64))
            .y_label_formatter(&|v| thousands(*v))
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .draw()
            .map_err(backend)?;

        let mut bottom = vec![0.0f64; matrix.n_rows()];
        for col in 0..matrix.n_cols() {
            let color = AREA_PALETTE[col % AREA_PALETTE.len()];
            let top: Vec<f64> = bottom
                .iter()
                .enumerate()
                .map(|(row, &base)| base + matrix.value(row, col))
                .collect();

            let mut band: Vec<(f64, f64)> = years
                .iter()
                .zip(&top)
                .map(|(&year, &v)| (year as f64, v))
                .collect();
            band.extend(
                years
                    .iter()
                    .zip(&bottom)
                    .rev()
                    .map(|(&year, &v)| (year as f64, v)),
            );
            chart
                .draw_series(std::iter::once(Polygon::new(band, color.mix(0.8).filled())))
                .map_err(backend)?
                .label(matrix.labels()[col].as_str())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 6), (x + 12, y + 6)], color.filled())
                });

            bottom = top;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .border_style(BLACK)
            .background_style(WHITE.mix(0.85))
            .draw()
            .map_err(backend)?;
        root.present().map_err(backend)?;
        info!(path = %out.display(), "wrote stacked area chart");
        Ok(())
    }
}

fn backend<E: std::fmt::Display>(error: E) -> RenderError {
    RenderError::Backend(error.to_string())
}

/// Map a z-score to a diverging color, clamped to ±2.
fn diverging_color(value: f64) -> RGBColor {
    let t = (value / 2.0).clamp(-1.0, 1.0);
    let (to, f) = if t < 0.0 { (COOL, -t) } else { (WARM, t) };
    RGBColor(
        lerp(CENTER.0, to.0, f),
        lerp(CENTER.1, to.1, f),
        lerp(CENTER.2, to.2, f),
    )
}

fn lerp(from: u8, to: u8, t: f64) -> u8 {
    (f64::from(from) + (f64::from(to) - f64::from(from)) * t).round() as u8
}

/// Format an axis value with thousands separators ("1,234,567").
fn thousands(value: f64) -> String {
    let n = value.round() as i64;
    let digits = n.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_groups_digits() {
        assert_eq!(thousands(1234567.0), "1,234,567");
        assert_eq!(thousands(999.0), "999");
        assert_eq!(thousands(-1000.0), "-1,000");
        assert_eq!(thousands(0.0), "0");
    }

    #[test]
    fn diverging_color_is_centered_and_clamped() {
        assert_eq!(diverging_color(0.0).rgb(), CENTER.rgb());
        assert_eq!(diverging_color(2.0).rgb(), WARM.rgb());
        assert_eq!(diverging_color(100.0).rgb(), WARM.rgb());
        assert_eq!(diverging_color(-2.0).rgb(), COOL.rgb());
    }
}
