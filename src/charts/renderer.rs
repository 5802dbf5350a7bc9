//! Static Chart Renderer
//! Draws report charts to PNG files with plotters, on a dark theme.
//!
//! Layout per chart kind:
//! - Line: categories along x (years or months), one marker per row
//! - Bar: one bar per category
//! - Pie: one slice per category, sized by the value column
//! - GroupedBar: categories along x, one colored bar per series value, legend top-right

use super::layout::{charts_for, ChartData, ChartKind};
use crate::report::{AggregateTable, Report};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use rayon::prelude::*;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

// Dark theme colors
const BACKGROUND: RGBColor = RGBColor(17, 17, 17);
const FOREGROUND: RGBColor = RGBColor(242, 245, 250);
const GRID: RGBColor = RGBColor(40, 52, 66);
const MUTED: RGBColor = RGBColor(150, 150, 150);

pub const PALETTE: [RGBColor; 10] = [
    RGBColor(99, 110, 250),
    RGBColor(239, 85, 59),
    RGBColor(0, 204, 150),
    RGBColor(171, 99, 250),
    RGBColor(255, 161, 90),
    RGBColor(25, 211, 243),
    RGBColor(255, 102, 146),
    RGBColor(182, 232, 128),
    RGBColor(255, 151, 255),
    RGBColor(254, 203, 82),
];

pub const DEFAULT_WIDTH: u32 = 1200;
pub const DEFAULT_HEIGHT: u32 = 700;

const FONT: &str = "sans-serif";

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to draw chart {chart}: {message}")]
    Drawing { chart: String, message: String },
    #[error("Failed to prepare chart directory: {0}")]
    Io(#[from] std::io::Error),
}

type DrawResult<T> = Result<T, String>;

fn draw_err<E: Display>(e: E) -> String {
    e.to_string()
}

/// Renders report charts as PNG images.
#[derive(Debug, Clone, Copy)]
pub struct StaticChartRenderer {
    width: u32,
    height: u32,
}

impl Default for StaticChartRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl StaticChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(200),
            height: height.max(150),
        }
    }

    /// Render all charts of a report into `out_dir`, one PNG per table.
    ///
    /// Charts are independent, so they are drawn in parallel.
    pub fn render_report(&self, report: &Report, out_dir: &Path) -> Result<Vec<PathBuf>, ChartError> {
        std::fs::create_dir_all(out_dir)?;
        let charts = charts_for(report);

        let paths = charts
            .par_iter()
            .map(|chart| {
                let path = out_dir.join(format!("{}.png", chart.name));
                self.render_chart(chart, &path)?;
                Ok(path)
            })
            .collect::<Result<Vec<PathBuf>, ChartError>>()?;

        info!(
            kind = %report.kind(),
            charts = paths.len(),
            dir = %out_dir.display(),
            "charts rendered"
        );
        Ok(paths)
    }

    /// Render a single chart to `path`.
    pub fn render_chart(&self, chart: &ChartData<'_>, path: &Path) -> Result<(), ChartError> {
        debug!(chart = %chart.name, rows = chart.table.height(), "rendering chart");
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();

        Self::draw(&root, chart)
            .and_then(|_| root.present().map_err(draw_err))
            .map_err(|message| ChartError::Drawing {
                chart: chart.name.clone(),
                message,
            })
    }

    fn draw<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, chart: &ChartData<'_>) -> DrawResult<()> {
        area.fill(&BACKGROUND).map_err(draw_err)?;

        let labels = column_labels(chart.table, chart.x);
        let values: Vec<f64> = chart
            .table
            .f64_values(chart.y)
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()).unwrap_or(0.0))
            .collect();

        if labels.is_empty() {
            return Self::draw_empty(area, &chart.title);
        }

        match chart.kind {
            ChartKind::Line => Self::draw_line(area, chart, &labels, &values),
            ChartKind::Bar => Self::draw_bars(area, chart, &labels, &values),
            ChartKind::Pie => Self::draw_pie(area, chart, &labels, &values),
            ChartKind::GroupedBar => {
                let series = chart
                    .series
                    .map(|s| column_labels(chart.table, s))
                    .unwrap_or_else(|| vec![String::new(); labels.len()]);
                Self::draw_grouped_bars(area, chart, &labels, &series, &values)
            }
        }
    }

    fn draw_empty<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, title: &str) -> DrawResult<()> {
        let titled = area
            .titled(title, (FONT, 28).into_font().color(&FOREGROUND))
            .map_err(draw_err)?;
        let (w, h) = titled.dim_in_pixel();
        titled
            .draw(&Text::new(
                "No data",
                (w as i32 / 2 - 40, h as i32 / 2),
                (FONT, 24).into_font().color(&MUTED),
            ))
            .map_err(draw_err)?;
        Ok(())
    }

    fn draw_line<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        chart: &ChartData<'_>,
        labels: &[String],
        values: &[f64],
    ) -> DrawResult<()> {
        let (y_min, y_max) = value_range(values);
        let n = labels.len();

        let mut ctx = ChartBuilder::on(area)
            .caption(&chart.title, (FONT, 28).into_font().color(&FOREGROUND))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_min..y_max)
            .map_err(draw_err)?;

        let formatter = |x: &f64| category_label(labels, *x);
        ctx.configure_mesh()
            .bold_line_style(GRID.stroke_width(1))
            .light_line_style(BACKGROUND.stroke_width(0))
            .axis_style(MUTED.stroke_width(1))
            .label_style((FONT, 15).into_font().color(&FOREGROUND))
            .axis_desc_style((FONT, 17).into_font().color(&FOREGROUND))
            .x_labels(n.min(12))
            .x_label_formatter(&formatter)
            .x_desc(chart.x)
            .y_desc(chart.y)
            .draw()
            .map_err(draw_err)?;

        let color = PALETTE[0];
        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v))
            .collect();

        ctx.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(3)))
            .map_err(draw_err)?;
        ctx.draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, color.filled())),
        )
        .map_err(draw_err)?;
        Ok(())
    }

    fn draw_bars<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        chart: &ChartData<'_>,
        labels: &[String],
        values: &[f64],
    ) -> DrawResult<()> {
        let (y_min, y_max) = value_range(values);
        let n = labels.len();

        let mut ctx = ChartBuilder::on(area)
            .caption(&chart.title, (FONT, 28).into_font().color(&FOREGROUND))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_min..y_max)
            .map_err(draw_err)?;

        let formatter = |x: &f64| category_label(labels, *x);
        ctx.configure_mesh()
            .disable_x_mesh()
            .bold_line_style(GRID.stroke_width(1))
            .light_line_style(BACKGROUND.stroke_width(0))
            .axis_style(MUTED.stroke_width(1))
            .label_style((FONT, 15).into_font().color(&FOREGROUND))
            .axis_desc_style((FONT, 17).into_font().color(&FOREGROUND))
            .x_labels(n)
            .x_label_formatter(&formatter)
            .x_desc(chart.x)
            .y_desc(chart.y)
            .draw()
            .map_err(draw_err)?;

        ctx.draw_series(values.iter().enumerate().map(|(i, &v)| {
            let x = i as f64;
            Rectangle::new(
                [(x - 0.35, 0.0), (x + 0.35, v)],
                PALETTE[i % PALETTE.len()].filled(),
            )
        }))
        .map_err(draw_err)?;
        Ok(())
    }

    fn draw_grouped_bars<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        chart: &ChartData<'_>,
        labels: &[String],
        series: &[String],
        values: &[f64],
    ) -> DrawResult<()> {
        let categories = distinct_in_order(labels);
        let series_names = distinct_in_order(series);
        let (y_min, y_max) = value_range(values);
        let n = categories.len();
        let slot = 0.8 / series_names.len().max(1) as f64;

        let mut ctx = ChartBuilder::on(area)
            .caption(&chart.title, (FONT, 24).into_font().color(&FOREGROUND))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_min..y_max)
            .map_err(draw_err)?;

        let formatter = |x: &f64| category_label(&categories, *x);
        ctx.configure_mesh()
            .disable_x_mesh()
            .bold_line_style(GRID.stroke_width(1))
            .light_line_style(BACKGROUND.stroke_width(0))
            .axis_style(MUTED.stroke_width(1))
            .label_style((FONT, 15).into_font().color(&FOREGROUND))
            .axis_desc_style((FONT, 17).into_font().color(&FOREGROUND))
            .x_labels(n.min(20))
            .x_label_formatter(&formatter)
            .x_desc(chart.x)
            .y_desc(chart.y)
            .draw()
            .map_err(draw_err)?;

        for (s, name) in series_names.iter().enumerate() {
            let color = PALETTE[s % PALETTE.len()];
            let bars: Vec<Rectangle<(f64, f64)>> = labels
                .iter()
                .zip(series)
                .zip(values)
                .filter(|((_, row_series), _)| *row_series == name)
                .filter_map(|((label, _), &v)| {
                    let c = categories.iter().position(|c| c == label)? as f64;
                    let left = c - 0.4 + s as f64 * slot;
                    Some(Rectangle::new([(left, 0.0), (left + slot, v)], color.filled()))
                })
                .collect();

            ctx.draw_series(bars)
                .map_err(draw_err)?
                .label(name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 12, y + 6)], color.filled()));
        }

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(BACKGROUND.mix(0.85))
            .border_style(MUTED)
            .label_font((FONT, 14).into_font().color(&FOREGROUND))
            .draw()
            .map_err(draw_err)?;
        Ok(())
    }

    fn draw_pie<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        chart: &ChartData<'_>,
        labels: &[String],
        values: &[f64],
    ) -> DrawResult<()> {
        let sizes: Vec<f64> = values.iter().map(|v| v.max(0.0)).collect();
        if sizes.iter().sum::<f64>() <= 0.0 {
            return Self::draw_empty(area, &chart.title);
        }

        let titled = area
            .titled(&chart.title, (FONT, 28).into_font().color(&FOREGROUND))
            .map_err(draw_err)?;
        let (w, h) = titled.dim_in_pixel();
        let center = (w as i32 / 2, h as i32 / 2);
        let radius = (w.min(h) as f64) * 0.33;
        let colors: Vec<RGBColor> = (0..sizes.len())
            .map(|i| PALETTE[i % PALETTE.len()])
            .collect();

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, labels);
        pie.label_style((FONT, 16).into_font().color(&FOREGROUND));
        pie.percentages((FONT, 14).into_font().color(&BACKGROUND));
        titled.draw(&pie).map_err(draw_err)?;
        Ok(())
    }
}

/// Display labels of a column, one per row.
fn column_labels(table: &AggregateTable, column: &str) -> Vec<String> {
    table
        .dataframe()
        .column(column)
        .map(|col| {
            let series = col.as_materialized_series();
            (0..series.len())
                .map(|i| {
                    series
                        .get(i)
                        .map(|val| {
                            if val.is_null() {
                                String::new()
                            } else {
                                val.to_string().trim_matches('"').to_string()
                            }
                        })
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default()
}

fn category_label(labels: &[String], x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

fn distinct_in_order(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        if !out.contains(v) {
            out.push(v.clone());
        }
    }
    out
}

/// Value axis range that always includes zero, with headroom above.
fn value_range(values: &[f64]) -> (f64, f64) {
    let max = values.iter().copied().fold(0.0f64, f64::max);
    let min = values.iter().copied().fold(0.0f64, f64::min);
    let span = (max - min).max(1.0);
    (min - if min < 0.0 { span * 0.1 } else { 0.0 }, max + span * 0.1)
}
