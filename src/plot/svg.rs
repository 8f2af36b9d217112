//! SVG chart files rendered with Plotters.
//!
//! Layout follows the usual burndown chart: dashed gray ideal line, colored
//! actual line with a marker per day, a light fill between the two, legend and
//! grid. The x-axis is the day offset from the window start, labelled with dates.

use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};
use plotters::prelude::*;

use crate::domain::{BurndownSeries, Metric};
use crate::error::AppError;

pub const SVG_SIZE: (u32, u32) = (1000, 600);

const IDEAL_COLOR: RGBColor = RGBColor(128, 128, 128);

/// Line color per metric.
pub fn metric_color(metric: Metric) -> RGBColor {
    match metric {
        Metric::Tasks => BLUE,
        Metric::Estimate => RGBColor(0, 128, 0),
    }
}

/// Default output path for a metric's chart inside `dir`.
pub fn chart_path(dir: &Path, metric: Metric) -> PathBuf {
    dir.join(format!("{}.svg", metric.file_stem()))
}

/// Render one series to an SVG file.
pub fn write_svg_chart(path: &Path, series: &BurndownSeries, title: &str) -> Result<(), AppError> {
    draw_chart(path, series, title)
        .map_err(|e| AppError::config(format!("Failed to render chart '{}': {e}", path.display())))?;
    tracing::info!(path = %path.display(), metric = series.metric.slug(), "wrote chart");
    Ok(())
}

fn draw_chart(path: &Path, series: &BurndownSeries, title: &str) -> Result<(), Box<dyn Error>> {
    let root = SVGBackend::new(path, SVG_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let start = series.window.start();
    let n = series.points.len();
    let x_max = (n.saturating_sub(1)).max(1) as f64;
    // Burndown charts always include zero; a little headroom above the scope.
    let (y_min, y_max) = super::value_bounds(series, 0.05);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, y_min..y_max)?;

    let fmt_date = |x: &f64| date_label(start, *x);
    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc(series.metric.axis_label())
        .x_labels(n.clamp(2, 12))
        .y_labels(8)
        .x_label_formatter(&fmt_date)
        .draw()?;

    let color = metric_color(series.metric);
    let ideal: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.ideal))
        .collect();
    let actual: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.remaining))
        .collect();

    let mut band = actual.clone();
    band.extend(ideal.iter().rev().copied());
    chart.draw_series(std::iter::once(Polygon::new(band, color.mix(0.1).filled())))?;

    chart
        .draw_series(DashedLineSeries::new(
            ideal,
            8,
            6,
            IDEAL_COLOR.stroke_width(2),
        ))?
        .label("Ideal Burndown")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], IDEAL_COLOR.stroke_width(2)));

    chart
        .draw_series(LineSeries::new(actual, color.stroke_width(2)).point_size(4))?
        .label("Actual Burndown")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// `MM-DD` label for an x-axis day offset.
pub fn date_label(start: NaiveDate, offset: f64) -> String {
    if !offset.is_finite() || offset < 0.0 {
        return String::new();
    }
    start
        .checked_add_days(Days::new(offset.round() as u64))
        .map(|d| d.format("%m-%d").to_string())
        .unwrap_or_default()
}
