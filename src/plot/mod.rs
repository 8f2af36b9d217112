//! Chart rendering: ASCII for the terminal, SVG for files.

pub mod ascii;
pub mod svg;

use crate::domain::BurndownSeries;

pub use ascii::render_ascii_plot;
pub use svg::{chart_path, write_svg_chart};

/// Y-axis range for a burndown chart.
///
/// The range always includes zero and the scope total, and covers every
/// remaining and ideal value. `pad` adds that fraction of the span as
/// headroom above the top.
pub fn value_bounds(series: &BurndownSeries, pad: f64) -> (f64, f64) {
    let mut min_y = 0.0_f64;
    let mut max_y = series.total.max(0.0);
    for p in &series.points {
        min_y = min_y.min(p.remaining).min(p.ideal);
        max_y = max_y.max(p.remaining).max(p.ideal);
    }
    if max_y <= min_y {
        max_y = min_y + 1.0;
    }
    (min_y, max_y + (max_y - min_y) * pad)
}
