//! Formatted terminal output.
//!
//! Formatting lives in one place so the aggregation code stays clean and
//! output changes are localized.

use crate::domain::{BurndownSeries, RunConfig};
use crate::report::ItemStats;

/// Format the run summary (project, window, item counts, per-metric totals).
pub fn format_run_summary(config: &RunConfig, stats: &ItemStats, series: &[BurndownSeries]) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} Burndown ===\n", config.project_title));
    out.push_str(&format!("Organization: {}\n", config.org));
    out.push_str(&format!(
        "Window: {} .. {} ({} days)\n",
        config.window.start(),
        config.window.end(),
        config.window.day_count()
    ));
    out.push_str(&format!(
        "Items: n={} | open={} | closed={} | other={}\n",
        stats.total, stats.open, stats.closed, stats.other
    ));
    out.push_str(&format!(
        "Closed: in window={} | before window={}\n",
        stats.closed_in_window, stats.closed_before_window
    ));

    for s in series {
        out.push_str(&format!(
            "{}: scope={} completed={} remaining={}\n",
            s.metric.display_name(),
            fmt_value(s.total),
            fmt_value(s.completed_total()),
            fmt_value(s.final_remaining()),
        ));
    }

    out
}

/// Format one series as a per-day table.
pub fn format_series_table(series: &BurndownSeries) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}:\n", series.metric.axis_label()));
    out.push_str(
        format!("{:<10} {:>10} {:>10} {:>10}\n", "date", "completed", "remaining", "ideal").trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<10} {:-<10} {:-<10} {:-<10}\n", "", "", "", "").trim_end());
    out.push('\n');

    for p in &series.points {
        out.push_str(
            format!(
                "{:<10} {:>10} {:>10} {:>10}\n",
                p.date.format("%Y-%m-%d"),
                fmt_value(p.completed),
                fmt_value(p.remaining),
                format!("{:.2}", p.ideal),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Whole numbers print without decimals; fractional estimates keep two.
pub fn fmt_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}
