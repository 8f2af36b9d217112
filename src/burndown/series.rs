//! Burndown series construction.
//!
//! A series has exactly one point per calendar day of the window. The first
//! day starts from the scope total: everything fetched, less whatever was
//! already closed before the window opened. Closures after the window end are
//! ignored.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::burndown::aggregate::{closed_per_day, total_weight};
use crate::domain::{BurndownPoint, BurndownSeries, DateWindow, Metric, WorkItem};

/// Build the burndown series for one metric.
pub fn build_series(items: &[WorkItem], metric: Metric, window: DateWindow, estimate_field: &str) -> BurndownSeries {
    let per_day = closed_per_day(items, metric, estimate_field);
    let total = total_weight(items, metric, estimate_field) - closed_before(&per_day, window.start());
    series_from_buckets(metric, window, total, &per_day)
}

/// Build a series from a precomputed scope total and daily completions.
pub fn series_from_buckets(
    metric: Metric,
    window: DateWindow,
    total: f64,
    per_day: &BTreeMap<NaiveDate, f64>,
) -> BurndownSeries {
    let ideal = ideal_line(total, window.day_count());

    let mut remaining = total;
    let mut points = Vec::with_capacity(window.day_count());
    for (date, ideal) in window.days().zip(ideal) {
        let completed = per_day.get(&date).copied().unwrap_or(0.0);
        remaining -= completed;
        tracing::debug!(%date, completed, remaining, metric = metric.slug(), "burndown day");
        points.push(BurndownPoint {
            date,
            completed,
            remaining,
            ideal,
        });
    }

    BurndownSeries {
        metric,
        window,
        total,
        points,
    }
}

/// Linear target from `total` on the first day to zero on the last.
///
/// The step is `total / (days - 1)`, so the final day lands on zero rather
/// than on `total / days`.
pub fn ideal_line(total: f64, days: usize) -> Vec<f64> {
    match days {
        0 => Vec::new(),
        1 => vec![total],
        n => {
            let step = total / (n as f64 - 1.0);
            (0..n).map(|i| total - step * i as f64).collect()
        }
    }
}

fn closed_before(per_day: &BTreeMap<NaiveDate, f64>, start: NaiveDate) -> f64 {
    per_day.range(..start).map(|(_, v)| *v).sum()
}
