//! Per-item weights and per-day closure buckets.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{Metric, WorkItem};

/// Weight an item contributes to a metric.
///
/// `Tasks` counts every item once. `Estimate` uses the numeric value of the
/// estimate field. Items without one, or with a value that is not positive,
/// weigh nothing.
pub fn item_weight(item: &WorkItem, metric: Metric, estimate_field: &str) -> f64 {
    match metric {
        Metric::Tasks => 1.0,
        Metric::Estimate => match item.fields.get(estimate_field).and_then(|v| v.as_number()) {
            Some(v) if v > 0.0 && v.is_finite() => v,
            Some(v) if v != 0.0 => {
                tracing::debug!(item = %item.id, estimate = v, "ignoring non-positive estimate");
                0.0
            }
            _ => 0.0,
        },
    }
}

/// Sum of weights over every fetched item, closed or not.
pub fn total_weight(items: &[WorkItem], metric: Metric, estimate_field: &str) -> f64 {
    items.iter().map(|i| item_weight(i, metric, estimate_field)).sum()
}

/// Completed weight grouped by UTC closure date.
///
/// Only closed items with a closure timestamp and a non-zero weight count.
pub fn closed_per_day(items: &[WorkItem], metric: Metric, estimate_field: &str) -> BTreeMap<NaiveDate, f64> {
    let mut out = BTreeMap::new();
    for item in items {
        let Some(date) = item.closed_on() else {
            continue;
        };
        let weight = item_weight(item, metric, estimate_field);
        if weight == 0.0 {
            continue;
        }
        *out.entry(date).or_insert(0.0) += weight;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::burndown::test_support::{closed, estimated, open};

    #[test]
    fn tasks_count_each_item_once() {
        let items = vec![open("a"), closed("b", "2025-01-13T08:00:00Z"), estimated(open("c"), 5.0)];
        assert_eq!(total_weight(&items, Metric::Tasks, "Estimate"), 3.0);
    }

    #[test]
    fn estimate_ignores_items_without_field() {
        let items = vec![open("a"), estimated(open("b"), 2.5), estimated(open("c"), 3.0)];
        assert_eq!(total_weight(&items, Metric::Estimate, "Estimate"), 5.5);
        assert_eq!(total_weight(&items, Metric::Estimate, "Points"), 0.0);
    }

    #[test]
    fn closures_bucket_by_utc_date() {
        let items = vec![
            closed("a", "2025-01-13T00:00:01Z"),
            closed("b", "2025-01-13T23:59:59Z"),
            closed("c", "2025-01-14T12:00:00Z"),
            open("d"),
        ];
        let buckets = closed_per_day(&items, Metric::Tasks, "Estimate");
        let d13 = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        let d14 = NaiveDate::from_ymd_opt(2025, 1, 14).unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[&d13], 2.0);
        assert_eq!(buckets[&d14], 1.0);
    }

    #[test]
    fn zero_estimate_closures_are_skipped() {
        let items = vec![
            estimated(closed("a", "2025-01-13T10:00:00Z"), 0.0),
            closed("b", "2025-01-13T10:00:00Z"),
            estimated(closed("c", "2025-01-15T10:00:00Z"), 8.0),
        ];
        let buckets = closed_per_day(&items, Metric::Estimate, "Estimate");
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets.values().copied().sum::<f64>(), 8.0);
    }

    #[test]
    fn negative_estimates_weigh_nothing() {
        let items = vec![estimated(open("a"), 5.0), estimated(closed("b", "2025-01-13T10:00:00Z"), -2.0)];
        assert_eq!(item_weight(&items[1], Metric::Estimate, "Estimate"), 0.0);
        assert_eq!(item_weight(&items[1], Metric::Tasks, "Estimate"), 1.0);
        assert_eq!(total_weight(&items, Metric::Estimate, "Estimate"), 5.0);
        assert!(closed_per_day(&items, Metric::Estimate, "Estimate").is_empty());
    }
}
