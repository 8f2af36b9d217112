//! Reporting utilities: item statistics and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{DateWindow, ItemState, WorkItem};

/// Counts over the fetched items, shown in the run summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemStats {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    pub other: usize,
    pub closed_in_window: usize,
    pub closed_before_window: usize,
}

pub fn summarize_items(items: &[WorkItem], window: &DateWindow) -> ItemStats {
    let mut stats = ItemStats {
        total: items.len(),
        ..ItemStats::default()
    };
    for item in items {
        match item.state {
            ItemState::Open => stats.open += 1,
            ItemState::Closed => stats.closed += 1,
            ItemState::Other => stats.other += 1,
        }
        if let Some(date) = item.closed_on() {
            if window.contains(date) {
                stats.closed_in_window += 1;
            } else if date < window.start() {
                stats.closed_before_window += 1;
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::burndown::test_support::{closed, open};

    #[test]
    fn counts_states_and_window_membership() {
        let window = DateWindow::new(
            NaiveDate::from_ymd_opt(2025, 1, 12).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 25).unwrap(),
        )
        .unwrap();
        let mut draft = open("draft");
        draft.state = ItemState::Other;
        let items = vec![
            open("a"),
            draft,
            closed("b", "2025-01-01T00:00:00Z"),
            closed("c", "2025-01-20T00:00:00Z"),
            closed("d", "2025-02-20T00:00:00Z"),
        ];

        let stats = summarize_items(&items, &window);
        assert_eq!(
            stats,
            ItemStats {
                total: 5,
                open: 1,
                closed: 3,
                other: 1,
                closed_in_window: 1,
                closed_before_window: 1,
            }
        );
    }
}
