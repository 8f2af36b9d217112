//! Burndown aggregation.
//!
//! Responsibilities:
//!
//! - weigh items per metric (count or estimate field)
//! - bucket closures by UTC calendar day
//! - produce one series point per day of the window, plus an ideal line

pub mod aggregate;
pub mod series;

pub use aggregate::*;
pub use series::*;

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeMap;

    use crate::domain::{FieldValue, ItemState, WorkItem};

    pub fn open(id: &str) -> WorkItem {
        WorkItem {
            id: id.to_string(),
            title: format!("item {id}"),
            state: ItemState::Open,
            closed_at: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn closed(id: &str, at: &str) -> WorkItem {
        WorkItem {
            state: ItemState::Closed,
            closed_at: Some(at.parse().unwrap()),
            ..open(id)
        }
    }

    pub fn estimated(mut item: WorkItem, estimate: f64) -> WorkItem {
        item.fields.insert("Estimate".to_string(), FieldValue::Number(estimate));
        item
    }
}
