//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - run configuration (`RunConfig`, `DateWindow`, `Metric`)
//! - normalized project items (`WorkItem`, `FieldValue`, `ItemState`)
//! - burndown outputs (`BurndownSeries`, `BurndownPoint`, `SeriesFile`)

pub mod types;

pub use types::*;
