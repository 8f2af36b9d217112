//! Input/output helpers.
//!
//! - per-day CSV export (`export`)
//! - series JSON read/write (`series`)

pub mod export;
pub mod series;

pub use export::*;
pub use series::*;
