//! `burndown` library crate.
//!
//! The binary is a thin wrapper around this library so the fetch, aggregation,
//! and rendering steps can be tested without spawning processes or touching
//! the network.

pub mod app;
pub mod burndown;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
