//! Shared pipeline used by both CLI and TUI front-ends.
//!
//! GitHub fetch -> item stats -> per-metric burndown series
//!
//! The front-ends only differ in presentation (printing/files vs widgets).

use crate::burndown::build_series;
use crate::data::GithubClient;
use crate::domain::{BurndownSeries, RunConfig, WorkItem};
use crate::error::AppError;
use crate::report::{ItemStats, summarize_items};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub items: Vec<WorkItem>,
    pub stats: ItemStats,
    pub series: Vec<BurndownSeries>,
}

/// Fetch the project and compute every configured series.
pub fn run(config: &RunConfig) -> Result<RunOutput, AppError> {
    let client = GithubClient::new(config)?;
    run_with_client(&client, config)
}

/// Same as `run`, reusing an existing client (the TUI refetches with it).
pub fn run_with_client(client: &GithubClient, config: &RunConfig) -> Result<RunOutput, AppError> {
    let items = client.fetch_project_items()?;
    tracing::info!(items = items.len(), project = %config.project_title, "fetched project");
    Ok(run_with_items(config, items))
}

/// Compute outputs from already-fetched items.
pub fn run_with_items(config: &RunConfig, items: Vec<WorkItem>) -> RunOutput {
    let stats = summarize_items(&items, &config.window);
    let series = config
        .metrics
        .iter()
        .map(|&metric| build_series(&items, metric, config.window, &config.estimate_field))
        .collect();

    RunOutput { items, stats, series }
}
