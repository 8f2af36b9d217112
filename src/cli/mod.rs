//! Command-line parsing for the burndown tool.
//!
//! Argument parsing and command dispatch stay separate from the fetch and
//! aggregation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::{ConfigOverrides, parse_date};
use crate::domain::MetricSelection;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "burndown", version, about = "Burndown charts for GitHub Projects")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the project, print the burndown, and write SVG charts.
    Chart(ChartArgs),
    /// Print the summary and per-day tables only (useful for scripting).
    Report(SourceArgs),
    /// Re-render a series JSON saved with `chart --export-json`.
    Plot(PlotArgs),
    /// Launch the interactive terminal view.
    Tui(SourceArgs),
}

/// Where the data comes from. Unset flags fall back to the environment (.env).
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Organization login (overrides ORG).
    #[arg(long)]
    pub org: Option<String>,

    /// Project title, matched exactly (overrides PROJECT_TITLE).
    #[arg(long)]
    pub project: Option<String>,

    /// First day of the window, YYYY-MM-DD (overrides YEAR/MONTH/DAY_START).
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last day of the window, YYYY-MM-DD (overrides YEAR/MONTH/DAY_END).
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Numeric project field used for the estimate burndown (overrides ESTIMATE_FIELD).
    #[arg(long)]
    pub estimate_field: Option<String>,

    /// GraphQL endpoint (overrides GITHUB_GRAPHQL_URL).
    #[arg(long)]
    pub api_url: Option<String>,

    /// Which burndowns to compute.
    #[arg(long, value_enum, default_value_t = MetricSelection::Both)]
    pub metric: MetricSelection,
}

impl SourceArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            org: self.org.clone(),
            project: self.project.clone(),
            start: self.start,
            end: self.end,
            api_url: self.api_url.clone(),
            estimate_field: self.estimate_field.clone(),
        }
    }
}

/// Options for `chart`.
#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Directory for the SVG charts.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Skip writing SVG charts.
    #[arg(long)]
    pub no_svg: bool,

    /// Skip the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export per-day values to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the computed series to JSON (replot later with `burndown plot`).
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

/// Options for plotting a saved series.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Series JSON file produced by `burndown chart --export-json`.
    #[arg(long, value_name = "JSON")]
    pub series: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Also write SVG charts into `--out-dir`.
    #[arg(long)]
    pub svg: bool,

    /// Directory for the SVG charts.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}
