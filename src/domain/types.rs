//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - built from GitHub responses during a run
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Days, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which quantity burns down over the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Count of items (every item weighs 1).
    Tasks,
    /// Sum of the numeric estimate field.
    Estimate,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Tasks, Metric::Estimate];

    pub fn slug(self) -> &'static str {
        match self {
            Metric::Tasks => "tasks",
            Metric::Estimate => "estimates",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Metric::Tasks => "Tasks",
            Metric::Estimate => "Estimate",
        }
    }

    /// Y-axis label used by every renderer.
    pub fn axis_label(self) -> &'static str {
        match self {
            Metric::Tasks => "Remaining Tasks",
            Metric::Estimate => "Remaining Estimate",
        }
    }

    /// Default chart file stem (`burndown_tasks`, `burndown_estimates`).
    pub fn file_stem(self) -> String {
        format!("burndown_{}", self.slug())
    }

    pub fn next(self) -> Self {
        match self {
            Metric::Tasks => Metric::Estimate,
            Metric::Estimate => Metric::Tasks,
        }
    }
}

/// Which metrics a run should chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MetricSelection {
    Tasks,
    Estimate,
    Both,
}

impl MetricSelection {
    pub fn metrics(self) -> Vec<Metric> {
        match self {
            MetricSelection::Tasks => vec![Metric::Tasks],
            MetricSelection::Estimate => vec![Metric::Estimate],
            MetricSelection::Both => Metric::ALL.to_vec(),
        }
    }
}

/// Inclusive calendar-day window `[start, end]`.
///
/// Construction enforces `start <= end`, so every window covers at least one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if end < start {
            return Err(AppError::config(format!(
                "Invalid date window: end date {end} is before start date {start}."
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days in the window (always >= 1).
    pub fn day_count(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every calendar day from start to end, inclusive, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.day_count() as u64).filter_map(move |i| self.start.checked_add_days(Days::new(i)))
    }
}

/// Lifecycle state of a project item's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Open,
    Closed,
    /// Draft issues, pull requests, redacted content, or unknown states.
    Other,
}

impl ItemState {
    pub fn from_graphql(raw: Option<&str>) -> Self {
        match raw {
            Some("OPEN") => ItemState::Open,
            Some("CLOSED") => ItemState::Closed,
            _ => ItemState::Other,
        }
    }
}

/// A project custom field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric interpretation: numbers as-is, text only if it parses.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) if v.is_finite() => Some(*v),
            FieldValue::Number(_) => None,
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

/// A normalized project item, as seen at fetch time.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    pub id: String,
    pub title: String,
    pub state: ItemState,
    pub closed_at: Option<DateTime<Utc>>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl WorkItem {
    /// UTC calendar date of closure, if the item is closed.
    pub fn closed_on(&self) -> Option<NaiveDate> {
        match self.state {
            ItemState::Closed => self.closed_at.map(|ts| ts.date_naive()),
            _ => None,
        }
    }
}

/// One day of a burndown series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurndownPoint {
    pub date: NaiveDate,
    /// Value completed on this day.
    pub completed: f64,
    /// Value still open at the end of this day.
    pub remaining: f64,
    /// Linear target from the scope total down to zero.
    pub ideal: f64,
}

/// A burndown series: one point per calendar day of the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurndownSeries {
    pub metric: Metric,
    pub window: DateWindow,
    /// Value open when the window starts.
    pub total: f64,
    pub points: Vec<BurndownPoint>,
}

impl BurndownSeries {
    pub fn completed_total(&self) -> f64 {
        self.points.iter().map(|p| p.completed).sum()
    }

    pub fn final_remaining(&self) -> f64 {
        self.points.last().map(|p| p.remaining).unwrap_or(self.total)
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// Built by `config::load` from the environment plus CLI overrides.
#[derive(Clone)]
pub struct RunConfig {
    pub token: String,
    pub org: String,
    pub project_title: String,
    pub window: DateWindow,
    pub api_url: String,
    pub estimate_field: String,
    pub metrics: Vec<Metric>,
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("token", &"<redacted>")
            .field("org", &self.org)
            .field("project_title", &self.project_title)
            .field("window", &self.window)
            .field("api_url", &self.api_url)
            .field("estimate_field", &self.estimate_field)
            .field("metrics", &self.metrics)
            .finish()
    }
}

/// Output options for the `chart` command.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub out_dir: PathBuf,
    pub svg: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

/// A saved series file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesFile {
    pub tool: String,
    pub org: String,
    pub project: String,
    pub series: Vec<BurndownSeries>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn window_rejects_inverted_range() {
        let err = DateWindow::new(d(2025, 1, 25), d(2025, 1, 12)).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
        assert!(err.message().contains("before start date"));
    }

    #[test]
    fn window_days_are_inclusive_and_cross_month_boundaries() {
        let w = DateWindow::new(d(2025, 1, 30), d(2025, 2, 2)).unwrap();
        let days: Vec<_> = w.days().collect();
        assert_eq!(days, vec![d(2025, 1, 30), d(2025, 1, 31), d(2025, 2, 1), d(2025, 2, 2)]);
        assert_eq!(w.day_count(), 4);
    }

    #[test]
    fn single_day_window() {
        let w = DateWindow::new(d(2024, 2, 29), d(2024, 2, 29)).unwrap();
        assert_eq!(w.days().count(), 1);
        assert!(w.contains(d(2024, 2, 29)));
        assert!(!w.contains(d(2024, 3, 1)));
    }

    #[test]
    fn field_value_numeric_interpretation() {
        assert_eq!(FieldValue::Number(3.0).as_number(), Some(3.0));
        assert_eq!(FieldValue::Text(" 5 ".into()).as_number(), Some(5.0));
        assert_eq!(FieldValue::Text("large".into()).as_number(), None);
    }

    #[test]
    fn closed_on_ignores_open_items() {
        let ts = "2025-01-14T23:59:59Z".parse::<DateTime<Utc>>().unwrap();
        let mut item = WorkItem {
            id: "PVTI_1".into(),
            title: "t".into(),
            state: ItemState::Open,
            closed_at: Some(ts),
            fields: BTreeMap::new(),
        };
        assert_eq!(item.closed_on(), None);
        item.state = ItemState::Closed;
        assert_eq!(item.closed_on(), Some(d(2025, 1, 14)));
    }

    #[test]
    fn run_config_debug_redacts_token() {
        let cfg = RunConfig {
            token: "ghp_secret".into(),
            org: "acme".into(),
            project_title: "Palette".into(),
            window: DateWindow::new(d(2025, 1, 1), d(2025, 1, 2)).unwrap(),
            api_url: "https://api.github.com/graphql".into(),
            estimate_field: "Estimate".into(),
            metrics: vec![Metric::Tasks],
        };
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("ghp_secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
