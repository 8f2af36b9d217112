//! Configuration loading from `.env`, the process environment, and CLI overrides.
//!
//! Everything here runs before the HTTP client exists: a missing token or an
//! inverted date window fails the run without any network traffic.

use chrono::NaiveDate;

use crate::domain::{DateWindow, Metric, RunConfig};
use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "https://api.github.com/graphql";
pub const DEFAULT_ESTIMATE_FIELD: &str = "Estimate";

/// Values supplied on the command line. `None` falls back to the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub org: Option<String>,
    pub project: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub api_url: Option<String>,
    pub estimate_field: Option<String>,
}

/// Load configuration from `.env` + process environment, applying overrides.
pub fn load(overrides: &ConfigOverrides, metrics: Vec<Metric>) -> Result<RunConfig, AppError> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(AppError::config(format!("Failed to read .env: {e}"))),
    }
    load_from(|key| std::env::var(key).ok(), overrides, metrics)
}

/// Build a `RunConfig` from an arbitrary variable lookup.
pub fn load_from<F>(lookup: F, overrides: &ConfigOverrides, metrics: Vec<Metric>) -> Result<RunConfig, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let token = required(&lookup, "GITHUB_TOKEN")?;
    let org = match &overrides.org {
        Some(v) => non_empty(v, "--org")?,
        None => required(&lookup, "ORG")?,
    };
    let project_title = match &overrides.project {
        Some(v) => non_empty(v, "--project")?,
        None => required(&lookup, "PROJECT_TITLE")?,
    };

    let start = match overrides.start {
        Some(d) => d,
        None => date_from_parts(&lookup, "START")?,
    };
    let end = match overrides.end {
        Some(d) => d,
        None => date_from_parts(&lookup, "END")?,
    };
    let window = DateWindow::new(start, end)?;

    let api_url = overrides
        .api_url
        .clone()
        .or_else(|| optional(&lookup, "GITHUB_GRAPHQL_URL"))
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let estimate_field = overrides
        .estimate_field
        .clone()
        .or_else(|| optional(&lookup, "ESTIMATE_FIELD"))
        .unwrap_or_else(|| DEFAULT_ESTIMATE_FIELD.to_string());

    if metrics.is_empty() {
        return Err(AppError::config("No metric selected."));
    }

    Ok(RunConfig {
        token,
        org,
        project_title,
        window,
        api_url,
        estimate_field,
        metrics,
    })
}

/// Parse a `YYYY-MM-DD` date (used by clap for `--start`/`--end`).
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn required<F>(lookup: &F, key: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).ok_or_else(|| AppError::config(format!("Missing {key} in environment (.env).")))?;
    non_empty(&value, key)
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn non_empty(value: &str, name: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::config(format!("{name} is set but empty.")));
    }
    Ok(trimmed.to_string())
}

/// Read `YEAR_<suffix>`, `MONTH_<suffix>`, `DAY_<suffix>` into a date.
fn date_from_parts<F>(lookup: &F, suffix: &str) -> Result<NaiveDate, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let year_key = format!("YEAR_{suffix}");
    let month_key = format!("MONTH_{suffix}");
    let day_key = format!("DAY_{suffix}");

    let year: i32 = parse_part(lookup, &year_key)?;
    let month: u32 = parse_part(lookup, &month_key)?;
    let day: u32 = parse_part(lookup, &day_key)?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        AppError::config(format!(
            "Invalid date from {year_key}/{month_key}/{day_key}: {year:04}-{month:02}-{day:02} does not exist."
        ))
    })
}

fn parse_part<F, T>(lookup: &F, key: &str) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = required(lookup, key)?;
    raw.parse::<T>()
        .map_err(|e| AppError::config(format!("Invalid {key}='{raw}': {e}")))
}
