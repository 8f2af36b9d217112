//! Read/write series JSON files.
//!
//! Series JSON is the portable representation of a run: organization, project,
//! and every computed series. `burndown plot --series <file>` re-renders it
//! without touching the network. The schema is `domain::SeriesFile`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{BurndownSeries, DateWindow, RunConfig, SeriesFile};
use crate::error::AppError;

pub const TOOL_NAME: &str = "burndown";

/// Write a series JSON file.
pub fn write_series_json(path: &Path, config: &RunConfig, series: &[BurndownSeries]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create series JSON '{}': {e}", path.display())))?;

    let doc = SeriesFile {
        tool: TOOL_NAME.to_string(),
        org: config.org.clone(),
        project: config.project_title.clone(),
        series: series.to_vec(),
    };

    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, &doc)
        .map_err(|e| AppError::config(format!("Failed to write series JSON: {e}")))?;
    out.flush()
        .map_err(|e| AppError::config(format!("Failed to flush series JSON '{}': {e}", path.display())))?;
    tracing::info!(path = %path.display(), "wrote series JSON");
    Ok(())
}

/// Read a series JSON file, re-checking each series' window and that its
/// points cover the window's days in order.
pub fn read_series_json(path: &Path) -> Result<SeriesFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open series JSON '{}': {e}", path.display())))?;
    let doc: SeriesFile =
        serde_json::from_reader(file).map_err(|e| AppError::config(format!("Invalid series JSON: {e}")))?;

    for s in &doc.series {
        let window = DateWindow::new(s.window.start(), s.window.end())?;
        if s.points.len() != window.day_count() {
            return Err(AppError::config(format!(
                "Invalid series JSON: {} series has {} points for a {}-day window.",
                s.metric.slug(),
                s.points.len(),
                window.day_count()
            )));
        }
        if let Some((point, expected)) = s.points.iter().zip(window.days()).find(|(p, d)| p.date != *d) {
            return Err(AppError::config(format!(
                "Invalid series JSON: {} series has a point dated {} where {} was expected.",
                s.metric.slug(),
                point.date,
                expected
            )));
        }
    }

    Ok(doc)
}
