//! Export burndown series to CSV.
//!
//! One row per metric and day, meant to be easy to consume in spreadsheets.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::BurndownSeries;
use crate::error::AppError;

/// Write every series to a single CSV file.
pub fn write_series_csv(path: &Path, series: &[BurndownSeries]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "metric,date,completed,remaining,ideal")
        .map_err(|e| AppError::config(format!("Failed to write export CSV header: {e}")))?;

    for s in series {
        for p in &s.points {
            writeln!(
                out,
                "{},{},{},{},{:.4}",
                s.metric.slug(),
                p.date,
                p.completed,
                p.remaining,
                p.ideal,
            )
            .map_err(|e| AppError::config(format!("Failed to write export CSV row: {e}")))?;
        }
    }

    out.flush()
        .map_err(|e| AppError::config(format!("Failed to flush export CSV: {e}")))?;
    tracing::info!(path = %path.display(), "wrote CSV export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::burndown::series_from_buckets;
    use crate::domain::{DateWindow, Metric};

    #[test]
    fn csv_has_one_row_per_metric_and_day() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 12).unwrap();
        let window = DateWindow::new(start, start.succ_opt().unwrap()).unwrap();
        let mut per_day = BTreeMap::new();
        per_day.insert(start, 1.5);
        let series = vec![
            series_from_buckets(Metric::Tasks, window, 3.0, &BTreeMap::new()),
            series_from_buckets(Metric::Estimate, window, 4.5, &per_day),
        ];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("burndown.csv");
        write_series_csv(&path, &series).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "metric,date,completed,remaining,ideal");
        assert_eq!(lines[1], "tasks,2025-01-12,0,3,3.0000");
        assert_eq!(lines[3], "estimates,2025-01-12,1.5,3,4.5000");
        assert_eq!(lines[4], "estimates,2025-01-13,0,3,0.0000");
    }

    #[test]
    fn unwritable_path_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = write_series_csv(&path, &[]).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
    }
}
