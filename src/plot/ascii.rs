//! ASCII plotting for terminal output.
//!
//! Fixed-size grid with deterministic output (useful for golden tests).
//!
//! Plot elements:
//! - ideal burndown: `.` line
//! - actual burndown: `-` line with an `o` marker per day

use crate::domain::BurndownSeries;

/// Render a burndown series as a text chart.
pub fn render_ascii_plot(series: &BurndownSeries, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let n = series.points.len();
    let x_max = (n.saturating_sub(1)).max(1) as f64;
    let (y_min, y_max) = super::value_bounds(series, 0.0);

    let mut grid = vec![vec![' '; width]; height];

    let ideal: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.ideal))
        .collect();
    let actual: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.remaining))
        .collect();

    // Ideal first, then actual on top, then markers.
    draw_polyline(&mut grid, &ideal, x_max, y_min, y_max, '.');
    draw_polyline(&mut grid, &actual, x_max, y_min, y_max, '-');
    for &(x, y) in &actual {
        let col = map_x(x, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} | y=[{y_min:.2}, {y_max:.2}]\n",
        series.metric.axis_label()
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    let start = series.window.start().to_string();
    let end = series.window.end().to_string();
    let gap = width.saturating_sub(start.len() + end.len()).max(1);
    out.push_str(&format!("{start}{}{end}\n", " ".repeat(gap)));

    out
}

/// Burndown charts always include zero on the y-axis.
fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    let u = (x / x_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(grid: &mut [Vec<char>], pts: &[(f64, f64)], x_max: f64, y_min: f64, y_max: f64, ch: char) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in pts {
        let col = map_x(x, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, ch),
            None => grid[row][col] = ch,
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham). Later lines overwrite earlier ones.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
