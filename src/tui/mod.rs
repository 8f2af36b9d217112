//! Ratatui-based terminal UI.
//!
//! Shows the burndown chart for one metric at a time with a summary panel.
//! `Tab`/`m` switches metric, `r` refetches from GitHub, `q` quits.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::{self, RunOutput};
use crate::data::GithubClient;
use crate::domain::{BurndownSeries, Metric, RunConfig};
use crate::error::AppError;
use crate::plot::svg::metric_color;
use crate::report::fmt_value;

mod plotters_chart;

use plotters_chart::BurndownPlottersChart;

/// Start the TUI. The first fetch happens before the terminal is taken over,
/// so configuration and network errors print normally.
pub fn run(config: RunConfig) -> Result<(), AppError> {
    let client = GithubClient::new(&config)?;
    let output = pipeline::run_with_client(&client, &config)?;
    let mut app = App::new(config, client, output);

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::upstream(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::upstream(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::upstream(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: RunConfig,
    client: GithubClient,
    output: RunOutput,
    metric: Metric,
    status: String,
}

impl App {
    fn new(config: RunConfig, client: GithubClient, output: RunOutput) -> Self {
        let metric = config.metrics.first().copied().unwrap_or(Metric::Tasks);
        let status = format!("Fetched {} items.", output.items.len());
        Self {
            config,
            client,
            output,
            metric,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::upstream(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::upstream(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::upstream(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::Char('m') => {
                self.metric = next_available(self.metric, &self.config.metrics);
                self.status = format!("metric: {}", self.metric.display_name());
            }
            KeyCode::Char('r') => self.refresh(),
            _ => {}
        }
        false
    }

    /// Refetch; on failure keep the previous data and show the error.
    fn refresh(&mut self) {
        match pipeline::run_with_client(&self.client, &self.config) {
            Ok(output) => {
                self.status = format!("Refetched {} items.", output.items.len());
                self.output = output;
            }
            Err(err) => {
                self.status = format!("Refresh failed: {err}");
            }
        }
    }

    fn current_series(&self) -> Option<&BurndownSeries> {
        self.output.series.iter().find(|s| s.metric == self.metric)
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let stats = &self.output.stats;
        let lines = vec![
            Line::from(vec![
                Span::styled(&self.config.project_title, Style::default().fg(Color::Cyan)),
                Span::raw(format!(" @ {}", self.config.org)),
            ]),
            Line::from(Span::styled(
                format!(
                    "window: {} .. {} | items: {} (open {}, closed {}, other {})",
                    self.config.window.start(),
                    self.config.window.end(),
                    stats.total,
                    stats.open,
                    stats.closed,
                    stats.other,
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(28)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_summary(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(format!("{} Burndown", self.metric.display_name()))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(series) = self.current_series() else {
            let msg = Paragraph::new("No data for this metric.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let data = chart_series(series);
        let color = metric_color(series.metric);
        let widget = BurndownPlottersChart {
            ideal: &data.ideal,
            actual: &data.actual,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            start: series.window.start(),
            y_label: series.metric.axis_label(),
            color,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_summary(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items = Vec::new();
        if let Some(series) = self.current_series() {
            items.push(ListItem::new(format!("Scope:     {}", fmt_value(series.total))));
            items.push(ListItem::new(format!("Completed: {}", fmt_value(series.completed_total()))));
            items.push(ListItem::new(format!("Remaining: {}", fmt_value(series.final_remaining()))));
            items.push(ListItem::new(""));
            for p in series.points.iter().rev().take(area.height.saturating_sub(6) as usize) {
                items.push(ListItem::new(format!(
                    "{} {:>6} {:>6}",
                    p.date.format("%m-%d"),
                    fmt_value(p.completed),
                    fmt_value(p.remaining)
                )));
            }
        }

        let list = List::new(items).block(Block::default().title("Summary").borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab/m metric  r refetch  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Precomputed chart inputs for one series.
struct ChartData {
    ideal: Vec<(f64, f64)>,
    actual: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_series(series: &BurndownSeries) -> ChartData {
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

    let x_max = (series.points.len().saturating_sub(1)).max(1) as f64;
    let (y_min, y_max) = crate::plot::value_bounds(series, 0.05);

    ChartData {
        ideal,
        actual,
        x_bounds: [0.0, x_max],
        y_bounds: [y_min, y_max],
    }
}

/// Next metric in the configured list, wrapping around.
fn next_available(current: Metric, metrics: &[Metric]) -> Metric {
    let pos = metrics.iter().position(|&m| m == current);
    match pos {
        Some(i) if !metrics.is_empty() => metrics[(i + 1) % metrics.len()],
        _ => metrics.first().copied().unwrap_or(current.next()),
    }
}
