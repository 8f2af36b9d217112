//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - loads configuration (failing before any network call)
//! - runs the fetch/aggregate pipeline
//! - prints reports/plots and writes charts and exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{ChartArgs, Command, PlotArgs, SourceArgs};
use crate::domain::{OutputConfig, RunConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `burndown` binary.
pub fn run() -> Result<(), AppError> {
    // `burndown` and `burndown --org x` behave like `burndown chart ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The TUI owns the terminal; stderr logging would corrupt the screen.
    if !matches!(cli.command, Command::Tui(_)) {
        init_logging(cli.verbose);
    }

    match cli.command {
        Command::Chart(args) => handle_chart(args),
        Command::Report(args) => handle_report(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(args: &SourceArgs) -> Result<RunConfig, AppError> {
    let config = crate::config::load(&args.overrides(), args.metric.metrics())?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

fn handle_chart(args: ChartArgs) -> Result<(), AppError> {
    let config = load_config(&args.source)?;
    let output = output_config_from_args(&args);
    let run = pipeline::run(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&config, &run.stats, &run.series)
    );
    for series in &run.series {
        println!("{}", crate::report::format_series_table(series));
        if output.plot {
            println!(
                "{}",
                crate::plot::render_ascii_plot(series, output.plot_width, output.plot_height)
            );
        }
    }

    if output.svg {
        std::fs::create_dir_all(&output.out_dir).map_err(|e| {
            AppError::config(format!(
                "Failed to create output directory '{}': {e}",
                output.out_dir.display()
            ))
        })?;
        let title = chart_title(&config.project_title);
        for series in &run.series {
            let path = crate::plot::chart_path(&output.out_dir, series.metric);
            crate::plot::write_svg_chart(&path, series, &title)?;
            println!("Chart saved as {}", path.display());
        }
    }

    // Optional exports.
    if let Some(path) = &output.export_csv {
        crate::io::write_series_csv(path, &run.series)?;
    }
    if let Some(path) = &output.export_json {
        crate::io::write_series_json(path, &config, &run.series)?;
    }

    Ok(())
}

fn handle_report(args: SourceArgs) -> Result<(), AppError> {
    let config = load_config(&args)?;
    let run = pipeline::run(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&config, &run.stats, &run.series)
    );
    for series in &run.series {
        println!("{}", crate::report::format_series_table(series));
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let doc = crate::io::read_series_json(&args.series)?;
    let title = chart_title(&doc.project);

    for series in &doc.series {
        println!(
            "{}",
            crate::plot::render_ascii_plot(series, args.width, args.height)
        );
        if args.svg {
            std::fs::create_dir_all(&args.out_dir).map_err(|e| {
                AppError::config(format!(
                    "Failed to create output directory '{}': {e}",
                    args.out_dir.display()
                ))
            })?;
            let path = crate::plot::chart_path(&args.out_dir, series.metric);
            crate::plot::write_svg_chart(&path, series, &title)?;
            println!("Chart saved as {}", path.display());
        }
    }
    Ok(())
}

fn handle_tui(args: SourceArgs) -> Result<(), AppError> {
    let config = load_config(&args)?;
    crate::tui::run(config)
}

pub fn output_config_from_args(args: &ChartArgs) -> OutputConfig {
    OutputConfig {
        out_dir: args.out_dir.clone(),
        svg: !args.no_svg,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
    }
}

fn chart_title(project: &str) -> String {
    format!("{project} Burndown Chart")
}

/// Rewrite argv so `burndown` defaults to `burndown chart`.
///
/// Rules:
/// - `burndown`                      -> `burndown chart`
/// - `burndown --org acme ...`       -> `burndown chart --org acme ...`
/// - `burndown --help/--version/-h`  -> unchanged (show top-level help/version)
/// - `burndown -v ...`               -> unchanged if a subcommand follows
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    const SUBCOMMANDS: [&str; 5] = ["chart", "report", "plot", "tui", "help"];

    let rest = argv.get(1..).unwrap_or(&[]);
    if rest.is_empty() {
        argv.push("chart".to_string());
        return argv;
    }

    let is_top_level_help_or_version = rest
        .iter()
        .any(|a| matches!(a.as_str(), "-h" | "--help" | "-V" | "--version"))
        && !rest.iter().any(|a| SUBCOMMANDS.contains(&a.as_str()));
    if is_top_level_help_or_version {
        return argv;
    }

    // Leading global verbosity flags may precede the subcommand.
    let first_non_verbose = rest
        .iter()
        .position(|a| !is_verbosity_flag(a))
        .map(|i| i + 1);

    match first_non_verbose {
        Some(i) if SUBCOMMANDS.contains(&argv[i].as_str()) => argv,
        Some(i) if argv[i].starts_with('-') => {
            argv.insert(i, "chart".to_string());
            argv
        }
        Some(_) => argv,
        None => {
            argv.push("chart".to_string());
            argv
        }
    }
}

fn is_verbosity_flag(arg: &str) -> bool {
    arg == "--verbose" || (arg.len() > 1 && arg.starts_with('-') && !arg.starts_with("--") && arg[1..].chars().all(|c| c == 'v'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_chart() {
        assert_eq!(rewrite_args(argv(&["burndown"])), argv(&["burndown", "chart"]));
        assert_eq!(rewrite_args(argv(&["burndown", "-vv"])), argv(&["burndown", "-vv", "chart"]));
    }

    #[test]
    fn leading_flags_are_chart_flags() {
        assert_eq!(
            rewrite_args(argv(&["burndown", "--org", "acme"])),
            argv(&["burndown", "chart", "--org", "acme"])
        );
        assert_eq!(
            rewrite_args(argv(&["burndown", "-v", "--no-plot"])),
            argv(&["burndown", "-v", "chart", "--no-plot"])
        );
    }

    #[test]
    fn explicit_subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["burndown", "tui"])), argv(&["burndown", "tui"]));
        assert_eq!(rewrite_args(argv(&["burndown", "-v", "report"])), argv(&["burndown", "-v", "report"]));
        assert_eq!(rewrite_args(argv(&["burndown", "--help"])), argv(&["burndown", "--help"]));
        assert_eq!(rewrite_args(argv(&["burndown", "plot", "--help"])), argv(&["burndown", "plot", "--help"]));
    }

    #[test]
    fn rewritten_args_parse() {
        let cli = crate::cli::Cli::try_parse_from(rewrite_args(argv(&["burndown", "--no-svg"]))).unwrap();
        assert!(matches!(cli.command, Command::Chart(ref a) if a.no_svg));
    }

    #[test]
    fn chart_title_names_project() {
        assert_eq!(chart_title("Palette"), "Palette Burndown Chart");
    }
}
