//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the dataset (once)
//! - runs the filter/metric pipeline
//! - prints reports/plots or hands off to the TUI
//! - writes optional exports

use clap::Parser;
use log::debug;

use crate::cli::{Command, DashArgs, SourceArgs, SummaryArgs};
use crate::data::DatasetSource;
use crate::domain::{DashConfig, SourceLocation};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `covid-dash` binary.
pub fn run() -> Result<(), AppError> {
    // We want `covid-dash` and `covid-dash -c Peru` to behave like `covid-dash tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    debug!("args: {cli:?}");

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Summary(args) => handle_summary(args),
        Command::Countries(args) => handle_countries(args),
    }
}

fn handle_tui(args: DashArgs) -> Result<(), AppError> {
    let config = dash_config_from_args(&args);
    eprintln!("Fetching dataset from {} ...", config.source);
    crate::tui::run(config)
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    let config = dash_config_from_args(&args.dash);
    let source = DatasetSource::new(config.source.clone());
    let dataset = source.get_or_load()?;
    let criteria = config.criteria(&dataset)?;
    debug!("criteria: {criteria:?}");

    let run = match pipeline::run_dashboard(&dataset, &criteria) {
        Ok(run) => run,
        Err(empty) => {
            println!("{}", pipeline::title(criteria.country()));
            println!("warning: {empty}");
            return Ok(());
        }
    };

    println!("{}", crate::report::format_summary(&run));

    if args.plot {
        println!("Trend Analysis\n");
        print!("{}", crate::plot::render_view_plot(&run.view, args.width, args.height));
    }

    if let Some(path) = &args.export {
        crate::io::export::write_view_csv(path, &run.view)?;
        println!("Wrote {} rows to {}", run.view.len(), path.display());
    }

    Ok(())
}

fn handle_countries(args: SourceArgs) -> Result<(), AppError> {
    let source = DatasetSource::new(source_from_args(&args));
    let dataset = source.get_or_load()?;
    print!("{}", crate::report::format_locations(dataset.locations()));
    Ok(())
}

/// Resolve the dataset location: `--file`, then `--url`, then `COVID_DASH_URL`/default.
pub fn source_from_args(args: &SourceArgs) -> SourceLocation {
    if let Some(path) = &args.file {
        return SourceLocation::File(path.clone());
    }
    match &args.url {
        Some(url) => SourceLocation::Remote(url.clone()),
        None => crate::data::source::location_from_env(),
    }
}

pub fn dash_config_from_args(args: &DashArgs) -> DashConfig {
    DashConfig {
        source: source_from_args(&args.source),
        country: args.country.clone(),
        start_date: args.start,
        end_date: args.end,
        include_hospital: args.hospital,
    }
}

/// Rewrite argv so `covid-dash` defaults to `covid-dash tui`.
///
/// Rules:
/// - `covid-dash`                      -> `covid-dash tui`
/// - `covid-dash -c Peru ...`          -> `covid-dash tui -c Peru ...`
/// - `covid-dash --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "summary" | "countries");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
