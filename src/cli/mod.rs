//! Command-line parsing for the COVID-19 dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the filtering/metric code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "covid-dash", version, about = "COVID-19 terminal dashboard (OWID data)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard (default).
    Tui(DashArgs),
    /// Print the title and metric tiles, optionally with ASCII charts and a CSV export.
    Summary(SummaryArgs),
    /// List the locations present in the dataset.
    Countries(SourceArgs),
}

/// Where to load the dataset from.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Dataset URL (defaults to `COVID_DASH_URL`, then the OWID CSV).
    #[arg(long, conflicts_with = "file")]
    pub url: Option<String>,

    /// Read a local CSV instead of fetching.
    #[arg(short = 'f', long, value_name = "CSV")]
    pub file: Option<PathBuf>,
}

/// Filter options shared by the dashboard commands.
#[derive(Debug, Args, Clone)]
pub struct DashArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Location to show (defaults to "United States").
    #[arg(short = 'c', long)]
    pub country: Option<String>,

    /// First date, inclusive (YYYY-MM-DD). Defaults to the earliest date in the data.
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Last date, inclusive (YYYY-MM-DD). Defaults to the latest date in the data.
    #[arg(long, value_name = "DATE")]
    pub end: Option<NaiveDate>,

    /// Include hospital and ICU patient series when the data has them.
    #[arg(long)]
    pub hospital: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub dash: DashArgs,

    /// Render stacked ASCII charts below the tiles.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows per chart).
    #[arg(long, default_value_t = 12)]
    pub height: usize,

    /// Export the filtered view to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_summary_flags() {
        let cli = Cli::parse_from([
            "covid-dash",
            "summary",
            "-c",
            "Peru",
            "--start",
            "2021-01-01",
            "--end",
            "2021-06-30",
            "--hospital",
            "--plot",
            "-f",
            "owid.csv",
        ]);
        let Command::Summary(args) = cli.command else {
            panic!("expected summary");
        };
        assert_eq!(args.dash.country.as_deref(), Some("Peru"));
        assert_eq!(args.dash.start, NaiveDate::from_ymd_opt(2021, 1, 1));
        assert_eq!(args.dash.end, NaiveDate::from_ymd_opt(2021, 6, 30));
        assert!(args.dash.hospital);
        assert!(args.plot);
        assert_eq!(args.dash.source.file, Some(PathBuf::from("owid.csv")));
        assert_eq!(args.width, 80);
    }

    #[test]
    fn rejects_bad_date() {
        assert!(Cli::try_parse_from(["covid-dash", "tui", "--start", "01/02/2021"]).is_err());
    }

    #[test]
    fn url_and_file_conflict() {
        assert!(
            Cli::try_parse_from(["covid-dash", "countries", "--url", "http://x", "--file", "a.csv"]).is_err()
        );
    }
}
