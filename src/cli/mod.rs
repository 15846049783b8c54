//! Command-line parsing for the retail sales dashboard.
//!
//! The goal of this module is to keep **argument parsing** separate from page
//! rendering and the data pipeline.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{FilterSelection, STORE_CONTROL_MAX, StoreMatch, StoreSelection, YearChoice};
use crate::error::AppError;

pub mod picker;

/// Default dataset location, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "outputs/Cleaned.csv";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dash", version, about = "Retail sales dashboard (terminal)")]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Write logs to this file (TUI mode defaults to `dash.log`; other commands log to stderr).
    #[arg(long, global = true, env = "DASH_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Where the dataset comes from.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Cleaned sales CSV.
    #[arg(long, global = true, env = "DASH_DATA", default_value = DEFAULT_DATA_PATH, value_name = "CSV")]
    pub data: PathBuf,

    /// Pick a CSV interactively from the current directory tree.
    #[arg(long, global = true, conflicts_with = "demo")]
    pub pick: bool,

    /// Use generated demo data instead of a CSV file.
    #[arg(long, global = true)]
    pub demo: bool,

    /// Seed for `--demo` data.
    #[arg(long, global = true, default_value_t = 42)]
    pub seed: u64,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive TUI (the default).
    Tui(TuiArgs),
    /// Render one page to stdout as ASCII charts and tables.
    Render(RenderArgs),
    /// List the registered pages.
    Pages,
    /// Print dataset statistics and rejected rows.
    Summary,
}

/// Initial sidebar state, shared by `tui` and `render`.
#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Store control value (0-44).
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=i64::from(STORE_CONTROL_MAX)))]
    pub store: u32,

    /// How the store value is compared: `above` (store > N) or `exact` (store == N).
    #[arg(long, value_enum, default_value_t = StoreMatch::Above)]
    pub store_match: StoreMatch,

    /// Year filter: a year like 2011, or "All Years".
    #[arg(long, default_value = crate::domain::ALL_YEARS_LABEL)]
    pub year: String,
}

impl FilterArgs {
    pub fn to_selection(&self) -> Result<FilterSelection, AppError> {
        Ok(FilterSelection {
            store: StoreSelection {
                value: self.store,
                mode: self.store_match,
            },
            year: self.year.parse::<YearChoice>()?,
        })
    }
}

#[derive(Debug, Clone, Args)]
pub struct TuiArgs {
    /// Page to open first.
    #[arg(long)]
    pub page: Option<String>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Page to render (see `dash pages`).
    #[arg(long)]
    pub page: String,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,

    /// Export every series of the page to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the rendered page to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_args_parse_into_selection() {
        let cli = Cli::try_parse_from([
            "dash",
            "render",
            "--page",
            "Store Department Overview",
            "--store",
            "10",
            "--store-match",
            "exact",
            "--year",
            "2011",
        ])
        .unwrap();
        let Command::Render(args) = cli.command else {
            panic!("expected render");
        };
        let sel = args.filter.to_selection().unwrap();
        assert_eq!(sel.store, StoreSelection::exact(10));
        assert_eq!(sel.year, YearChoice::Year(2011));
    }

    #[test]
    fn store_is_limited_to_control_range() {
        assert!(Cli::try_parse_from(["dash", "render", "--page", "x", "--store", "45"]).is_err());
    }

    #[test]
    fn defaults_are_all_years_and_above_zero() {
        let cli = Cli::try_parse_from(["dash", "tui"]).unwrap();
        let Command::Tui(args) = cli.command else {
            panic!("expected tui");
        };
        assert_eq!(args.filter.to_selection().unwrap(), FilterSelection::default());
    }
}
