//! Top-level application orchestration.
//!
//! `src/main.rs` only maps errors to exit codes; this module:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - opens the session (dataset + page registry)
//! - runs the TUI or prints a page/summary

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Command, RenderArgs};
use crate::error::AppError;
use crate::pages::APP_NAME;

pub mod pipeline;

use pipeline::Session;

/// Default log file while the TUI owns the terminal.
const DEFAULT_TUI_LOG: &str = "dash.log";

const SUBCOMMANDS: [&str; 4] = ["tui", "render", "pages", "summary"];

/// Entry point for the `dash` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let is_tui = matches!(cli.command, Command::Tui(_));
    let log_file = match (&cli.log_file, is_tui) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(PathBuf::from(DEFAULT_TUI_LOG)),
        (None, false) => None,
    };
    init_tracing(log_file.as_deref())?;

    let session = Session::open(&cli.source)?;
    info!(source = %session.source, rows = session.dataset().len(), "session ready");

    match cli.command {
        Command::Tui(args) => {
            let selection = args.filter.to_selection()?;
            crate::tui::run(session, args.page, selection)
        }
        Command::Render(args) => handle_render(&session, &args),
        Command::Pages => {
            for name in session.page_names() {
                println!("{name}");
            }
            Ok(())
        }
        Command::Summary => {
            println!("{}", crate::report::format_summary(&session.source, &session.loaded));
            Ok(())
        }
    }
}

fn handle_render(session: &Session, args: &RenderArgs) -> Result<(), AppError> {
    let selection = args.filter.to_selection()?;
    let view = session.render(&args.page, &selection)?;

    println!(
        "{}",
        crate::report::format_page(APP_NAME, &args.page, &view, args.width, args.height)
    );

    if let Some(path) = &args.export {
        crate::io::export::write_series_csv(path, &view)?;
    }
    if let Some(path) = &args.export_json {
        crate::io::export::write_page_json(path, &view)?;
    }

    Ok(())
}

/// `RUST_LOG` controls verbosity (default `warn`). Logs go to `log_file` when
/// given, stderr otherwise.
fn init_tracing(log_file: Option<&Path>) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // `try_init` only fails if a subscriber is already installed; keep the first.
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| AppError::config(format!("Failed to create log file '{}': {e}", path.display())))?;
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .with(filter)
                .try_init()
                .ok();
        }
        None => {
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .try_init()
                .ok();
        }
    }
    Ok(())
}

/// Rewrite argv so `dash` defaults to `dash tui`.
///
/// Rules:
/// - `dash`                       -> `dash tui`
/// - `dash --demo ...`            -> `dash tui --demo ...`
/// - `dash --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    // Global flags may precede the subcommand (`dash --demo render ...`).
    if argv.iter().skip(1).any(|a| SUBCOMMANDS.contains(&a.as_str())) {
        return argv;
    }

    // A leading flag means "tui with these flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }

    argv
}
