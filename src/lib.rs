//! TypeDupe - Duplicate TypeScript Type Finder
//!
//! Finds interfaces, type aliases and enums that are declared more than once
//! across a TypeScript code base, either under the same name or with the same
//! textual shape.
//!
//! The pipeline is: discover source units, parse each with tree-sitter,
//! extract declaration records, then group the records by name and/or by
//! shape fingerprint.

pub mod cli;
pub mod config;
pub mod declarations;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::output::RenderOptions;
use crate::progress::Progress;

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Configuration errors, missing roots, interruption and output failures
/// are returned; [`ExitCode::from_error`] maps them to an exit code.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let Commands::Scan(args) = cli.command;

    let mut config = Config::load(args.config.as_deref())?;
    config.apply_scan_args(&args);
    let settings = config.validate()?;
    log::debug!(
        "Mode {}, min group size {}, {} I/O threads",
        settings.mode,
        settings.min_group_size,
        settings.io_threads
    );

    let handler = signal::install_handler().context("Cannot install Ctrl+C handler")?;

    let mut finder_config = settings
        .finder_config()
        .with_shutdown_flag(handler.get_flag());
    if !cli.quiet {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let report = DuplicateFinder::new(finder_config).find_duplicates(&args.paths)?;

    let summary = &report.summary;
    log::info!(
        "Found {} duplicate groups among {} declarations in {} units",
        summary.total_groups(),
        summary.declarations_found,
        summary.units_analyzed
    );
    if summary.units_failed > 0 {
        log::warn!(
            "{} of {} units skipped ({:.1}%)",
            summary.units_failed,
            summary.units_discovered,
            summary.failure_rate()
        );
    }

    let options = RenderOptions {
        max_reported_errors: settings.max_reported_errors,
        snippet_max_chars: settings.snippet_max_chars,
        color: !cli.no_color && args.output_file.is_none() && std::io::stdout().is_terminal(),
    };
    let mut writer = output::open_writer(args.output_file.as_deref())?;
    output::render(&report, args.output, &options, &mut writer)?;

    Ok(ExitCode::from_report(&report))
}
