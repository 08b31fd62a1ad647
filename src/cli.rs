//! Command-line interface definitions for TypeDupe.
//!
//! Global options (verbosity, color, error format) apply to every subcommand.
//! Options that also exist in the configuration file are optional here so
//! that an absent flag leaves the configured value alone.
//!
//! # Example
//!
//! ```bash
//! # Scan the current directory, name and shape passes
//! typedupe scan
//!
//! # Only structural duplicates, as JSON
//! typedupe scan src packages --mode shape --output json
//!
//! # Skip enums, report only groups of three or more
//! typedupe scan src --no-enums --min-group-size 3
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Find duplicate TypeScript type declarations by name or by shape.
///
/// TypeDupe extracts every interface, type alias and enum from a body of
/// TypeScript sources and reports declarations that share a name or that
/// normalize to the same text.
#[derive(Debug, Parser)]
#[command(name = "typedupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors and the report
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as a JSON object on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan source trees for duplicate declarations
    Scan(ScanArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Files or directories to scan
    #[arg(value_name = "PATHS", default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Grouping mode: name, shape or both
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Smallest group to report (at least 2)
    #[arg(long, value_name = "N")]
    pub min_group_size: Option<usize>,

    /// Ignore enum declarations
    #[arg(long)]
    pub no_enums: bool,

    /// Group names listed in `export { ... } from` clauses too
    #[arg(long)]
    pub include_reexports: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Glob patterns to ignore (can be specified multiple times)
    ///
    /// These patterns are added to configured patterns and any .gitignore.
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Source file extensions (replaces the configured list)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Number of worker threads reading and parsing files
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Maximum number of skipped units listed in the report
    #[arg(long = "max-errors", value_name = "N")]
    pub max_reported_errors: Option<usize>,

    /// Configuration file (defaults to ./typedupe.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON document for scripting
    Json,
    /// Markdown tables
    Markdown,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}
