//! Report renderers for scan results.
//!
//! This module provides three output formats:
//! - Text for terminals (optionally colored)
//! - JSON for automation and scripting
//! - Markdown for pull requests and wikis
//!
//! Duplicate groups and skipped units are always rendered as separate
//! sections. Snippets and long fingerprints are shortened for display only.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use typedupe::cli::OutputFormat;
//! use typedupe::duplicates::DuplicateFinder;
//! use typedupe::output::{render, RenderOptions};
//!
//! let finder = DuplicateFinder::with_defaults();
//! let report = finder.find_duplicates(&[PathBuf::from("src")]).unwrap();
//!
//! let mut stdout = std::io::stdout();
//! render(&report, OutputFormat::Markdown, &RenderOptions::default(), &mut stdout).unwrap();
//! ```

pub mod json;
pub mod markdown;
pub mod text;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::duplicates::DuplicateReport;

pub use json::JsonOutput;
pub use markdown::MarkdownOutput;
pub use text::TextOutput;

/// Display settings shared by all renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Skipped units listed before the rest are summarized
    pub max_reported_errors: usize,
    /// Snippet and fingerprint length
    pub snippet_max_chars: usize,
    /// ANSI colors in text output
    pub color: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_reported_errors: 20,
            snippet_max_chars: 200,
            color: false,
        }
    }
}

/// Errors that can occur while rendering or writing a report.
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error while writing report: {0}")]
    Io(#[from] std::io::Error),

    /// The output file could not be created
    #[error("Cannot create output file {path}: {source}")]
    Create {
        /// Requested output path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Render `report` in `format` to `writer`.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn render<W: Write>(
    report: &DuplicateReport,
    format: OutputFormat,
    options: &RenderOptions,
    writer: &mut W,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Text => TextOutput::new(report, options).write_to(writer)?,
        OutputFormat::Json => JsonOutput::new(report, options).write_to(writer, true)?,
        OutputFormat::Markdown => MarkdownOutput::new(report, options).write_to(writer)?,
    }
    writer.flush()?;
    Ok(())
}

/// Buffered writer for `--output-file`, or stdout when no path is given.
///
/// # Errors
///
/// Returns [`OutputError::Create`] if the file cannot be created.
pub fn open_writer(path: Option<&Path>) -> Result<Box<dyn Write>, OutputError> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|source| OutputError::Create {
                path: path.to_path_buf(),
                source,
            })?;
            log::debug!("Writing report to {}", path.display());
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout()))),
    }
}

/// Shorten `text` to `max_chars` characters, marking the cut with an ellipsis.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
