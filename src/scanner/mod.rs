//! Source-unit discovery and parsing.
//!
//! This module provides functionality for:
//! - Parallel directory walking using jwalk
//! - Gitignore-style filtering via the `ignore` crate
//! - Tree-sitter parsing of TypeScript units
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and source file discovery
//! - [`parser`]: Tree-sitter front-end producing [`ParsedUnit`]s
//!
//! # Example
//!
//! ```no_run
//! use typedupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(path) => println!("{}", path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod parser;
pub mod walker;

use std::path::PathBuf;

pub use parser::{parse_unit, LanguageVariant, ParsedUnit};
pub use walker::Walker;

/// File extensions treated as TypeScript source units.
pub const DEFAULT_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts"];

/// Directory names never descended into.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &["node_modules", "dist", "build", ".git"];

/// Configuration for directory walking.
///
/// Controls which files count as source units and which directories are
/// skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Extensions (without the dot, case-insensitive) of files to yield.
    pub extensions: Vec<String>,

    /// Directory names to prune from traversal.
    pub exclude_dirs: Vec<String>,

    /// Glob patterns to ignore (gitignore-style).
    /// These are applied in addition to any .gitignore file at the root.
    pub ignore_patterns: Vec<String>,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Follow symbolic links during traversal.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            ignore_patterns: Vec::new(),
            skip_hidden: false,
            follow_symlinks: false,
        }
    }
}

impl WalkerConfig {
    /// Whether `path` has one of the configured extensions.
    #[must_use]
    pub fn matches_extension(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}

/// A source unit that could not be analyzed.
///
/// Unit errors are isolated: the unit contributes no declarations and the
/// scan carries on with the remaining units.
#[derive(thiserror::Error, Debug)]
pub enum UnitError {
    /// The unit's text could not be read.
    #[error("Failed to read {unit_id}: {source}")]
    Read {
        /// Unit identifier
        unit_id: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The unit did not parse cleanly.
    #[error("Syntax error in {unit_id} at {line}:{column}")]
    Parse {
        /// Unit identifier
        unit_id: String,
        /// 1-based line of the first error node
        line: usize,
        /// 1-based column of the first error node
        column: usize,
    },
}

impl UnitError {
    /// Identifier of the failed unit.
    #[must_use]
    pub fn unit_id(&self) -> &str {
        match self {
            Self::Read { unit_id, .. } | Self::Parse { unit_id, .. } => unit_id,
        }
    }

    /// Short machine-readable kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Read { .. } => "read",
            Self::Parse { .. } => "parse",
        }
    }
}
