//! Layered configuration.
//!
//! Values are merged with figment, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. User file: `<config dir>/typedupe/config.toml`
//! 3. Project file: `--config PATH`, or `./typedupe.toml` when present
//! 4. Environment: `TYPEDUPE_*` (`__` separates nested keys)
//! 5. Command-line flags
//!
//! The merged [`Config`] is checked once by [`Config::validate`], before any
//! file is discovered. Invalid values abort the run.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::ScanArgs;
use crate::declarations::ExtractOptions;
use crate::duplicates::{DetectionMode, FinderConfig};
use crate::scanner::{WalkerConfig, DEFAULT_EXCLUDE_DIRS, DEFAULT_EXTENSIONS};

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "TYPEDUPE_";

/// Project-local configuration file name.
pub const PROJECT_CONFIG_FILE: &str = "typedupe.toml";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extract enum declarations
    pub include_enums: bool,
    /// Drop re-exported names before grouping
    pub skip_reexports: bool,
    /// Smallest reported group
    pub min_group_size: usize,
    /// "name", "shape" or "both"
    pub mode: String,
    /// Worker threads for reading and parsing
    pub io_threads: usize,
    /// Source file extensions
    pub extensions: Vec<String>,
    /// Directory names never descended into
    pub exclude_dirs: Vec<String>,
    /// Gitignore-style patterns
    pub ignore_patterns: Vec<String>,
    /// Skip dot-files and dot-directories
    pub skip_hidden: bool,
    /// Follow symbolic links
    pub follow_symlinks: bool,
    /// Skipped units listed in reports
    pub max_reported_errors: usize,
    /// Snippet length in reports
    pub snippet_max_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include_enums: true,
            skip_reexports: true,
            min_group_size: 2,
            mode: DetectionMode::Both.as_str().to_string(),
            io_threads: 4,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            ignore_patterns: Vec::new(),
            skip_hidden: false,
            follow_symlinks: false,
            max_reported_errors: 20,
            snippet_max_chars: 200,
        }
    }
}

/// Invalid or unloadable configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// `min_group_size` below 2.
    #[error("min_group_size must be at least 2 (got {0})")]
    MinGroupSize(usize),

    /// Unrecognized `mode`.
    #[error("unknown mode '{mode}', expected one of: name, shape, both{}", did_you_mean(.suggestion))]
    UnknownMode {
        /// Value as given
        mode: String,
        /// Closest valid mode, if any is close
        suggestion: Option<&'static str>,
    },

    /// `io_threads` of zero.
    #[error("io_threads must be at least 1")]
    IoThreads,

    /// Empty extension list.
    #[error("at least one source file extension is required")]
    NoExtensions,

    /// `--config` points at a missing file.
    #[error("configuration file not found: {0}")]
    MissingFile(PathBuf),

    /// Malformed file or environment value.
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),
}

fn did_you_mean(suggestion: &Option<&'static str>) -> String {
    suggestion
        .map(|s| format!(" (did you mean '{s}'?)"))
        .unwrap_or_default()
}

/// Closest known mode within a small edit distance.
fn suggest_mode(input: &str) -> Option<&'static str> {
    let lowered = input.to_ascii_lowercase();
    DetectionMode::NAMES
        .iter()
        .map(|name| (*name, strsim::levenshtein(&lowered, name)))
        .filter(|(_, distance)| *distance <= 2)
        .min_by_key(|(_, distance)| *distance)
        .map(|(name, _)| name)
}

/// A configuration that passed validation, in the types the pipeline uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    /// Grouping passes
    pub mode: DetectionMode,
    /// Smallest reported group (at least 2)
    pub min_group_size: usize,
    /// Worker threads (at least 1)
    pub io_threads: usize,
    /// Extraction switches
    pub extract_options: ExtractOptions,
    /// Drop re-exports before grouping
    pub skip_reexports: bool,
    /// Discovery settings
    pub walker_config: WalkerConfig,
    /// Skipped units listed in reports
    pub max_reported_errors: usize,
    /// Snippet length in reports
    pub snippet_max_chars: usize,
}

impl ValidatedConfig {
    /// Finder configuration without shutdown flag or progress callback.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_io_threads(self.io_threads)
            .with_mode(self.mode)
            .with_min_group_size(self.min_group_size)
            .with_include_enums(self.extract_options.include_enums)
            .with_skip_reexports(self.skip_reexports)
            .with_walker_config(self.walker_config.clone())
    }
}

impl Config {
    /// Default user configuration file, if the platform has a config dir.
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "typedupe").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Build the provider stack: defaults, the given files, then environment.
    ///
    /// Missing files contribute nothing.
    #[must_use]
    pub fn figment(user_file: Option<&Path>, project_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = user_file {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = project_file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load defaults, user file, project file and environment.
    ///
    /// `explicit` is the `--config` path; when absent, `./typedupe.toml` is
    /// used if it exists.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingFile`] if `explicit` does not exist,
    /// [`ConfigError::Load`] if any layer is malformed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let project = match explicit {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
            Some(path) => Some(path.to_path_buf()),
            None => {
                let local = PathBuf::from(PROJECT_CONFIG_FILE);
                local.is_file().then_some(local)
            }
        };
        let user = Self::user_config_path().filter(|p| p.is_file());

        if let Some(ref path) = user {
            log::debug!("Using user configuration {}", path.display());
        }
        if let Some(ref path) = project {
            log::debug!("Using project configuration {}", path.display());
        }

        Ok(Self::figment(user.as_deref(), project.as_deref()).extract()?)
    }

    /// Apply command-line overrides.
    pub fn apply_scan_args(&mut self, args: &ScanArgs) {
        if let Some(ref mode) = args.mode {
            self.mode.clone_from(mode);
        }
        if let Some(size) = args.min_group_size {
            self.min_group_size = size;
        }
        if args.no_enums {
            self.include_enums = false;
        }
        if args.include_reexports {
            self.skip_reexports = false;
        }
        if !args.extensions.is_empty() {
            self.extensions.clone_from(&args.extensions);
        }
        self.ignore_patterns
            .extend(args.ignore_patterns.iter().cloned());
        if args.skip_hidden {
            self.skip_hidden = true;
        }
        if args.follow_symlinks {
            self.follow_symlinks = true;
        }
        if let Some(threads) = args.io_threads {
            self.io_threads = threads;
        }
        if let Some(max) = args.max_reported_errors {
            self.max_reported_errors = max;
        }
    }

    /// Check every value and convert to pipeline types.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    ///
    /// # Example
    ///
    /// ```
    /// use typedupe::config::{Config, ConfigError};
    ///
    /// let config = Config {
    ///     mode: "shap".to_string(),
    ///     ..Config::default()
    /// };
    /// let err = config.validate().unwrap_err();
    /// assert!(err.to_string().contains("did you mean 'shape'"));
    /// ```
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        if self.min_group_size < 2 {
            return Err(ConfigError::MinGroupSize(self.min_group_size));
        }
        let mode = DetectionMode::from_name(&self.mode).ok_or_else(|| ConfigError::UnknownMode {
            mode: self.mode.clone(),
            suggestion: suggest_mode(&self.mode),
        })?;
        if self.io_threads == 0 {
            return Err(ConfigError::IoThreads);
        }
        if self.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(ConfigError::NoExtensions);
        }

        Ok(ValidatedConfig {
            mode,
            min_group_size: self.min_group_size,
            io_threads: self.io_threads,
            extract_options: ExtractOptions {
                include_enums: self.include_enums,
            },
            skip_reexports: self.skip_reexports,
            walker_config: WalkerConfig {
                extensions: self.extensions.clone(),
                exclude_dirs: self.exclude_dirs.clone(),
                ignore_patterns: self.ignore_patterns.clone(),
                skip_hidden: self.skip_hidden,
                follow_symlinks: self.follow_symlinks,
            },
            max_reported_errors: self.max_reported_errors,
            snippet_max_chars: self.snippet_max_chars,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn scan_args(args: &[&str]) -> ScanArgs {
        let mut argv = vec!["typedupe", "scan"];
        argv.extend_from_slice(args);
        let Commands::Scan(scan) = Cli::try_parse_from(argv).unwrap().command;
        scan
    }

    #[test]
    fn test_defaults_validate() {
        let validated = Config::default().validate().unwrap();

        assert_eq!(validated.mode, DetectionMode::Both);
        assert_eq!(validated.min_group_size, 2);
        assert_eq!(validated.io_threads, 4);
        assert!(validated.extract_options.include_enums);
        assert!(validated.skip_reexports);
        assert_eq!(validated.max_reported_errors, 20);
        assert_eq!(validated.snippet_max_chars, 200);
        assert_eq!(validated.walker_config, WalkerConfig::default());
    }

    #[test]
    fn test_validated_configs_compare() {
        let a = Config::default().validate().unwrap();
        let b = Config::default().validate().unwrap();
        assert_eq!(a, b);

        let hidden = Config {
            skip_hidden: true,
            ..Config::default()
        }
        .validate()
        .unwrap();
        assert_ne!(a, hidden);
        assert_ne!(a.walker_config, hidden.walker_config);
    }

    #[test]
    fn test_min_group_size_rejected() {
        for size in [0, 1] {
            let config = Config {
                min_group_size: size,
                ..Config::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::MinGroupSize(s)) if s == size
            ));
        }
    }

    #[test]
    fn test_unknown_mode_with_suggestion() {
        let config = Config {
            mode: "nmae".to_string(),
            ..Config::default()
        };
        match config.validate() {
            Err(ConfigError::UnknownMode { mode, suggestion }) => {
                assert_eq!(mode, "nmae");
                assert_eq!(suggestion, Some("name"));
            }
            other => panic!("Expected UnknownMode, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_mode_without_suggestion() {
        let config = Config {
            mode: "semantic".to_string(),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown mode 'semantic', expected one of: name, shape, both"
        );
    }

    #[test]
    fn test_io_threads_rejected() {
        let config = Config {
            io_threads: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::IoThreads)));
    }

    #[test]
    fn test_empty_extensions_rejected() {
        let config = Config {
            extensions: Vec::new(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoExtensions)));
    }

    #[test]
    fn test_apply_scan_args() {
        let mut config = Config {
            ignore_patterns: vec!["from-file/".to_string()],
            ..Config::default()
        };
        config.apply_scan_args(&scan_args(&[
            "--mode",
            "name",
            "--min-group-size",
            "4",
            "--no-enums",
            "--include-reexports",
            "--ext",
            "mts",
            "--ignore",
            "gen/",
            "--io-threads",
            "2",
            "--max-errors",
            "3",
        ]));

        assert_eq!(config.mode, "name");
        assert_eq!(config.min_group_size, 4);
        assert!(!config.include_enums);
        assert!(!config.skip_reexports);
        assert_eq!(config.extensions, vec!["mts"]);
        assert_eq!(config.ignore_patterns, vec!["from-file/", "gen/"]);
        assert_eq!(config.io_threads, 2);
        assert_eq!(config.max_reported_errors, 3);
    }

    #[test]
    fn test_absent_flags_keep_config_values() {
        let mut config = Config {
            mode: "shape".to_string(),
            min_group_size: 3,
            include_enums: false,
            ..Config::default()
        };
        let before = config.clone();
        config.apply_scan_args(&scan_args(&[]));

        assert_eq!(config, before);
    }

    #[test]
    fn test_finder_config_from_validated() {
        let config = Config {
            mode: "shape".to_string(),
            io_threads: 6,
            include_enums: false,
            ..Config::default()
        };
        let finder = config.validate().unwrap().finder_config();

        assert_eq!(finder.mode, DetectionMode::Shape);
        assert_eq!(finder.io_threads, 6);
        assert!(!finder.extract_options.include_enums);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = Config::load(Some(Path::new("/definitely/not/here/typedupe.toml")));
        assert!(matches!(result, Err(ConfigError::MissingFile(_))));
    }

    #[test]
    fn test_suggest_mode() {
        assert_eq!(suggest_mode("Both"), Some("both"));
        assert_eq!(suggest_mode("shap"), Some("shape"));
        assert_eq!(suggest_mode("xyzzy"), None);
    }
}
