//! Duplicate finder pipeline.
//!
//! # Overview
//!
//! This module orchestrates duplicate detection over a body of source units:
//! 1. **Discovery** - Walk the roots and collect TypeScript files
//! 2. **Extraction** - Read, parse and extract every unit on a bounded pool
//! 3. **Grouping** - Once every unit is done, group the records per mode
//!
//! Units that cannot be read or parsed are recorded in
//! [`DuplicateReport::unit_errors`] and contribute no records; the rest of
//! the batch is unaffected.
//!
//! # Example
//!
//! ```
//! use typedupe::duplicates::{DetectionMode, DuplicateFinder, FinderConfig};
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_mode(DetectionMode::Name));
//! let report = finder
//!     .find_duplicates_in_sources(vec![
//!         ("a.ts".to_string(), "type Id = string;".to_string()),
//!         ("b.ts".to_string(), "type Id = number;".to_string()),
//!     ])
//!     .unwrap();
//!
//! assert_eq!(report.summary.name_groups, 1);
//! assert!(report.shape_groups.is_none());
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;

use super::groups::{group_records, DuplicateGroup, GroupKey, GroupingStats};
use crate::declarations::{extract, DeclarationRecord, ExtractOptions};
use crate::progress::ProgressCallback;
use crate::scanner::{parse_unit, ScanError, UnitError, Walker, WalkerConfig};

/// Which grouping passes to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    /// Group by declaration name only
    Name,
    /// Group by shape fingerprint only
    Shape,
    /// Run both passes
    #[default]
    Both,
}

impl DetectionMode {
    /// Accepted spellings, in display order.
    pub const NAMES: [&'static str; 3] = ["name", "shape", "both"];

    /// Parse a mode name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "name" => Some(Self::Name),
            "shape" => Some(Self::Shape),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    /// Grouping passes for this mode, in report order.
    #[must_use]
    pub fn keys(self) -> &'static [GroupKey] {
        match self {
            Self::Name => &[GroupKey::Name],
            Self::Shape => &[GroupKey::Shape],
            Self::Both => &[GroupKey::Name, GroupKey::Shape],
        }
    }

    /// Whether this mode runs the `key` pass.
    #[must_use]
    pub fn includes(self, key: GroupKey) -> bool {
        self.keys().contains(&key)
    }

    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Shape => "shape",
            Self::Both => "both",
        }
    }
}

impl std::fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of worker threads reading and parsing units.
    /// Default is 4 to cap the number of simultaneously open files.
    pub io_threads: usize,
    /// Grouping passes to run.
    pub mode: DetectionMode,
    /// Smallest group that is reported (at least 2).
    pub min_group_size: usize,
    /// Extraction switches.
    pub extract_options: ExtractOptions,
    /// Drop re-export records before grouping.
    pub skip_reexports: bool,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("mode", &self.mode)
            .field("min_group_size", &self.min_group_size)
            .field("extract_options", &self.extract_options)
            .field("skip_reexports", &self.skip_reexports)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            mode: DetectionMode::Both,
            min_group_size: 2,
            extract_options: ExtractOptions::default(),
            skip_reexports: true,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the worker thread count (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the detection mode.
    #[must_use]
    pub fn with_mode(mut self, mode: DetectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the minimum reported group size.
    #[must_use]
    pub fn with_min_group_size(mut self, size: usize) -> Self {
        self.min_group_size = size;
        self
    }

    /// Include or exclude enum declarations.
    #[must_use]
    pub fn with_include_enums(mut self, include: bool) -> Self {
        self.extract_options.include_enums = include;
        self
    }

    /// Drop or keep re-export records.
    #[must_use]
    pub fn with_skip_reexports(mut self, skip: bool) -> Self {
        self.skip_reexports = skip;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Source units found by discovery (or supplied directly)
    pub units_discovered: usize,
    /// Units that were read, parsed and extracted
    pub units_analyzed: usize,
    /// Units skipped because of a read or parse error
    pub units_failed: usize,
    /// Records kept for grouping
    pub declarations_found: usize,
    /// Re-export records dropped before grouping
    pub reexports_skipped: usize,
    /// Groups in the name pass
    pub name_groups: usize,
    /// Groups in the shape pass
    pub shape_groups: usize,
    /// Time spent discovering units
    pub discovery_duration: Duration,
    /// Time spent reading, parsing and extracting
    pub extraction_duration: Duration,
    /// Time spent grouping
    pub grouping_duration: Duration,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// Traversal errors encountered during discovery
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Total groups across passes.
    #[must_use]
    pub fn total_groups(&self) -> usize {
        self.name_groups + self.shape_groups
    }

    /// Percentage of discovered units that failed.
    #[must_use]
    pub fn failure_rate(&self) -> f64 {
        if self.units_discovered == 0 {
            0.0
        } else {
            (self.units_failed as f64 / self.units_discovered as f64) * 100.0
        }
    }

    /// Whether any unit or traversal error occurred.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.units_failed > 0 || !self.scan_errors.is_empty()
    }
}

/// Everything a scan produces.
#[derive(Debug)]
pub struct DuplicateReport {
    /// Mode the scan ran in
    pub mode: DetectionMode,
    /// Records that took part in grouping, in unit order
    pub records: Vec<DeclarationRecord>,
    /// Name groups (present when the mode includes the name pass)
    pub name_groups: Option<Vec<DuplicateGroup>>,
    /// Shape groups (present when the mode includes the shape pass)
    pub shape_groups: Option<Vec<DuplicateGroup>>,
    /// Name pass statistics
    pub name_stats: Option<GroupingStats>,
    /// Shape pass statistics
    pub shape_stats: Option<GroupingStats>,
    /// Units that could not be analyzed, in unit order
    pub unit_errors: Vec<UnitError>,
    /// Scan statistics
    pub summary: ScanSummary,
}

impl DuplicateReport {
    /// Groups for one pass, if that pass ran.
    #[must_use]
    pub fn groups(&self, key: GroupKey) -> Option<&[DuplicateGroup]> {
        match key {
            GroupKey::Name => self.name_groups.as_deref(),
            GroupKey::Shape => self.shape_groups.as_deref(),
        }
    }

    /// Whether any pass found at least one group.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.summary.total_groups() > 0
    }
}

/// Errors that abort a scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),
}

/// A unit waiting to be analyzed.
enum UnitInput {
    File(PathBuf),
    Memory { id: String, source: String },
}

impl UnitInput {
    fn id(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Memory { id, .. } => id.clone(),
        }
    }
}

/// Duplicate finder that runs the discovery, extraction and grouping pipeline.
///
/// # Example
///
/// ```no_run
/// use typedupe::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::PathBuf;
///
/// let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(8));
/// let report = finder.find_duplicates(&[PathBuf::from("src")]).unwrap();
///
/// println!(
///     "{} name groups, {} shape groups",
///     report.summary.name_groups, report.summary.shape_groups
/// );
/// ```
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The finder's configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find duplicate declarations beneath the given roots.
    ///
    /// Each root may be a directory or a single file. A file reachable from
    /// more than one root is analyzed once.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - A root does not exist
    /// - The scan is interrupted by shutdown signal
    pub fn find_duplicates(&self, roots: &[PathBuf]) -> Result<DuplicateReport, FinderError> {
        let start_time = Instant::now();

        for root in roots {
            if !root.exists() {
                return Err(FinderError::PathNotFound(root.clone()));
            }
        }
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let (files, scan_errors) = self.discover(roots);
        let discovery_duration = start_time.elapsed();

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let inputs = files.into_iter().map(UnitInput::File).collect();
        let mut report = self.run_pipeline(inputs, start_time)?;
        report.summary.discovery_duration = discovery_duration;
        report.summary.scan_errors = scan_errors;
        Ok(report)
    }

    /// Run the pipeline over in-memory `(unit_id, source)` pairs.
    ///
    /// No I/O happens; discovery is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if the shutdown flag is set.
    pub fn find_duplicates_in_sources(
        &self,
        sources: Vec<(String, String)>,
    ) -> Result<DuplicateReport, FinderError> {
        let start_time = Instant::now();
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }
        let inputs = sources
            .into_iter()
            .map(|(id, source)| UnitInput::Memory { id, source })
            .collect();
        self.run_pipeline(inputs, start_time)
    }

    /// Walk every root, dropping paths already seen.
    fn discover(&self, roots: &[PathBuf]) -> (Vec<PathBuf>, Vec<ScanError>) {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("discovering", 0);
        }

        let mut seen = HashSet::new();
        let mut files = Vec::new();
        let mut errors = Vec::new();

        for root in roots {
            if let Some(ref callback) = self.config.progress_callback {
                callback.on_message(&format!("Walking {}", root.display()));
            }
            log::info!("Discovering source units in {}", root.display());

            let mut walker = Walker::new(root, self.config.walker_config.clone());
            if let Some(ref flag) = self.config.shutdown_flag {
                walker = walker.with_shutdown_flag(flag.clone());
            }

            for result in walker.walk() {
                match result {
                    Ok(path) => {
                        if seen.insert(path.clone()) {
                            if let Some(ref callback) = self.config.progress_callback {
                                callback.on_progress(files.len() + 1, &path.to_string_lossy());
                            }
                            files.push(path);
                        }
                    }
                    Err(e) => errors.push(e),
                }
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("discovering");
        }

        log::info!(
            "Discovered {} source units ({} traversal errors)",
            files.len(),
            errors.len()
        );
        (files, errors)
    }

    fn run_pipeline(
        &self,
        inputs: Vec<UnitInput>,
        start_time: Instant,
    ) -> Result<DuplicateReport, FinderError> {
        let mut summary = ScanSummary {
            units_discovered: inputs.len(),
            ..Default::default()
        };

        // Extraction, then a full barrier before grouping
        let extraction_start = Instant::now();
        let results = self.extract_all(inputs)?;
        summary.extraction_duration = extraction_start.elapsed();

        let mut records = Vec::new();
        let mut unit_errors = Vec::new();
        for result in results {
            match result {
                Ok(unit_records) => {
                    summary.units_analyzed += 1;
                    records.extend(unit_records);
                }
                Err(e) => unit_errors.push(e),
            }
        }
        summary.units_failed = unit_errors.len();

        if self.config.skip_reexports {
            let before = records.len();
            records.retain(|r| !r.is_reexport);
            summary.reexports_skipped = before - records.len();
        }
        summary.declarations_found = records.len();

        log::info!(
            "Extracted {} declarations from {} units ({} failed, {} re-exports skipped)",
            summary.declarations_found,
            summary.units_analyzed,
            summary.units_failed,
            summary.reexports_skipped
        );

        let grouping_start = Instant::now();
        let mode = self.config.mode;
        let min = self.config.min_group_size;

        let (name_groups, name_stats) = if mode.includes(GroupKey::Name) {
            let (groups, stats) = group_records(&records, GroupKey::Name, min);
            summary.name_groups = groups.len();
            (Some(groups), Some(stats))
        } else {
            (None, None)
        };
        let (shape_groups, shape_stats) = if mode.includes(GroupKey::Shape) {
            let (groups, stats) = group_records(&records, GroupKey::Shape, min);
            summary.shape_groups = groups.len();
            (Some(groups), Some(stats))
        } else {
            (None, None)
        };

        summary.grouping_duration = grouping_start.elapsed();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} name groups, {} shape groups in {:.2?}",
            summary.name_groups,
            summary.shape_groups,
            summary.scan_duration
        );

        Ok(DuplicateReport {
            mode,
            records,
            name_groups,
            shape_groups,
            name_stats,
            shape_stats,
            unit_errors,
            summary,
        })
    }

    /// Analyze every unit on a bounded pool, keeping input order.
    fn extract_all(
        &self,
        inputs: Vec<UnitInput>,
    ) -> Result<Vec<Result<Vec<DeclarationRecord>, UnitError>>, FinderError> {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("extracting", inputs.len());
        }
        log::debug!(
            "Extracting {} units on {} threads",
            inputs.len(),
            self.config.io_threads
        );

        let work = || -> Vec<Option<Result<Vec<DeclarationRecord>, UnitError>>> {
            inputs
                .into_par_iter()
                .enumerate()
                .map(|(idx, input)| {
                    // Stop scheduling further units once shutdown is requested
                    if self.config.is_shutdown_requested() {
                        return None;
                    }
                    let id = input.id();
                    let result = self.analyze_unit(input);
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(idx + 1, &id);
                    }
                    Some(result)
                })
                .collect()
        };

        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads.max(1))
            .build()
        {
            Ok(pool) => pool.install(work),
            Err(e) => {
                log::warn!(
                    "Failed to create worker pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                work()
            }
        };

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("extracting");
        }

        if self.config.is_shutdown_requested() {
            log::debug!("Extraction interrupted, discarding partial results");
            return Err(FinderError::Interrupted);
        }

        results
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(FinderError::Interrupted)
    }

    fn analyze_unit(&self, input: UnitInput) -> Result<Vec<DeclarationRecord>, UnitError> {
        let (id, source) = match input {
            UnitInput::File(path) => {
                let id = path.display().to_string();
                let source = read_unit(&path, &id)?;
                (id, source)
            }
            UnitInput::Memory { id, source } => (id, source),
        };

        let unit = parse_unit(id, source).inspect_err(|e| log::warn!("Skipping unit: {}", e))?;
        Ok(extract(&unit, &self.config.extract_options))
    }
}

fn read_unit(path: &Path, id: &str) -> Result<String, UnitError> {
    std::fs::read_to_string(path).map_err(|source| {
        log::warn!("Failed to read {}: {}", path.display(), source);
        UnitError::Read {
            unit_id: id.to_string(),
            source,
        }
    })
}
