//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Grouping declaration records by name or shape
//! - Running the discovery, extraction and grouping pipeline

pub mod finder;
pub mod groups;

pub use finder::{
    DetectionMode, DuplicateFinder, DuplicateReport, FinderConfig, FinderError, ScanSummary,
};
pub use groups::{group_by_key, group_records, DuplicateGroup, GroupKey, GroupingStats};
