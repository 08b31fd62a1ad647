//! JSON output formatter for scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "generated_at": "2026-01-01T12:00:00Z",
//!   "mode": "both",
//!   "summary": {
//!     "units_discovered": 3,
//!     "units_analyzed": 2,
//!     "units_failed": 1,
//!     "declarations": 3,
//!     "reexports_skipped": 0,
//!     "name_groups": 1,
//!     "shape_groups": 1,
//!     "scan_duration_ms": 12,
//!     "interrupted": false
//!   },
//!   "name_groups": [
//!     {
//!       "key": "User",
//!       "count": 2,
//!       "members": [{ "name": "User", "kind": "interface", "unit_id": "a.ts", "line": 5 }]
//!     }
//!   ],
//!   "shape_groups": [],
//!   "declarations": [],
//!   "unit_errors": [{ "unit_id": "broken.ts", "kind": "parse", "message": "..." }],
//!   "unit_errors_truncated": false
//! }
//! ```
//!
//! `name_groups` and `shape_groups` are omitted when their pass did not run.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{OutputError, RenderOptions};
use crate::declarations::{DeclarationKind, DeclarationRecord};
use crate::duplicates::{DuplicateGroup, DuplicateReport, ScanSummary};
use crate::scanner::UnitError;

/// One group member.
#[derive(Debug, Clone, Serialize)]
pub struct JsonMember {
    /// Declared or re-exported name
    pub name: String,
    /// Declaration kind
    pub kind: DeclarationKind,
    /// Source unit
    pub unit_id: String,
    /// 1-based line
    pub line: usize,
}

impl JsonMember {
    fn from_record(record: &DeclarationRecord) -> Self {
        Self {
            name: record.name.clone(),
            kind: record.kind,
            unit_id: record.location.unit_id.clone(),
            line: record.location.line,
        }
    }
}

/// A duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroup {
    /// Shared name or fingerprint (never truncated)
    pub key: String,
    /// Number of members
    pub count: usize,
    /// Members in encounter order
    pub members: Vec<JsonMember>,
}

impl JsonGroup {
    /// Create a JSON group from a DuplicateGroup.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            key: group.key.clone(),
            count: group.count(),
            members: group.members.iter().map(JsonMember::from_record).collect(),
        }
    }
}

/// A declaration in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDeclaration {
    /// Declared or re-exported name
    pub name: String,
    /// Declaration kind
    pub kind: DeclarationKind,
    /// Source unit
    pub unit_id: String,
    /// 1-based line
    pub line: usize,
    /// Whether the record came from a re-export clause
    pub is_reexport: bool,
    /// Member names, sorted
    pub property_names: Vec<String>,
    /// Shape fingerprint
    pub shape_fingerprint: String,
    /// Source text, shortened for display
    pub snippet: String,
}

impl JsonDeclaration {
    fn from_record(record: &DeclarationRecord, snippet_max_chars: usize) -> Self {
        Self {
            name: record.name.clone(),
            kind: record.kind,
            unit_id: record.location.unit_id.clone(),
            line: record.location.line,
            is_reexport: record.is_reexport,
            property_names: record.property_names.clone(),
            shape_fingerprint: record.shape_fingerprint.clone(),
            snippet: record.display_snippet(snippet_max_chars),
        }
    }
}

/// A skipped unit in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonUnitError {
    /// Unit identifier
    pub unit_id: String,
    /// "read" or "parse"
    pub kind: &'static str,
    /// Human-readable message
    pub message: String,
}

impl JsonUnitError {
    fn from_unit_error(error: &UnitError) -> Self {
        Self {
            unit_id: error.unit_id().to_string(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Units found by discovery
    pub units_discovered: usize,
    /// Units analyzed successfully
    pub units_analyzed: usize,
    /// Units skipped because of errors
    pub units_failed: usize,
    /// Declarations that took part in grouping
    pub declarations: usize,
    /// Re-export records dropped before grouping
    pub reexports_skipped: usize,
    /// Name groups reported
    pub name_groups: usize,
    /// Shape groups reported
    pub shape_groups: usize,
    /// Traversal errors during discovery
    pub scan_errors: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Duration of the discovery phase in milliseconds
    pub discovery_duration_ms: u64,
    /// Duration of the extraction phase in milliseconds
    pub extraction_duration_ms: u64,
    /// Duration of the grouping phase in milliseconds
    pub grouping_duration_ms: u64,
    /// Whether the scan was interrupted
    pub interrupted: bool,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary) -> Self {
        Self {
            units_discovered: summary.units_discovered,
            units_analyzed: summary.units_analyzed,
            units_failed: summary.units_failed,
            declarations: summary.declarations_found,
            reexports_skipped: summary.reexports_skipped,
            name_groups: summary.name_groups,
            shape_groups: summary.shape_groups,
            scan_errors: summary.scan_errors.len(),
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            discovery_duration_ms: summary.discovery_duration.as_millis() as u64,
            extraction_duration_ms: summary.extraction_duration.as_millis() as u64,
            grouping_duration_ms: summary.grouping_duration.as_millis() as u64,
            interrupted: summary.interrupted,
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// When the report was rendered
    pub generated_at: DateTime<Utc>,
    /// Grouping mode
    pub mode: &'static str,
    /// Scan summary statistics
    pub summary: JsonSummary,
    /// Name groups, if the name pass ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_groups: Option<Vec<JsonGroup>>,
    /// Shape groups, if the shape pass ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape_groups: Option<Vec<JsonGroup>>,
    /// Every grouped declaration
    pub declarations: Vec<JsonDeclaration>,
    /// Skipped units, capped at `max_reported_errors`
    pub unit_errors: Vec<JsonUnitError>,
    /// Whether `unit_errors` was capped
    pub unit_errors_truncated: bool,
}

impl JsonOutput {
    /// Build the JSON document for `report`.
    #[must_use]
    pub fn new(report: &DuplicateReport, options: &RenderOptions) -> Self {
        let convert = |groups: &Vec<DuplicateGroup>| {
            groups
                .iter()
                .map(JsonGroup::from_duplicate_group)
                .collect::<Vec<_>>()
        };

        Self {
            generated_at: Utc::now(),
            mode: report.mode.as_str(),
            summary: JsonSummary::from_scan_summary(&report.summary),
            name_groups: report.name_groups.as_ref().map(convert),
            shape_groups: report.shape_groups.as_ref().map(convert),
            declarations: report
                .records
                .iter()
                .map(|r| JsonDeclaration::from_record(r, options.snippet_max_chars))
                .collect(),
            unit_errors: report
                .unit_errors
                .iter()
                .take(options.max_reported_errors)
                .map(JsonUnitError::from_unit_error)
                .collect(),
            unit_errors_truncated: report.unit_errors.len() > options.max_reported_errors,
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), OutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}
