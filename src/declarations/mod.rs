//! Declaration records and the per-unit extraction pipeline.
//!
//! This module provides:
//! - [`DeclarationRecord`]: one interface, type alias, enum, or re-exported name
//! - [`normalize`]: the shape normalizer that turns a declaration into a fingerprint
//! - [`extractor`]: the walk over a parsed unit that produces records
//!
//! # Example
//!
//! ```
//! use typedupe::declarations::{extract_source, ExtractOptions};
//!
//! let records = extract_source(
//!     "src/user.ts",
//!     "interface User { id: string; name: string; }",
//!     &ExtractOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].name, "User");
//! assert_eq!(records[0].property_names, vec!["id", "name"]);
//! assert_eq!(
//!     records[0].shape_fingerprint,
//!     "type __NAME__ = { id: string; name: string; }"
//! );
//! ```

pub mod extractor;
pub mod normalize;

use serde::Serialize;

pub use extractor::{extract, extract_source, ExtractOptions};
pub use normalize::{normalize, NAME_PLACEHOLDER};

/// The closed set of declaration kinds the extractor recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeclarationKind {
    /// `interface Foo { ... }`
    Interface,
    /// `type Foo = ...`
    TypeAlias,
    /// `enum Foo { ... }` and `const enum Foo { ... }`
    Enum,
    /// A name listed in `export { ... } from "..."`
    Reexport,
}

impl DeclarationKind {
    /// Short label used in reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Interface => "interface",
            Self::TypeAlias => "type",
            Self::Enum => "enum",
            Self::Reexport => "re-export",
        }
    }
}

impl std::fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a declaration was found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    /// Source unit identifier (usually a path)
    pub unit_id: String,
    /// 1-based line number
    pub line: usize,
}

impl Location {
    /// Create a new location.
    #[must_use]
    pub fn new(unit_id: impl Into<String>, line: usize) -> Self {
        Self {
            unit_id: unit_id.into(),
            line,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.unit_id, self.line)
    }
}

/// One discovered declaration.
///
/// Records are created once during extraction and never mutated afterwards.
/// `shape_fingerprint` is always computed from the full `raw_snippet`;
/// truncation only ever happens in [`DeclarationRecord::display_snippet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclarationRecord {
    /// Exported (or re-exported, post-alias) name
    pub name: String,
    /// Declaration kind
    pub kind: DeclarationKind,
    /// Unit and line
    pub location: Location,
    /// Exact source text of the declaration
    pub raw_snippet: String,
    /// Output of [`normalize`] for `raw_snippet` and `name`
    pub shape_fingerprint: String,
    /// Whether this record comes from a re-export clause
    pub is_reexport: bool,
    /// Member names sorted ascending
    pub property_names: Vec<String>,
}

impl DeclarationRecord {
    /// Build a record for a locally declared interface, type alias, or enum.
    ///
    /// The fingerprint is derived from `raw_snippet` here so that the two can
    /// never drift apart.
    #[must_use]
    pub fn declared(
        name: impl Into<String>,
        kind: DeclarationKind,
        location: Location,
        raw_snippet: impl Into<String>,
        mut property_names: Vec<String>,
    ) -> Self {
        let name = name.into();
        let raw_snippet = raw_snippet.into();
        property_names.sort();
        Self {
            shape_fingerprint: normalize(&raw_snippet, &name),
            name,
            kind,
            location,
            raw_snippet,
            is_reexport: false,
            property_names,
        }
    }

    /// Build a re-export record. `statement` is the whole export statement.
    #[must_use]
    pub fn reexport(
        name: impl Into<String>,
        location: Location,
        statement: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let raw_snippet = statement.into();
        Self {
            shape_fingerprint: normalize(&raw_snippet, &name),
            name,
            kind: DeclarationKind::Reexport,
            location,
            raw_snippet,
            is_reexport: true,
            property_names: Vec::new(),
        }
    }

    /// Snippet bounded to `max_chars` characters for display.
    ///
    /// Whitespace runs are collapsed first so multi-line declarations fit on
    /// one report line. An ellipsis marks truncation.
    #[must_use]
    pub fn display_snippet(&self, max_chars: usize) -> String {
        let collapsed = self.raw_snippet.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.chars().count() <= max_chars {
            return collapsed;
        }
        let mut out: String = collapsed.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
