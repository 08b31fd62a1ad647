//! Duplicate grouping of declaration records.
//!
//! # Overview
//!
//! Records are bucketed by a key (the declaration name or its shape
//! fingerprint). Buckets smaller than the minimum group size are dropped and
//! the survivors are ranked:
//!
//! 1. by member count, descending
//! 2. by key, ascending (byte-wise)
//!
//! Members keep the order in which they were encountered, so grouping the
//! same record list twice yields identical output. Records with an empty key
//! are never grouped.
//!
//! # Example
//!
//! ```
//! use typedupe::declarations::{DeclarationKind, DeclarationRecord, Location};
//! use typedupe::duplicates::{group_records, GroupKey};
//!
//! let record = |name: &str, unit: &str| {
//!     DeclarationRecord::declared(
//!         name,
//!         DeclarationKind::TypeAlias,
//!         Location::new(unit, 1),
//!         format!("type {name} = string;"),
//!         Vec::new(),
//!     )
//! };
//! let records = vec![record("Id", "a.ts"), record("Id", "b.ts"), record("Name", "c.ts")];
//!
//! let (groups, stats) = group_records(&records, GroupKey::Name, 2);
//!
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].key, "Id");
//! assert_eq!(groups[0].count(), 2);
//! assert_eq!(stats.eliminated_keys, 1);
//!
//! // All three share the fingerprint "type __NAME__ = string"
//! let (groups, _) = group_records(&records, GroupKey::Shape, 2);
//! assert_eq!(groups[0].count(), 3);
//! ```

use std::collections::HashMap;

use crate::declarations::DeclarationRecord;

/// Which record field a grouping pass buckets by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Identical declaration names
    Name,
    /// Identical shape fingerprints
    Shape,
}

impl GroupKey {
    /// Key of `record` for this pass.
    #[must_use]
    pub fn key_of(self, record: &DeclarationRecord) -> &str {
        match self {
            Self::Name => &record.name,
            Self::Shape => &record.shape_fingerprint,
        }
    }

    /// Label used in logs and reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Shape => "shape",
        }
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Declarations sharing a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Shared name or fingerprint
    pub key: String,
    /// Members in encounter order
    pub members: Vec<DeclarationRecord>,
}

impl DuplicateGroup {
    /// Create a group from its key and members.
    #[must_use]
    pub fn new(key: impl Into<String>, members: Vec<DeclarationRecord>) -> Self {
        Self {
            key: key.into(),
            members,
        }
    }

    /// Number of members.
    #[must_use]
    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// Alias for [`DuplicateGroup::count`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of distinct units the members come from.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        let mut units: Vec<&str> = self
            .members
            .iter()
            .map(|m| m.location.unit_id.as_str())
            .collect();
        units.sort_unstable();
        units.dedup();
        units.len()
    }
}

/// Statistics from a grouping pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct GroupingStats {
    /// Records considered
    pub total_records: usize,
    /// Distinct non-empty keys
    pub distinct_keys: usize,
    /// Records skipped because their key was empty
    pub empty_keys_skipped: usize,
    /// Keys dropped for having fewer than the minimum members
    pub eliminated_keys: usize,
    /// Groups reported
    pub duplicate_groups: usize,
    /// Records that ended up in a reported group
    pub grouped_records: usize,
}

impl GroupingStats {
    /// Percentage of distinct keys dropped as non-duplicates.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.distinct_keys == 0 {
            0.0
        } else {
            (self.eliminated_keys as f64 / self.distinct_keys as f64) * 100.0
        }
    }
}

/// Bucket `records` by `key_fn`, keep buckets with at least `min_count`
/// members and rank them.
///
/// `min_count` is expected to be at least 2; that is checked when the
/// configuration is validated, not here.
#[must_use]
pub fn group_by_key<F>(
    records: &[DeclarationRecord],
    key_fn: F,
    min_count: usize,
) -> (Vec<DuplicateGroup>, GroupingStats)
where
    F: Fn(&DeclarationRecord) -> &str,
{
    let mut buckets: HashMap<&str, Vec<DeclarationRecord>> = HashMap::new();
    let mut stats = GroupingStats {
        total_records: records.len(),
        ..Default::default()
    };

    for record in records {
        let key = key_fn(record);
        if key.is_empty() {
            stats.empty_keys_skipped += 1;
            log::trace!("Empty key for {} at {}", record.name, record.location);
            continue;
        }
        buckets.entry(key).or_default().push(record.clone());
    }

    stats.distinct_keys = buckets.len();

    let mut groups: Vec<DuplicateGroup> = buckets
        .into_iter()
        .filter(|(_, members)| {
            if members.len() < min_count {
                stats.eliminated_keys += 1;
                false
            } else {
                stats.grouped_records += members.len();
                true
            }
        })
        .map(|(key, members)| DuplicateGroup::new(key, members))
        .collect();

    groups.sort_by(|a, b| b.count().cmp(&a.count()).then_with(|| a.key.cmp(&b.key)));
    stats.duplicate_groups = groups.len();

    (groups, stats)
}

/// Group records by name or shape.
#[must_use]
pub fn group_records(
    records: &[DeclarationRecord],
    key: GroupKey,
    min_count: usize,
) -> (Vec<DuplicateGroup>, GroupingStats) {
    let (groups, stats) = group_by_key(records, |r| key.key_of(r), min_count);

    log::info!(
        "Grouping by {}: {} records -> {} groups ({} records in groups)",
        key,
        stats.total_records,
        stats.duplicate_groups,
        stats.grouped_records
    );
    if stats.empty_keys_skipped > 0 {
        log::debug!(
            "Grouping by {}: skipped {} record(s) with an empty key",
            key,
            stats.empty_keys_skipped
        );
    }

    (groups, stats)
}
