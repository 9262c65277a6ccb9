//! Feature consolidation across sources and assessment years.
//!
//! Batches of features are merged one at a time into a caller-owned
//! [`CanonicalCollection`]. Each feature is keyed with
//! [`feature_key`](crate::identity::feature_key); on a key collision the
//! incoming candidate replaces the existing one when
//!
//! - its priority is higher, or
//! - priorities are equal and its source year is the same or newer
//!   (a missing year counts as 0).
//!
//! The surviving features are read out in key order, so the final ordering
//! does not depend on the order batches were merged in.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use tracing::{debug, warn};

use crate::feature::Feature;
use crate::identity::feature_key;

/// Priority of legacy per-year files (`<ISO3>_<year>_areas.topojson`).
pub const PRIORITY_LEGACY: i32 = -1;
/// Priority of the previously persisted country dataset.
pub const PRIORITY_EXISTING: i32 = 0;
/// Priority of freshly downloaded batches.
pub const PRIORITY_DOWNLOAD: i32 = 10;

/// Provenance of one merge batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSource {
    /// Higher wins regardless of year
    pub priority: i32,
    /// Year used for features that carry none of their own
    pub source_year: Option<i32>,
    /// Human-readable label for logs and reports
    pub label: String,
}

impl BatchSource {
    pub fn new(priority: i32, source_year: Option<i32>, label: impl Into<String>) -> Self {
        Self {
            priority,
            source_year,
            label: label.into(),
        }
    }

    /// A legacy-format file, optionally tagged with the year in its name.
    pub fn legacy(year: Option<i32>) -> Self {
        let label = match year {
            Some(year) => format!("legacy:{}", year),
            None => "legacy".to_string(),
        };
        Self::new(PRIORITY_LEGACY, year, label)
    }

    /// The dataset already persisted for a country.
    pub fn existing() -> Self {
        Self::new(PRIORITY_EXISTING, None, "existing")
    }

    /// A batch freshly retrieved for an assessment year.
    pub fn download(year: i32) -> Self {
        Self::new(PRIORITY_DOWNLOAD, Some(year), format!("download:{}", year))
    }
}

/// A feature together with the provenance it was merged with.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub feature: Feature,
    pub priority: i32,
    pub source_year: Option<i32>,
    pub source_label: String,
}

impl Candidate {
    fn new(feature: Feature, source: &BatchSource) -> Self {
        let source_year = feature.year().or(source.source_year);
        Self {
            feature,
            priority: source.priority,
            source_year,
            source_label: source.label.clone(),
        }
    }

    /// True when this candidate should replace `existing` under the same key.
    pub fn supersedes(&self, existing: &Candidate) -> bool {
        if self.priority != existing.priority {
            return self.priority > existing.priority;
        }
        self.source_year.unwrap_or(0) >= existing.source_year.unwrap_or(0)
    }
}

/// Per-batch merge bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// New keys inserted
    pub added: usize,
    /// Existing entries replaced (including identical re-inserts)
    pub updated: usize,
    /// Incoming features that lost the tie-break
    pub skipped: usize,
    /// Features that could not be keyed and were dropped
    pub rejected: usize,
}

impl MergeStats {
    /// True when the batch changed the collection's membership or content.
    pub fn changed(&self) -> bool {
        self.added > 0 || self.updated > 0
    }
}

impl AddAssign for MergeStats {
    fn add_assign(&mut self, other: Self) {
        self.added += other.added;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.rejected += other.rejected;
    }
}

/// One surviving candidate per deduplication key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalCollection {
    entries: BTreeMap<String, Candidate>,
}

impl CanonicalCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Candidate> {
        self.entries.get(key)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Candidate)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge one batch into the collection.
    pub fn merge<I>(&mut self, features: I, source: &BatchSource) -> MergeStats
    where
        I: IntoIterator<Item = Feature>,
    {
        let mut stats = MergeStats::default();

        for feature in features {
            let key = match feature_key(&feature) {
                Ok(key) => key,
                Err(e) => {
                    warn!(source = %source.label, "Skipping feature without a usable key: {}", e);
                    stats.rejected += 1;
                    continue;
                }
            };

            let candidate = Candidate::new(feature, source);
            let replaces = self
                .entries
                .get(&key)
                .map(|existing| candidate.supersedes(existing));
            match replaces {
                None => {
                    self.entries.insert(key, candidate);
                    stats.added += 1;
                }
                Some(true) => {
                    self.entries.insert(key, candidate);
                    stats.updated += 1;
                }
                Some(false) => stats.skipped += 1,
            }
        }

        debug!(
            source = %source.label,
            priority = source.priority,
            added = stats.added,
            updated = stats.updated,
            skipped = stats.skipped,
            rejected = stats.rejected,
            "Merged batch"
        );
        stats
    }

    /// Newest source year among surviving candidates.
    pub fn target_year(&self) -> Option<i32> {
        self.entries.values().filter_map(|c| c.source_year).max()
    }

    /// Surviving features in key order.
    pub fn features(&self) -> Vec<Feature> {
        self.entries.values().map(|c| c.feature.clone()).collect()
    }

    /// Consume the collection, yielding surviving features in key order.
    pub fn into_features(self) -> Vec<Feature> {
        self.entries.into_values().map(|c| c.feature).collect()
    }
}

/// Functional form of [`CanonicalCollection::merge`]: thread the collection
/// through and get it back along with the batch statistics.
pub fn merge<I>(
    mut collection: CanonicalCollection,
    features: I,
    source: &BatchSource,
) -> (CanonicalCollection, MergeStats)
where
    I: IntoIterator<Item = Feature>,
{
    let stats = collection.merge(features, source);
    (collection, stats)
}

#[cfg(test)]
mod tests;
