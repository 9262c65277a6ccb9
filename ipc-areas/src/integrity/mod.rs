//! Identifier uniqueness checks.
//!
//! Counts area identifiers across the whole dataset and within a scope
//! (the ISO3 code by default). Features without an identifier are counted
//! under [`MISSING_ID`], so two unidentified areas in the same scope are
//! reported like any other collision.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::feature::Feature;

/// Marker counted in place of an absent identifier.
pub const MISSING_ID: &str = "<missing>";

/// Scope assigned to features with an empty scope property.
pub const UNKNOWN_SCOPE: &str = "UNK";

/// Property used to group features before counting identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeProperty {
    /// ISO 3166-1 alpha-3 code
    #[default]
    Iso3,
    /// ISO 3166-1 alpha-2 code
    Country,
}

impl ScopeProperty {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeProperty::Iso3 => "iso3",
            ScopeProperty::Country => "country",
        }
    }

    fn value_of<'a>(&self, feature: &'a Feature) -> &'a str {
        let value = match self {
            ScopeProperty::Iso3 => feature.properties().iso3.trim(),
            ScopeProperty::Country => feature.properties().country.trim(),
        };
        if value.is_empty() {
            UNKNOWN_SCOPE
        } else {
            value
        }
    }
}

impl fmt::Display for ScopeProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScopeProperty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iso3" => Ok(ScopeProperty::Iso3),
            "country" | "iso2" => Ok(ScopeProperty::Country),
            other => Err(format!(
                "unknown scope '{}': expected 'iso3' or 'country'",
                other
            )),
        }
    }
}

/// Duplicate identifiers found within one scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Duplicate ids in {scope}: {}", .ids.join(", "))]
pub struct IntegrityViolation {
    pub scope: String,
    pub ids: Vec<String>,
}

/// Result of [`find_duplicate_ids`]. All id lists are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    /// Identifiers seen more than once across the whole dataset
    pub global: Vec<String>,
    /// Identifiers seen more than once within a scope, keyed by scope value
    pub per_scope: BTreeMap<String, Vec<String>>,
}

impl DuplicateReport {
    /// True when no identifier repeats anywhere.
    pub fn is_clean(&self) -> bool {
        self.global.is_empty() && self.per_scope.is_empty()
    }

    /// One violation per scope holding duplicates, in scope order.
    pub fn violations(&self) -> Vec<IntegrityViolation> {
        self.per_scope
            .iter()
            .map(|(scope, ids)| IntegrityViolation {
                scope: scope.clone(),
                ids: ids.clone(),
            })
            .collect()
    }

    /// Render per-scope duplicates as `KEN: A1, A2; UGA: B1`.
    pub fn format_report(&self) -> String {
        self.per_scope
            .iter()
            .map(|(scope, ids)| format!("{}: {}", scope, ids.join(", ")))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Count identifiers globally and per scope, reporting any seen twice or more.
pub fn find_duplicate_ids(features: &[Feature], scope: ScopeProperty) -> DuplicateReport {
    let mut global: BTreeMap<String, usize> = BTreeMap::new();
    let mut scoped: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();

    for feature in features {
        let id = feature
            .id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| MISSING_ID.to_string());

        *global.entry(id.clone()).or_default() += 1;
        *scoped
            .entry(scope.value_of(feature).to_string())
            .or_default()
            .entry(id)
            .or_default() += 1;
    }

    let per_scope = scoped
        .into_iter()
        .filter_map(|(scope, counts)| {
            let dupes = repeated(counts);
            (!dupes.is_empty()).then_some((scope, dupes))
        })
        .collect();

    DuplicateReport {
        global: repeated(global),
        per_scope,
    }
}

fn repeated(counts: BTreeMap<String, usize>) -> Vec<String> {
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id)
        .collect()
}
