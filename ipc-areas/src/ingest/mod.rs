//! Ingestion of raw retrieval batches.
//!
//! The retrieval service returns a GeoJSON `FeatureCollection` whose
//! properties are loosely typed. Ingestion validates each entry and maps it
//! onto the fixed [`AreaProperties`] shape before it reaches the
//! consolidation step:
//!
//! - geometry must be a `Polygon` or `MultiPolygon` with at least one position
//! - identical geometries within one batch are kept once
//! - `title` defaults to empty, `country` to the batch ISO2 code, `year` to the
//!   batch assessment year; `iso3` is always the batch ISO3 code
//!
//! Rejected entries are reported individually and never abort the batch.

use std::collections::HashSet;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::feature::{AreaGeometry, AreaId, AreaProperties, Feature};
use crate::identity::to_canon_json_bytes;

/// Errors that reject a whole batch.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid batch JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Batch is not a feature collection: missing 'features' array")]
    NotAFeatureCollection,
}

/// Why a single raw feature was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("feature is not a JSON object")]
    NotAnObject,

    #[error("feature has no geometry")]
    MissingGeometry,

    #[error("unsupported geometry type '{0}'")]
    UnsupportedGeometry(String),

    #[error("geometry has no coordinates")]
    EmptyCoordinates,

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

/// A raw feature that was filtered out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Feature {index}: {reason}")]
pub struct MalformedFeature {
    /// Position of the entry in the raw `features` array
    pub index: usize,
    pub reason: MalformedReason,
}

/// Batch-level defaults applied to raw properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestContext {
    /// ISO 3166-1 alpha-2 code used when a feature has no `country`
    pub iso2: String,
    /// ISO 3166-1 alpha-3 code stamped on every feature
    pub iso3: String,
    /// Assessment year used when a feature has no usable `year`
    pub year: i32,
}

impl IngestContext {
    pub fn new(iso2: &str, iso3: &str, year: i32) -> Self {
        Self {
            iso2: iso2.trim().to_uppercase(),
            iso3: iso3.trim().to_uppercase(),
            year,
        }
    }
}

/// Result of ingesting one batch.
#[derive(Debug, Clone, Default)]
pub struct IngestOutcome {
    /// Accepted features, in input order
    pub features: Vec<Feature>,
    /// Entries that failed validation
    pub rejected: Vec<MalformedFeature>,
    /// Entries dropped because an identical geometry was already accepted
    pub duplicates: usize,
}

/// Parse and ingest a raw batch from bytes.
pub fn ingest_slice(bytes: &[u8], context: &IngestContext) -> Result<IngestOutcome, IngestError> {
    let raw: Value = serde_json::from_slice(bytes)?;
    ingest_batch(&raw, context)
}

/// Validate and normalize every feature of a raw `FeatureCollection`.
pub fn ingest_batch(raw: &Value, context: &IngestContext) -> Result<IngestOutcome, IngestError> {
    let entries = raw
        .get("features")
        .and_then(Value::as_array)
        .ok_or(IngestError::NotAFeatureCollection)?;

    let mut outcome = IngestOutcome::default();
    let mut seen_geometries: HashSet<Vec<u8>> = HashSet::new();

    for (index, entry) in entries.iter().enumerate() {
        let Some(object) = entry.as_object() else {
            outcome.rejected.push(MalformedFeature {
                index,
                reason: MalformedReason::NotAnObject,
            });
            continue;
        };

        let (geometry, raw_geometry) = match parse_geometry(object) {
            Ok(parsed) => parsed,
            Err(reason) => {
                debug!(index, %reason, "Rejecting raw feature");
                outcome.rejected.push(MalformedFeature { index, reason });
                continue;
            }
        };

        // Serializing a parsed Value cannot produce non-finite numbers.
        let fingerprint = to_canon_json_bytes(raw_geometry).unwrap_or_default();
        if !seen_geometries.insert(fingerprint) {
            outcome.duplicates += 1;
            continue;
        }

        let properties = build_properties(object, context);
        outcome.features.push(Feature::new(geometry, properties));
    }

    if !outcome.rejected.is_empty() {
        warn!(
            iso3 = %context.iso3,
            year = context.year,
            rejected = outcome.rejected.len(),
            "Some raw features were rejected"
        );
    }
    debug!(
        iso3 = %context.iso3,
        accepted = outcome.features.len(),
        duplicates = outcome.duplicates,
        "Ingested batch"
    );

    Ok(outcome)
}

fn parse_geometry(object: &Map<String, Value>) -> Result<(AreaGeometry, &Value), MalformedReason> {
    let raw = match object.get("geometry") {
        Some(Value::Object(_)) => &object["geometry"],
        _ => return Err(MalformedReason::MissingGeometry),
    };

    let kind = raw.get("type").and_then(Value::as_str).unwrap_or_default();
    let coordinates = match raw.get("coordinates") {
        Some(Value::Null) | None => return Err(MalformedReason::EmptyCoordinates),
        Some(c) => c.clone(),
    };

    let invalid = |e: serde_json::Error| MalformedReason::InvalidCoordinates(e.to_string());
    let geometry = match kind {
        "Polygon" => AreaGeometry::Polygon(serde_json::from_value(coordinates).map_err(invalid)?),
        "MultiPolygon" => {
            AreaGeometry::MultiPolygon(serde_json::from_value(coordinates).map_err(invalid)?)
        }
        other => return Err(MalformedReason::UnsupportedGeometry(other.to_string())),
    };

    if geometry.is_empty() {
        return Err(MalformedReason::EmptyCoordinates);
    }

    Ok((geometry, raw))
}

fn build_properties(object: &Map<String, Value>, context: &IngestContext) -> AreaProperties {
    let props = object.get("properties").and_then(Value::as_object);
    let text = |key: &str| {
        props
            .and_then(|p| p.get(key))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    let year = props
        .and_then(|p| p.get("year"))
        .and_then(parse_year)
        .unwrap_or(context.year);

    let id = props
        .and_then(|p| p.get("id"))
        .or_else(|| object.get("id"))
        .and_then(AreaId::from_value);

    AreaProperties {
        title: text("title").unwrap_or_default().to_string(),
        country: text("country").unwrap_or(context.iso2.as_str()).to_string(),
        iso3: context.iso3.clone(),
        year: Some(year),
        id,
    }
}

fn parse_year(value: &Value) -> Option<i32> {
    let year = match value {
        Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    (year != 0).then_some(year)
}
