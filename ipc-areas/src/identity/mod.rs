//! Deduplication keys for area features.
//!
//! A key names one logical area across assessment years and sources.
//! Resolution order, first match wins:
//!
//! 1. `id::<iso3>::<id>` when the feature has a source identifier
//! 2. `<iso3>::<title>` or `title::<title>` when the feature has a title
//! 3. `geometry::<sha1>` of the canonical geometry JSON
//! 4. `feature::<sha1>` of the canonical feature JSON
//!
//! Titles are whitespace-collapsed and lowercased; ISO3 codes are trimmed and
//! lowercased.

mod canon;

pub use canon::{to_canon_json_bytes, CanonJsonError};

use serde::Serialize;
use sha1::{Digest, Sha1};

use crate::feature::Feature;

/// Collapse whitespace runs, trim, and lowercase a title.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Derive the deduplication key for a feature.
///
/// Fails only when a hash fallback is needed and the feature cannot be
/// canonically serialized (non-finite coordinates).
pub fn feature_key(feature: &Feature) -> Result<String, CanonJsonError> {
    let props = feature.properties();
    let iso3 = props.iso3.trim().to_lowercase();

    if let Some(id) = feature.id() {
        return Ok(format!("id::{}::{}", iso3, id.to_string().trim()));
    }

    let title = normalize_title(&props.title);
    if !title.is_empty() {
        return Ok(if iso3.is_empty() {
            format!("title::{}", title)
        } else {
            format!("{}::{}", iso3, title)
        });
    }

    let geometry = feature.geometry();
    if !geometry.is_finite() {
        return Err(CanonJsonError::NonFiniteFloat);
    }
    if !geometry.is_empty() {
        return Ok(format!("geometry::{}", sha1_hex(geometry)?));
    }

    Ok(format!("feature::{}", sha1_hex(feature)?))
}

/// SHA-1 of the canonical JSON encoding, as lowercase hex.
pub fn sha1_hex<T: Serialize>(value: &T) -> Result<String, CanonJsonError> {
    let bytes = to_canon_json_bytes(value)?;
    Ok(format!("{:x}", Sha1::digest(&bytes)))
}
