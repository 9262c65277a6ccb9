//! TopoJSON geometry codec.
//!
//! Converts between the persisted topology artifact and a flat list of
//! [`Feature`](crate::feature::Feature) values.
//!
//! # Artifact layout
//!
//! ```text
//! {"type": "Topology",
//!  "bbox": [minx, miny, maxx, maxy],
//!  "objects": {"data": {"type": "GeometryCollection", "geometries": [...]}},
//!  "arcs": [[[x, y], ...], ...]}
//! ```
//!
//! Each geometry record references arcs by index; a negative index `~i`
//! walks arc `i` backwards. Encoding never quantizes, so arcs hold absolute
//! coordinates. Decoding additionally understands quantized artifacts that
//! carry a `transform` with delta-encoded arcs.
//!
//! Encoding is deterministic: the same features in the same order always
//! produce the same artifact, byte for byte.

mod decode;
mod encode;

pub use decode::{decode, decode_slice, Decoded};
pub use encode::encode;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::feature::{AreaId, Position};

/// Default name of the geometry group written by [`encode`].
pub const DEFAULT_OBJECT_NAME: &str = "data";

/// Errors reading a topology artifact.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Input is not valid JSON or does not have the topology shape
    #[error("Invalid topology JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Top-level `type` is something other than `Topology`
    #[error("Not a topology artifact (type = '{0}')")]
    NotATopology(String),
}

/// Errors writing a topology artifact.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Failed to serialize topology: {0}")]
    Json(#[from] serde_json::Error),
}

/// Quantization transform of a quantized topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

/// A geometry object inside the `objects` container.
///
/// Used both for group containers (`GeometryCollection` with `geometries`)
/// and for the individual records they hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopoGeometry {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AreaId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arcs: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometries: Option<Vec<TopoGeometry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
}

impl TopoGeometry {
    /// Create an empty geometry collection.
    pub fn collection(geometries: Vec<TopoGeometry>) -> Self {
        Self {
            kind: Some("GeometryCollection".to_string()),
            id: None,
            arcs: None,
            geometries: Some(geometries),
            properties: None,
        }
    }

    /// True when this object is a geometry collection.
    pub fn is_collection(&self) -> bool {
        self.kind.as_deref() == Some("GeometryCollection")
    }
}

/// The persisted topology artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub objects: BTreeMap<String, TopoGeometry>,
    #[serde(default)]
    pub arcs: Vec<Vec<Position>>,
}

impl Topology {
    /// Parse an artifact from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        let topology: Topology = serde_json::from_slice(bytes)?;
        if topology.kind != "Topology" {
            return Err(DecodeError::NotATopology(topology.kind));
        }
        Ok(topology)
    }

    /// Serialize to compact JSON bytes.
    pub fn to_vec(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Number of geometry records in the first group, if any group exists.
    pub fn feature_count(&self) -> Option<usize> {
        let first = self.objects.values().next()?;
        match &first.geometries {
            Some(geometries) => Some(geometries.len()),
            None if first.kind.is_some() => Some(1),
            None => None,
        }
    }
}
