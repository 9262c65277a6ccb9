//! Feature extraction from a topology.

use std::borrow::Cow;

use serde_json::Value;
use tracing::warn;

use super::{DecodeError, TopoGeometry, Topology, Transform};
use crate::feature::{AreaGeometry, AreaProperties, Feature, Position, Ring};

/// Result of decoding an artifact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    /// Polygonal features in group order, then record order
    pub features: Vec<Feature>,
    /// Records that were skipped (unsupported type or corrupt data)
    pub skipped: usize,
}

/// Parse and decode an artifact from JSON bytes.
pub fn decode_slice(bytes: &[u8]) -> Result<Decoded, DecodeError> {
    let topology = Topology::from_slice(bytes)?;
    Ok(decode(&topology))
}

/// Decode every polygonal record in every geometry group.
///
/// Groups are visited in name order. Records that cannot be turned into a
/// feature are skipped with a warning rather than failing the whole artifact.
pub fn decode(topology: &Topology) -> Decoded {
    let arcs = resolve_arcs(topology);
    let mut decoded = Decoded::default();

    for (name, object) in &topology.objects {
        let records: Vec<&TopoGeometry> = match &object.geometries {
            Some(geometries) if object.is_collection() => geometries.iter().collect(),
            _ => vec![object],
        };

        for (index, record) in records.into_iter().enumerate() {
            match decode_record(record, &arcs) {
                Ok(feature) => decoded.features.push(feature),
                Err(reason) => {
                    warn!(group = %name, index, "Skipping geometry record: {}", reason);
                    decoded.skipped += 1;
                }
            }
        }
    }

    decoded
}

fn decode_record(record: &TopoGeometry, arcs: &[Vec<Position>]) -> Result<Feature, String> {
    let refs = record.arcs.clone().unwrap_or(Value::Array(Vec::new()));
    let geometry = match record.kind.as_deref() {
        Some("Polygon") => {
            let rings: Vec<Vec<i64>> = serde_json::from_value(refs)
                .map_err(|e| format!("invalid polygon arcs: {}", e))?;
            AreaGeometry::Polygon(polygon(&rings, arcs)?)
        }
        Some("MultiPolygon") => {
            let polygons: Vec<Vec<Vec<i64>>> = serde_json::from_value(refs)
                .map_err(|e| format!("invalid multipolygon arcs: {}", e))?;
            AreaGeometry::MultiPolygon(
                polygons
                    .iter()
                    .map(|rings| polygon(rings, arcs))
                    .collect::<Result<_, _>>()?,
            )
        }
        Some(other) => return Err(format!("unsupported geometry type '{}'", other)),
        None => return Err("null geometry".to_string()),
    };

    let mut properties: AreaProperties = match &record.properties {
        Some(value) if !value.is_null() => serde_json::from_value(value.clone())
            .map_err(|e| format!("invalid properties: {}", e))?,
        _ => AreaProperties::default(),
    };
    if properties.id.is_none() {
        properties.id = record.id.clone();
    }

    Ok(Feature::new(geometry, properties))
}

fn polygon(rings: &[Vec<i64>], arcs: &[Vec<Position>]) -> Result<Vec<Ring>, String> {
    rings.iter().map(|refs| ring(refs, arcs)).collect()
}

/// Stitch arcs into a ring. Each arc after the first shares its first
/// position with the previous arc's last, so that position is dropped.
fn ring(refs: &[i64], arcs: &[Vec<Position>]) -> Result<Ring, String> {
    let mut ring = Ring::new();
    for (n, &reference) in refs.iter().enumerate() {
        let (idx, reversed) = if reference < 0 {
            (!reference as usize, true)
        } else {
            (reference as usize, false)
        };
        let arc = arcs
            .get(idx)
            .ok_or_else(|| format!("arc index {} out of range ({} arcs)", reference, arcs.len()))?;

        let skip = usize::from(n > 0);
        if reversed {
            ring.extend(arc.iter().rev().skip(skip).cloned());
        } else {
            ring.extend(arc.iter().skip(skip).cloned());
        }
    }
    Ok(ring)
}

/// Absolute arc coordinates, undoing quantization when present.
fn resolve_arcs(topology: &Topology) -> Cow<'_, [Vec<Position>]> {
    match &topology.transform {
        None => Cow::Borrowed(topology.arcs.as_slice()),
        Some(transform) => Cow::Owned(
            topology
                .arcs
                .iter()
                .map(|arc| dequantize(arc, transform))
                .collect(),
        ),
    }
}

fn dequantize(arc: &[Position], transform: &Transform) -> Vec<Position> {
    let (mut x, mut y) = (0.0, 0.0);
    arc.iter()
        .map(|position| {
            x += position.first().copied().unwrap_or(0.0);
            y += position.get(1).copied().unwrap_or(0.0);
            let mut absolute = vec![
                x * transform.scale[0] + transform.translate[0],
                y * transform.scale[1] + transform.translate[1],
            ];
            absolute.extend(position.iter().skip(2).copied());
            absolute
        })
        .collect()
}
