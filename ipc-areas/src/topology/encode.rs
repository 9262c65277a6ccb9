//! Topology construction from features.
//!
//! Rings are cut into arcs at junctions, and arcs shared between rings are
//! stored once. A junction is any point whose neighbours differ between two
//! visits, plus every ring's start point. Cutting at ring starts keeps each
//! ring reconstructible exactly as supplied.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::{json, Value};

use super::{TopoGeometry, Topology};
use crate::feature::{AreaGeometry, Feature, Position, Ring};

/// Bit-exact identity of a position.
type PointKey = Vec<u64>;

fn point_key(position: &Position) -> PointKey {
    position.iter().map(|v| v.to_bits()).collect()
}

/// Encode features into a topology with a single geometry group.
///
/// Records are written in input order. An empty input yields an artifact
/// with an empty group and no arcs.
pub fn encode(features: &[Feature], object_name: &str) -> Topology {
    let junctions = find_junctions(features.iter().flat_map(|f| f.geometry().rings()));
    let mut builder = ArcBuilder::new(junctions);

    let geometries = features
        .iter()
        .map(|feature| encode_feature(feature, &mut builder))
        .collect();

    let bbox = bounding_box(features);
    let mut objects = BTreeMap::new();
    objects.insert(object_name.to_string(), TopoGeometry::collection(geometries));

    Topology {
        kind: "Topology".to_string(),
        bbox,
        transform: None,
        objects,
        arcs: builder.into_arcs(),
    }
}

fn encode_feature(feature: &Feature, builder: &mut ArcBuilder) -> TopoGeometry {
    let geometry = feature.geometry();
    let arcs = match geometry {
        AreaGeometry::Polygon(rings) => json!(builder.polygon(rings)),
        AreaGeometry::MultiPolygon(polygons) => json!(polygons
            .iter()
            .map(|rings| builder.polygon(rings))
            .collect::<Vec<_>>()),
    };

    let properties = serde_json::to_value(feature.properties()).unwrap_or(Value::Null);

    TopoGeometry {
        kind: Some(geometry.type_name().to_string()),
        id: feature.id().cloned(),
        arcs: Some(arcs),
        geometries: None,
        properties: Some(properties),
    }
}

/// Find points where rings meet or diverge.
fn find_junctions<'a>(rings: impl Iterator<Item = &'a Ring>) -> HashSet<PointKey> {
    let mut neighbours: HashMap<PointKey, [PointKey; 2]> = HashMap::new();
    let mut junctions = HashSet::new();

    for ring in rings {
        let Some(first) = ring.first() else {
            continue;
        };
        junctions.insert(point_key(first));

        // Closing position duplicates the first; walk the open ring.
        let open = if ring.len() > 1 && ring.first() == ring.last() {
            ring.len() - 1
        } else {
            ring.len()
        };

        for i in 0..open {
            let prev = &ring[(i + open - 1) % open];
            let next = &ring[(i + 1) % open];
            let mut pair = [point_key(prev), point_key(next)];
            pair.sort();

            let key = point_key(&ring[i]);
            match neighbours.get(&key) {
                Some(seen) if *seen != pair => {
                    junctions.insert(key);
                }
                Some(_) => {}
                None => {
                    neighbours.insert(key, pair);
                }
            }
        }
    }

    junctions
}

/// Collects unique arcs and hands out references to them.
struct ArcBuilder {
    junctions: HashSet<PointKey>,
    arcs: Vec<Vec<Position>>,
    index: HashMap<Vec<PointKey>, usize>,
}

impl ArcBuilder {
    fn new(junctions: HashSet<PointKey>) -> Self {
        Self {
            junctions,
            arcs: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn into_arcs(self) -> Vec<Vec<Position>> {
        self.arcs
    }

    fn polygon(&mut self, rings: &[Ring]) -> Vec<Vec<i64>> {
        rings.iter().map(|ring| self.ring(ring)).collect()
    }

    /// Split a ring at junctions and intern each piece.
    fn ring(&mut self, ring: &Ring) -> Vec<i64> {
        if ring.is_empty() {
            return Vec::new();
        }

        let last = ring.len() - 1;
        let mut refs = Vec::new();
        let mut start = 0;
        for i in 1..=last {
            if i == last || self.junctions.contains(&point_key(&ring[i])) {
                refs.push(self.intern(&ring[start..=i]));
                start = i;
            }
        }
        if refs.is_empty() {
            // Single-position ring
            refs.push(self.intern(&ring[..]));
        }
        refs
    }

    /// Return a reference to an existing arc (forward or reversed) or add it.
    fn intern(&mut self, arc: &[Position]) -> i64 {
        let forward: Vec<PointKey> = arc.iter().map(point_key).collect();
        if let Some(&idx) = self.index.get(&forward) {
            return idx as i64;
        }

        let reversed: Vec<PointKey> = forward.iter().rev().cloned().collect();
        if let Some(&idx) = self.index.get(&reversed) {
            return !(idx as i64);
        }

        let idx = self.arcs.len();
        self.arcs.push(arc.to_vec());
        self.index.insert(forward, idx);
        idx as i64
    }
}

fn bounding_box(features: &[Feature]) -> Option<[f64; 4]> {
    let mut bbox: Option<[f64; 4]> = None;
    for position in features
        .iter()
        .flat_map(|f| f.geometry().rings())
        .flatten()
    {
        let (Some(&x), Some(&y)) = (position.first(), position.get(1)) else {
            continue;
        };
        bbox = Some(match bbox {
            None => [x, y, x, y],
            Some([min_x, min_y, max_x, max_y]) => {
                [min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y)]
            }
        });
    }
    bbox
}
