//! Feature type definitions

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single coordinate tuple: `[x, y]` with optional extra dimensions.
pub type Position = Vec<f64>;

/// A closed sequence of positions.
pub type Ring = Vec<Position>;

/// Area geometry. Only polygonal shapes are accepted into a dataset.
///
/// Serializes as a GeoJSON geometry object:
/// `{"type": "Polygon", "coordinates": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum AreaGeometry {
    /// Exterior ring followed by holes
    Polygon(Vec<Ring>),
    /// One ring list per member polygon
    MultiPolygon(Vec<Vec<Ring>>),
}

impl AreaGeometry {
    /// GeoJSON type tag for this geometry.
    pub fn type_name(&self) -> &'static str {
        match self {
            AreaGeometry::Polygon(_) => "Polygon",
            AreaGeometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Iterate over every ring in the geometry, in storage order.
    pub fn rings(&self) -> Box<dyn Iterator<Item = &Ring> + '_> {
        match self {
            AreaGeometry::Polygon(rings) => Box::new(rings.iter()),
            AreaGeometry::MultiPolygon(polygons) => Box::new(polygons.iter().flatten()),
        }
    }

    /// Total number of positions across all rings.
    pub fn position_count(&self) -> usize {
        self.rings().map(Vec::len).sum()
    }

    /// True when the geometry carries no positions at all.
    pub fn is_empty(&self) -> bool {
        self.position_count() == 0
    }

    /// True when every coordinate value is a finite number.
    pub fn is_finite(&self) -> bool {
        self.rings()
            .flatten()
            .all(|position| position.iter().all(|v| v.is_finite()))
    }

    /// Produce a new geometry with `f` applied to every position.
    pub fn map_positions<F>(&self, mut f: F) -> AreaGeometry
    where
        F: FnMut(&Position) -> Position,
    {
        let mut map_ring = |ring: &Ring| ring.iter().map(&mut f).collect::<Ring>();
        match self {
            AreaGeometry::Polygon(rings) => {
                AreaGeometry::Polygon(rings.iter().map(&mut map_ring).collect())
            }
            AreaGeometry::MultiPolygon(polygons) => AreaGeometry::MultiPolygon(
                polygons
                    .iter()
                    .map(|rings| rings.iter().map(&mut map_ring).collect())
                    .collect(),
            ),
        }
    }
}

/// Source-assigned area identifier.
///
/// The retrieval API hands out numeric identifiers, while hand-edited
/// datasets sometimes carry strings. Both are kept as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AreaId {
    Number(serde_json::Number),
    Text(String),
}

impl AreaId {
    /// Build an identifier from a JSON scalar. Arrays, objects and null are rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(AreaId::Number(n.clone())),
            Value::String(s) => Some(AreaId::Text(s.clone())),
            Value::Bool(b) => Some(AreaId::Text(b.to_string())),
            _ => None,
        }
    }
}

impl From<&str> for AreaId {
    fn from(s: &str) -> Self {
        AreaId::Text(s.to_string())
    }
}

impl From<i64> for AreaId {
    fn from(n: i64) -> Self {
        AreaId::Number(n.into())
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaId::Number(n) => write!(f, "{}", n),
            AreaId::Text(s) => f.write_str(s),
        }
    }
}

/// Fixed-shape area attributes.
///
/// `title`, `country` (ISO 3166-1 alpha-2) and `iso3` default to empty
/// strings when absent; `year` accepts integers or numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaProperties {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub country: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub iso3: String,
    #[serde(
        default,
        deserialize_with = "lenient_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AreaId>,
}

impl AreaProperties {
    pub fn new(title: &str, country: &str, iso3: &str, year: Option<i32>) -> Self {
        Self {
            title: title.to_string(),
            country: country.to_string(),
            iso3: iso3.to_string(),
            year,
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<AreaId>) -> Self {
        self.id = Some(id.into());
        self
    }
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("year out of range: {}", n))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid year: '{}'", s))),
        Some(other) => Err(D::Error::custom(format!("invalid year: {}", other))),
    }
}

/// One IPC area.
///
/// Serializes as a GeoJSON `Feature` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    geometry: AreaGeometry,
    #[serde(default)]
    properties: AreaProperties,
}

impl Feature {
    pub fn new(geometry: AreaGeometry, properties: AreaProperties) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    pub fn geometry(&self) -> &AreaGeometry {
        &self.geometry
    }

    pub fn properties(&self) -> &AreaProperties {
        &self.properties
    }

    /// Source identifier, if the area has one.
    pub fn id(&self) -> Option<&AreaId> {
        self.properties.id.as_ref()
    }

    /// Assessment year recorded on the feature.
    pub fn year(&self) -> Option<i32> {
        self.properties.year
    }

    /// Return a copy of this feature carrying a different geometry.
    pub fn with_geometry(&self, geometry: AreaGeometry) -> Feature {
        Feature {
            geometry,
            properties: self.properties.clone(),
        }
    }
}
