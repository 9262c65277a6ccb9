//! Shape simplification backed by the `geo` crate.

use std::fmt;
use std::str::FromStr;

use geo::{Coord, LineString, Polygon, Simplify, SimplifyVwPreserve};

use super::Simplifier;
use crate::feature::{AreaGeometry, Position, Ring};

/// Smallest valid closed ring: three distinct corners plus the closing position.
const MIN_RING_POSITIONS: usize = 4;

/// Simplification algorithm selection.
///
/// Configured tolerances are distances in coordinate units, which is what
/// the default reads them as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimplifyAlgorithm {
    /// Ramer-Douglas-Peucker; tolerance is a distance
    #[default]
    DouglasPeucker,
    /// Visvalingam-Whyatt with topology preservation; tolerance is an area
    VwPreserve,
}

impl SimplifyAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimplifyAlgorithm::VwPreserve => "vw_preserve",
            SimplifyAlgorithm::DouglasPeucker => "douglas_peucker",
        }
    }
}

impl fmt::Display for SimplifyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimplifyAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vw_preserve" | "vw" => Ok(SimplifyAlgorithm::VwPreserve),
            "douglas_peucker" | "rdp" => Ok(SimplifyAlgorithm::DouglasPeucker),
            other => Err(format!(
                "unknown algorithm '{}': expected 'vw_preserve' or 'douglas_peucker'",
                other
            )),
        }
    }
}

/// [`Simplifier`] implemented with `geo`.
///
/// Rings that collapse below four positions are dropped; a polygon whose
/// exterior collapses is dropped entirely. Output is two-dimensional.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoSimplifier {
    algorithm: SimplifyAlgorithm,
}

impl GeoSimplifier {
    pub fn new(algorithm: SimplifyAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> SimplifyAlgorithm {
        self.algorithm
    }

    fn simplify_polygon(&self, rings: &[Ring], tolerance: f64) -> Option<Vec<Ring>> {
        let (exterior, interiors) = rings.split_first()?;
        let polygon = Polygon::new(
            to_line_string(exterior),
            interiors.iter().map(to_line_string).collect(),
        );

        let simplified = match self.algorithm {
            SimplifyAlgorithm::VwPreserve => polygon.simplify_vw_preserve(&tolerance),
            SimplifyAlgorithm::DouglasPeucker => polygon.simplify(&tolerance),
        };

        let exterior = from_line_string(simplified.exterior());
        if exterior.len() < MIN_RING_POSITIONS {
            return None;
        }

        let mut out = vec![exterior];
        out.extend(
            simplified
                .interiors()
                .iter()
                .map(from_line_string)
                .filter(|ring| ring.len() >= MIN_RING_POSITIONS),
        );
        Some(out)
    }
}

impl Simplifier for GeoSimplifier {
    fn simplify(&self, geometry: &AreaGeometry, tolerance: f64) -> AreaGeometry {
        match geometry {
            AreaGeometry::Polygon(rings) => AreaGeometry::Polygon(
                self.simplify_polygon(rings, tolerance).unwrap_or_default(),
            ),
            AreaGeometry::MultiPolygon(polygons) => AreaGeometry::MultiPolygon(
                polygons
                    .iter()
                    .filter_map(|rings| self.simplify_polygon(rings, tolerance))
                    .collect(),
            ),
        }
    }
}

fn to_line_string(ring: &Ring) -> LineString<f64> {
    ring.iter()
        .map(|position: &Position| Coord {
            x: position.first().copied().unwrap_or(0.0),
            y: position.get(1).copied().unwrap_or(0.0),
        })
        .collect::<Vec<_>>()
        .into()
}

fn from_line_string(line: &LineString<f64>) -> Ring {
    line.coords().map(|c| vec![c.x, c.y]).collect()
}
