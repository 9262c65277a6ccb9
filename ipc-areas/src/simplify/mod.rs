//! Coordinate precision reduction and shape simplification.
//!
//! Each feature is processed independently:
//!
//! 1. When `tolerance > 0`, the geometry is replaced by the output of a
//!    [`Simplifier`]. An empty result keeps the original geometry so that no
//!    area is ever dropped.
//! 2. Every coordinate is rounded to `precision` decimal places. Rounding runs
//!    after simplification so the simplifier sees full-precision input.
//! 3. Rounding can push a kept vertex under the tolerance, so steps 1 and 2
//!    repeat on the rounded geometry until it stops changing.
//!
//! Running the pipeline on its own output with the same options yields the
//! same bytes.

mod geometry;
mod report;

pub use geometry::{GeoSimplifier, SimplifyAlgorithm};
pub use report::SizeReport;

use thiserror::Error;
use tracing::{debug, warn};

use crate::feature::{AreaGeometry, Feature};
use crate::topology::{self, DecodeError, Decoded, EncodeError, Topology};

/// Errors from the simplification pipeline.
#[derive(Debug, Error)]
pub enum SimplifyError {
    /// Precision must be zero or more decimal places
    #[error("Invalid precision {0}: must be zero or greater")]
    NegativePrecision(i64),

    /// Tolerance must be a finite, non-negative number
    #[error("Invalid simplification tolerance {0}: must be a finite number >= 0")]
    InvalidTolerance(f64),

    /// Input artifact could not be read
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Output artifact could not be written
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Input decoded to zero features
    #[error("No features available to simplify")]
    NoFeatures,
}

/// Validated pipeline parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplifyOptions {
    /// Decimal places kept in every coordinate
    pub precision: u32,
    /// Simplification tolerance in coordinate units; 0 disables simplification
    pub tolerance: f64,
}

impl SimplifyOptions {
    /// Validate raw parameters before any processing starts.
    pub fn new(precision: i64, tolerance: f64) -> Result<Self, SimplifyError> {
        let precision =
            u32::try_from(precision).map_err(|_| SimplifyError::NegativePrecision(precision))?;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(SimplifyError::InvalidTolerance(tolerance));
        }
        Ok(Self {
            precision,
            tolerance,
        })
    }
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            precision: 4,
            tolerance: 0.0,
        }
    }
}

/// Shape simplification capability.
///
/// Implemented for plain functions and closures so tests and callers can
/// inject their own behaviour.
pub trait Simplifier {
    fn simplify(&self, geometry: &AreaGeometry, tolerance: f64) -> AreaGeometry;
}

impl<F> Simplifier for F
where
    F: Fn(&AreaGeometry, f64) -> AreaGeometry,
{
    fn simplify(&self, geometry: &AreaGeometry, tolerance: f64) -> AreaGeometry {
        self(geometry, tolerance)
    }
}

/// Decimal places past which rounding a coordinate no longer changes it.
pub const MAX_PRECISION: u32 = 17;

/// Round a coordinate value to `digits` decimal places.
///
/// Uses correctly rounded decimal formatting, so rounding an already rounded
/// value at the same or a coarser precision is stable. `digits` is capped at
/// [`MAX_PRECISION`].
pub fn round_coordinate(value: f64, digits: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", digits.min(MAX_PRECISION) as usize, value)
        .parse()
        .unwrap_or(value)
}

/// Round every coordinate of a geometry.
pub fn round_geometry(geometry: &AreaGeometry, digits: u32) -> AreaGeometry {
    geometry.map_positions(|position| {
        position
            .iter()
            .map(|&v| round_coordinate(v, digits))
            .collect()
    })
}

/// Simplify and round one feature.
///
/// The result is a fixed point: simplifying and rounding it again with the
/// same options returns it unchanged.
pub fn simplify_feature<S>(feature: &Feature, options: &SimplifyOptions, simplifier: &S) -> Feature
where
    S: Simplifier + ?Sized,
{
    let original = feature.geometry();
    if options.tolerance <= 0.0 {
        return feature.with_geometry(round_geometry(original, options.precision));
    }

    let simplified = simplifier.simplify(original, options.tolerance);
    let first = if simplified.is_empty() {
        if !original.is_empty() {
            warn!(
                title = %feature.properties().title,
                tolerance = options.tolerance,
                "Simplification collapsed geometry; keeping original"
            );
        }
        original
    } else {
        &simplified
    };
    let mut geometry = round_geometry(first, options.precision);

    // Each pass that changes a rounded geometry removes at least one position.
    let max_passes = geometry.position_count() + 1;
    for _ in 0..max_passes {
        let next = simplify_pass(&geometry, options, simplifier);
        if next == geometry {
            return feature.with_geometry(geometry);
        }
        geometry = next;
    }

    warn!(
        title = %feature.properties().title,
        passes = max_passes,
        "Simplification did not settle; output may change on a rerun"
    );
    feature.with_geometry(geometry)
}

fn simplify_pass<S>(geometry: &AreaGeometry, options: &SimplifyOptions, simplifier: &S) -> AreaGeometry
where
    S: Simplifier + ?Sized,
{
    let simplified = simplifier.simplify(geometry, options.tolerance);
    if simplified.is_empty() {
        geometry.clone()
    } else {
        round_geometry(&simplified, options.precision)
    }
}

/// Simplify and round a list of features, preserving order.
pub fn simplify_features<S>(
    features: &[Feature],
    options: &SimplifyOptions,
    simplifier: &S,
) -> Vec<Feature>
where
    S: Simplifier + ?Sized,
{
    features
        .iter()
        .map(|feature| simplify_feature(feature, options, simplifier))
        .collect()
}

/// Output of [`simplify_slice`].
#[derive(Debug, Clone)]
pub struct SimplifiedArtifact {
    /// Re-encoded artifact bytes
    pub bytes: Vec<u8>,
    /// Features written to the artifact
    pub features: Vec<Feature>,
    /// Size comparison against the input
    pub report: SizeReport,
}

/// Decode an artifact, simplify its features, and re-encode it.
///
/// The size report compares the input byte length against the output's.
pub fn simplify_slice<S>(
    input: &[u8],
    options: &SimplifyOptions,
    simplifier: &S,
    object_name: &str,
) -> Result<SimplifiedArtifact, SimplifyError>
where
    S: Simplifier + ?Sized,
{
    let decoded = topology::decode_slice(input)?;
    rebuild(decoded, input.len() as u64, options, simplifier, object_name)
}

/// Simplify an already parsed topology.
///
/// The original size is measured on the compact serialization of `topology`.
pub fn simplify_topology<S>(
    topology: &Topology,
    options: &SimplifyOptions,
    simplifier: &S,
    object_name: &str,
) -> Result<SimplifiedArtifact, SimplifyError>
where
    S: Simplifier + ?Sized,
{
    let original_size = topology.to_vec()?.len() as u64;
    rebuild(
        topology::decode(topology),
        original_size,
        options,
        simplifier,
        object_name,
    )
}

fn rebuild<S>(
    decoded: Decoded,
    original_size: u64,
    options: &SimplifyOptions,
    simplifier: &S,
    object_name: &str,
) -> Result<SimplifiedArtifact, SimplifyError>
where
    S: Simplifier + ?Sized,
{
    if decoded.features.is_empty() {
        return Err(SimplifyError::NoFeatures);
    }

    let features = simplify_features(&decoded.features, options, simplifier);
    let bytes = topology::encode(&features, object_name).to_vec()?;
    let report = SizeReport::new(original_size, bytes.len() as u64, options);

    debug!(
        features = features.len(),
        skipped = decoded.skipped,
        original_size = report.original_size,
        new_size = report.new_size,
        "Simplified topology"
    );

    Ok(SimplifiedArtifact {
        bytes,
        features,
        report,
    })
}
