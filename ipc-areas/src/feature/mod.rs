//! Area feature data model.
//!
//! A [`Feature`] is one IPC classification area: a polygon or multi-polygon
//! geometry plus a fixed-shape property record. Features are values; any
//! transformation (rounding, simplification) produces a new feature.

mod types;

pub use types::{AreaGeometry, AreaId, AreaProperties, Feature, Position, Ring};
