//! IPC Areas - consolidation and publishing of food-insecurity area polygons
//!
//! This library holds the core of the IPC areas toolkit: it reads and writes
//! shared-arc topology artifacts, merges polygon batches from several sources
//! into one canonical set per country, reduces coordinate precision, and
//! checks identifier uniqueness before anything is published.
//!
//! # Pipeline
//!
//! ```text
//! raw batches ─► ingest ─► consolidate ─► topology::encode ─► simplify ─► integrity
//!                              ▲
//! topology::decode ────────────┘  (existing and legacy datasets)
//! ```
//!
//! ```
//! use ipc_areas::consolidate::{BatchSource, CanonicalCollection};
//! use ipc_areas::feature::{AreaGeometry, AreaProperties, Feature};
//! use ipc_areas::integrity::{find_duplicate_ids, ScopeProperty};
//! use ipc_areas::topology;
//!
//! let square = AreaGeometry::Polygon(vec![vec![
//!     vec![0.0, 0.0], vec![1.0, 0.0], vec![1.0, 1.0], vec![0.0, 1.0], vec![0.0, 0.0],
//! ]]);
//! let area = Feature::new(square, AreaProperties::new("Turkana", "KE", "KEN", Some(2024)));
//!
//! let mut collection = CanonicalCollection::new();
//! let stats = collection.merge(vec![area], &BatchSource::download(2024));
//! assert_eq!(stats.added, 1);
//!
//! let artifact = topology::encode(&collection.features(), topology::DEFAULT_OBJECT_NAME);
//! let decoded = topology::decode(&artifact);
//! assert!(find_duplicate_ids(&decoded.features, ScopeProperty::Iso3).is_clean());
//! ```

pub mod catalog;
pub mod config;
pub mod consolidate;
pub mod feature;
pub mod identity;
pub mod ingest;
pub mod integrity;
pub mod logging;
pub mod simplify;
pub mod topology;

/// Version of the IPC areas library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
