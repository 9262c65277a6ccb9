//! On-disk dataset layout.
//!
//! ```text
//! data/
//! ├── index.json
//! ├── ipc_global_areas.topojson
//! └── KEN/
//!     ├── KEN_areas.topojson         current country dataset
//!     ├── KEN_2024_areas.topojson    legacy per-year dataset
//!     └── KEN_2023_areas.topojson
//! ```

mod index;

pub use index::{cdn_url, relative_path, timestamp, Country, DatasetIndex, IndexEntry};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::topology::Topology;

/// File extension of topology artifacts.
pub const TOPOLOGY_EXTENSION: &str = "topojson";

/// Name of the dataset index inside the data directory.
pub const INDEX_FILE_NAME: &str = "index.json";

const DATASET_SUFFIX: &str = "_areas.topojson";

/// Errors from dataset discovery and index maintenance.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Data directory not found: {0}")]
    MissingDataDir(PathBuf),

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid index file {path}: {source}")]
    InvalidIndex {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// A per-year dataset kept from earlier retrieval runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyDataset {
    pub year: i32,
    pub path: PathBuf,
}

/// List every topology artifact below `data_dir`, sorted by path.
///
/// Files named like any entry of `skip` (the generated global artifacts) are
/// excluded.
pub fn discover_topology_files(data_dir: &Path, skip: &[&Path]) -> CatalogResult<Vec<PathBuf>> {
    if !data_dir.is_dir() {
        return Err(CatalogError::MissingDataDir(data_dir.to_path_buf()));
    }

    let mut files = Vec::new();
    walk(data_dir, &mut files)?;

    files.retain(|path| {
        !skip
            .iter()
            .any(|s| s.file_name().is_some() && s.file_name() == path.file_name())
    });
    files.sort();

    debug!(dir = %data_dir.display(), count = files.len(), "Discovered topology files");
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> CatalogResult<()> {
    let read_failed = |source| CatalogError::ReadFailed {
        path: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(read_failed)? {
        let path = entry.map_err(read_failed)?.path();
        if path.is_dir() {
            walk(&path, files)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(TOPOLOGY_EXTENSION) {
            files.push(path);
        }
    }
    Ok(())
}

/// Directory holding one country's datasets.
pub fn country_dir(data_dir: &Path, iso3: &str) -> PathBuf {
    data_dir.join(iso3.trim().to_uppercase())
}

/// Path of the current dataset for a country: `<data>/<ISO3>/<ISO3>_areas.topojson`.
pub fn country_dataset_path(data_dir: &Path, iso3: &str) -> PathBuf {
    let iso3 = iso3.trim().to_uppercase();
    data_dir.join(&iso3).join(format!("{}{}", iso3, DATASET_SUFFIX))
}

/// Per-year datasets for a country (`<ISO3>_<year>_areas.topojson`), newest first.
///
/// A missing country directory yields an empty list.
pub fn legacy_datasets(data_dir: &Path, iso3: &str) -> CatalogResult<Vec<LegacyDataset>> {
    let iso3 = iso3.trim().to_uppercase();
    let dir = data_dir.join(&iso3);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let read_failed = |source| CatalogError::ReadFailed {
        path: dir.clone(),
        source,
    };

    let mut datasets = Vec::new();
    for entry in fs::read_dir(&dir).map_err(read_failed)? {
        let path = entry.map_err(read_failed)?.path();
        if !path.is_file() {
            continue;
        }
        let year = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|name| legacy_year(name, &iso3));
        if let Some(year) = year {
            datasets.push(LegacyDataset { year, path });
        }
    }

    datasets.sort_by(|a, b| b.year.cmp(&a.year).then_with(|| a.path.cmp(&b.path)));
    Ok(datasets)
}

/// Parse the year out of `<ISO3>_<year>_areas.topojson`.
pub fn legacy_year(file_name: &str, iso3: &str) -> Option<i32> {
    let year = file_name
        .strip_prefix(iso3)?
        .strip_prefix('_')?
        .strip_suffix(DATASET_SUFFIX)?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    year.parse().ok()
}

/// Number of records in the first group of an artifact on disk.
///
/// Unreadable or malformed files yield `None`.
pub fn infer_feature_count(path: &Path) -> Option<usize> {
    let bytes = fs::read(path).ok()?;
    Topology::from_slice(&bytes).ok()?.feature_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{AreaGeometry, AreaProperties, Feature};
    use crate::topology::encode;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"{}").unwrap();
    }

    #[test]
    fn test_country_dataset_path() {
        let path = country_dataset_path(Path::new("data"), " ken ");
        assert_eq!(path, PathBuf::from("data/KEN/KEN_areas.topojson"));
        assert_eq!(country_dir(Path::new("data"), "ken"), PathBuf::from("data/KEN"));
    }

    #[test]
    fn test_discover_sorted_and_skips_output() {
        let temp = TempDir::new().unwrap();
        let data = temp.path();
        touch(&data.join("UGA/UGA_areas.topojson"));
        touch(&data.join("KEN/KEN_areas.topojson"));
        touch(&data.join("KEN/KEN_2023_areas.topojson"));
        touch(&data.join("KEN/notes.txt"));
        touch(&data.join("ipc_global_areas.topojson"));
        touch(&data.join("global_optimized.topojson"));

        let skip = [
            Path::new("ipc_global_areas.topojson"),
            Path::new("/elsewhere/global_optimized.topojson"),
        ];
        let files = discover_topology_files(data, &skip).unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(data).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            names,
            vec![
                "KEN/KEN_2023_areas.topojson",
                "KEN/KEN_areas.topojson",
                "UGA/UGA_areas.topojson",
            ]
        );
    }

    #[test]
    fn test_discover_missing_dir() {
        let temp = TempDir::new().unwrap();
        let result = discover_topology_files(&temp.path().join("nope"), &[]);
        assert!(matches!(result, Err(CatalogError::MissingDataDir(_))));
    }

    #[test]
    fn test_legacy_datasets_newest_first() {
        let temp = TempDir::new().unwrap();
        let data = temp.path();
        touch(&data.join("KEN/KEN_2022_areas.topojson"));
        touch(&data.join("KEN/KEN_2024_areas.topojson"));
        touch(&data.join("KEN/KEN_areas.topojson"));
        touch(&data.join("KEN/UGA_2023_areas.topojson"));

        let legacy = legacy_datasets(data, "ken").unwrap();

        let years: Vec<_> = legacy.iter().map(|d| d.year).collect();
        assert_eq!(years, vec![2024, 2022]);
        assert!(legacy[0].path.ends_with("KEN_2024_areas.topojson"));
    }

    #[test]
    fn test_legacy_datasets_missing_country() {
        let temp = TempDir::new().unwrap();
        assert!(legacy_datasets(temp.path(), "SOM").unwrap().is_empty());
    }

    #[test]
    fn test_legacy_year() {
        assert_eq!(legacy_year("KEN_2024_areas.topojson", "KEN"), Some(2024));
        assert_eq!(legacy_year("KEN_areas.topojson", "KEN"), None);
        assert_eq!(legacy_year("KEN_24_areas.topojson", "KEN"), None);
        assert_eq!(legacy_year("KEN_20x4_areas.topojson", "KEN"), None);
        assert_eq!(legacy_year("UGA_2024_areas.topojson", "KEN"), None);
    }

    #[test]
    fn test_infer_feature_count() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("KEN_areas.topojson");
        let square = AreaGeometry::Polygon(vec![vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 0.0],
        ]]);
        let features = vec![Feature::new(
            square,
            AreaProperties::new("A", "KE", "KEN", Some(2024)),
        )];
        fs::write(&path, encode(&features, "data").to_vec().unwrap()).unwrap();

        assert_eq!(infer_feature_count(&path), Some(1));
        assert_eq!(infer_feature_count(&temp.path().join("missing.topojson")), None);
    }
}
