//! `index.json` model for CDN discovery of country datasets.

use std::fs;
use std::path::{Component, Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CatalogError, CatalogResult};

/// Country identity used when describing a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    pub name: String,
    pub iso2: String,
    pub iso3: String,
}

impl Country {
    /// Build a country, falling back to the ISO2 code when no name is known.
    pub fn new(name: Option<&str>, iso2: &str, iso3: &str) -> Self {
        let iso2 = iso2.trim().to_uppercase();
        Self {
            name: name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| iso2.clone()),
            iso2,
            iso3: iso3.trim().to_uppercase(),
        }
    }
}

/// One published dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub country: String,
    pub iso2: String,
    pub iso3: String,
    pub year: i32,
    pub relative_path: String,
    pub file_name: String,
    pub feature_count: Option<usize>,
    pub cdn_url: String,
    pub updated_at: String,
}

impl IndexEntry {
    /// Describe the dataset at `path`, which must live below `data_dir`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        country: &Country,
        year: i32,
        data_dir: &Path,
        path: &Path,
        feature_count: Option<usize>,
        cdn_base: &str,
        release_tag: &str,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let relative_path = relative_path(data_dir, path);
        Self {
            country: country.name.clone(),
            iso2: country.iso2.clone(),
            iso3: country.iso3.clone(),
            year,
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            feature_count,
            cdn_url: cdn_url(cdn_base, release_tag, &relative_path),
            relative_path,
            updated_at: timestamp(updated_at),
        }
    }
}

/// The whole `index.json` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetIndex {
    pub generated_at: String,
    pub cdn_release_tag: String,
    pub total_files: usize,
    pub items: Vec<IndexEntry>,
}

impl DatasetIndex {
    /// Read an index, or start an empty one when the file does not exist.
    pub fn load_or_default(path: &Path) -> CatalogResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(path).map_err(|source| CatalogError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| CatalogError::InvalidIndex {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Insert an entry, replacing any entry for the same relative path.
    pub fn upsert(&mut self, entry: IndexEntry) {
        self.items.retain(|e| e.relative_path != entry.relative_path);
        self.items.push(entry);
    }

    /// Previously recorded display name for a country, if any.
    pub fn country_name(&self, iso3: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|e| e.iso3.eq_ignore_ascii_case(iso3))
            .map(|e| e.country.as_str())
    }

    /// Sort entries and refresh the header fields.
    pub fn finalize(&mut self, release_tag: &str, generated_at: DateTime<Utc>) {
        self.items.sort_by(|a, b| {
            (&a.iso3, a.year, &a.file_name).cmp(&(&b.iso3, b.year, &b.file_name))
        });
        self.total_files = self.items.len();
        self.cdn_release_tag = release_tag.to_string();
        self.generated_at = timestamp(generated_at);
    }

    /// Write the index as indented JSON.
    pub fn save(&self, path: &Path) -> CatalogResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|source| {
            CatalogError::InvalidIndex {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, json).map_err(|source| CatalogError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// UTC timestamp with second precision, e.g. `2024-05-01T12:00:00Z`.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Public URL of a dataset: `<base>@<tag>/<relative_path>`.
pub fn cdn_url(cdn_base: &str, release_tag: &str, relative_path: &str) -> String {
    format!(
        "{}@{}/{}",
        cdn_base.trim_end_matches('/'),
        release_tag,
        relative_path.trim_start_matches('/')
    )
}

/// Path of `path` relative to the parent of `data_dir`, with `/` separators.
///
/// `data/KEN/KEN_areas.topojson` stays `data/KEN/KEN_areas.topojson` no matter
/// where the data directory lives on disk.
pub fn relative_path(data_dir: &Path, path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(name) = data_dir.file_name() {
        parts.push(name.to_string_lossy().into_owned());
    }

    let inner = path.strip_prefix(data_dir).unwrap_or(path);
    parts.extend(inner.components().filter_map(|c| match c {
        Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
        _ => None,
    }));
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    fn entry(iso3: &str, year: i32, file: &str) -> IndexEntry {
        let country = Country::new(None, &iso3[..2], iso3);
        IndexEntry::new(
            &country,
            year,
            Path::new("data"),
            &Path::new("data").join(iso3).join(file),
            Some(3),
            "https://cdn.example.org/gh/org/repo",
            "v1",
            at(12),
        )
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(timestamp(at(9)), "2024-05-01T09:00:00Z");
    }

    #[test]
    fn test_cdn_url() {
        assert_eq!(
            cdn_url("https://cdn/gh/o/r/", "main", "data/KEN/KEN_areas.topojson"),
            "https://cdn/gh/o/r@main/data/KEN/KEN_areas.topojson"
        );
    }

    #[test]
    fn test_relative_path() {
        let data = Path::new("/srv/repo/data");
        let path = data.join("KEN").join("KEN_areas.topojson");
        assert_eq!(relative_path(data, &path), "data/KEN/KEN_areas.topojson");
    }

    #[test]
    fn test_country_name_fallback() {
        assert_eq!(Country::new(None, "ke", "ken").name, "KE");
        assert_eq!(Country::new(Some("  "), "ke", "ken").name, "KE");
        assert_eq!(Country::new(Some("Kenya"), "ke", "ken").name, "Kenya");
    }

    #[test]
    fn test_entry_fields() {
        let e = entry("KEN", 2024, "KEN_areas.topojson");
        assert_eq!(e.relative_path, "data/KEN/KEN_areas.topojson");
        assert_eq!(e.file_name, "KEN_areas.topojson");
        assert_eq!(
            e.cdn_url,
            "https://cdn.example.org/gh/org/repo@v1/data/KEN/KEN_areas.topojson"
        );
        assert_eq!(e.updated_at, "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_upsert_replaces_same_path() {
        let mut index = DatasetIndex::default();
        index.upsert(entry("KEN", 2023, "KEN_areas.topojson"));
        index.upsert(entry("KEN", 2024, "KEN_areas.topojson"));

        assert_eq!(index.items.len(), 1);
        assert_eq!(index.items[0].year, 2024);
    }

    #[test]
    fn test_finalize_sorts_and_counts() {
        let mut index = DatasetIndex::default();
        index.upsert(entry("UGA", 2024, "UGA_areas.topojson"));
        index.upsert(entry("KEN", 2024, "KEN_areas.topojson"));
        index.upsert(entry("KEN", 2023, "KEN_2023_areas.topojson"));

        index.finalize("v2", at(15));

        let order: Vec<_> = index
            .items
            .iter()
            .map(|e| (e.iso3.as_str(), e.year))
            .collect();
        assert_eq!(order, vec![("KEN", 2023), ("KEN", 2024), ("UGA", 2024)]);
        assert_eq!(index.total_files, 3);
        assert_eq!(index.cdn_release_tag, "v2");
        assert_eq!(index.generated_at, "2024-05-01T15:00:00Z");
    }

    #[test]
    fn test_save_and_load() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("index.json");

        assert_eq!(DatasetIndex::load_or_default(&path).unwrap(), DatasetIndex::default());

        let mut index = DatasetIndex::default();
        index.upsert(entry("KEN", 2024, "KEN_areas.topojson"));
        index.finalize("main", at(1));
        index.save(&path).unwrap();

        let loaded = DatasetIndex::load_or_default(&path).unwrap();
        assert_eq!(loaded, index);
        assert_eq!(loaded.country_name("ken"), Some("KE"));
    }

    #[test]
    fn test_load_invalid_index() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("index.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            DatasetIndex::load_or_default(&path),
            Err(CatalogError::InvalidIndex { .. })
        ));
    }
}
