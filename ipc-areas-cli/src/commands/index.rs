//! Index command - rebuild `index.json` from the datasets on disk.

use std::path::{Path, PathBuf};

use chrono::Utc;
use ipc_areas::catalog::{self, Country, DatasetIndex, IndexEntry};
use tracing::{info, warn};

use super::common::decode_file;
use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the index command.
pub struct IndexArgs {
    pub data_dir: Option<PathBuf>,
    pub release_tag: Option<String>,
}

/// ISO3 code of the country directory holding `path`.
fn country_code(path: &Path) -> Option<String> {
    let code = path.parent()?.file_name()?.to_str()?;
    (code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphabetic()))
        .then(|| code.to_uppercase())
}

/// Run the index command.
pub fn run(global: &GlobalOptions, args: IndexArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(global)?;
    runner.log_startup("index");
    let config = runner.config();

    let data_dir = args.data_dir.unwrap_or_else(|| config.data.directory.clone());
    let release_tag = args
        .release_tag
        .unwrap_or_else(|| config.data.release_tag.clone());
    let index_path = data_dir.join(catalog::INDEX_FILE_NAME);

    // Display names are not stored in the datasets themselves.
    let previous = DatasetIndex::load_or_default(&index_path).unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable index");
        DatasetIndex::default()
    });

    let files = catalog::discover_topology_files(&data_dir, &[])?;
    let now = Utc::now();
    let mut index = DatasetIndex::default();

    for path in &files {
        let Some(iso3) = country_code(path) else {
            continue;
        };
        let decoded = match decode_file(path) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable dataset");
                continue;
            }
        };

        let file_year = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|name| catalog::legacy_year(name, &iso3));
        let year = file_year
            .or_else(|| decoded.features.iter().filter_map(|f| f.year()).max())
            .unwrap_or(0);
        let iso2 = decoded
            .features
            .iter()
            .map(|f| f.properties().country.trim())
            .find(|c| !c.is_empty())
            .unwrap_or("")
            .to_string();
        let country = Country::new(previous.country_name(&iso3), &iso2, &iso3);

        index.upsert(IndexEntry::new(
            &country,
            year,
            &data_dir,
            path,
            Some(decoded.features.len()),
            &config.data.cdn_base,
            &release_tag,
            now,
        ));
    }

    index.finalize(&release_tag, now);
    index.save(&index_path)?;

    info!(path = %index_path.display(), files = index.total_files, "Index rebuilt");
    println!(
        "Indexed {} datasets into {}",
        index.total_files,
        index_path.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_code_from_parent_dir() {
        assert_eq!(
            country_code(Path::new("data/ken/KEN_areas.topojson")),
            Some("KEN".to_string())
        );
        assert_eq!(country_code(Path::new("data/ipc_global_areas.topojson")), None);
        assert_eq!(country_code(Path::new("data/K3N/K3N_areas.topojson")), None);
    }
}
