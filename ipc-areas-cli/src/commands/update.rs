//! Update command - merge freshly retrieved batches into a country dataset.
//!
//! Sources are merged lowest priority first: legacy per-year files, then the
//! persisted dataset, then each downloaded batch. The result replaces
//! `<data>/<ISO3>/<ISO3>_areas.topojson` and the country's `index.json` entry.

use std::path::PathBuf;

use chrono::Utc;
use ipc_areas::catalog::{self, Country, DatasetIndex, IndexEntry};
use ipc_areas::consolidate::{BatchSource, CanonicalCollection, MergeStats};
use ipc_areas::ingest::{ingest_slice, IngestContext};
use ipc_areas::topology;
use tracing::{info, warn};

use super::common::{decode_file, read_file, write_file};
use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the update command.
pub struct UpdateArgs {
    pub iso3: String,
    pub iso2: String,
    pub name: Option<String>,
    /// Raw batches as `YEAR=PATH`
    pub batches: Vec<String>,
    pub data_dir: Option<PathBuf>,
}

/// One downloaded batch named on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchArg {
    pub year: i32,
    pub path: PathBuf,
}

/// Parse a `YEAR=PATH` batch argument.
pub fn parse_batch(value: &str) -> Result<BatchArg, CliError> {
    let (year, path) = value.split_once('=').ok_or_else(|| {
        CliError::Config(format!("Invalid batch '{}': expected YEAR=PATH", value))
    })?;
    let year = year
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid batch year '{}'", year.trim())))?;
    if path.trim().is_empty() {
        return Err(CliError::Config(format!("Invalid batch '{}': empty path", value)));
    }
    Ok(BatchArg {
        year,
        path: PathBuf::from(path.trim()),
    })
}

/// Year recorded in `index.json`: the newest downloaded batch, or the newest
/// surviving feature year when nothing was downloaded.
fn index_year(batches: &[BatchArg], collection: &CanonicalCollection) -> i32 {
    batches
        .iter()
        .map(|b| b.year)
        .max()
        .or_else(|| collection.target_year())
        .unwrap_or(0)
}

fn print_stats(label: &str, stats: &MergeStats) {
    println!(
        "  {:<16} added {:>5}  updated {:>5}  skipped {:>5}",
        label, stats.added, stats.updated, stats.skipped
    );
}

/// Run the update command.
pub fn run(global: &GlobalOptions, args: UpdateArgs) -> Result<(), CliError> {
    let batches = args
        .batches
        .iter()
        .map(|b| parse_batch(b))
        .collect::<Result<Vec<_>, _>>()?;

    let runner = CliRunner::new(global)?;
    runner.log_startup("update");
    let config = runner.config();

    let data_dir = args.data_dir.unwrap_or_else(|| config.data.directory.clone());
    let iso3 = args.iso3.trim().to_uppercase();
    let dataset_path = catalog::country_dataset_path(&data_dir, &iso3);

    println!("Updating {} in {}", iso3, data_dir.display());

    let mut collection = CanonicalCollection::new();

    for legacy in catalog::legacy_datasets(&data_dir, &iso3)? {
        match decode_file(&legacy.path) {
            Ok(decoded) => {
                let source = BatchSource::legacy(Some(legacy.year));
                let stats = collection.merge(decoded.features, &source);
                print_stats(&source.label, &stats);
            }
            Err(e) => warn!(path = %legacy.path.display(), error = %e, "Skipping legacy dataset"),
        }
    }

    if dataset_path.exists() {
        let decoded = decode_file(&dataset_path)?;
        let source = BatchSource::existing();
        let stats = collection.merge(decoded.features, &source);
        print_stats(&source.label, &stats);
    }

    for batch in &batches {
        let bytes = read_file(&batch.path)?;
        let context = IngestContext::new(&args.iso2, &iso3, batch.year);
        let outcome = ingest_slice(&bytes, &context).map_err(|error| CliError::Ingest {
            path: batch.path.display().to_string(),
            error,
        })?;
        for rejected in &outcome.rejected {
            warn!(path = %batch.path.display(), "{}", rejected);
        }

        let source = BatchSource::download(batch.year);
        let stats = collection.merge(outcome.features, &source);
        print_stats(&source.label, &stats);
        if !outcome.rejected.is_empty() || outcome.duplicates > 0 {
            println!(
                "  {:<16} rejected {} malformed, dropped {} repeated geometries",
                "", outcome.rejected.len(), outcome.duplicates
            );
        }
    }

    if collection.is_empty() {
        return Err(CliError::NoFeatures(format!("No features available for {}", iso3)));
    }

    let year = index_year(&batches, &collection);
    let features = collection.into_features();
    let bytes = topology::encode(&features, &config.data.object_name).to_vec()?;
    write_file(&dataset_path, &bytes)?;

    println!(
        "Wrote {} features to {}",
        features.len(),
        dataset_path.display()
    );

    let index_path = data_dir.join(catalog::INDEX_FILE_NAME);
    let mut index = DatasetIndex::load_or_default(&index_path)?;
    let name = args
        .name
        .clone()
        .or_else(|| index.country_name(&iso3).map(str::to_string));
    let country = Country::new(name.as_deref(), &args.iso2, &iso3);

    let now = Utc::now();
    index.upsert(IndexEntry::new(
        &country,
        year,
        &data_dir,
        &dataset_path,
        Some(features.len()),
        &config.data.cdn_base,
        &config.data.release_tag,
        now,
    ));
    index.finalize(&config.data.release_tag, now);
    index.save(&index_path)?;

    info!(
        iso3 = %iso3,
        year,
        features = features.len(),
        index = %index_path.display(),
        "Country dataset updated"
    );

    Ok(())
}
