//! Combine command - merge every country dataset into one global artifact.

use std::path::PathBuf;

use ipc_areas::catalog;
use ipc_areas::consolidate::{BatchSource, CanonicalCollection, MergeStats, PRIORITY_EXISTING};
use ipc_areas::simplify::{simplify_slice, GeoSimplifier};
use ipc_areas::topology;
use tracing::{info, warn};

use super::common::{decode_file, format_bytes, resolve_options, write_file};
use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the combine command.
pub struct CombineArgs {
    pub data_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub skip_simplify: bool,
    pub precision: Option<i64>,
    pub tolerance: Option<f64>,
}

/// Run the combine command.
pub fn run(global: &GlobalOptions, args: CombineArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(global)?;
    runner.log_startup("combine");
    let config = runner.config();

    let options = resolve_options(args.precision, args.tolerance, config.simplify.options())?;

    let mut data = config.data.clone();
    if let Some(dir) = args.data_dir {
        data.directory = dir;
    }
    let output = args.output.unwrap_or_else(|| data.output_path());
    let optimized = config.optimize.output_path(&data);

    let files =
        catalog::discover_topology_files(&data.directory, &[output.as_path(), optimized.as_path()])?;
    if files.is_empty() {
        return Err(CliError::NoFeatures(format!(
            "No topology files found in {}",
            data.directory.display()
        )));
    }

    println!("Combining {} files from {}", files.len(), data.directory.display());

    let mut collection = CanonicalCollection::new();
    let mut totals = MergeStats::default();
    for path in &files {
        let decoded = match decode_file(path) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable file");
                println!("  Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let year = path
            .file_name()
            .and_then(|n| n.to_str())
            .zip(path.parent().and_then(|p| p.file_name()).and_then(|n| n.to_str()))
            .and_then(|(name, iso3)| catalog::legacy_year(name, iso3));
        let label = path.display().to_string();
        totals += collection.merge(
            decoded.features,
            &BatchSource::new(PRIORITY_EXISTING, year, label),
        );
    }

    if collection.is_empty() {
        return Err(CliError::NoFeatures(
            "No features found in any input file".to_string(),
        ));
    }

    let features = collection.into_features();
    let bytes = topology::encode(&features, &data.object_name).to_vec()?;
    write_file(&output, &bytes)?;

    info!(
        output = %output.display(),
        features = features.len(),
        added = totals.added,
        updated = totals.updated,
        skipped = totals.skipped,
        "Combined datasets"
    );
    println!(
        "Wrote {} features to {} ({} bytes)",
        features.len(),
        output.display(),
        format_bytes(bytes.len() as u64)
    );

    if args.skip_simplify {
        return Ok(());
    }

    let simplifier = GeoSimplifier::new(config.simplify.algorithm);
    let result = simplify_slice(&bytes, &options, &simplifier, &data.object_name)?;
    write_file(&output, &result.bytes)?;

    println!(
        "Simplified with precision {} and tolerance {}",
        options.precision, options.tolerance
    );
    println!("{}", result.report);

    Ok(())
}
