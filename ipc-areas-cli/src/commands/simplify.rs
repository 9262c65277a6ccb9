//! Simplify command - reduce coordinate precision and shape detail of an artifact.

use std::path::PathBuf;

use ipc_areas::simplify::{simplify_slice, GeoSimplifier, SimplifyAlgorithm};
use tracing::info;

use super::common::{format_bytes, read_file, resolve_options, write_file, AlgorithmArg};
use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the simplify command.
pub struct SimplifyArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub precision: Option<i64>,
    pub tolerance: Option<f64>,
    pub algorithm: Option<AlgorithmArg>,
}

/// Run the simplify command.
pub fn run(global: &GlobalOptions, args: SimplifyArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(global)?;
    runner.log_startup("simplify");
    let config = runner.config();

    let options = resolve_options(args.precision, args.tolerance, config.simplify.options())?;
    let algorithm = args
        .algorithm
        .map(SimplifyAlgorithm::from)
        .unwrap_or(config.simplify.algorithm);

    let input = args.input.unwrap_or_else(|| config.data.output_path());
    let output = args.output.unwrap_or_else(|| input.clone());

    let bytes = read_file(&input)?;
    let result = simplify_slice(
        &bytes,
        &options,
        &GeoSimplifier::new(algorithm),
        &config.data.object_name,
    )?;
    write_file(&output, &result.bytes)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        algorithm = %algorithm,
        precision = options.precision,
        tolerance = options.tolerance,
        "Simplified artifact"
    );

    println!(
        "Simplified {} features ({} bytes -> {} bytes)",
        result.features.len(),
        format_bytes(result.report.original_size),
        format_bytes(result.report.new_size)
    );
    println!("{}", result.report);
    println!("Wrote {}", output.display());

    Ok(())
}
