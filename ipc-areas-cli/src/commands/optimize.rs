//! Optimize command - validate, simplify, and re-validate the global artifact.
//!
//! Fails when the optimized output contains duplicate identifiers within a
//! scope, so a broken artifact is never published silently.

use std::path::PathBuf;

use ipc_areas::integrity::find_duplicate_ids;
use ipc_areas::simplify::{simplify_topology, GeoSimplifier};
use ipc_areas::topology::{self, Topology};
use tracing::{info, warn};

use super::common::{print_duplicate_report, read_file, resolve_options, write_file};
use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the optimize command.
pub struct OptimizeArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub in_place: bool,
    pub precision: Option<i64>,
    pub tolerance: Option<f64>,
}

/// Run the optimize command.
pub fn run(global: &GlobalOptions, args: OptimizeArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(global)?;
    runner.log_startup("optimize");
    let config = runner.config();

    let options = resolve_options(args.precision, args.tolerance, config.optimize.options())?;
    let scope = config.integrity.scope;

    let input = args.input.unwrap_or_else(|| config.data.output_path());
    let output = if args.in_place {
        input.clone()
    } else {
        args.output
            .unwrap_or_else(|| config.optimize.output_path(&config.data))
    };

    let bytes = read_file(&input)?;
    let artifact = Topology::from_slice(&bytes).map_err(|error| CliError::Decode {
        path: input.display().to_string(),
        error,
    })?;

    println!("Validating {}", input.display());
    let before = find_duplicate_ids(&topology::decode(&artifact).features, scope);
    print_duplicate_report(&before);

    let result = simplify_topology(
        &artifact,
        &options,
        &GeoSimplifier::new(config.simplify.algorithm),
        &config.data.object_name,
    )?;
    write_file(&output, &result.bytes)?;

    println!();
    println!(
        "Optimized with precision {} and tolerance {}",
        options.precision, options.tolerance
    );
    println!("{}", result.report);
    println!("Wrote {}", output.display());

    println!();
    println!("Validating {}", output.display());
    let after = find_duplicate_ids(&result.features, scope);
    print_duplicate_report(&after);

    info!(
        input = %input.display(),
        output = %output.display(),
        features = result.features.len(),
        "Optimized artifact"
    );

    if !after.per_scope.is_empty() {
        warn!(scopes = after.per_scope.len(), "Duplicate ids remain after optimization");
        return Err(CliError::DuplicateIds(after.violations()));
    }

    Ok(())
}
