//! Validate command - check identifier uniqueness in an artifact.

use std::path::PathBuf;

use ipc_areas::integrity::{find_duplicate_ids, ScopeProperty};
use tracing::info;

use super::common::{decode_file, print_duplicate_report};
use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the validate command.
pub struct ValidateArgs {
    pub input: Option<PathBuf>,
    pub scope: Option<ScopeProperty>,
}

/// Run the validate command.
///
/// Global collisions are reported but only per-scope duplicates fail.
pub fn run(global: &GlobalOptions, args: ValidateArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(global)?;
    runner.log_startup("validate");
    let config = runner.config();

    let input = args.input.unwrap_or_else(|| config.data.output_path());
    let scope = args.scope.unwrap_or(config.integrity.scope);

    let decoded = decode_file(&input)?;
    println!(
        "Checking {} features in {} (scope: {})",
        decoded.features.len(),
        input.display(),
        scope
    );
    if decoded.skipped > 0 {
        println!("Skipped {} unsupported records", decoded.skipped);
    }

    let report = find_duplicate_ids(&decoded.features, scope);
    print_duplicate_report(&report);

    info!(
        input = %input.display(),
        global = report.global.len(),
        scopes = report.per_scope.len(),
        "Validation finished"
    );

    if report.per_scope.is_empty() {
        Ok(())
    } else {
        Err(CliError::DuplicateIds(report.violations()))
    }
}
