//! Common types and utilities shared across CLI commands.

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use ipc_areas::integrity::DuplicateReport;
use ipc_areas::simplify::{SimplifyAlgorithm, SimplifyOptions};
use ipc_areas::topology::{self, Decoded};

use crate::error::CliError;

/// Simplification algorithm selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum AlgorithmArg {
    /// Ramer-Douglas-Peucker; tolerance is a distance
    DouglasPeucker,
    /// Visvalingam-Whyatt, keeps rings from self-intersecting; tolerance is an area
    VwPreserve,
}

impl From<AlgorithmArg> for SimplifyAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::VwPreserve => SimplifyAlgorithm::VwPreserve,
            AlgorithmArg::DouglasPeucker => SimplifyAlgorithm::DouglasPeucker,
        }
    }
}

/// Resolve simplification parameters: CLI flags take precedence over config.
///
/// Validation happens here, before any file is touched.
pub fn resolve_options(
    precision: Option<i64>,
    tolerance: Option<f64>,
    defaults: SimplifyOptions,
) -> Result<SimplifyOptions, CliError> {
    Ok(SimplifyOptions::new(
        precision.unwrap_or(i64::from(defaults.precision)),
        tolerance.unwrap_or(defaults.tolerance),
    )?)
}

/// Read a whole file.
pub fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|error| CliError::FileRead {
        path: path.display().to_string(),
        error,
    })
}

/// Write a whole file, creating parent directories as needed.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    let write_failed = |error| CliError::FileWrite {
        path: path.display().to_string(),
        error,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }
    }
    fs::write(path, bytes).map_err(write_failed)
}

/// Read and decode a topology artifact.
pub fn decode_file(path: &Path) -> Result<Decoded, CliError> {
    let bytes = read_file(path)?;
    topology::decode_slice(&bytes).map_err(|error| CliError::Decode {
        path: path.display().to_string(),
        error,
    })
}

/// Print a duplicate id summary in the style of the validation commands.
pub fn print_duplicate_report(report: &DuplicateReport) {
    if report.global.is_empty() {
        println!("All geometry ids are globally unique");
    } else {
        println!("Found {} duplicate ids globally", report.global.len());
    }

    if report.per_scope.is_empty() {
        println!("No per-scope duplicate ids detected");
    } else {
        println!("Duplicates detected within the following scopes:");
        println!("{}", report.format_report());
    }
}

/// Format a byte count with thousands separators.
pub fn format_bytes(bytes: u64) -> String {
    let digits = bytes.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_options_prefers_flags() {
        let defaults = SimplifyOptions::new(4, 0.0).unwrap();

        let options = resolve_options(Some(2), None, defaults).unwrap();
        assert_eq!(options.precision, 2);
        assert_eq!(options.tolerance, 0.0);

        let options = resolve_options(None, Some(0.01), defaults).unwrap();
        assert_eq!(options.precision, 4);
        assert_eq!(options.tolerance, 0.01);
    }

    #[test]
    fn test_resolve_options_rejects_negative_values() {
        let defaults = SimplifyOptions::default();
        assert!(matches!(
            resolve_options(Some(-1), None, defaults),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            resolve_options(None, Some(-0.1), defaults),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0");
        assert_eq!(format_bytes(999), "999");
        assert_eq!(format_bytes(1000), "1,000");
        assert_eq!(format_bytes(1234567), "1,234,567");
    }

    #[test]
    fn test_write_file_creates_parents() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("KEN").join("KEN_areas.topojson");

        write_file(&path, b"{}").unwrap();

        assert_eq!(read_file(&path).unwrap(), b"{}");
    }

    #[test]
    fn test_decode_file_reports_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("broken.topojson");
        std::fs::write(&path, "not json").unwrap();

        let err = decode_file(&path).unwrap_err();
        assert!(matches!(err, CliError::Decode { .. }));
        assert!(err.to_string().contains("broken.topojson"));
    }
}
