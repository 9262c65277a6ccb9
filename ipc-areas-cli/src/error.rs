//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::io;
use std::process;

use ipc_areas::catalog::CatalogError;
use ipc_areas::config::ConfigFileError;
use ipc_areas::ingest::IngestError;
use ipc_areas::integrity::IntegrityViolation;
use ipc_areas::simplify::SimplifyError;
use ipc_areas::topology::{DecodeError, EncodeError};

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error, including invalid command-line parameters
    Config(String),
    /// Failed to read an input file
    FileRead { path: String, error: io::Error },
    /// Failed to write an output file
    FileWrite { path: String, error: io::Error },
    /// Input file is not a readable topology artifact
    Decode { path: String, error: DecodeError },
    /// Output artifact could not be serialized
    Encode(EncodeError),
    /// Raw batch could not be ingested
    Ingest { path: String, error: IngestError },
    /// Simplification failed
    Simplify(SimplifyError),
    /// Dataset discovery or index maintenance failed
    Catalog(CatalogError),
    /// Nothing left to write
    NoFeatures(String),
    /// Duplicate identifiers within a scope
    DuplicateIds(Vec<IntegrityViolation>),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Catalog(CatalogError::MissingDataDir(_)) => {
                eprintln!();
                eprintln!("Set [data] directory in config.ini or pass --data-dir.");
            }
            CliError::DuplicateIds(violations) => {
                eprintln!();
                for violation in violations {
                    eprintln!("  {}", violation);
                }
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read file '{}': {}", path, error)
            }
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
            CliError::Decode { path, error } => write!(f, "Cannot decode '{}': {}", path, error),
            CliError::Encode(e) => write!(f, "{}", e),
            CliError::Ingest { path, error } => write!(f, "Cannot ingest '{}': {}", path, error),
            CliError::Simplify(e) => write!(f, "Simplification failed: {}", e),
            CliError::Catalog(e) => write!(f, "{}", e),
            CliError::NoFeatures(msg) => write!(f, "{}", msg),
            CliError::DuplicateIds(violations) => write!(
                f,
                "Duplicate ids detected in {} scope(s)",
                violations.len()
            ),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::FileRead { error, .. } => Some(error),
            CliError::FileWrite { error, .. } => Some(error),
            CliError::Decode { error, .. } => Some(error),
            CliError::Encode(e) => Some(e),
            CliError::Ingest { error, .. } => Some(error),
            CliError::Simplify(e) => Some(e),
            CliError::Catalog(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<SimplifyError> for CliError {
    fn from(e: SimplifyError) -> Self {
        match e {
            SimplifyError::NegativePrecision(_) | SimplifyError::InvalidTolerance(_) => {
                CliError::Config(e.to_string())
            }
            other => CliError::Simplify(other),
        }
    }
}

impl From<EncodeError> for CliError {
    fn from(e: EncodeError) -> Self {
        CliError::Encode(e)
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        CliError::Catalog(e)
    }
}
