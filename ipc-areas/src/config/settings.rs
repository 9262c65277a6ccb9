//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::path::PathBuf;

use crate::integrity::ScopeProperty;
use crate::simplify::{SimplifyAlgorithm, SimplifyOptions};

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Dataset locations and publishing
    pub data: DataSettings,
    /// Defaults for the `simplify` and `combine` commands
    pub simplify: SimplifySettings,
    /// Defaults for the `optimize` command
    pub optimize: OptimizeSettings,
    /// Identifier uniqueness checks
    pub integrity: IntegritySettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Dataset locations.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    /// Root of the per-country dataset tree
    pub directory: PathBuf,
    /// Combined artifact; relative paths resolve against `directory`
    pub output: PathBuf,
    /// Geometry group name written into artifacts
    pub object_name: String,
    /// CDN base URL used in `index.json`
    pub cdn_base: String,
    /// Release tag appended to the CDN base
    pub release_tag: String,
}

impl DataSettings {
    /// Resolved path of the combined artifact.
    pub fn output_path(&self) -> PathBuf {
        resolve(&self.directory, &self.output)
    }

    /// Path of `index.json` inside the data directory.
    pub fn index_path(&self) -> PathBuf {
        self.directory.join(crate::catalog::INDEX_FILE_NAME)
    }
}

/// Simplification defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplifySettings {
    pub precision: u32,
    pub tolerance: f64,
    pub algorithm: SimplifyAlgorithm,
}

impl SimplifySettings {
    pub fn options(&self) -> SimplifyOptions {
        SimplifyOptions {
            precision: self.precision,
            tolerance: self.tolerance,
        }
    }
}

/// Optimization defaults: a coarser pass than `simplify`.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeSettings {
    pub precision: u32,
    pub tolerance: f64,
    /// Optimized artifact; relative paths resolve against the data directory
    pub output: PathBuf,
}

impl OptimizeSettings {
    pub fn options(&self) -> SimplifyOptions {
        SimplifyOptions {
            precision: self.precision,
            tolerance: self.tolerance,
        }
    }

    /// Resolved path of the optimized artifact.
    pub fn output_path(&self, data: &DataSettings) -> PathBuf {
        resolve(&data.directory, &self.output)
    }
}

/// Integrity check configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegritySettings {
    /// Property whose value groups features for per-scope checks
    pub scope: ScopeProperty,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

fn resolve(base: &std::path::Path, path: &std::path::Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
