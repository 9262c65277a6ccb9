//! Default values for all configuration settings, and the
//! `ConfigFile::default()` implementation.

use std::path::PathBuf;

use super::settings::*;
use crate::integrity::ScopeProperty;
use crate::simplify::SimplifyAlgorithm;

/// Directory holding per-country datasets, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// File name of the combined global artifact.
pub const DEFAULT_OUTPUT_FILE: &str = "ipc_global_areas.topojson";

/// File name of the optimized global artifact.
pub const DEFAULT_OPTIMIZED_FILE: &str = "global_areas_optimized_plus.topojson";

/// Geometry group name written into artifacts.
pub const DEFAULT_OBJECT_NAME: &str = crate::topology::DEFAULT_OBJECT_NAME;

/// Base URL of the public dataset mirror.
pub const DEFAULT_CDN_BASE: &str = "https://cdn.jsdelivr.net/gh/maplumi/ipc-areas";

/// Release tag used in CDN URLs.
pub const DEFAULT_RELEASE_TAG: &str = "main";

/// Decimal places kept by `simplify` and `combine`.
pub const DEFAULT_SIMPLIFY_PRECISION: u32 = 4;

/// Simplification tolerance for `simplify` and `combine` (disabled).
pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 0.0;

/// Decimal places kept by `optimize`.
pub const DEFAULT_OPTIMIZE_PRECISION: u32 = 3;

/// Simplification tolerance for `optimize`, in degrees.
pub const DEFAULT_OPTIMIZE_TOLERANCE: f64 = 0.0005;

/// Log file name inside the config directory.
pub const DEFAULT_LOG_FILE: &str = "ipc-areas.log";

impl Default for ConfigFile {
    fn default() -> Self {
        let config_dir = super::file::config_directory();

        ConfigFile {
            data: DataSettings {
                directory: PathBuf::from(DEFAULT_DATA_DIR),
                output: PathBuf::from(DEFAULT_OUTPUT_FILE),
                object_name: DEFAULT_OBJECT_NAME.to_string(),
                cdn_base: DEFAULT_CDN_BASE.to_string(),
                release_tag: DEFAULT_RELEASE_TAG.to_string(),
            },
            simplify: SimplifySettings {
                precision: DEFAULT_SIMPLIFY_PRECISION,
                tolerance: DEFAULT_SIMPLIFY_TOLERANCE,
                algorithm: SimplifyAlgorithm::default(),
            },
            optimize: OptimizeSettings {
                precision: DEFAULT_OPTIMIZE_PRECISION,
                tolerance: DEFAULT_OPTIMIZE_TOLERANCE,
                output: PathBuf::from(DEFAULT_OPTIMIZED_FILE),
            },
            integrity: IntegritySettings {
                scope: ScopeProperty::default(),
            },
            logging: LoggingSettings {
                file: config_dir.join(DEFAULT_LOG_FILE),
            },
        }
    }
}
