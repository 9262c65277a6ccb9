//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented representation written by `config init`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[data]
; Root of the per-country dataset tree (<directory>/<ISO3>/<ISO3>_areas.topojson)
directory = {}
; Combined global artifact written by `combine`; relative to the data directory
output = {}
; Geometry group name inside written topology artifacts
object_name = {}
; CDN base and release tag used for dataset URLs in index.json
cdn_base = {}
release_tag = {}

[simplify]
; Decimal places kept in every coordinate (default: 4)
precision = {}
; Simplification tolerance in degrees; 0 disables shape simplification
tolerance = {}
; Simplification algorithm:
;   douglas_peucker - Ramer-Douglas-Peucker, tolerance is a distance (default)
;   vw_preserve     - Visvalingam-Whyatt, keeps rings from self-intersecting;
;                     tolerance is an area in square degrees
algorithm = {}

[optimize]
; Coarser pass used by `optimize` (default: 3 decimal places, 0.0005 degrees)
precision = {}
tolerance = {}
; Optimized artifact; relative to the data directory
output = {}

[integrity]
; Property grouping features when checking identifier uniqueness: iso3 or country
scope = {}

[logging]
; Log file path
file = {}
"#,
        path_to_string(&config.data.directory),
        path_to_string(&config.data.output),
        config.data.object_name,
        config.data.cdn_base,
        config.data.release_tag,
        config.simplify.precision,
        config.simplify.tolerance,
        config.simplify.algorithm,
        config.optimize.precision,
        config.optimize.tolerance,
        path_to_string(&config.optimize.output),
        config.integrity.scope,
        path_to_string(&config.logging.file),
    )
}

/// Convert path to string, collapsing home dir to ~.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::super::settings::ConfigFile;
    use crate::integrity::ScopeProperty;
    use crate::simplify::SimplifyAlgorithm;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.data.directory = PathBuf::from("/srv/ipc/data");
        config.data.release_tag = "v1.2.0".to_string();
        config.simplify.precision = 6;
        config.simplify.tolerance = 0.002;
        config.simplify.algorithm = SimplifyAlgorithm::VwPreserve;
        config.optimize.tolerance = 0.01;
        config.integrity.scope = ScopeProperty::Country;

        config.save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_default_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        ConfigFile::default().save_to(&config_path).unwrap();

        assert_eq!(
            ConfigFile::load_from(&config_path).unwrap(),
            ConfigFile::default()
        );
    }

    #[test]
    fn test_output_is_commented() {
        let text = ConfigFile::default().to_ini_string();
        assert!(text.contains("; Decimal places kept in every coordinate"));
        assert!(text.contains("algorithm = douglas_peucker"));
        assert!(text.contains("scope = iso3"));
    }
}
