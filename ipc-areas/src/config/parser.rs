//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::{Ini, Properties};
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::simplify::SimplifyOptions;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [data] section
    if let Some(section) = ini.section(Some("data")) {
        if let Some(v) = non_empty(section, "directory") {
            config.data.directory = expand_tilde(v);
        }
        if let Some(v) = non_empty(section, "output") {
            config.data.output = expand_tilde(v);
        }
        if let Some(v) = non_empty(section, "object_name") {
            config.data.object_name = v.to_string();
        }
        if let Some(v) = non_empty(section, "cdn_base") {
            config.data.cdn_base = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = non_empty(section, "release_tag") {
            config.data.release_tag = v.to_string();
        }
    }

    // [simplify] section
    if let Some(section) = ini.section(Some("simplify")) {
        let options = parse_options(
            section,
            "simplify",
            config.simplify.precision,
            config.simplify.tolerance,
        )?;
        config.simplify.precision = options.precision;
        config.simplify.tolerance = options.tolerance;

        if let Some(v) = non_empty(section, "algorithm") {
            config.simplify.algorithm =
                v.parse().map_err(|reason| ConfigFileError::InvalidValue {
                    section: "simplify".to_string(),
                    key: "algorithm".to_string(),
                    value: v.to_string(),
                    reason,
                })?;
        }
    }

    // [optimize] section
    if let Some(section) = ini.section(Some("optimize")) {
        let options = parse_options(
            section,
            "optimize",
            config.optimize.precision,
            config.optimize.tolerance,
        )?;
        config.optimize.precision = options.precision;
        config.optimize.tolerance = options.tolerance;

        if let Some(v) = non_empty(section, "output") {
            config.optimize.output = expand_tilde(v);
        }
    }

    // [integrity] section
    if let Some(section) = ini.section(Some("integrity")) {
        if let Some(v) = non_empty(section, "scope") {
            config.integrity.scope =
                v.parse().map_err(|reason| ConfigFileError::InvalidValue {
                    section: "integrity".to_string(),
                    key: "scope".to_string(),
                    value: v.to_string(),
                    reason,
                })?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "file") {
            config.logging.file = expand_tilde(v);
        }
    }

    Ok(config)
}

/// Read `precision` and `tolerance`, validating them the same way the CLI flags are.
fn parse_options(
    section: &Properties,
    name: &str,
    precision: u32,
    tolerance: f64,
) -> Result<SimplifyOptions, ConfigFileError> {
    let invalid = |key: &str, value: &str, reason: String| ConfigFileError::InvalidValue {
        section: name.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason,
    };

    let precision = match non_empty(section, "precision") {
        Some(v) => v
            .parse::<i64>()
            .map_err(|_| invalid("precision", v, "must be an integer".to_string()))?,
        None => i64::from(precision),
    };
    let tolerance = match non_empty(section, "tolerance") {
        Some(v) => v
            .parse::<f64>()
            .map_err(|_| invalid("tolerance", v, "must be a number".to_string()))?,
        None => tolerance,
    };

    SimplifyOptions::new(precision, tolerance).map_err(|e| {
        let (key, value) = match &e {
            crate::simplify::SimplifyError::NegativePrecision(_) => {
                ("precision", precision.to_string())
            }
            _ => ("tolerance", tolerance.to_string()),
        };
        invalid(key, &value, e.to_string())
    })
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

/// Expand a leading `~/` to the user's home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrity::ScopeProperty;
    use crate::simplify::SimplifyAlgorithm;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_overlay_keeps_unset_defaults() {
        let config = load(
            r#"
[data]
directory = /srv/ipc/data
release_tag = v2.1.0
"#,
        )
        .unwrap();

        assert_eq!(config.data.directory, PathBuf::from("/srv/ipc/data"));
        assert_eq!(config.data.release_tag, "v2.1.0");
        assert_eq!(config.data.object_name, "data");
        assert_eq!(config.simplify, ConfigFile::default().simplify);
    }

    #[test]
    fn test_simplify_section() {
        let config = load(
            r#"
[simplify]
precision = 5
tolerance = 0.001
algorithm = vw_preserve
"#,
        )
        .unwrap();

        assert_eq!(config.simplify.precision, 5);
        assert_eq!(config.simplify.tolerance, 0.001);
        assert_eq!(config.simplify.algorithm, SimplifyAlgorithm::VwPreserve);
    }

    #[test]
    fn test_optimize_section() {
        let config = load(
            r#"
[optimize]
precision = 2
output = optimized.topojson
"#,
        )
        .unwrap();

        assert_eq!(config.optimize.precision, 2);
        assert_eq!(config.optimize.tolerance, 0.0005);
        assert_eq!(config.optimize.output, PathBuf::from("optimized.topojson"));
    }

    #[test]
    fn test_negative_precision_rejected() {
        let err = load("[simplify]\nprecision = -1\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue { section, key, .. } => {
                assert_eq!(section, "simplify");
                assert_eq!(key, "precision");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let err = load("[optimize]\ntolerance = -0.5\n").unwrap_err();
        assert!(err.to_string().contains("optimize.tolerance"));
    }

    #[test]
    fn test_non_numeric_values_rejected() {
        assert!(load("[simplify]\nprecision = four\n").is_err());
        assert!(load("[simplify]\ntolerance = lots\n").is_err());
    }

    #[test]
    fn test_invalid_algorithm() {
        let err = load("[simplify]\nalgorithm = magic\n").unwrap_err();
        assert!(err.to_string().contains("vw_preserve"));
    }

    #[test]
    fn test_integrity_scope() {
        let config = load("[integrity]\nscope = country\n").unwrap();
        assert_eq!(config.integrity.scope, ScopeProperty::Country);

        assert!(load("[integrity]\nscope = admin1\n").is_err());
    }

    #[test]
    fn test_empty_values_keep_defaults() {
        let config = load("[data]\ndirectory =\n[logging]\nfile =\n").unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_tilde("relative"), PathBuf::from("relative"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/logs/a.log"), home.join("logs/a.log"));
        }
    }
}
