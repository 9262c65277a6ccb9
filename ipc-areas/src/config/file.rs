//! Loading and saving of `~/.ipc-areas/config.ini`.

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::settings::ConfigFile;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
            }
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Render the configuration as commented INI text.
    pub fn to_ini_string(&self) -> String {
        super::writer::to_config_string(self)
    }
}

/// Get the path to the config directory (~/.ipc-areas).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ipc-areas")
}

/// Get the path to the config file (~/.ipc-areas/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use crate::integrity::ScopeProperty;
    use crate::simplify::SimplifyAlgorithm;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(config.data.directory, PathBuf::from("data"));
        assert_eq!(config.data.object_name, "data");
        assert_eq!(config.simplify.precision, DEFAULT_SIMPLIFY_PRECISION);
        assert_eq!(config.simplify.tolerance, 0.0);
        assert_eq!(config.simplify.algorithm, SimplifyAlgorithm::DouglasPeucker);
        assert_eq!(config.optimize.precision, 3);
        assert_eq!(config.optimize.tolerance, DEFAULT_OPTIMIZE_TOLERANCE);
        assert_eq!(config.integrity.scope, ScopeProperty::Iso3);
        assert!(config.logging.file.ends_with(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_output_paths_resolve_against_data_dir() {
        let config = ConfigFile::default();

        assert_eq!(
            config.data.output_path(),
            PathBuf::from("data").join(DEFAULT_OUTPUT_FILE)
        );
        assert_eq!(
            config.optimize.output_path(&config.data),
            PathBuf::from("data").join(DEFAULT_OPTIMIZED_FILE)
        );
        assert_eq!(config.data.index_path(), PathBuf::from("data/index.json"));
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.ini");

        ConfigFile::default().save_to(&config_path).unwrap();

        assert!(config_path.exists());
    }
}
