//! CLI runner for common setup and operations.
//!
//! Encapsulates configuration loading and logging initialization so command
//! handlers start from a ready-to-use [`ConfigFile`].

use std::path::{Path, PathBuf};

use ipc_areas::config::{config_file_path, ConfigFile};
use ipc_areas::logging::{init_logging, LoggingGuard};
use tracing::{debug, info};

use crate::error::CliError;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Config file overriding `~/.ipc-areas/config.ini`
    pub config: Option<PathBuf>,
    /// Force debug-level logging
    pub debug: bool,
}

impl GlobalOptions {
    /// Config file path in effect.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config_file_path)
    }
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Load config and initialize logging.
    pub fn new(options: &GlobalOptions) -> Result<Self, CliError> {
        let config = load_config(&options.config_path())?;

        let logging_guard = init_logging(&config.logging.file, options.debug)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        debug!(config = %options.config_path().display(), "Configuration loaded");

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("IPC Areas v{}", ipc_areas::VERSION);
        info!("IPC Areas CLI: {} command", command);
    }
}

/// Load configuration from `path`, or defaults when the file does not exist.
pub fn load_config(path: &Path) -> Result<ConfigFile, CliError> {
    Ok(ConfigFile::load_from(path)?)
}
