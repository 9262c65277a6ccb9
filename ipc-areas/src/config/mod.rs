//! Configuration file handling for `~/.ipc-areas/config.ini`.
//!
//! Settings structs live in [`settings`], constants in [`defaults`],
//! parsing in `parser`, and serialization in `writer`.
//!
//! # Example
//!
//! ```
//! use ipc_areas::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! assert_eq!(config.simplify.precision, 4);
//! ```

pub mod defaults;
mod file;
mod parser;
pub mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, DataSettings, IntegritySettings, LoggingSettings, OptimizeSettings,
    SimplifySettings,
};
