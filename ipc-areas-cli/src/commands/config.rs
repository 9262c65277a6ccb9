//! Configuration management CLI commands.
//!
//! Provides `config path`, `config show`, and `config init`.

use clap::Subcommand;
use ipc_areas::config::ConfigFile;

use crate::error::CliError;
use crate::runner::{load_config, GlobalOptions};

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Print the effective configuration as INI
    Show,

    /// Write a configuration file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(global: &GlobalOptions, command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(global),
        ConfigCommands::Show => run_show(global),
        ConfigCommands::Init { force } => run_init(global, force),
    }
}

fn run_path(global: &GlobalOptions) -> Result<(), CliError> {
    println!("{}", global.config_path().display());
    Ok(())
}

fn run_show(global: &GlobalOptions) -> Result<(), CliError> {
    let config = load_config(&global.config_path())?;
    print!("{}", config.to_ini_string());
    Ok(())
}

fn run_init(global: &GlobalOptions, force: bool) -> Result<(), CliError> {
    let path = global.config_path();
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    ConfigFile::default().save_to(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
