//! IPC Areas CLI - Command-line interface
//!
//! Builds, simplifies, and validates the IPC area polygon datasets.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ipc_areas::integrity::ScopeProperty;

use commands::common::AlgorithmArg;
use commands::config::ConfigCommands;
use runner::GlobalOptions;

#[derive(Parser)]
#[command(name = "ipc-areas")]
#[command(version = ipc_areas::VERSION)]
#[command(about = "Build and maintain IPC area polygon datasets", long_about = None)]
struct Cli {
    /// Config file (default: ~/.ipc-areas/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge every country dataset into one global artifact
    Combine {
        /// Root of the per-country dataset tree
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Combined artifact path
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Write the combined artifact without simplifying it
        #[arg(long)]
        skip_simplify: bool,

        /// Decimal places kept in coordinates
        #[arg(long, allow_negative_numbers = true)]
        precision: Option<i64>,

        /// Simplification tolerance (0 disables shape simplification)
        #[arg(long, allow_negative_numbers = true)]
        tolerance: Option<f64>,
    },

    /// Merge downloaded batches into one country's dataset
    Update {
        /// ISO 3166-1 alpha-3 country code
        #[arg(long)]
        iso3: String,

        /// ISO 3166-1 alpha-2 country code
        #[arg(long)]
        iso2: String,

        /// Country display name for index.json
        #[arg(long)]
        name: Option<String>,

        /// Downloaded batch as YEAR=PATH (repeatable)
        #[arg(long = "batch", value_name = "YEAR=PATH")]
        batches: Vec<String>,

        /// Root of the per-country dataset tree
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Round coordinates and simplify shapes in an artifact
    Simplify {
        /// Input artifact (default: the combined artifact)
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Output path (default: overwrite the input)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Decimal places kept in coordinates
        #[arg(long, allow_negative_numbers = true)]
        precision: Option<i64>,

        /// Simplification tolerance (0 disables shape simplification)
        #[arg(long, allow_negative_numbers = true)]
        tolerance: Option<f64>,

        /// Simplification algorithm
        #[arg(long, value_enum)]
        algorithm: Option<AlgorithmArg>,
    },

    /// Validate, simplify, and re-validate the combined artifact
    Optimize {
        /// Input artifact (default: the combined artifact)
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Output path (default: the configured optimized artifact)
        #[arg(long, short, conflicts_with = "in_place")]
        output: Option<PathBuf>,

        /// Overwrite the input artifact
        #[arg(long)]
        in_place: bool,

        /// Decimal places kept in coordinates
        #[arg(long, allow_negative_numbers = true)]
        precision: Option<i64>,

        /// Simplification tolerance (0 disables shape simplification)
        #[arg(long, allow_negative_numbers = true)]
        tolerance: Option<f64>,
    },

    /// Check area identifiers for duplicates
    Validate {
        /// Input artifact (default: the combined artifact)
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Property grouping features for per-scope checks (iso3 or country)
        #[arg(long)]
        scope: Option<ScopeProperty>,
    },

    /// Rebuild index.json from the datasets on disk
    Index {
        /// Root of the per-country dataset tree
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Release tag used in CDN URLs
        #[arg(long)]
        release_tag: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    let global = GlobalOptions {
        config: cli.config,
        debug: cli.debug,
    };

    let result = match cli.command {
        Commands::Combine {
            data_dir,
            output,
            skip_simplify,
            precision,
            tolerance,
        } => commands::combine::run(
            &global,
            commands::combine::CombineArgs {
                data_dir,
                output,
                skip_simplify,
                precision,
                tolerance,
            },
        ),

        Commands::Update {
            iso3,
            iso2,
            name,
            batches,
            data_dir,
        } => commands::update::run(
            &global,
            commands::update::UpdateArgs {
                iso3,
                iso2,
                name,
                batches,
                data_dir,
            },
        ),

        Commands::Simplify {
            input,
            output,
            precision,
            tolerance,
            algorithm,
        } => commands::simplify::run(
            &global,
            commands::simplify::SimplifyArgs {
                input,
                output,
                precision,
                tolerance,
                algorithm,
            },
        ),

        Commands::Optimize {
            input,
            output,
            in_place,
            precision,
            tolerance,
        } => commands::optimize::run(
            &global,
            commands::optimize::OptimizeArgs {
                input,
                output,
                in_place,
                precision,
                tolerance,
            },
        ),

        Commands::Validate { input, scope } => {
            commands::validate::run(&global, commands::validate::ValidateArgs { input, scope })
        }

        Commands::Index {
            data_dir,
            release_tag,
        } => commands::index::run(
            &global,
            commands::index::IndexArgs {
                data_dir,
                release_tag,
            },
        ),

        Commands::Config { command } => commands::config::run(&global, command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
