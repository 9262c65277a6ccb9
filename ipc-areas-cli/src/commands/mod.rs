//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`combine`] - Merge all country datasets into the global artifact
//! - [`config`] - Configuration management (path, show, init)
//! - [`index`] - Rebuild `index.json`
//! - [`optimize`] - Validate, simplify, and re-validate the global artifact
//! - [`simplify`] - Round and simplify an artifact
//! - [`update`] - Merge downloaded batches into one country's dataset
//! - [`validate`] - Identifier uniqueness checks

pub mod combine;
pub mod common;
pub mod config;
pub mod index;
pub mod optimize;
pub mod simplify;
pub mod update;
pub mod validate;
