//! Command-line interface for openbroadcast-playlist.
//!
//! This module provides the harvest and build pipelines as subcommands,
//! plus helpers for catalog authorization and configuration.

mod commands;

pub use commands::{Cli, Commands, run_command};
