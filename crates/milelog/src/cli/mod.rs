//! Command-line interface for milelog.
//!
//! This module provides the CLI structure for the `milelog` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DeleteCommand, ExportCommand, ListCommand, RecordCommand, ShowCommand,
    VariantArg,
};

/// milelog - Log business journeys from the terminal
///
/// Walks you through one journey at a time: where you started, why, the
/// odometer at each end and where you finished. Completed journeys are
/// kept locally and can be shared or saved as plain text.
#[derive(Debug, Parser)]
#[command(name = "milelog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a journey interactively
    Record(RecordCommand),

    /// List recorded journeys
    List(ListCommand),

    /// Print one journey
    Show(ShowCommand),

    /// Delete a journey
    Delete(DeleteCommand),

    /// Share or save a journey
    Export(ExportCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
