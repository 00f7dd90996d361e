//! Command-line interface for exptoolkit.
//!
//! This module provides the CLI structure for the `exptk` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    parse_assignment, Assignment, ClearCommand, ConfigCommand, ExportCommand, FillCommand,
    FormArg, FormatArg, FormsCommand, ShowCommand, StatusCommand,
};

/// exptk - Fill, save and export experiment planning forms
///
/// Works with four forms: an experiment brief, a master checklist, a
/// go/no-go checklist and a post-experiment summary. Each form is saved
/// locally and can be exported as a paginated document.
#[derive(Debug, Parser)]
#[command(name = "exptk")]
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
    /// List the forms, or the fields of one form
    Forms(FormsCommand),

    /// Show the saved values of a form
    Show(ShowCommand),

    /// Edit fields of a form and save it
    Fill(FillCommand),

    /// Delete the saved values of a form
    Clear(ClearCommand),

    /// Export a form as a document
    Export(ExportCommand),

    /// List saved forms
    Status(StatusCommand),

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
