//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::config::ExportFormat;
use crate::form::FormId;

/// Form selection argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormArg {
    /// Blank experiment brief
    Brief,
    /// Master experiment checklist
    Checklist,
    /// Post-experiment summary
    Summary,
    /// Go/no-go checklist
    Gono,
}

impl From<FormArg> for FormId {
    fn from(arg: FormArg) -> Self {
        match arg {
            FormArg::Brief => Self::Brief,
            FormArg::Checklist => Self::Checklist,
            FormArg::Summary => Self::Summary,
            FormArg::Gono => Self::Gono,
        }
    }
}

/// Document format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// PDF document
    Pdf,
    /// Plain text
    Text,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Pdf => Self::Pdf,
            FormatArg::Text => Self::Text,
        }
    }
}

/// Forms command arguments.
#[derive(Debug, Args)]
pub struct FormsCommand {
    /// List the fields of this form instead of all forms
    #[arg(value_enum)]
    pub form: Option<FormArg>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// The form to show
    #[arg(value_enum)]
    pub form: FormArg,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// A `KEY=VALUE` field assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Field key.
    pub key: String,
    /// New value.
    pub value: String,
}

/// Parse a `KEY=VALUE` assignment. The value may be empty or contain `=`.
///
/// # Errors
///
/// Returns an error if there is no `=` or the key is empty.
pub fn parse_assignment(raw: &str) -> Result<Assignment, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field key in '{raw}'"));
    }
    Ok(Assignment {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Fill command arguments.
#[derive(Debug, Args)]
pub struct FillCommand {
    /// The form to edit
    #[arg(value_enum)]
    pub form: FormArg,

    /// Set a text or choice field (repeatable)
    #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub set: Vec<Assignment>,

    /// Check a checklist item (repeatable)
    #[arg(long, value_name = "KEY")]
    pub check: Vec<String>,

    /// Uncheck a checklist item (repeatable)
    #[arg(long, value_name = "KEY")]
    pub uncheck: Vec<String>,
}

impl FillCommand {
    /// Whether any edit was requested.
    #[must_use]
    pub fn has_edits(&self) -> bool {
        !(self.set.is_empty() && self.check.is_empty() && self.uncheck.is_empty())
    }
}

/// Clear command arguments.
#[derive(Debug, Args)]
pub struct ClearCommand {
    /// The form to clear
    #[arg(value_enum)]
    pub form: FormArg,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// The form to export
    #[arg(value_enum)]
    pub form: FormArg,

    /// Document title (defaults to the form's title)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Output directory (overrides configuration)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Document format (overrides configuration)
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
