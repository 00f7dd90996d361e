//! Error types for exptoolkit.
//!
//! This module defines all error types used throughout the exptoolkit crate.
//! Errors fall into two families that callers treat differently: storage
//! failures, which the snapshot store recovers from locally, and render
//! failures, which an export reports to the user as a single failure.

use std::path::PathBuf;
use thiserror::Error;

use crate::form::FormId;

/// The main error type for exptoolkit operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A serialized snapshot is larger than the configured quota.
    #[error("snapshot for '{key}' is {size} bytes, exceeding the {limit} byte quota")]
    QuotaExceeded {
        /// Namespaced storage key.
        key: String,
        /// Serialized size in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Form Errors ===
    /// A form identifier could not be parsed.
    #[error("unknown form '{0}' (expected one of: brief, checklist, summary, gono)")]
    UnknownForm(String),

    /// A field key is not part of the form's schema.
    #[error("form '{form}' has no field '{key}'")]
    UnknownField {
        /// The form that was edited.
        form: FormId,
        /// The rejected key.
        key: String,
    },

    /// A value of the wrong kind was assigned to a field.
    #[error("field '{key}' is a {expected} field")]
    FieldKind {
        /// The field key.
        key: String,
        /// The kind the field actually has.
        expected: &'static str,
    },

    /// A choice field was given a value outside its options.
    #[error("'{value}' is not a valid option for '{key}' (expected one of: {allowed})")]
    InvalidChoice {
        /// The field key.
        key: String,
        /// The rejected value.
        value: String,
        /// Comma-separated list of accepted values.
        allowed: String,
    },

    // === Render Errors ===
    /// Document generation or encoding failed.
    #[error("failed to render document: {message}")]
    Render {
        /// Description of what went wrong.
        message: String,
    },

    /// Writing the exported document failed.
    #[error("failed to export document to {path}: {source}")]
    Export {
        /// Target path of the export.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for exptoolkit operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new render error.
    #[must_use]
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create an unknown field error.
    #[must_use]
    pub fn unknown_field(form: FormId, key: impl Into<String>) -> Self {
        Self::UnknownField {
            form,
            key: key.into(),
        }
    }

    /// Check if this error belongs to the persistence layer.
    ///
    /// Storage failures are logged and swallowed by the snapshot store.
    #[must_use]
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::QuotaExceeded { .. }
                | Self::Json(_)
        )
    }

    /// Check if this error belongs to document export.
    #[must_use]
    pub fn is_render_failure(&self) -> bool {
        matches!(self, Self::Render { .. } | Self::Export { .. })
    }
}
