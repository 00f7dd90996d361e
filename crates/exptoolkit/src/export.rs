//! Document export.
//!
//! An export renders a record, encodes it with the configured writer and
//! writes the result to the output directory. The file is written to a
//! temporary file in the same directory and renamed into place, so a failed
//! export never leaves a partial document behind. Every failure is reported
//! as a single render failure.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::{Config, ExportFormat};
use crate::error::{Error, Result};
use crate::form::{FormId, FormRecord};
use crate::render::{writer_for, DocumentWriter, Renderer};

/// Fallback file stem when a title has no usable characters.
const FALLBACK_STEM: &str = "document";

/// A document written by an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    /// Path of the written file.
    pub path: PathBuf,
    /// Number of pages in the document.
    pub pages: usize,
    /// Size of the file in bytes.
    pub bytes: usize,
}

/// Renders records and writes them to disk.
#[derive(Debug, Clone)]
pub struct Exporter {
    renderer: Renderer,
    format: ExportFormat,
    output_dir: PathBuf,
}

impl Exporter {
    /// Create an exporter writing `format` documents into `output_dir`.
    #[must_use]
    pub fn new(renderer: Renderer, format: ExportFormat, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            format,
            output_dir: output_dir.into(),
        }
    }

    /// Create an exporter from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured page geometry is invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        let renderer = Renderer::new(config.page.clone())?;
        Ok(Self::new(renderer, config.export.format, config.output_dir()))
    }

    /// Use a different document format.
    #[must_use]
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    /// Use a different output directory.
    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// The document format.
    #[must_use]
    pub fn format(&self) -> ExportFormat {
        self.format
    }

    /// The output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Export `record` as a document titled `title`.
    ///
    /// The record is only read; nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns a render failure if the document cannot be produced or
    /// written. No file is left at the target path in that case.
    pub fn export(&self, form: FormId, title: &str, record: &FormRecord) -> Result<ExportedFile> {
        let writer = writer_for(self.format);
        self.export_with(writer.as_ref(), form, title, record)
    }

    /// Export using an explicit document writer.
    ///
    /// # Errors
    ///
    /// Returns a render failure if the document cannot be produced or
    /// written.
    pub fn export_with(
        &self,
        writer: &dyn DocumentWriter,
        form: FormId,
        title: &str,
        record: &FormRecord,
    ) -> Result<ExportedFile> {
        let document = self.renderer.render(form, title, record);
        let bytes = writer.encode(&document).map_err(|e| {
            if e.is_render_failure() {
                e
            } else {
                Error::render(e.to_string())
            }
        })?;

        let path = self.output_dir.join(file_name(title, writer.format()));
        write_atomically(&self.output_dir, &path, &bytes)?;

        info!("Exported {} to {}", form, path.display());
        Ok(ExportedFile {
            path,
            pages: document.page_count(),
            bytes: bytes.len(),
        })
    }
}

fn write_atomically(dir: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let export_error = |source: std::io::Error| Error::Export {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(export_error)?;
    let mut file = NamedTempFile::new_in(dir).map_err(export_error)?;
    debug!("Writing export to temporary file {}", file.path().display());
    file.write_all(bytes).map_err(export_error)?;
    file.flush().map_err(export_error)?;
    file.persist(path).map_err(|e| export_error(e.error))?;
    Ok(())
}

fn whitespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// File name for a document titled `title`.
///
/// The title is lower-cased, runs of whitespace become a single underscore
/// and path separators become dashes. Leading and trailing whitespace is
/// kept as an underscore like any other run.
#[must_use]
pub fn file_name(title: &str, format: ExportFormat) -> String {
    let lowered = title.to_lowercase();
    let stem = whitespace_pattern()
        .replace_all(&lowered, "_")
        .replace(['/', '\\'], "-");
    let stem = if stem.is_empty() || stem.chars().all(|c| c == '.') {
        FALLBACK_STEM
    } else {
        stem.as_str()
    };
    format!("{stem}.{}", format.extension())
}
