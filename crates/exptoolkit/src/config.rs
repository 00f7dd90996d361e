//! Configuration management for exptoolkit.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "exptoolkit";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "snapshots.db";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "EXPTOOLKIT_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `EXPTOOLKIT_`, `__` between levels)
/// 2. TOML config file at `~/.config/exptoolkit/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Export configuration.
    pub export: ExportConfig,
    /// Page geometry used by the renderer.
    pub page: PageConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/exptoolkit/snapshots.db`
    pub database_path: Option<PathBuf>,
    /// Prefix prepended to the form tag to build storage keys.
    pub key_prefix: String,
    /// Largest serialized snapshot accepted, in bytes.
    /// Set to 0 for unlimited.
    pub max_snapshot_bytes: usize,
}

/// Output format of exported documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Portable Document Format.
    #[default]
    Pdf,
    /// Plain UTF-8 text with form feeds between pages.
    Text,
}

impl ExportFormat {
    /// File extension for this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "txt",
        }
    }
}

/// Export-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory exported documents are written to.
    /// Defaults to the current directory.
    pub output_dir: Option<PathBuf>,
    /// Document format.
    pub format: ExportFormat,
}

/// Page geometry, in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Page width.
    pub width: f32,
    /// Page height.
    pub height: f32,
    /// Left edge of all text.
    pub margin_left: f32,
    /// Baseline of the title on page 1.
    pub title_y: f32,
    /// Cursor position after the title.
    pub content_top: f32,
    /// Cursor position at the top of continuation pages.
    pub top_margin: f32,
    /// A new page starts once the cursor passes this position.
    pub bottom_limit: f32,
    /// Distance of the timestamp footer from the bottom edge.
    pub footer_offset: f32,
    /// Vertical advance per line.
    pub line_height: f32,
    /// Width available for wrapped text.
    pub text_width: f32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            key_prefix: "experiment_toolkit_".to_string(),
            max_snapshot_bytes: 5 * 1024 * 1024,
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        // A4 portrait
        Self {
            width: 210.0,
            height: 297.0,
            margin_left: 20.0,
            title_y: 20.0,
            content_top: 40.0,
            top_margin: 20.0,
            bottom_limit: 280.0,
            footer_offset: 10.0,
            line_height: 10.0,
            text_width: 170.0,
        }
    }
}

impl PageConfig {
    /// Validate the page geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if the geometry cannot hold at least one line of text.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(Error::ConfigValidation { message });

        if self.line_height <= 0.0 {
            return invalid("page.line_height must be greater than 0".to_string());
        }
        if self.text_width <= 0.0 {
            return invalid("page.text_width must be greater than 0".to_string());
        }
        if self.margin_left < 0.0 || self.margin_left + self.text_width > self.width {
            return invalid(format!(
                "page.margin_left ({}) + page.text_width ({}) exceeds page.width ({})",
                self.margin_left, self.text_width, self.width
            ));
        }
        if self.top_margin >= self.bottom_limit || self.bottom_limit >= self.height {
            return invalid(format!(
                "page.bottom_limit ({}) must lie between page.top_margin ({}) and page.height ({})",
                self.bottom_limit, self.top_margin, self.height
            ));
        }
        if self.footer_offset < 0.0 || self.footer_offset >= self.height {
            return invalid(format!(
                "page.footer_offset ({}) must lie within the page",
                self.footer_offset
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `EXPTOOLKIT_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.key_prefix.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "storage.key_prefix must not be empty".to_string(),
            });
        }

        self.page.validate()
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the export directory, resolving defaults if not set.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get the snapshot size limit, if any.
    #[must_use]
    pub fn snapshot_quota(&self) -> Option<usize> {
        match self.storage.max_snapshot_bytes {
            0 => None,
            limit => Some(limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.storage.key_prefix, "experiment_toolkit_");
        assert_eq!(config.export.format, ExportFormat::Pdf);
        assert!(config.export.output_dir.is_none());
    }

    #[test]
    fn test_default_storage_config() {
        let storage = StorageConfig::default();

        assert!(storage.database_path.is_none());
        assert_eq!(storage.max_snapshot_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_default_page_config_is_a4() {
        let page = PageConfig::default();

        assert!((page.width - 210.0).abs() < f32::EPSILON);
        assert!((page.height - 297.0).abs() < f32::EPSILON);
        assert!((page.bottom_limit - 280.0).abs() < f32::EPSILON);
        assert!(page.validate().is_ok());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_key_prefix() {
        let mut config = Config::default();
        config.storage.key_prefix = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("key_prefix"));
    }

    #[test]
    fn test_validate_zero_line_height() {
        let mut config = Config::default();
        config.page.line_height = 0.0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("line_height"));
    }

    #[test]
    fn test_validate_text_overflows_page() {
        let mut config = Config::default();
        config.page.text_width = 200.0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("text_width"));
    }

    #[test]
    fn test_validate_bottom_limit_above_top_margin() {
        let mut config = Config::default();
        config.page.bottom_limit = 10.0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("bottom_limit"));
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Pdf.extension(), "pdf");
        assert_eq!(ExportFormat::Text.extension(), "txt");
    }

    #[test]
    fn test_export_format_serde() {
        assert_eq!(serde_json::to_string(&ExportFormat::Text).unwrap(), "\"text\"");
        let format: ExportFormat = serde_json::from_str("\"pdf\"").unwrap();
        assert_eq!(format, ExportFormat::Pdf);
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("snapshots.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_output_dir_default() {
        assert_eq!(Config::default().output_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_snapshot_quota() {
        let mut config = Config::default();
        assert_eq!(config.snapshot_quota(), Some(5 * 1024 * 1024));

        config.storage.max_snapshot_bytes = 0;
        assert_eq!(config.snapshot_quota(), None);
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("exptoolkit"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_default_data_dir() {
        let path = Config::default_data_dir();
        assert!(path.to_string_lossy().contains("exptoolkit"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[export]\nformat = \"text\"\n\n[page]\nline_height = 8.0\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.export.format, ExportFormat::Text);
        assert!((config.page.line_height - 8.0).abs() < f32::EPSILON);
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[page]\ntext_width = -1.0\n").unwrap();

        let result = Config::load_from(Some(path));
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));
    }

    #[test]
    fn test_storage_config_deserialize() {
        let json = r#"{"key_prefix": "toolkit:", "max_snapshot_bytes": 1024}"#;
        let storage: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(storage.key_prefix, "toolkit:");
        assert_eq!(storage.max_snapshot_bytes, 1024);
    }

    #[test]
    fn test_config_clone() {
        let config = Config::default();
        let cloned = config.clone();
        assert_eq!(config, cloned);
    }
}
