//! Local persistence for form snapshots.
//!
//! Each form has at most one snapshot, stored under a key made of a
//! constant prefix plus the form tag. The public `save`, `load` and `clear`
//! operations never fail: storage problems are logged and the previously
//! stored snapshot is left exactly as it was. The `try_*` variants expose
//! the underlying errors.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::form::{FormId, FormRecord};

/// Settings for a [`SnapshotStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Prefix prepended to the form tag to build storage keys.
    pub key_prefix: String,
    /// Largest serialized snapshot accepted, in bytes.
    pub quota: Option<usize>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            key_prefix: "experiment_toolkit_".to_string(),
            quota: None,
        }
    }
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        Self {
            key_prefix: config.storage.key_prefix.clone(),
            quota: config.snapshot_quota(),
        }
    }
}

/// What a successful save did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The snapshot was written.
    Written,
    /// An identical snapshot was already stored; nothing was written.
    Unchanged,
}

/// Metadata about one stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    /// The form the snapshot belongs to.
    pub form: FormId,
    /// Namespaced storage key.
    pub key: String,
    /// When the snapshot was last written.
    pub saved_at: Option<DateTime<Utc>>,
    /// Serialized size in bytes.
    pub size_bytes: u64,
    /// BLAKE3 digest of the serialized snapshot.
    pub digest: String,
}

/// Key-value store holding one snapshot per form.
#[derive(Debug)]
pub struct SnapshotStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
    options: StoreOptions,
}

impl SnapshotStore {
    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening snapshot store at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Snapshot store opened at {}", path.display());
        Ok(Self {
            path,
            conn,
            options,
        })
    }

    /// Open the store described by the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::open(config.database_path(), StoreOptions::from(config))
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory(options: StoreOptions) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
            options,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The storage key for a form.
    #[must_use]
    pub fn key_for(&self, form: FormId) -> String {
        format!("{}{}", self.options.key_prefix, form)
    }

    /// Persist `record` as the snapshot for `form`.
    ///
    /// Failures are logged and leave any prior snapshot untouched.
    pub fn save(&self, form: FormId, record: &FormRecord) {
        if let Err(err) = self.try_save(form, record) {
            warn!("Failed to save {} snapshot: {}", form, err);
        }
    }

    /// Persist `record` as the snapshot for `form`, reporting failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the record belongs to another form, the snapshot
    /// exceeds the quota, or the database write fails.
    pub fn try_save(&self, form: FormId, record: &FormRecord) -> Result<SaveOutcome> {
        if record.form() != form {
            return Err(Error::internal(format!(
                "refusing to save a {} record as {}",
                record.form(),
                form
            )));
        }

        let key = self.key_for(form);
        let value = record.to_snapshot()?;

        if let Some(limit) = self.options.quota {
            if value.len() > limit {
                return Err(Error::QuotaExceeded {
                    key,
                    size: value.len(),
                    limit,
                });
            }
        }

        let digest = blake3::hash(value.as_bytes()).to_hex().to_string();
        if self.stored_digest(&key)?.as_deref() == Some(digest.as_str()) {
            debug!("Snapshot {} unchanged, skipping write", key);
            return Ok(SaveOutcome::Unchanged);
        }

        self.conn.execute(
            r"
            INSERT INTO snapshots (key, form, value, digest, saved_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(key) DO UPDATE SET
                form = excluded.form,
                value = excluded.value,
                digest = excluded.digest,
                saved_at = excluded.saved_at
            ",
            params![key, form.as_str(), value, digest, Utc::now().to_rfc3339()],
        )?;

        info!("Saved {} snapshot ({} bytes)", form, value.len());
        Ok(SaveOutcome::Written)
    }

    /// Load the snapshot for `form`.
    ///
    /// Returns `None` if no snapshot exists or it cannot be read.
    #[must_use]
    pub fn load(&self, form: FormId) -> Option<FormRecord> {
        match self.try_load(form) {
            Ok(record) => record,
            Err(err) => {
                warn!("Failed to load {} snapshot: {}", form, err);
                None
            }
        }
    }

    /// Load the snapshot for `form`, reporting failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails or the stored snapshot is
    /// not a JSON object.
    pub fn try_load(&self, form: FormId) -> Result<Option<FormRecord>> {
        let key = self.key_for(form);
        let value: Option<String> = self
            .conn
            .query_row("SELECT value FROM snapshots WHERE key = ?1", [&key], |row| {
                row.get(0)
            })
            .optional()?;

        match value {
            None => {
                debug!("No snapshot stored under {}", key);
                Ok(None)
            }
            Some(json) => Ok(Some(FormRecord::from_snapshot(form, &json)?)),
        }
    }

    /// Remove the snapshot for `form`. A missing snapshot is not an error.
    pub fn clear(&self, form: FormId) {
        if let Err(err) = self.try_clear(form) {
            warn!("Failed to clear {} snapshot: {}", form, err);
        }
    }

    /// Remove the snapshot for `form`, reporting failures.
    ///
    /// Returns `true` if a snapshot was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn try_clear(&self, form: FormId) -> Result<bool> {
        let key = self.key_for(form);
        let affected = self
            .conn
            .execute("DELETE FROM snapshots WHERE key = ?1", [&key])?;
        if affected > 0 {
            info!("Cleared {} snapshot", form);
        }
        Ok(affected > 0)
    }

    /// List the stored snapshots, in form order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list(&self) -> Result<Vec<SnapshotInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT length(CAST(value AS BLOB)), digest, saved_at FROM snapshots WHERE key = ?1",
        )?;

        let mut snapshots = Vec::new();
        for form in FormId::ALL {
            let key = self.key_for(form);
            let row = stmt
                .query_row([&key], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })
                .optional()?;

            if let Some((size, digest, saved_at)) = row {
                snapshots.push(SnapshotInfo {
                    form,
                    key,
                    saved_at: DateTime::parse_from_rfc3339(&saved_at)
                        .ok()
                        .map(|dt| dt.with_timezone(&Utc)),
                    size_bytes: u64::try_from(size).unwrap_or(0),
                    digest,
                });
            }
        }
        Ok(snapshots)
    }

    fn stored_digest(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row("SELECT digest FROM snapshots WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?)
    }
}
