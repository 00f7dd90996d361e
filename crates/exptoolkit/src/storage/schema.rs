//! `SQLite` schema definitions for the snapshot store.

/// SQL statement to create the snapshots table.
///
/// One row per namespaced form key; saving overwrites the row in place.
pub const CREATE_SNAPSHOTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS snapshots (
    key TEXT PRIMARY KEY,
    form TEXT NOT NULL,
    value TEXT NOT NULL,
    digest TEXT NOT NULL,
    saved_at TEXT NOT NULL
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_SNAPSHOTS_TABLE, CREATE_METADATA_TABLE];
