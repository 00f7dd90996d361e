//! `exptoolkit` - Experiment planning forms with local persistence and export
//!
//! This library provides the four toolkit forms (experiment brief, master
//! checklist, go/no-go checklist and post-experiment summary), a snapshot
//! store that keeps one saved copy of each form, and a renderer that turns a
//! form into a paginated document.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod form;
pub mod logging;
pub mod render;
pub mod schema;
pub mod storage;
pub mod view;

pub use config::Config;
pub use error::{Error, Result};
pub use export::{ExportedFile, Exporter};
pub use form::{FormId, FormRecord};
pub use logging::init_logging;
pub use render::Renderer;
pub use storage::SnapshotStore;
pub use view::FormView;
