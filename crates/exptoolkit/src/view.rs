//! Form views.
//!
//! A [`FormView`] owns the in-memory record of one form and exposes the
//! save, clear and export actions against it. The record is passed by
//! reference into each action; there is no shared state between views.

use tracing::debug;

use crate::error::Result;
use crate::export::{ExportedFile, Exporter};
use crate::form::{FormId, FormRecord};
use crate::storage::{SaveOutcome, SnapshotStore};

/// One mounted form bound to a snapshot store.
#[derive(Debug)]
pub struct FormView<'a> {
    store: &'a SnapshotStore,
    record: FormRecord,
}

impl<'a> FormView<'a> {
    /// Mount `form`: start from defaults and hydrate from the stored
    /// snapshot if one exists.
    #[must_use]
    pub fn mount(store: &'a SnapshotStore, form: FormId) -> Self {
        let mut view = Self {
            store,
            record: FormRecord::new(form),
        };
        view.reload();
        view
    }

    /// Replace the record with the stored snapshot.
    ///
    /// Leaves the record untouched and returns `false` when there is no
    /// snapshot or it cannot be read.
    pub fn reload(&mut self) -> bool {
        match self.store.load(self.form()) {
            Some(record) => {
                debug!("Hydrated {} from stored snapshot", self.form());
                self.record = record;
                true
            }
            None => false,
        }
    }

    /// The mounted form.
    #[must_use]
    pub fn form(&self) -> FormId {
        self.record.form()
    }

    /// The current record.
    #[must_use]
    pub fn record(&self) -> &FormRecord {
        &self.record
    }

    /// Mutable access to the current record.
    pub fn record_mut(&mut self) -> &mut FormRecord {
        &mut self.record
    }

    /// Set a text or choice field.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or value is not valid for the form.
    pub fn set_text(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.record.set_text(key, value)
    }

    /// Check or uncheck a checklist item.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not a checklist item of the form.
    pub fn set_checked(&mut self, key: &str, checked: bool) -> Result<()> {
        self.record.set_checked(key, checked)
    }

    /// Persist the current record. Failures are logged, not returned.
    pub fn save(&self) {
        self.store.save(self.form(), &self.record);
    }

    /// Persist the current record, reporting the outcome.
    ///
    /// # Errors
    ///
    /// Returns a storage failure if the snapshot could not be written; the
    /// previously stored snapshot is kept.
    pub fn try_save(&self) -> Result<SaveOutcome> {
        self.store.try_save(self.form(), &self.record)
    }

    /// Delete the stored snapshot and reset the record to defaults.
    pub fn clear(&mut self) {
        self.store.clear(self.form());
        self.record.reset();
    }

    /// Export the current record.
    ///
    /// `title` defaults to the form's standard title. The store is not
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns a render failure if the document cannot be produced.
    pub fn export(&self, exporter: &Exporter, title: Option<&str>) -> Result<ExportedFile> {
        let title = title.unwrap_or(self.record.schema().title);
        exporter.export(self.form(), title, &self.record)
    }
}
