//! Core form types for exptoolkit.
//!
//! This module defines the form identifiers, the field schema descriptors
//! shared by the store, the view and the renderer, and [`FormRecord`], the
//! in-memory state of one form.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Identifies one of the four toolkit forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormId {
    /// Blank experiment brief.
    Brief,
    /// Master experiment checklist.
    Checklist,
    /// Post-experiment summary.
    Summary,
    /// Go/no-go checklist.
    Gono,
}

impl FormId {
    /// All forms, in the order the toolkit presents them.
    pub const ALL: [FormId; 4] = [Self::Checklist, Self::Brief, Self::Summary, Self::Gono];

    /// The stable tag used in storage keys and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Brief => "brief",
            Self::Checklist => "checklist",
            Self::Summary => "summary",
            Self::Gono => "gono",
        }
    }

    /// The schema describing this form's fields.
    #[must_use]
    pub fn schema(self) -> &'static FormSchema {
        crate::schema::schema_for(self)
    }

    /// Whether this form renders as a checklist rather than free text.
    #[must_use]
    pub fn is_checklist(self) -> bool {
        self.schema().style == FormStyle::Checklist
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownForm(s.to_string()))
    }
}

/// How a form is laid out when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStyle {
    /// Sections of boolean items rendered with checkbox glyphs.
    Checklist,
    /// Labeled free-text fields; blank fields are omitted.
    FreeText,
}

/// One selectable option of a choice field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOption {
    /// Stored value.
    pub value: &'static str,
    /// Display label.
    pub label: &'static str,
}

/// The kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Free text restricted to a fixed set of options.
    Choice(&'static [FieldOption]),
    /// Boolean checklist item.
    Check,
}

impl FieldKind {
    /// Short name used in error messages and listings.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Choice(_) => "choice",
            Self::Check => "check",
        }
    }

    /// The value a field of this kind starts with.
    #[must_use]
    pub fn default_value(&self) -> FieldValue {
        match self {
            Self::Check => FieldValue::Flag(false),
            Self::Text | Self::Choice(_) => FieldValue::Text(String::new()),
        }
    }
}

/// Describes a single field of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Stable key used in snapshots.
    pub key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Value kind.
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// A free-text field.
    #[must_use]
    pub const fn text(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Text,
        }
    }

    /// A choice field.
    #[must_use]
    pub const fn choice(
        key: &'static str,
        label: &'static str,
        options: &'static [FieldOption],
    ) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Choice(options),
        }
    }

    /// A checklist item.
    #[must_use]
    pub const fn check(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Check,
        }
    }

    /// Resolve a user-supplied choice to its stored value.
    ///
    /// Accepts either the option value or its label, ignoring case.
    fn resolve_choice(&self, input: &str) -> Result<&'static str> {
        let FieldKind::Choice(options) = self.kind else {
            return Err(Error::FieldKind {
                key: self.key.to_string(),
                expected: self.kind.name(),
            });
        };
        let input = input.trim();
        options
            .iter()
            .find(|opt| opt.value.eq_ignore_ascii_case(input) || opt.label.eq_ignore_ascii_case(input))
            .map(|opt| opt.value)
            .ok_or_else(|| Error::InvalidChoice {
                key: self.key.to_string(),
                value: input.to_string(),
                allowed: options
                    .iter()
                    .map(|opt| opt.value)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// A named group of fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// Heading rendered above the section (checklists only).
    pub title: &'static str,
    /// Fields in declaration order.
    pub fields: &'static [FieldDescriptor],
}

/// The complete field layout of one form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormSchema {
    /// Which form this schema belongs to.
    pub id: FormId,
    /// Default document title.
    pub title: &'static str,
    /// Rendering style.
    pub style: FormStyle,
    /// Sections in declaration order.
    pub sections: &'static [Section],
    /// Optional decision slot rendered after the sections.
    pub decision: Option<FieldDescriptor>,
}

impl FormSchema {
    /// Iterate over every field, sections first, then the decision slot.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> + '_ {
        self.sections
            .iter()
            .flat_map(|section| section.fields.iter())
            .chain(self.decision.iter())
    }

    /// Look up a field by key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields().find(|field| field.key == key)
    }

    /// Number of fields, including the decision slot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields().count()
    }

    /// Whether the schema declares no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Checklist item state.
    Flag(bool),
    /// Text or choice value.
    Text(String),
}

impl FieldValue {
    /// The text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Flag(_) => None,
        }
    }

    /// Truthiness: checked flags and non-blank text.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Text(text) => !text.trim().is_empty(),
        }
    }
}

/// In-memory state of one form.
///
/// Every key of the form's schema is always present; a record never holds
/// keys outside its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRecord {
    form: FormId,
    values: BTreeMap<&'static str, FieldValue>,
}

impl FormRecord {
    /// Create a record with every field at its default.
    #[must_use]
    pub fn new(form: FormId) -> Self {
        let values = form
            .schema()
            .fields()
            .map(|field| (field.key, field.kind.default_value()))
            .collect();
        Self { form, values }
    }

    /// Build a record from a serialized snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a JSON object.
    pub fn from_snapshot(form: FormId, json: &str) -> Result<Self> {
        let mut record = Self::new(form);
        record.merge_snapshot(json)?;
        Ok(record)
    }

    /// Overlay the values of a serialized snapshot onto this record.
    ///
    /// Unknown keys, values of the wrong type and choices outside a field's
    /// options are ignored; fields absent from the snapshot keep their
    /// current value. Returns how many fields were applied.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a JSON object. The record is left
    /// unchanged in that case.
    pub fn merge_snapshot(&mut self, json: &str) -> Result<usize> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let schema = self.form.schema();
        let mut applied = 0;

        for (key, value) in raw {
            let Some(field) = schema.field(&key) else {
                debug!("Ignoring unknown key '{}' in {} snapshot", key, self.form);
                continue;
            };
            let value = match (field.kind, value) {
                (FieldKind::Check, serde_json::Value::Bool(flag)) => FieldValue::Flag(flag),
                (FieldKind::Text, serde_json::Value::String(text)) => FieldValue::Text(text),
                (FieldKind::Choice(_), serde_json::Value::String(text)) if text.trim().is_empty() => {
                    FieldValue::Text(String::new())
                }
                (FieldKind::Choice(_), serde_json::Value::String(text)) => {
                    match field.resolve_choice(&text) {
                        Ok(choice) => FieldValue::Text(choice.to_string()),
                        Err(e) => {
                            debug!("Ignoring stored value in {} snapshot: {}", self.form, e);
                            continue;
                        }
                    }
                }
                (kind, other) => {
                    debug!(
                        "Ignoring {} value for {} field '{}'",
                        json_type_name(&other),
                        kind.name(),
                        key
                    );
                    continue;
                }
            };
            self.values.insert(field.key, value);
            applied += 1;
        }

        Ok(applied)
    }

    /// Serialize this record as a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_snapshot(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.values)?)
    }

    /// The form this record belongs to.
    #[must_use]
    pub fn form(&self) -> FormId {
        self.form
    }

    /// The schema of this record's form.
    #[must_use]
    pub fn schema(&self) -> &'static FormSchema {
        self.form.schema()
    }

    /// All values keyed by field key.
    #[must_use]
    pub fn values(&self) -> &BTreeMap<&'static str, FieldValue> {
        &self.values
    }

    /// Get a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    /// Text of a field, or `""` for unknown keys and checklist items.
    #[must_use]
    pub fn text(&self, key: &str) -> &str {
        self.get(key).and_then(FieldValue::as_text).unwrap_or("")
    }

    /// Whether a field's value is truthy.
    #[must_use]
    pub fn is_checked(&self, key: &str) -> bool {
        self.get(key).is_some_and(FieldValue::is_truthy)
    }

    /// Text of a field as displayed: choice values map to their labels.
    #[must_use]
    pub fn display_text(&self, field: &FieldDescriptor) -> Cow<'_, str> {
        let raw = self.text(field.key);
        if let FieldKind::Choice(options) = field.kind {
            if let Some(option) = options.iter().find(|opt| opt.value == raw) {
                return Cow::Borrowed(option.label);
            }
        }
        Cow::Borrowed(raw)
    }

    /// Set a text or choice field.
    ///
    /// Choice fields accept an option value or label; a blank value clears
    /// the field.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys, checklist items, or choices
    /// outside the field's options.
    pub fn set_text(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let field = self.field(key)?;
        let value = value.into();
        let stored = match field.kind {
            FieldKind::Text => value,
            FieldKind::Choice(_) if value.trim().is_empty() => String::new(),
            FieldKind::Choice(_) => field.resolve_choice(&value)?.to_string(),
            FieldKind::Check => {
                return Err(Error::FieldKind {
                    key: key.to_string(),
                    expected: field.kind.name(),
                })
            }
        };
        self.values.insert(field.key, FieldValue::Text(stored));
        Ok(())
    }

    /// Check or uncheck a checklist item.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys or non-checklist fields.
    pub fn set_checked(&mut self, key: &str, checked: bool) -> Result<()> {
        let field = self.field(key)?;
        if field.kind != FieldKind::Check {
            return Err(Error::FieldKind {
                key: key.to_string(),
                expected: field.kind.name(),
            });
        }
        self.values.insert(field.key, FieldValue::Flag(checked));
        Ok(())
    }

    /// Reset every field to its default.
    pub fn reset(&mut self) {
        *self = Self::new(self.form);
    }

    /// Whether every field still holds its default.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        self.values.values().all(|value| !value.is_truthy())
    }

    /// Iterate over fields and their values in schema order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static FieldDescriptor, &FieldValue)> + '_ {
        self.schema()
            .fields()
            .filter_map(|field| self.values.get(field.key).map(|value| (field, value)))
    }

    /// Number of checked checklist items.
    #[must_use]
    pub fn checked_count(&self) -> usize {
        self.values
            .values()
            .filter(|value| matches!(value, FieldValue::Flag(true)))
            .count()
    }

    fn field(&self, key: &str) -> Result<&'static FieldDescriptor> {
        self.schema()
            .field(key)
            .ok_or_else(|| Error::unknown_field(self.form, key))
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_id_round_trip_str() {
        for id in FormId::ALL {
            assert_eq!(id.as_str().parse::<FormId>().unwrap(), id);
            assert_eq!(id.to_string(), id.as_str());
        }
        assert_eq!("GONO".parse::<FormId>().unwrap(), FormId::Gono);
    }

    #[test]
    fn test_form_id_parse_unknown() {
        let err = "survey".parse::<FormId>().unwrap_err();
        assert!(matches!(err, Error::UnknownForm(ref s) if s == "survey"));
    }

    #[test]
    fn test_form_id_style() {
        assert!(FormId::Checklist.is_checklist());
        assert!(FormId::Gono.is_checklist());
        assert!(!FormId::Brief.is_checklist());
        assert!(!FormId::Summary.is_checklist());
    }

    #[test]
    fn test_form_id_serde() {
        assert_eq!(serde_json::to_string(&FormId::Gono).unwrap(), "\"gono\"");
        let id: FormId = serde_json::from_str("\"brief\"").unwrap();
        assert_eq!(id, FormId::Brief);
    }

    #[test]
    fn test_new_record_has_defaults_for_every_field() {
        for id in FormId::ALL {
            let record = FormRecord::new(id);
            assert_eq!(record.entries().count(), id.schema().len());
            assert!(record.is_pristine());
            for (field, value) in record.entries() {
                assert_eq!(*value, field.kind.default_value());
            }
        }
    }

    #[test]
    fn test_set_text() {
        let mut record = FormRecord::new(FormId::Brief);
        record.set_text("title", "Button Color Test").unwrap();
        assert_eq!(record.text("title"), "Button Color Test");
        assert!(!record.is_pristine());
    }

    #[test]
    fn test_set_text_unknown_key() {
        let mut record = FormRecord::new(FormId::Brief);
        let err = record.set_text("colour", "blue").unwrap_err();
        assert!(matches!(err, Error::UnknownField { form: FormId::Brief, .. }));
    }

    #[test]
    fn test_set_text_on_check_field() {
        let mut record = FormRecord::new(FormId::Gono);
        let err = record.set_text("gono_1", "yes").unwrap_err();
        assert!(matches!(err, Error::FieldKind { expected: "check", .. }));
    }

    #[test]
    fn test_set_checked() {
        let mut record = FormRecord::new(FormId::Gono);
        record.set_checked("gono_3", true).unwrap();
        assert!(record.is_checked("gono_3"));
        assert!(!record.is_checked("gono_1"));
        assert_eq!(record.checked_count(), 1);
    }

    #[test]
    fn test_set_checked_on_text_field() {
        let mut record = FormRecord::new(FormId::Summary);
        let err = record.set_checked("notes", true).unwrap_err();
        assert!(matches!(err, Error::FieldKind { expected: "text", .. }));
    }

    #[test]
    fn test_choice_accepts_value_or_label() {
        let mut record = FormRecord::new(FormId::Brief);
        record.set_text("experiment_type", "bandit").unwrap();
        assert_eq!(record.text("experiment_type"), "bandit");

        record.set_text("experiment_type", "a/b").unwrap();
        assert_eq!(record.text("experiment_type"), "ab");
    }

    #[test]
    fn test_choice_rejects_unknown_option() {
        let mut record = FormRecord::new(FormId::Gono);
        let err = record.set_text("final_decision", "maybe").unwrap_err();
        match err {
            Error::InvalidChoice { allowed, .. } => assert_eq!(allowed, "go, no-go"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_choice_blank_clears() {
        let mut record = FormRecord::new(FormId::Summary);
        record.set_text("decision", "launch").unwrap();
        record.set_text("decision", "  ").unwrap();
        assert_eq!(record.text("decision"), "");
    }

    #[test]
    fn test_display_text_maps_choice_label() {
        let mut record = FormRecord::new(FormId::Brief);
        record.set_text("randomisation_unit", "session").unwrap();
        let field = FormId::Brief.schema().field("randomisation_unit").unwrap();
        assert_eq!(record.display_text(field), "Session");

        let field = FormId::Brief.schema().field("owner").unwrap();
        assert_eq!(record.display_text(field), "");
    }

    #[test]
    fn test_reset() {
        let mut record = FormRecord::new(FormId::Checklist);
        record.set_checked("planning_1", true).unwrap();
        record.reset();
        assert_eq!(record, FormRecord::new(FormId::Checklist));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut record = FormRecord::new(FormId::Brief);
        record.set_text("title", "Button Color Test").unwrap();
        record.set_text("owner", "Alice").unwrap();

        let json = record.to_snapshot().unwrap();
        let restored = FormRecord::from_snapshot(FormId::Brief, &json).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_snapshot_is_deterministic() {
        let mut record = FormRecord::new(FormId::Gono);
        record.set_checked("gono_2", true).unwrap();
        assert_eq!(record.to_snapshot().unwrap(), record.clone().to_snapshot().unwrap());
    }

    #[test]
    fn test_merge_ignores_unknown_keys_and_wrong_types() {
        let mut record = FormRecord::new(FormId::Gono);
        let applied = record
            .merge_snapshot(r#"{"gono_1": true, "gono_2": "yes", "legacy": 4, "final_decision": "go"}"#)
            .unwrap();

        assert_eq!(applied, 2);
        assert!(record.is_checked("gono_1"));
        assert!(!record.is_checked("gono_2"));
        assert!(record.get("legacy").is_none());
        assert_eq!(record.text("final_decision"), "go");
    }

    #[test]
    fn test_merge_drops_choices_outside_options() {
        let mut record = FormRecord::new(FormId::Brief);
        record.set_text("experiment_type", "adaptive").unwrap();

        let applied = record
            .merge_snapshot(r#"{"experiment_type": "bogus", "owner": "Alice"}"#)
            .unwrap();
        assert_eq!(applied, 1);
        assert_eq!(record.text("experiment_type"), "adaptive");
        assert_eq!(record.text("owner"), "Alice");

        let restored =
            FormRecord::from_snapshot(FormId::Gono, r#"{"final_decision": "GO"}"#).unwrap();
        assert_eq!(restored.text("final_decision"), "go");
        let restored =
            FormRecord::from_snapshot(FormId::Gono, r#"{"final_decision": "maybe"}"#).unwrap();
        assert_eq!(restored.text("final_decision"), "");
    }

    #[test]
    fn test_merge_keeps_missing_fields() {
        let mut record = FormRecord::new(FormId::Summary);
        record.set_text("notes", "keep me").unwrap();
        record.merge_snapshot(r#"{"owner": "Bob"}"#).unwrap();

        assert_eq!(record.text("owner"), "Bob");
        assert_eq!(record.text("notes"), "keep me");
    }

    #[test]
    fn test_merge_invalid_json_leaves_record_unchanged() {
        let mut record = FormRecord::new(FormId::Brief);
        record.set_text("owner", "Alice").unwrap();
        let before = record.clone();

        assert!(record.merge_snapshot("not json").is_err());
        assert!(record.merge_snapshot("[1, 2]").is_err());
        assert_eq!(record, before);
    }

    #[test]
    fn test_field_value_truthiness() {
        assert!(FieldValue::Flag(true).is_truthy());
        assert!(!FieldValue::Flag(false).is_truthy());
        assert!(FieldValue::Text("x".to_string()).is_truthy());
        assert!(!FieldValue::Text(" \n\t".to_string()).is_truthy());
    }

    #[test]
    fn test_field_value_untagged_serde() {
        let value: FieldValue = serde_json::from_str("true").unwrap();
        assert_eq!(value, FieldValue::Flag(true));
        let value: FieldValue = serde_json::from_str("\"Alice\"").unwrap();
        assert_eq!(value, FieldValue::Text("Alice".to_string()));
    }
}
