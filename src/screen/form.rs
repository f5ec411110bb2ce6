//! Edit form: schema-declared validation over a plain field map, and the
//! ephemeral draft session that lives while edit mode is on.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::data::{Record, RecordId, RecordPatch, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Name,
    DisplayName,
    Description,
}

impl Field {
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::DisplayName => "displayName",
            Field::Description => "description",
        }
    }

    fn read(self, record: &Record) -> &str {
        match self {
            Field::Name => &record.name,
            Field::DisplayName => &record.display_name,
            Field::Description => &record.description,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Field::Name),
            "displayName" | "display_name" | "display-name" => Ok(Field::DisplayName),
            "description" => Ok(Field::Description),
            other => Err(format!("Unknown field: {}", other)),
        }
    }
}

pub type FieldValues = BTreeMap<Field, String>;

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn set(&mut self, field: Field, message: Option<&str>) {
        match message {
            Some(message) => {
                self.0.insert(field, message.to_string());
            }
            None => {
                self.0.remove(&field);
            }
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub field: Field,
    pub label: &'static str,
    pub required_message: &'static str,
}

/// Ordered set of editable fields. Every field is a required string that
/// must be non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSchema {
    rules: Vec<FieldRule>,
}

impl FormSchema {
    pub fn for_resource(resource: &Resource) -> Self {
        let mut rules = vec![FieldRule {
            field: Field::Name,
            label: "Name",
            required_message: "Name is required",
        }];
        if resource.has_display_name() {
            rules.push(FieldRule {
                field: Field::DisplayName,
                label: "Display Name",
                required_message: "Display name is required",
            });
        }
        rules.push(FieldRule {
            field: Field::Description,
            label: "Description",
            required_message: "Description is required",
        });
        Self { rules }
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn contains(&self, field: Field) -> bool {
        self.rule(field).is_some()
    }

    fn rule(&self, field: Field) -> Option<&FieldRule> {
        self.rules.iter().find(|rule| rule.field == field)
    }

    /// Validate a single field, returning its error message if invalid
    pub fn check(&self, field: Field, value: &str) -> Option<&'static str> {
        let rule = self.rule(field)?;
        value.trim().is_empty().then_some(rule.required_message)
    }

    /// Validate every field and build the typed update payload
    pub fn validate(&self, id: RecordId, values: &FieldValues) -> Result<RecordPatch, FieldErrors> {
        let mut errors = FieldErrors::default();
        for rule in &self.rules {
            let value = values.get(&rule.field).map(String::as_str).unwrap_or("");
            errors.set(rule.field, self.check(rule.field, value));
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let trimmed = |field: Field| {
            values
                .get(&field)
                .map(|value| value.trim().to_string())
                .unwrap_or_default()
        };
        Ok(RecordPatch {
            id,
            name: trimmed(Field::Name),
            display_name: self
                .contains(Field::DisplayName)
                .then(|| trimmed(Field::DisplayName)),
            description: trimmed(Field::Description),
        })
    }
}

/// Draft of one record while edit mode is on. Values are copied from the
/// record at entry; later collection changes do not reach the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSession {
    record_id: RecordId,
    schema: FormSchema,
    draft: FieldValues,
    errors: FieldErrors,
    submitting: bool,
}

impl FormSession {
    pub fn begin(record: &Record, schema: FormSchema) -> Self {
        let draft = schema
            .rules()
            .iter()
            .map(|rule| (rule.field, rule.field.read(record).to_string()))
            .collect();
        Self {
            record_id: record.id,
            schema,
            draft,
            errors: FieldErrors::default(),
            submitting: false,
        }
    }

    pub fn record_id(&self) -> RecordId {
        self.record_id
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn value(&self, field: Field) -> Option<&str> {
        self.draft.get(&field).map(String::as_str)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Update a draft value and revalidate that field. Returns false for
    /// fields outside the schema or while a submission is in flight.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> bool {
        if self.submitting || !self.schema.contains(field) {
            return false;
        }
        let value = value.into();
        self.errors.set(field, self.schema.check(field, &value));
        self.draft.insert(field, value);
        true
    }

    /// Validate everything. On success the session is marked in flight and
    /// the payload returned; on failure the errors are kept for display.
    pub fn begin_submit(&mut self) -> Result<RecordPatch, FieldErrors> {
        match self.schema.validate(self.record_id, &self.draft) {
            Ok(patch) => {
                self.errors = FieldErrors::default();
                self.submitting = true;
                Ok(patch)
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    /// The submission failed remotely; keep the draft and allow a retry
    pub fn submit_failed(&mut self) {
        self.submitting = false;
    }
}
