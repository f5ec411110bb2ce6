//! Data models for managed records and the collections they arrive in

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a record within its collection.
///
/// `0` is the "no record" sentinel: rows the backend sends without an id
/// decode to it, and it never resolves to a selection.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl RecordId {
    pub const NONE: RecordId = RecordId(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId(value)
    }
}

/// A single managed entity (sub-module, control family, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecordRow", rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub display_name: String,
    pub description: String,
}

impl Record {
    pub fn new(
        id: impl Into<RecordId>,
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_name: display_name.into(),
            description: description.into(),
        }
    }
}

/// Wire shape of a record row. The backend uses upper-case column names that
/// differ per resource; the camelCase/snake_case spellings are accepted too.
#[derive(Debug, Deserialize)]
struct RecordRow {
    #[serde(default, alias = "ID", alias = "Id")]
    id: RecordId,
    #[serde(default, alias = "SUBMODULE_NAME", alias = "CONTROL_FAMILY_NAME")]
    name: String,
    #[serde(
        default,
        rename = "displayName",
        alias = "display_name",
        alias = "DISPLAY_SUBMODULE_NAME"
    )]
    display_name: Option<String>,
    #[serde(default, alias = "SUBMODULE_DESC", alias = "CONTROL_FAMILY_DESC")]
    description: String,
}

impl From<RecordRow> for Record {
    fn from(row: RecordRow) -> Self {
        let display_name = match row.display_name {
            Some(display) if !display.trim().is_empty() => display,
            _ => row.name.clone(),
        };
        Record {
            id: row.id,
            name: row.name,
            display_name,
            description: row.description,
        }
    }
}

/// Ordered set of records fetched as a unit. Insertion order is display
/// order; ids are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Collection {
    records: Vec<Record>,
}

impl Collection {
    /// Build a collection, keeping the first record for any repeated id.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut seen = HashSet::with_capacity(records.len());
        let mut unique = Vec::with_capacity(records.len());
        for record in records {
            if !record.id.is_none() && !seen.insert(record.id) {
                tracing::warn!(record_id = %record.id, "Dropping record with duplicate id");
                continue;
            }
            unique.push(record);
        }
        Self { records: unique }
    }

    /// Decode the `data` array of a list response
    pub fn decode(data: serde_json::Value) -> Result<Self, serde_json::Error> {
        let records: Vec<Record> = serde_json::from_value(data)?;
        Ok(Self::from_records(records))
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        if id.is_none() {
            return None;
        }
        self.records.iter().find(|record| record.id == id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Validated field values for an update, produced by the edit form.
///
/// `display_name` is `None` for resources whose records have no separate
/// display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPatch {
    pub id: RecordId,
    pub name: String,
    pub display_name: Option<String>,
    pub description: String,
}
