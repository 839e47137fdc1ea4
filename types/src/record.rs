//! Generic record shape shared by every backend.
//!
//! A [`Record`] is one row/document in the backend store: a server-assigned
//! id, an optional server timestamp, and a flat field map. The typed
//! conversions in [`crate::task`] and [`crate::expense`] sit on top.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::ids::RecordId;

/// Flat field map as it travels on the wire.
pub type Fields = serde_json::Map<String, Value>;

/// One row/document in the backend store.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub created_at: Option<DateTime<Utc>>,
    pub fields: Fields,
}

impl Record {
    #[must_use]
    pub fn new(id: RecordId, created_at: Option<DateTime<Utc>>, fields: Fields) -> Self {
        Self {
            id,
            created_at,
            fields,
        }
    }
}

/// Where records live: a (base, table) pair.
///
/// For the table service `base` is the base id and `table` the table name;
/// for the document backend `base` is the project id and `table` the
/// collection. Constructed by config resolution, never ad hoc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    base: String,
    table: String,
}

impl Scope {
    #[must_use]
    pub fn new(base: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            table: table.into(),
        }
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.table)
    }
}

/// A record could not be interpreted as the expected domain type.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error("missing field '{0}'")]
    Missing(&'static str),
    #[error("field '{field}' has invalid value: {value}")]
    Invalid { field: &'static str, value: String },
}

pub(crate) fn require_str<'a>(fields: &'a Fields, name: &'static str) -> Result<&'a str, FieldError> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .ok_or(FieldError::Missing(name))
}

pub(crate) fn optional_str<'a>(fields: &'a Fields, name: &str) -> Option<&'a str> {
    fields.get(name).and_then(Value::as_str)
}

pub(crate) fn require_f64(fields: &Fields, name: &'static str) -> Result<f64, FieldError> {
    let value = fields.get(name).ok_or(FieldError::Missing(name))?;
    value.as_f64().ok_or_else(|| FieldError::Invalid {
        field: name,
        value: value.to_string(),
    })
}
