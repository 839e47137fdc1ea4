use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::NonEmptyString;
use crate::ids::{RecordId, UserId};
use crate::record::{FieldError, Fields, Record, optional_str, require_str};

/// The three fixed board columns, in board order.
///
/// `as_str` is the backend field spelling; parsing accepts exactly those
/// spellings (plus the legacy "To-Do" the earliest records were written
/// with).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    ToDo,
    InProgress,
    Done,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown task status '{0}'")]
pub struct StatusParseError(String);

impl TaskStatus {
    /// All statuses in column order.
    #[must_use]
    pub const fn all() -> &'static [TaskStatus] {
        &[TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Done]
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, StatusParseError> {
        match raw.trim() {
            "To Do" | "To-Do" => Ok(TaskStatus::ToDo),
            "In Progress" => Ok(TaskStatus::InProgress),
            "Done" => Ok(TaskStatus::Done),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire field names for task records.
pub mod fields {
    pub const OWNER: &str = "user_id";
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const STATUS: &str = "status";
    pub const DUE_DATE: &str = "due_date";
}

/// A task as read back from the backend.
///
/// Created by the task form (always `ToDo`), status mutated from the board,
/// never deleted in-app.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: RecordId,
    pub owner: UserId,
    pub name: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Interpret a backend record as a task.
    ///
    /// A record with a missing owner or name is malformed (someone wrote to
    /// the table outside the app); an unknown status string likewise.
    pub fn from_record(record: Record) -> Result<Self, FieldError> {
        let owner = UserId::new(require_str(&record.fields, fields::OWNER)?);
        let name = require_str(&record.fields, fields::NAME)?.to_string();
        let status_raw = require_str(&record.fields, fields::STATUS)?;
        let status = TaskStatus::parse(status_raw).map_err(|_| FieldError::Invalid {
            field: fields::STATUS,
            value: status_raw.to_string(),
        })?;
        let description = optional_str(&record.fields, fields::DESCRIPTION)
            .unwrap_or_default()
            .to_string();
        let due_date = match optional_str(&record.fields, fields::DUE_DATE) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<NaiveDate>().map_err(|_| FieldError::Invalid {
                field: fields::DUE_DATE,
                value: raw.to_string(),
            })?),
        };

        Ok(Self {
            id: record.id,
            owner,
            name,
            description,
            status,
            due_date,
            created_at: record.created_at,
        })
    }

    /// Field set for creating a new task. Status is always `ToDo`.
    #[must_use]
    pub fn create_fields(
        owner: &UserId,
        name: &NonEmptyString,
        description: &str,
        due_date: Option<NaiveDate>,
    ) -> Fields {
        let mut f = Fields::new();
        f.insert(fields::OWNER.into(), Value::from(owner.as_str()));
        f.insert(fields::NAME.into(), Value::from(name.as_str()));
        if !description.trim().is_empty() {
            f.insert(fields::DESCRIPTION.into(), Value::from(description));
        }
        f.insert(
            fields::STATUS.into(),
            Value::from(TaskStatus::ToDo.as_str()),
        );
        if let Some(due) = due_date {
            f.insert(fields::DUE_DATE.into(), Value::from(due.to_string()));
        }
        f
    }

    /// Field set for a status transition: patches exactly one field.
    #[must_use]
    pub fn status_fields(status: TaskStatus) -> Fields {
        let mut f = Fields::new();
        f.insert(fields::STATUS.into(), Value::from(status.as_str()));
        f
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskStatus, fields};
    use crate::NonEmptyString;
    use crate::ids::{RecordId, UserId};
    use crate::record::{FieldError, Record};
    use serde_json::json;

    fn record(fields: serde_json::Value) -> Record {
        let serde_json::Value::Object(map) = fields else {
            panic!("fields must be an object");
        };
        Record::new(RecordId::new("rec1"), None, map)
    }

    #[test]
    fn status_spellings_round_trip() {
        for status in TaskStatus::all() {
            assert_eq!(TaskStatus::parse(status.as_str()).unwrap(), *status);
        }
    }

    #[test]
    fn status_accepts_legacy_hyphenated_todo() {
        assert_eq!(TaskStatus::parse("To-Do").unwrap(), TaskStatus::ToDo);
    }

    #[test]
    fn status_rejects_unknown() {
        assert!(TaskStatus::parse("Blocked").is_err());
    }

    #[test]
    fn from_record_reads_all_fields() {
        let task = Task::from_record(record(json!({
            "user_id": "u1",
            "name": "Buy milk",
            "description": "2%",
            "status": "In Progress",
            "due_date": "2025-01-01",
        })))
        .unwrap();

        assert_eq!(task.owner, UserId::new("u1"));
        assert_eq!(task.name, "Buy milk");
        assert_eq!(task.description, "2%");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.due_date.unwrap().to_string(), "2025-01-01");
    }

    #[test]
    fn from_record_missing_name_fails() {
        let err = Task::from_record(record(json!({
            "user_id": "u1",
            "status": "Done",
        })))
        .unwrap_err();
        assert!(matches!(err, FieldError::Missing(name) if name == fields::NAME));
    }

    #[test]
    fn from_record_bad_status_fails() {
        let err = Task::from_record(record(json!({
            "user_id": "u1",
            "name": "x",
            "status": "Someday",
        })))
        .unwrap_err();
        assert!(matches!(err, FieldError::Invalid { field, .. } if field == fields::STATUS));
    }

    #[test]
    fn create_fields_always_start_in_todo() {
        let name = NonEmptyString::new("Buy milk").unwrap();
        let f = Task::create_fields(&UserId::new("u1"), &name, "", None);
        assert_eq!(f[fields::STATUS], "To Do");
        assert_eq!(f[fields::NAME], "Buy milk");
        assert!(!f.contains_key(fields::DESCRIPTION));
        assert!(!f.contains_key(fields::DUE_DATE));
    }

    #[test]
    fn status_fields_patch_exactly_one_field() {
        let f = Task::status_fields(TaskStatus::Done);
        assert_eq!(f.len(), 1);
        assert_eq!(f[fields::STATUS], "Done");
    }
}
