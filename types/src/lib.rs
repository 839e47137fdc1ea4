//! Core domain types for Tally.
//!
//! Everything here is plain data: no IO, no async, no HTTP. The client
//! crate moves [`Record`]s over the wire; the conversions in [`task`] and
//! [`expense`] are the only place wire field names appear.

pub mod expense;
pub mod ids;
pub mod record;
pub mod task;

pub use expense::{Amount, Expense, ExpenseCategory, PaymentType};
pub use ids::{RecordId, UserId};
pub use record::{FieldError, Fields, Record, Scope};
pub use task::{Task, TaskStatus};

use serde::{Deserialize, Serialize};

/// A string that is guaranteed non-empty after trimming.
///
/// Required form fields (task name, expense item) are parsed into this at
/// the form boundary, so an empty submission can never reach the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

#[derive(Debug, thiserror::Error)]
#[error("value must not be empty")]
pub struct EmptyStringError;

impl NonEmptyString {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(EmptyStringError)
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::NonEmptyString;

    #[test]
    fn non_empty_string_accepts_content() {
        let s = NonEmptyString::new("Buy milk").unwrap();
        assert_eq!(s.as_str(), "Buy milk");
    }

    #[test]
    fn non_empty_string_rejects_empty() {
        assert!(NonEmptyString::new("").is_err());
    }

    #[test]
    fn non_empty_string_rejects_whitespace() {
        assert!(NonEmptyString::new("   \t").is_err());
    }

    #[test]
    fn non_empty_string_serde_boundary() {
        let ok: Result<NonEmptyString, _> = serde_json::from_str("\"x\"");
        assert!(ok.is_ok());
        let err: Result<NonEmptyString, _> = serde_json::from_str("\"  \"");
        assert!(err.is_err());
    }
}
