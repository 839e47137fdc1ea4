use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::NonEmptyString;
use crate::ids::{RecordId, UserId};
use crate::record::{FieldError, Fields, Record, optional_str, require_f64, require_str};

/// A non-negative expense amount.
///
/// Negative and non-finite values are unrepresentable; the expense form
/// rejects them before a create call is issued.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Amount(f64);

#[derive(Debug, thiserror::Error)]
#[error("amount must be a non-negative number")]
pub struct AmountError;

impl Amount {
    pub fn new(value: f64) -> Result<Self, AmountError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(AmountError)
        }
    }

    /// Parse a form field. Accepts a leading currency-style `$`.
    pub fn parse(raw: &str) -> Result<Self, AmountError> {
        let trimmed = raw.trim().trim_start_matches('$');
        let value: f64 = trimmed.parse().map_err(|_| AmountError)?;
        Self::new(value)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Amount {
    type Error = AmountError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for f64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Fixed expense categories, matching the category picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExpenseCategory {
    #[default]
    Food,
    Transportation,
    Entertainment,
    Other,
}

impl ExpenseCategory {
    #[must_use]
    pub const fn all() -> &'static [ExpenseCategory] {
        &[
            ExpenseCategory::Food,
            ExpenseCategory::Transportation,
            ExpenseCategory::Entertainment,
            ExpenseCategory::Other,
        ]
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ExpenseCategory::Food => "Food",
            ExpenseCategory::Transportation => "Transportation",
            ExpenseCategory::Entertainment => "Entertainment",
            ExpenseCategory::Other => "Other",
        }
    }

    /// Unknown category strings fall back to `Other` rather than failing
    /// the whole fetch; categories are display metadata, not structure.
    #[must_use]
    pub fn parse_lossy(raw: &str) -> Self {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(raw.trim()))
            .unwrap_or(ExpenseCategory::Other)
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentType {
    #[default]
    Cash,
    Credit,
    Debit,
}

impl PaymentType {
    #[must_use]
    pub const fn all() -> &'static [PaymentType] {
        &[PaymentType::Cash, PaymentType::Credit, PaymentType::Debit]
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PaymentType::Cash => "Cash",
            PaymentType::Credit => "Credit",
            PaymentType::Debit => "Debit",
        }
    }

    /// There is no catch-all payment option; unknown strings fall back
    /// to the default.
    #[must_use]
    pub fn parse_lossy(raw: &str) -> Self {
        Self::all()
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(raw.trim()))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire field names for expense records.
pub mod fields {
    pub const OWNER: &str = "user_id";
    pub const ITEM: &str = "item";
    pub const AMOUNT: &str = "amount";
    pub const CATEGORY: &str = "category";
    pub const DATE: &str = "date";
    pub const PAYMENT_TYPE: &str = "payment_type";
    pub const NOTES: &str = "notes";
}

/// An expense as read back from the backend. Immutable after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: RecordId,
    pub owner: UserId,
    pub item: String,
    pub amount: Amount,
    pub category: ExpenseCategory,
    pub date: Option<NaiveDate>,
    pub payment_type: PaymentType,
    pub notes: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Expense {
    pub fn from_record(record: Record) -> Result<Self, FieldError> {
        let owner = UserId::new(require_str(&record.fields, fields::OWNER)?);
        let item = require_str(&record.fields, fields::ITEM)?.to_string();
        let raw_amount = require_f64(&record.fields, fields::AMOUNT)?;
        let amount = Amount::new(raw_amount).map_err(|_| FieldError::Invalid {
            field: fields::AMOUNT,
            value: raw_amount.to_string(),
        })?;
        let category = optional_str(&record.fields, fields::CATEGORY)
            .map(ExpenseCategory::parse_lossy)
            .unwrap_or_default();
        let payment_type = optional_str(&record.fields, fields::PAYMENT_TYPE)
            .map(PaymentType::parse_lossy)
            .unwrap_or_default();
        let date = match optional_str(&record.fields, fields::DATE) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<NaiveDate>().map_err(|_| FieldError::Invalid {
                field: fields::DATE,
                value: raw.to_string(),
            })?),
        };
        let notes = optional_str(&record.fields, fields::NOTES)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            id: record.id,
            owner,
            item,
            amount,
            category,
            date,
            payment_type,
            notes,
            created_at: record.created_at,
        })
    }

    /// Field set for creating a new expense.
    #[must_use]
    pub fn create_fields(
        owner: &UserId,
        item: &NonEmptyString,
        amount: Amount,
        category: ExpenseCategory,
        date: Option<NaiveDate>,
        payment_type: PaymentType,
        notes: &str,
    ) -> Fields {
        let mut f = Fields::new();
        f.insert(fields::OWNER.into(), Value::from(owner.as_str()));
        f.insert(fields::ITEM.into(), Value::from(item.as_str()));
        f.insert(fields::AMOUNT.into(), Value::from(amount.value()));
        f.insert(fields::CATEGORY.into(), Value::from(category.as_str()));
        if let Some(date) = date {
            f.insert(fields::DATE.into(), Value::from(date.to_string()));
        }
        f.insert(
            fields::PAYMENT_TYPE.into(),
            Value::from(payment_type.as_str()),
        );
        if !notes.trim().is_empty() {
            f.insert(fields::NOTES.into(), Value::from(notes));
        }
        f
    }
}

/// Sum of all amounts, for the running-total display.
#[must_use]
pub fn total(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|e| e.amount.value()).sum()
}

#[cfg(test)]
mod tests {
    use super::{Amount, Expense, ExpenseCategory, PaymentType, total};
    use crate::ids::RecordId;
    use crate::record::Record;
    use serde_json::json;

    fn record(fields: serde_json::Value) -> Record {
        let serde_json::Value::Object(map) = fields else {
            panic!("fields must be an object");
        };
        Record::new(RecordId::new("rec1"), None, map)
    }

    #[test]
    fn amount_rejects_negative() {
        assert!(Amount::new(-0.01).is_err());
        assert!(Amount::new(0.0).is_ok());
    }

    #[test]
    fn amount_parse_accepts_dollar_prefix() {
        assert_eq!(Amount::parse("$12.50").unwrap().value(), 12.5);
    }

    #[test]
    fn amount_parse_rejects_garbage() {
        assert!(Amount::parse("twelve").is_err());
        assert!(Amount::parse("-3").is_err());
    }

    #[test]
    fn category_parse_is_lossy() {
        assert_eq!(ExpenseCategory::parse_lossy("food"), ExpenseCategory::Food);
        assert_eq!(
            ExpenseCategory::parse_lossy("Transportation"),
            ExpenseCategory::Transportation
        );
        assert_eq!(
            ExpenseCategory::parse_lossy("Groceries"),
            ExpenseCategory::Other
        );
    }

    #[test]
    fn payment_parse_reads_all_options_and_falls_back_to_cash() {
        assert_eq!(PaymentType::parse_lossy("Credit"), PaymentType::Credit);
        assert_eq!(PaymentType::parse_lossy("debit"), PaymentType::Debit);
        assert_eq!(PaymentType::parse_lossy("Wire"), PaymentType::Cash);
    }

    #[test]
    fn from_record_reads_expense() {
        let expense = Expense::from_record(record(json!({
            "user_id": "u1",
            "item": "Coffee",
            "amount": 4.25,
            "category": "Food",
            "date": "2025-02-03",
            "payment_type": "Credit",
        })))
        .unwrap();

        assert_eq!(expense.item, "Coffee");
        assert_eq!(expense.amount.value(), 4.25);
        assert_eq!(expense.category, ExpenseCategory::Food);
        assert_eq!(expense.payment_type, PaymentType::Credit);
        assert!(expense.notes.is_empty());
    }

    #[test]
    fn from_record_rejects_negative_amount() {
        let result = Expense::from_record(record(json!({
            "user_id": "u1",
            "item": "Refund?",
            "amount": -5.0,
        })));
        assert!(result.is_err());
    }

    #[test]
    fn total_sums_amounts() {
        let a = Expense::from_record(record(json!({
            "user_id": "u1", "item": "a", "amount": 1.5,
        })))
        .unwrap();
        let b = Expense::from_record(record(json!({
            "user_id": "u1", "item": "b", "amount": 2.25,
        })))
        .unwrap();
        assert!((total(&[a, b]) - 3.75).abs() < f64::EPSILON);
    }

    #[test]
    fn total_of_empty_is_zero() {
        assert_eq!(total(&[]), 0.0);
    }
}
