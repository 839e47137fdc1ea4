//! Form handling: capture input, check required fields, build the field
//! set for a create call.
//!
//! Validation is deliberately thin: required fields
//! must be non-empty, the amount must parse as a non-negative number,
//! dates must be YYYY-MM-DD. Everything else the backend enforces.

use chrono::NaiveDate;
use tally_types::{
    Amount, Expense, ExpenseCategory, Fields, NonEmptyString, PaymentType, Task, UserId,
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} must be a date like 2025-01-31")]
    InvalidDate(&'static str),
    #[error("amount must be a non-negative number")]
    InvalidAmount,
}

/// A single-line text input with a cursor, char-indexed.
#[derive(Debug, Default, Clone)]
pub struct TextInput {
    text: String,
    cursor: usize,
}

impl TextInput {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor)
            .map_or(self.text.len(), |(i, _)| i)
    }

    pub fn enter_char(&mut self, c: char) {
        let index = self.byte_index();
        self.text.insert(index, c);
        self.cursor += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let before = self.text.chars().take(self.cursor - 1);
        let after = self.text.chars().skip(self.cursor);
        self.text = before.chain(after).collect();
        self.cursor -= 1;
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

/// A fixed-options picker cycled with left/right.
#[derive(Debug, Clone)]
pub struct Picker {
    options: &'static [&'static str],
    index: usize,
}

impl Picker {
    #[must_use]
    pub fn new(options: &'static [&'static str]) -> Self {
        Self { options, index: 0 }
    }

    #[must_use]
    pub fn selected(&self) -> &'static str {
        self.options[self.index]
    }

    pub fn next(&mut self) {
        self.index = (self.index + 1) % self.options.len();
    }

    pub fn prev(&mut self) {
        self.index = (self.index + self.options.len() - 1) % self.options.len();
    }
}

/// One focusable form field.
#[derive(Debug, Clone)]
pub enum FieldInput {
    Text(TextInput),
    Choice(Picker),
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub input: FieldInput,
}

impl FormField {
    fn text(label: &'static str) -> Self {
        Self {
            label,
            input: FieldInput::Text(TextInput::default()),
        }
    }

    fn choice(label: &'static str, options: &'static [&'static str]) -> Self {
        Self {
            label,
            input: FieldInput::Choice(Picker::new(options)),
        }
    }

    #[must_use]
    pub fn display_value(&self) -> &str {
        match &self.input {
            FieldInput::Text(t) => t.text(),
            FieldInput::Choice(p) => p.selected(),
        }
    }
}

/// Shared focus/edit behavior of both forms.
#[derive(Debug)]
pub struct Form {
    title: &'static str,
    fields: Vec<FormField>,
    focus: usize,
    error: Option<String>,
}

impl Form {
    #[must_use]
    pub fn title(&self) -> &'static str {
        self.title
    }

    #[must_use]
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    #[must_use]
    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Inline validation message, shown until the next edit.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    fn focused_mut(&mut self) -> &mut FieldInput {
        &mut self.fields[self.focus].input
    }

    pub fn enter_char(&mut self, c: char) {
        self.error = None;
        if let FieldInput::Text(t) = self.focused_mut() {
            t.enter_char(c);
        }
    }

    pub fn delete_char(&mut self) {
        self.error = None;
        if let FieldInput::Text(t) = self.focused_mut() {
            t.delete_char();
        }
    }

    /// Left arrow: cursor movement in text fields, previous option in
    /// pickers.
    pub fn left(&mut self) {
        match self.focused_mut() {
            FieldInput::Text(t) => t.move_cursor_left(),
            FieldInput::Choice(p) => p.prev(),
        }
    }

    pub fn right(&mut self) {
        match self.focused_mut() {
            FieldInput::Text(t) => t.move_cursor_right(),
            FieldInput::Choice(p) => p.next(),
        }
    }

    fn value(&self, index: usize) -> &str {
        self.fields[index].display_value()
    }
}

fn parse_optional_date(raw: &str, label: &'static str) -> Result<Option<NaiveDate>, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<NaiveDate>()
        .map(Some)
        .map_err(|_| FormError::InvalidDate(label))
}

const TASK_NAME: usize = 0;
const TASK_DESCRIPTION: usize = 1;
const TASK_DUE: usize = 2;

/// The new-task form. Status is not a field: every task starts in To Do.
#[derive(Debug)]
pub struct TaskForm(pub Form);

impl TaskForm {
    #[must_use]
    pub fn new() -> Self {
        Self(Form {
            title: "New Task",
            fields: vec![
                FormField::text("Name"),
                FormField::text("Description"),
                FormField::text("Due date"),
            ],
            focus: 0,
            error: None,
        })
    }

    /// Required-field check, then the create field set.
    pub fn validate(&self, owner: &UserId) -> Result<Fields, FormError> {
        let name = NonEmptyString::new(self.0.value(TASK_NAME))
            .map_err(|_| FormError::Required("name"))?;
        let due = parse_optional_date(self.0.value(TASK_DUE), "due date")?;
        Ok(Task::create_fields(
            owner,
            &name,
            self.0.value(TASK_DESCRIPTION),
            due,
        ))
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

const EXPENSE_ITEM: usize = 0;
const EXPENSE_AMOUNT: usize = 1;
const EXPENSE_CATEGORY: usize = 2;
const EXPENSE_DATE: usize = 3;
const EXPENSE_PAYMENT: usize = 4;
const EXPENSE_NOTES: usize = 5;

const CATEGORY_OPTIONS: &[&str] = &["Food", "Transportation", "Entertainment", "Other"];
const PAYMENT_OPTIONS: &[&str] = &["Cash", "Credit", "Debit"];

#[derive(Debug)]
pub struct ExpenseForm(pub Form);

impl ExpenseForm {
    #[must_use]
    pub fn new() -> Self {
        Self(Form {
            title: "New Expense",
            fields: vec![
                FormField::text("Item"),
                FormField::text("Amount"),
                FormField::choice("Category", CATEGORY_OPTIONS),
                FormField::text("Date"),
                FormField::choice("Payment", PAYMENT_OPTIONS),
                FormField::text("Notes"),
            ],
            focus: 0,
            error: None,
        })
    }

    pub fn validate(&self, owner: &UserId) -> Result<Fields, FormError> {
        let item = NonEmptyString::new(self.0.value(EXPENSE_ITEM))
            .map_err(|_| FormError::Required("item"))?;
        let amount =
            Amount::parse(self.0.value(EXPENSE_AMOUNT)).map_err(|_| FormError::InvalidAmount)?;
        let category = ExpenseCategory::parse_lossy(self.0.value(EXPENSE_CATEGORY));
        let payment = PaymentType::parse_lossy(self.0.value(EXPENSE_PAYMENT));
        let date = parse_optional_date(self.0.value(EXPENSE_DATE), "date")?;
        Ok(Expense::create_fields(
            owner,
            &item,
            amount,
            category,
            date,
            payment,
            self.0.value(EXPENSE_NOTES),
        ))
    }
}

impl Default for ExpenseForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{ExpenseForm, FormError, TaskForm};
    use tally_types::UserId;

    fn owner() -> UserId {
        UserId::new("u1")
    }

    fn type_into(form: &mut super::Form, text: &str) {
        for c in text.chars() {
            form.enter_char(c);
        }
    }

    #[test]
    fn task_form_requires_name() {
        let form = TaskForm::new();
        assert_eq!(form.validate(&owner()), Err(FormError::Required("name")));
    }

    #[test]
    fn task_form_whitespace_name_is_still_empty() {
        let mut form = TaskForm::new();
        type_into(&mut form.0, "   ");
        assert_eq!(form.validate(&owner()), Err(FormError::Required("name")));
    }

    #[test]
    fn task_form_builds_create_fields() {
        let mut form = TaskForm::new();
        type_into(&mut form.0, "Buy milk");
        form.0.focus_next();
        type_into(&mut form.0, "2% if they have it");
        form.0.focus_next();
        type_into(&mut form.0, "2025-01-01");

        let fields = form.validate(&owner()).unwrap();
        assert_eq!(fields["name"], "Buy milk");
        assert_eq!(fields["status"], "To Do");
        assert_eq!(fields["due_date"], "2025-01-01");
        assert_eq!(fields["user_id"], "u1");
    }

    #[test]
    fn task_form_rejects_bad_due_date() {
        let mut form = TaskForm::new();
        type_into(&mut form.0, "Buy milk");
        form.0.focus_next();
        form.0.focus_next();
        type_into(&mut form.0, "tomorrow");
        assert_eq!(
            form.validate(&owner()),
            Err(FormError::InvalidDate("due date"))
        );
    }

    #[test]
    fn expense_form_requires_item_and_valid_amount() {
        let form = ExpenseForm::new();
        assert_eq!(form.validate(&owner()), Err(FormError::Required("item")));

        let mut form = ExpenseForm::new();
        type_into(&mut form.0, "Coffee");
        form.0.focus_next();
        type_into(&mut form.0, "-4");
        assert_eq!(form.validate(&owner()), Err(FormError::InvalidAmount));
    }

    #[test]
    fn expense_form_builds_create_fields() {
        let mut form = ExpenseForm::new();
        type_into(&mut form.0, "Coffee");
        form.0.focus_next();
        type_into(&mut form.0, "4.25");
        form.0.focus_next(); // category picker, defaults to Food
        form.0.right(); // Transportation
        form.0.focus_next();
        type_into(&mut form.0, "2025-02-03");

        let fields = form.validate(&owner()).unwrap();
        assert_eq!(fields["item"], "Coffee");
        assert_eq!(fields["amount"], 4.25);
        assert_eq!(fields["category"], "Transportation");
        assert_eq!(fields["date"], "2025-02-03");
        assert_eq!(fields["payment_type"], "Cash");
        assert!(!fields.contains_key("notes"));
    }

    #[test]
    fn picker_wraps_both_directions() {
        let mut picker = super::Picker::new(&["a", "b"]);
        picker.prev();
        assert_eq!(picker.selected(), "b");
        picker.next();
        assert_eq!(picker.selected(), "a");
    }

    #[test]
    fn text_input_edits_at_cursor() {
        let mut input = super::TextInput::default();
        for c in "milk".chars() {
            input.enter_char(c);
        }
        input.move_cursor_left();
        input.move_cursor_left();
        input.enter_char('_');
        assert_eq!(input.text(), "mi_lk");
        input.delete_char();
        assert_eq!(input.text(), "milk");
    }
}
