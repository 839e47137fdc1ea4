//! Application state.
//!
//! One `App` value owns the session, the fetched records, and the open
//! form, and every mutation goes backend-first: submit or transition,
//! await the call, then re-fetch and rebuild the local view from the
//! response. Nothing is patched optimistically, so what the board shows
//! is always a fetch result, never a guess.
//!
//! All network calls are awaited inline by the event handler; there is
//! exactly one interaction in flight at any time.

use tally_client::{ClientError, IdentityClient, RecordStore, User};
use tally_types::{Expense, Record, Scope, Task, TaskStatus, UserId, expense};

use crate::board::{Board, Selection};
use crate::forms::{ExpenseForm, TaskForm, TextInput};

/// Which screen the app is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Login,
    Board,
    Expenses,
}

/// The logged-in user. Existence of a `Session` is the login check.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
}

/// One-line message at the bottom of the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Info(String),
    Error(String),
}

pub struct App {
    store: RecordStore,
    identity: IdentityClient,
    tasks_scope: Scope,
    expenses_scope: Scope,

    view: View,
    session: Option<Session>,
    login_email: TextInput,
    pending_signup: Option<String>,

    board: Board,
    selection: Selection,
    expenses: Vec<Expense>,

    task_form: Option<TaskForm>,
    expense_form: Option<ExpenseForm>,

    banner: Option<Banner>,
    should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(
        store: RecordStore,
        identity: IdentityClient,
        tasks_scope: Scope,
        expenses_scope: Scope,
    ) -> Self {
        Self {
            store,
            identity,
            tasks_scope,
            expenses_scope,
            view: View::Login,
            session: None,
            login_email: TextInput::default(),
            pending_signup: None,
            board: Board::default(),
            selection: Selection::default(),
            expenses: Vec::new(),
            task_form: None,
            expense_form: None,
            banner: None,
            should_quit: false,
        }
    }

    // --- accessors for rendering and input dispatch ---

    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn login_email(&self) -> &TextInput {
        &self.login_email
    }

    pub fn login_email_mut(&mut self) -> &mut TextInput {
        self.banner = None;
        &mut self.login_email
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    #[must_use]
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Running total for the expense view.
    #[must_use]
    pub fn expense_total(&self) -> f64 {
        expense::total(&self.expenses)
    }

    #[must_use]
    pub fn task_form(&self) -> Option<&TaskForm> {
        self.task_form.as_ref()
    }

    pub fn task_form_mut(&mut self) -> Option<&mut TaskForm> {
        self.task_form.as_mut()
    }

    #[must_use]
    pub fn expense_form(&self) -> Option<&ExpenseForm> {
        self.expense_form.as_ref()
    }

    pub fn expense_form_mut(&mut self) -> Option<&mut ExpenseForm> {
        self.expense_form.as_mut()
    }

    #[must_use]
    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    fn owner(&self) -> Option<UserId> {
        self.session.as_ref().map(|s| s.user.uid.clone())
    }

    fn set_info(&mut self, message: impl Into<String>) {
        self.banner = Some(Banner::Info(message.into()));
    }

    fn set_error(&mut self, message: impl Into<String>) {
        self.banner = Some(Banner::Error(message.into()));
    }

    // --- login ---

    /// Enter on the login screen. First attempt looks the email up; if the
    /// provider doesn't know it, a second Enter signs it up.
    pub async fn submit_login(&mut self) {
        let email = self.login_email.text().trim().to_string();
        if email.is_empty() {
            self.set_error("Enter an email to log in");
            return;
        }

        if self.pending_signup.as_deref() == Some(email.as_str()) {
            match self.identity.create_user(&email).await {
                Ok(user) => self.start_session(user).await,
                Err(err) => self.set_error(format!("Sign-up failed: {err}")),
            }
            self.pending_signup = None;
            return;
        }

        match self.identity.lookup_user(&email).await {
            Ok(Some(user)) => self.start_session(user).await,
            Ok(None) => {
                self.pending_signup = Some(email.clone());
                self.set_info(format!("No account for {email} - press Enter again to sign up"));
            }
            Err(err) => self.set_error(format!("Login failed: {err}")),
        }
    }

    async fn start_session(&mut self, user: User) {
        tracing::info!(uid = %user.uid, "Session started");
        self.session = Some(Session { user });
        self.view = View::Board;
        self.banner = None;
        self.refresh_tasks().await;
        self.refresh_expenses().await;
    }

    // --- fetching ---

    /// Re-read the owner's tasks and rebuild the board from scratch.
    pub async fn refresh_tasks(&mut self) {
        let Some(owner) = self.owner() else { return };
        match self.store.list_owned(&self.tasks_scope, &owner).await {
            Ok(records) => {
                self.board = Board::partition(decode_records(records, Task::from_record));
                self.selection.clamp(&self.board);
            }
            Err(err) => self.report_fetch_error("tasks", &err),
        }
    }

    pub async fn refresh_expenses(&mut self) {
        let Some(owner) = self.owner() else { return };
        match self.store.list_owned(&self.expenses_scope, &owner).await {
            Ok(records) => {
                self.expenses = decode_records(records, Expense::from_record);
            }
            Err(err) => self.report_fetch_error("expenses", &err),
        }
    }

    fn report_fetch_error(&mut self, what: &str, err: &ClientError) {
        tracing::warn!(what, %err, "Fetch failed");
        self.set_error(format!("Could not load {what}: {err}"));
    }

    // --- board ---

    pub fn select_left(&mut self) {
        self.selection.move_left();
        self.selection.clamp(&self.board);
    }

    pub fn select_right(&mut self) {
        self.selection.move_right();
        self.selection.clamp(&self.board);
    }

    pub fn select_up(&mut self) {
        self.selection.move_up();
    }

    pub fn select_down(&mut self) {
        self.selection.move_down(&self.board);
    }

    /// Move the selected task to `status`: update the one field on the
    /// backend, then re-fetch the whole board. Same-status selections are
    /// a no-op, and a vanished record gets a stale-data banner after the
    /// re-fetch brings the board back in line.
    pub async fn transition_selected(&mut self, status: TaskStatus) {
        let Some(task) = self.board.task_at(self.selection) else {
            return;
        };
        if task.status == status {
            return;
        }
        let id = task.id.clone();
        let name = task.name.clone();

        match self
            .store
            .update(&self.tasks_scope, &id, Task::status_fields(status))
            .await
        {
            Ok(_) => {
                // A failed re-fetch overwrites this with its error banner
                self.set_info(format!("Moved '{name}' to {status}"));
                self.refresh_tasks().await;
            }
            Err(ClientError::NotFound(_)) => {
                self.refresh_tasks().await;
                self.set_error("That task no longer exists - board refreshed");
            }
            Err(err) => self.set_error(format!("Could not move task: {err}")),
        }
    }

    // --- forms ---

    pub fn open_task_form(&mut self) {
        self.task_form = Some(TaskForm::new());
        self.banner = None;
    }

    pub fn open_expense_form(&mut self) {
        self.expense_form = Some(ExpenseForm::new());
        self.banner = None;
    }

    pub fn close_forms(&mut self) {
        self.task_form = None;
        self.expense_form = None;
    }

    /// Submit the task form: required-field check, create, re-fetch.
    /// Validation failures stay inline on the form; no request is issued.
    pub async fn submit_task_form(&mut self) {
        let Some(owner) = self.owner() else { return };
        let Some(form) = &self.task_form else { return };

        let fields = match form.validate(&owner) {
            Ok(fields) => fields,
            Err(err) => {
                if let Some(form) = self.task_form.as_mut() {
                    form.0.set_error(err.to_string());
                }
                return;
            }
        };

        match self.store.create(&self.tasks_scope, fields).await {
            Ok(record) => {
                tracing::info!(id = %record.id, "Task created");
                self.task_form = None;
                self.set_info("Task added");
                self.refresh_tasks().await;
            }
            Err(ClientError::Validation(message)) => {
                if let Some(form) = self.task_form.as_mut() {
                    form.0.set_error(message);
                }
            }
            Err(err) => self.set_error(format!("Could not add task: {err}")),
        }
    }

    pub async fn submit_expense_form(&mut self) {
        let Some(owner) = self.owner() else { return };
        let Some(form) = &self.expense_form else { return };

        let fields = match form.validate(&owner) {
            Ok(fields) => fields,
            Err(err) => {
                if let Some(form) = self.expense_form.as_mut() {
                    form.0.set_error(err.to_string());
                }
                return;
            }
        };

        match self.store.create(&self.expenses_scope, fields).await {
            Ok(record) => {
                tracing::info!(id = %record.id, "Expense created");
                self.expense_form = None;
                self.set_info("Expense added");
                self.refresh_expenses().await;
            }
            Err(ClientError::Validation(message)) => {
                if let Some(form) = self.expense_form.as_mut() {
                    form.0.set_error(message);
                }
            }
            Err(err) => self.set_error(format!("Could not add expense: {err}")),
        }
    }

    // --- view switching ---

    pub fn show_board(&mut self) {
        if self.session.is_some() {
            self.view = View::Board;
        }
    }

    pub fn show_expenses(&mut self) {
        if self.session.is_some() {
            self.view = View::Expenses;
        }
    }
}

/// Decode fetched records, dropping malformed ones with a warning rather
/// than failing the whole view. Records written outside the app are not
/// this user's problem.
fn decode_records<T, E: std::fmt::Display>(
    records: Vec<Record>,
    decode: impl Fn(Record) -> Result<T, E>,
) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| {
            let id = record.id.clone();
            match decode(record) {
                Ok(value) => Some(value),
                Err(err) => {
                    tracing::warn!(%id, %err, "Skipping malformed record");
                    None
                }
            }
        })
        .collect()
}
