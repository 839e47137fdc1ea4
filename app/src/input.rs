//! Terminal event handling.
//!
//! One key event per frame, and any backend call it triggers is awaited
//! right here before the next draw - the single-interaction model: the
//! board the user sees next is always the re-fetched one.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::app::{App, View};
use crate::board::column_status;

/// Handle terminal events.
/// Returns true if the app should quit.
pub async fn handle_events(app: &mut App) -> Result<bool> {
    if event::poll(Duration::from_millis(100))?
        && let Event::Key(key) = event::read()?
    {
        // Only handle key press events (not release) - important for Windows
        if key.kind != KeyEventKind::Press {
            return Ok(app.should_quit());
        }

        // Handle Ctrl+C globally
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(true);
        }

        if app.task_form().is_some() {
            handle_task_form(app, key).await;
        } else if app.expense_form().is_some() {
            handle_expense_form(app, key).await;
        } else {
            match app.view() {
                View::Login => handle_login(app, key).await,
                View::Board => handle_board(app, key).await,
                View::Expenses => handle_expenses(app, key).await,
            }
        }
    }

    Ok(app.should_quit())
}

async fn handle_login(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.request_quit(),
        KeyCode::Enter => app.submit_login().await,
        KeyCode::Backspace => app.login_email_mut().delete_char(),
        KeyCode::Left => app.login_email_mut().move_cursor_left(),
        KeyCode::Right => app.login_email_mut().move_cursor_right(),
        KeyCode::Char(c) => app.login_email_mut().enter_char(c),
        _ => {}
    }
}

async fn handle_board(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.request_quit(),
        KeyCode::Char('a') => app.open_task_form(),
        KeyCode::Char('e') => app.show_expenses(),
        KeyCode::Char('r') => app.refresh_tasks().await,
        KeyCode::Char('h') | KeyCode::Left => app.select_left(),
        KeyCode::Char('l') | KeyCode::Right => app.select_right(),
        KeyCode::Char('k') | KeyCode::Up => app.select_up(),
        KeyCode::Char('j') | KeyCode::Down => app.select_down(),
        // Move the selected task to column 1/2/3
        KeyCode::Char(c @ ('1' | '2' | '3')) => {
            let column = (c as usize) - ('1' as usize);
            app.transition_selected(column_status(column)).await;
        }
        _ => {}
    }
}

async fn handle_expenses(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.request_quit(),
        KeyCode::Char('a') => app.open_expense_form(),
        KeyCode::Char('b') | KeyCode::Esc => app.show_board(),
        KeyCode::Char('r') => app.refresh_expenses().await,
        _ => {}
    }
}

async fn handle_task_form(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_forms(),
        KeyCode::Enter => app.submit_task_form().await,
        _ => {
            if let Some(form) = app.task_form_mut() {
                edit_form(&mut form.0, key);
            }
        }
    }
}

async fn handle_expense_form(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_forms(),
        KeyCode::Enter => app.submit_expense_form().await,
        _ => {
            if let Some(form) = app.expense_form_mut() {
                edit_form(&mut form.0, key);
            }
        }
    }
}

fn edit_form(form: &mut crate::forms::Form, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Left => form.left(),
        KeyCode::Right => form.right(),
        KeyCode::Backspace => form.delete_char(),
        KeyCode::Char(c) => form.enter_char(c),
        _ => {}
    }
}
