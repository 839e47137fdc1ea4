use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Banner, View};
use crate::board::{Selection, column_status};
use crate::forms::{FieldInput, Form};
use crate::theme::{colors, status_color, styles};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let bg_block = Block::default().style(Style::default().bg(colors::BG_DARK));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    match app.view() {
        View::Login => draw_login(frame, app, chunks[0]),
        View::Board => draw_board(frame, app, chunks[0]),
        View::Expenses => draw_expenses(frame, app, chunks[0]),
    }

    draw_status_bar(frame, app, chunks[1]);

    if let Some(form) = app.task_form() {
        draw_form(frame, &form.0);
    } else if let Some(form) = app.expense_form() {
        draw_form(frame, &form.0);
    }
}

fn draw_login(frame: &mut Frame, app: &App, area: Rect) {
    let box_width = 60.min(area.width.saturating_sub(4));
    let box_area = Rect {
        x: area.x + (area.width.saturating_sub(box_width)) / 2,
        y: area.y + area.height / 3,
        width: box_width,
        height: 7.min(area.height),
    };

    let email = app.login_email();
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(" Email ❯ ", Style::default().fg(colors::PRIMARY)),
            Span::styled(email.text(), Style::default().fg(colors::TEXT_PRIMARY)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Enter", styles::key_highlight()),
            Span::styled(" log in / sign up   ", styles::key_hint()),
            Span::styled("Esc", styles::key_highlight()),
            Span::styled(" quit", styles::key_hint()),
        ])
        .alignment(Alignment::Center),
    ];

    let login = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(colors::PRIMARY))
            .title(Line::from(vec![Span::styled(
                " Tally ",
                Style::default()
                    .fg(colors::TEXT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            )])),
    );
    frame.render_widget(login, box_area);

    // Cursor inside the email field
    let cursor_x = box_area.x + 10 + prefix_width(email.text(), email.cursor());
    frame.set_cursor_position((cursor_x, box_area.y + 2));
}

fn draw_board(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let selection = app.selection();
    for (index, column_area) in columns.iter().enumerate() {
        draw_column(frame, app, *column_area, index, selection);
    }
}

fn draw_column(frame: &mut Frame, app: &App, area: Rect, index: usize, selection: Selection) {
    let status = column_status(index);
    let tasks = app.board().column(status);
    let accent = status_color(index);
    let selected_here = selection.column == index;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if selected_here {
            accent
        } else {
            colors::TEXT_MUTED
        }))
        .padding(Padding::horizontal(1))
        .title(Line::from(vec![Span::styled(
            format!(" {status} ({}) ", tasks.len()),
            styles::column_title(accent),
        )]));

    let mut lines: Vec<Line> = Vec::new();
    for (row, task) in tasks.iter().enumerate() {
        let is_selected = selected_here && selection.row == row;
        let style = if is_selected {
            styles::selected_task()
        } else {
            Style::default().fg(colors::TEXT_PRIMARY)
        };
        lines.push(Line::from(Span::styled(
            format!(" {} ", task.name),
            style,
        )));
        if let Some(due) = task.due_date {
            lines.push(Line::from(Span::styled(
                format!("   due {due}"),
                Style::default().fg(colors::TEXT_SECONDARY),
            )));
        }
        lines.push(Line::from(""));
    }

    if tasks.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  (no tasks)",
            Style::default().fg(colors::TEXT_MUTED),
        )));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_expenses(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(colors::TEXT_MUTED))
        .padding(Padding::horizontal(1))
        .title(Line::from(vec![Span::styled(
            " Expenses ",
            Style::default()
                .fg(colors::TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )]));

    let mut lines: Vec<Line> = vec![Line::from(Span::styled(
        format!(
            " {:<12} {:<24} {:>10}  {:<14} {}",
            "Date", "Item", "Amount", "Category", "Payment"
        ),
        Style::default()
            .fg(colors::TEXT_MUTED)
            .add_modifier(Modifier::BOLD),
    ))];

    for expense in app.expenses() {
        let date = expense
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(Line::from(Span::styled(
            format!(
                " {:<12} {:<24} {:>10}  {:<14} {}",
                date,
                truncate(&expense.item, 24),
                format!("${}", expense.amount),
                expense.category,
                expense.payment_type,
            ),
            Style::default().fg(colors::TEXT_PRIMARY),
        )));
    }

    if app.expenses().is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " (no expenses yet)",
            Style::default().fg(colors::TEXT_MUTED),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" Total ", styles::key_hint()),
        Span::styled(
            format!("${:.2}", app.expense_total()),
            Style::default()
                .fg(colors::GREEN)
                .add_modifier(Modifier::BOLD),
        ),
    ]));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_form(frame: &mut Frame, form: &Form) {
    let area = frame.area();
    let width = 52.min(area.width.saturating_sub(4));
    let height = (form.fields().len() as u16) * 2 + 5;
    let form_area = Rect {
        x: (area.width.saturating_sub(width)) / 2,
        y: area.height / 4,
        width,
        height: height.min(area.height),
    };

    frame.render_widget(Clear, form_area);

    let mut lines: Vec<Line> = vec![Line::from("")];
    for (index, field) in form.fields().iter().enumerate() {
        let focused = index == form.focus();
        let label_style = if focused {
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors::TEXT_MUTED)
        };
        let value = match &field.input {
            FieldInput::Text(t) => t.text().to_string(),
            FieldInput::Choice(p) => format!("◂ {} ▸", p.selected()),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", field.label), label_style),
            Span::styled(value, Style::default().fg(colors::TEXT_PRIMARY)),
        ]));
        lines.push(Line::from(""));
    }

    if let Some(error) = form.error() {
        lines.push(Line::from(Span::styled(
            format!("  {error}"),
            Style::default().fg(colors::RED),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled("  Enter", styles::key_highlight()),
            Span::styled(" save  ", styles::key_hint()),
            Span::styled("Tab", styles::key_highlight()),
            Span::styled(" next field  ", styles::key_hint()),
            Span::styled("Esc", styles::key_highlight()),
            Span::styled(" cancel", styles::key_hint()),
        ]));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(colors::PRIMARY))
            .style(Style::default().bg(colors::BG_PANEL))
            .title(Line::from(vec![Span::styled(
                format!(" {} ", form.title()),
                Style::default()
                    .fg(colors::TEXT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            )])),
    );
    frame.render_widget(widget, form_area);

    // Cursor in the focused text field
    if let FieldInput::Text(t) = &form.fields()[form.focus()].input {
        let row = 2 + 2 * form.focus() as u16;
        let cursor_x = form_area.x + 15 + prefix_width(t.text(), t.cursor());
        frame.set_cursor_position((cursor_x, form_area.y + row));
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (status_text, status_style) = match app.banner() {
        Some(Banner::Error(message)) => (message.clone(), Style::default().fg(colors::RED)),
        Some(Banner::Info(message)) => (message.clone(), Style::default().fg(colors::YELLOW)),
        None => match app.session() {
            Some(session) => (
                format!("● {}", session.user.email),
                Style::default().fg(colors::GREEN),
            ),
            None => (
                "○ Not logged in".to_string(),
                Style::default().fg(colors::TEXT_MUTED),
            ),
        },
    };

    let hints = match app.view() {
        View::Login => "",
        View::Board => "a add  1/2/3 move  e expenses  r refresh  q quit",
        View::Expenses => "a add  b board  r refresh  q quit",
    };

    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(status_text, status_style),
    ]));

    let hints_width = hints.width() as u16 + 2;
    let status_area = Rect {
        x: area.x,
        y: area.y,
        width: area.width.saturating_sub(hints_width),
        height: area.height,
    };
    let hints_area = Rect {
        x: area.x + area.width.saturating_sub(hints_width),
        y: area.y,
        width: hints_width,
        height: area.height,
    };

    frame.render_widget(status, status_area);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(hints, styles::key_hint()),
            Span::raw(" "),
        ]))
        .alignment(Alignment::Right),
        hints_area,
    );
}

/// Display width of the text before the cursor (handles wide glyphs).
fn prefix_width(text: &str, cursor: usize) -> u16 {
    let before: String = text.chars().take(cursor).collect();
    before.width() as u16
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
