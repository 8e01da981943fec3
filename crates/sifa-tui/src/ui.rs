use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};

use sifa_core::{Badge, Field, FormProfile, Input, TextValue};

use crate::app::{App, Focus};

const LABEL_WIDTH: usize = 16;
const PANEL_MAX_ROWS: usize = 8;

pub(crate) fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let title = match app.form.profile() {
        FormProfile::DualMode => " SIFA · Orden de medicamento ",
        FormProfile::SingleField => " SIFA · Producto rápido ",
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border()))
        .style(Style::default().bg(app.theme.bg()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows_height = if app.form.rows.is_present() {
        app.form.rows.len() as u16 + 2
    } else {
        0
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(rows_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    render_mode(frame, app, chunks[0]);
    let query_line = render_fields(frame, app, chunks[1]);
    render_rows(frame, app, chunks[2]);
    render_hints(frame, app, chunks[3]);
    render_status(frame, app, chunks[4]);

    if let Some(line) = query_line {
        render_panel(frame, app, chunks[1], line);
    }
}

fn render_mode(frame: &mut Frame, app: &App, area: Rect) {
    let Some(mode) = app.form.mode() else {
        return;
    };
    let mark = if mode.is_create() { "[x]" } else { "[ ]" };
    let line = Line::from(vec![
        Span::styled(format!(" {mark} "), Style::default().fg(app.theme.accent())),
        Span::styled(
            mode.to_string(),
            Style::default().fg(app.theme.fg_bright()).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  (Ctrl-T)", Style::default().fg(app.theme.muted())),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw visible fields; returns the line index of the query input.
fn render_fields(frame: &mut Frame, app: &App, area: Rect) -> Option<u16> {
    let mut lines = Vec::new();
    let mut query_line = None;

    for field in app.form.fields() {
        let hidden = app
            .form
            .section_of(&field.id)
            .and_then(|kind| app.form.section(kind))
            .is_some_and(|s| s.hidden);
        if hidden {
            continue;
        }
        if app.form.query_field_id() == Some(&field.id) {
            query_line = Some(lines.len() as u16);
        }
        let focused = app.focus.as_ref() == Some(&Focus::Field(field.id.clone()));
        lines.push(field_line(app, field, focused));
    }

    frame.render_widget(Paragraph::new(lines), area);
    query_line
}

fn field_line(app: &App, field: &Field, focused: bool) -> Line<'static> {
    let label_style = if field.disabled {
        Style::default().fg(app.theme.muted()).add_modifier(Modifier::DIM)
    } else if focused {
        Style::default().fg(app.theme.active()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.fg())
    };
    let marker = if field.required { "*" } else { " " };
    let label = format!("{}{marker}", field.label);

    let value = match &field.input {
        Input::Text(t) if focused => with_cursor(t),
        Input::Text(t) if t.value.is_empty() => "─".to_string(),
        Input::Text(t) => t.value.clone(),
        Input::Select(c) => match c.selected() {
            Some(o) if focused => format!("◀ {} ▶", o.label),
            Some(o) => o.label.clone(),
            None if focused => "◀ ─ ▶".to_string(),
            None => "─".to_string(),
        },
    };
    let value_style = if field.disabled {
        Style::default().fg(app.theme.muted())
    } else {
        Style::default().fg(app.theme.fg())
    };

    Line::from(vec![
        Span::styled(
            if focused { "▶ " } else { "  " },
            Style::default().fg(app.theme.active()),
        ),
        Span::styled(format!("{label:<LABEL_WIDTH$}"), label_style),
        Span::styled(value, value_style),
    ])
}

/// Text with a block cursor drawn at its byte cursor. An offset past the end
/// or inside a multi-byte char draws at the end.
fn with_cursor(t: &TextValue) -> String {
    let mut shown = t.value.clone();
    let at = if shown.is_char_boundary(t.cursor) {
        t.cursor
    } else {
        shown.len()
    };
    shown.insert(at, '█');
    shown
}

fn render_rows(frame: &mut Frame, app: &App, area: Rect) {
    if area.height == 0 {
        return;
    }
    let items: Vec<ListItem> = app
        .form
        .rows
        .rows()
        .iter()
        .enumerate()
        .map(|(r, row)| {
            let mut spans = vec![Span::styled(
                format!(" #{:<3}", r + 1),
                Style::default().fg(app.theme.muted()),
            )];
            for (c, cell) in row.cells.iter().enumerate() {
                let focused = app.focus == Some(Focus::Cell { row: r, cell: c });
                let value = if focused {
                    with_cursor(&cell.value)
                } else if cell.value.value.is_empty() {
                    "─".to_string()
                } else {
                    cell.value.value.clone()
                };
                let style = if focused {
                    Style::default().fg(app.theme.active()).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(app.theme.fg())
                };
                spans.push(Span::styled(format!("{}: ", cell.name), Style::default().fg(app.theme.muted())));
                spans.push(Span::styled(format!("{value:<8}"), style));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let block = Block::default()
        .title(" Horario ")
        .borders(Borders::TOP)
        .border_style(Style::default().fg(app.theme.border()));
    frame.render_widget(List::new(items).block(block), area);
}

fn render_hints(frame: &mut Frame, app: &App, area: Rect) {
    let mut hint = String::from(" Tab: next  ↑↓/Enter: suggestions  Ctrl-S: submit  Esc: quit");
    if app.form.mode().is_some() {
        hint.push_str("  Ctrl-T: mode");
    }
    if app.form.rows.is_present() {
        hint.push_str("  Ctrl-A/D: rows");
    }
    frame.render_widget(
        Paragraph::new(Span::styled(
            hint,
            Style::default().fg(app.theme.muted()).add_modifier(Modifier::DIM),
        )),
        area,
    );
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let style = if app.status_message.starts_with("Validation") {
        Style::default().fg(app.theme.danger())
    } else {
        Style::default().fg(app.theme.success())
    };
    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {}", app.status_message), style))
            .style(Style::default().bg(app.theme.bg_secondary())),
        area,
    );
}

/// Suggestion dropdown anchored under the query input.
fn render_panel(frame: &mut Frame, app: &App, fields_area: Rect, query_line: u16) {
    let Some(panel) = app.form.panel().filter(|p| p.is_visible()) else {
        return;
    };
    let x = fields_area.x + 2 + LABEL_WIDTH as u16;
    let y = fields_area.y + query_line + 1;
    let bottom = fields_area.y + fields_area.height + 4;
    let wanted = panel.rows().len().min(PANEL_MAX_ROWS) as u16 + 2;
    let height = wanted.min(bottom.saturating_sub(y));
    let width = fields_area.width.saturating_sub(x - fields_area.x).max(20);
    if height < 3 {
        return;
    }
    let area = Rect { x, y, width, height }.intersection(frame.area());
    frame.render_widget(Clear, area);

    let items: Vec<ListItem> = panel
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let selected = panel.highlighted() == Some(i);
            let style = if selected {
                Style::default()
                    .bg(app.theme.accent())
                    .fg(app.theme.bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(app.theme.fg())
            };
            let badge_color = match &row.badge {
                Badge::UseExisting => app.theme.success(),
                Badge::FillIn => app.theme.warning(),
                Badge::Source(_) => app.theme.external(),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", row.text), style),
                Span::styled(format!(" {} ", row.badge.text()), Style::default().fg(badge_color)),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.accent()))
        .style(Style::default().bg(app.theme.bg_secondary()));
    frame.render_widget(List::new(items).block(block), area);
}
