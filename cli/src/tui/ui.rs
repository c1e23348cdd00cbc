//! TUI rendering.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use super::app::App;
use crate::commands::truncate;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_table(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let title = if app.is_searching() {
        format!("TaskReaper | Search: {}_", app.search_query)
    } else if !app.search_query.is_empty() {
        format!(
            "TaskReaper | {} matches for '{}'",
            app.entries().len(),
            app.search_query
        )
    } else {
        format!("TaskReaper | {} processes", app.entries().len())
    };

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    f.render_widget(header, area);
}

fn draw_table(f: &mut Frame, app: &App, area: Rect) {
    let header_cells = ["PID", "PROCESS", "STATE", "↻", "DESCRIPTION"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).bold()));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows = app.entries().iter().enumerate().map(|(i, entry)| {
        let (state, state_color) = if entry.foreground {
            ("fg", Color::Green)
        } else {
            ("bg", Color::DarkGray)
        };

        let cells = vec![
            Cell::from(entry.pid().to_string()),
            Cell::from(truncate(&entry.label, 40)),
            Cell::from(state).style(Style::default().fg(state_color)),
            Cell::from(if entry.is_restartable() { "↻" } else { " " })
                .style(Style::default().fg(Color::Cyan)),
            Cell::from(entry.short_description.clone()),
        ];

        let style = if i == app.selected {
            Style::default().bg(Color::DarkGray).fg(Color::White)
        } else {
            Style::default()
        };

        Row::new(cells).style(style)
    });

    let widths = [
        Constraint::Length(8),
        Constraint::Length(40),
        Constraint::Length(5),
        Constraint::Length(2),
        Constraint::Min(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" {} ", app.item_label())),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD));

    let mut state = TableState::default();
    state.select(Some(app.selected));

    f.render_stateful_widget(table, area, &mut state);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let help = if app.is_searching() {
        "Type to search | Enter: done | Esc: cancel".to_string()
    } else {
        let action = app
            .selected_action()
            .map(|a| a.label())
            .unwrap_or("-");
        let default = if app.default_applies() {
            app.default_action().label().to_string()
        } else {
            format!("{} (n/a)", app.default_action().label())
        };
        format!(
            "Enter: {} | a: action [{}] | x: run action | /: search | j/k: navigate | r: refresh | q: quit",
            default,
            action
        )
    };

    let footer_text = match app.get_status() {
        Some(status) if !status.is_empty() => format!("{} | {}", status, help),
        _ => help,
    };

    let footer = Paragraph::new(footer_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    f.render_widget(footer, area);
}
