use crate::app::{App, InputMode, PAGE_SIZE};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::card;

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    let editing_import = app.input_mode == InputMode::EditingImportPath;

    // Layout: header(3) + search(3) [+ import(3)] + cards(min) + pagination(1) + status(1)
    let mut constraints = vec![Constraint::Length(3), Constraint::Length(3)];
    if editing_import {
        constraints.push(Constraint::Length(3));
    }
    constraints.extend([
        Constraint::Min(5),
        Constraint::Length(1),
        Constraint::Length(1),
    ]);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let cards_chunk = if editing_import { chunks[3] } else { chunks[2] };
    let pagination_chunk = if editing_import { chunks[4] } else { chunks[3] };
    let status_chunk = if editing_import { chunks[5] } else { chunks[4] };

    // ── Header ──
    let count_label = if app.source.is_imported() {
        format!("{} imported books", app.source.count())
    } else {
        format!("Found {} results", app.source.count())
    };
    let header = Paragraph::new(format!(" Book Hub   [{count_label}]"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(header, chunks[0]);

    // ── Search bar ──
    // Dimmed and inert while imported data is active, like the original
    // form: clearing the import is the way back to searching.
    let search_style = if app.source.is_imported() {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    } else {
        match app.input_mode {
            InputMode::EditingQuery => Style::default().fg(Color::Yellow),
            _ => Style::default().fg(Color::DarkGray),
        }
    };
    let search_label = if app.source.is_imported() {
        " Search (clear import with c): "
    } else if app.input_mode == InputMode::EditingQuery {
        " Search (Enter to submit, Esc to cancel): "
    } else {
        " Search (/): "
    };
    let search_bar = Paragraph::new(format!("{}{}", search_label, app.query))
        .style(search_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(search_style)
                .title(" Search "),
        );
    frame.render_widget(search_bar, chunks[1]);

    if app.input_mode == InputMode::EditingQuery {
        let cursor_x = chunks[1].x + search_label.len() as u16 + app.query.len() as u16;
        let cursor_y = chunks[1].y + 1;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    // ── Import path bar ──
    if editing_import {
        let import_label = " Path to .json file (Enter to load, Esc to cancel): ";
        let import_bar = Paragraph::new(format!("{}{}", import_label, app.import_path))
            .style(Style::default().fg(Color::Yellow))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title(" Import "),
            );
        frame.render_widget(import_bar, chunks[2]);

        let cursor_x = chunks[2].x + import_label.len() as u16 + app.import_path.len() as u16;
        let cursor_y = chunks[2].y + 1;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    // ── Cards ──
    let visible = app.visible_slice();
    let page_info = if visible.is_empty() {
        format!(" 0-0 of {} ", app.source.count())
    } else {
        let start = (app.page - 1) * PAGE_SIZE + 1;
        format!(
            " {}-{} of {} ",
            start,
            start + visible.len() - 1,
            app.source.count()
        )
    };

    let card_width = (cards_chunk.width as usize).saturating_sub(4);
    let body: Vec<Line> = if app.loading {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Loading...",
                Style::default().fg(Color::Yellow),
            )),
        ]
    } else if visible.is_empty() {
        vec![Line::from(""), Line::from("  No books found.")]
    } else {
        let mut lines = Vec::with_capacity(visible.len() * 4);
        for book in visible {
            for line in card::lines(book, card_width) {
                lines.push(line);
            }
            lines.push(Line::from(""));
        }
        lines
    };

    let cards = Paragraph::new(body)
        .scroll((app.scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Books ")
                .title_bottom(Line::from(page_info).alignment(Alignment::Right)),
        );
    frame.render_widget(cards, cards_chunk);

    // ── Pagination ──
    let total_pages = app.total_pages();
    let pagination = if total_pages == 0 {
        Line::from("")
    } else {
        let enabled = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let disabled = Style::default().fg(Color::DarkGray);
        Line::from(vec![
            Span::styled(
                " ← Previous ",
                if app.prev_disabled() { disabled } else { enabled },
            ),
            Span::raw("  "),
            Span::raw(format!("Page {} of {}", app.page, total_pages)),
            Span::raw("  "),
            Span::styled(
                " Next → ",
                if app.next_disabled() { disabled } else { enabled },
            ),
        ])
    };
    frame.render_widget(Paragraph::new(pagination), pagination_chunk);

    // ── Status bar ──
    let mut status_spans = vec![
        Span::styled(
            " /",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Search  "),
        Span::styled(
            "←→",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Page  "),
        Span::styled(
            "u",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Import  "),
    ];
    if app.source.is_imported() {
        status_spans.push(Span::styled(
            "c",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        status_spans.push(Span::raw(" Clear import  "));
    }
    status_spans.push(Span::styled(
        "?",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ));
    status_spans.push(Span::raw(" Help  "));
    status_spans.push(Span::styled(
        "q",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ));
    status_spans.push(Span::raw(" Quit  "));
    match &app.error {
        Some(message) => status_spans.push(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        )),
        None => status_spans.push(Span::styled(
            app.status_msg.clone(),
            Style::default().fg(Color::DarkGray),
        )),
    }
    frame.render_widget(Paragraph::new(Line::from(status_spans)), status_chunk);
}
