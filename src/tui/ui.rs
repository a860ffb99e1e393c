use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, FormField};
use crate::models::NoticeLevel;

pub fn draw(frame: &mut Frame, app: &App) {
    // Main horizontal split: 1/3 left, 2/3 right
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3), // Left pane: feed cards
            Constraint::Ratio(2, 3), // Right pane: viewer
        ])
        .split(frame.area());

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(0),    // Card list
            Constraint::Length(1), // Status line
        ])
        .split(main_chunks[0]);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Active title
            Constraint::Min(0),    // Embed target
        ])
        .split(main_chunks[1]);

    render_header(frame, app, left_chunks[0]);
    render_card_list(frame, app, left_chunks[1]);
    render_status(frame, app, left_chunks[2]);

    render_active_title(frame, app, right_chunks[0]);
    render_viewer(frame, app, right_chunks[1]);

    if app.form.is_some() {
        render_feed_form(frame, app);
    }

    if app.pending_delete.is_some() {
        render_delete_confirm(frame, app);
    }

    if app.show_help {
        render_help(frame);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Live Feeds ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let stats = format!(" {} saved feeds", app.cards.len());
    let paragraph = Paragraph::new(stats).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_card_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .cards
        .iter()
        .map(|card| {
            let active = app.is_active(card);
            let name_style = if active {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            };
            let marker = if active { "● " } else { "  " };

            let saved = card
                .created_at()
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Yellow)),
                    Span::styled(card.name.as_str(), name_style),
                ]),
                Line::from(Span::styled(
                    format!("  Saved Feed • ID: {} • {}", card.id, saved),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !app.cards.is_empty() {
        state.select(Some(app.selected_index));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let (text, color) = match &app.notice {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => Color::Green,
                NoticeLevel::Warning => Color::Yellow,
                NoticeLevel::Error => Color::Red,
            };
            (notice.text.as_str(), color)
        }
        None => ("j/k:nav  enter:watch  a:add  d:delete  ?:help  q:quit", Color::DarkGray),
    };

    let paragraph = Paragraph::new(text).style(Style::default().fg(color));
    frame.render_widget(paragraph, area);
}

fn render_active_title(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.viewer {
        Some(viewer) => Line::from(vec![
            Span::styled(viewer.title.as_str(), Style::default().fg(Color::White)),
            Span::raw("  "),
            Span::styled(
                viewer.status_label(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]),
        None => Line::from("No feed selected"),
    };

    let block = Block::default()
        .title(" Now Watching ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_viewer(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match &app.viewer {
        Some(viewer) => vec![
            Line::from(vec![
                Span::styled("Embed:   ", Style::default().fg(Color::Blue)),
                Span::raw(viewer.target.url.as_str()),
            ]),
            Line::from(vec![
                Span::styled("Sandbox: ", Style::default().fg(Color::Blue)),
                Span::raw(viewer.target.sandbox.to_string()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                viewer.target.iframe_html(&viewer.title),
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press 'o' to open in browser",
                Style::default().fg(Color::DarkGray),
            )),
        ],
        None => vec![Line::from("Select a feed and press Enter to start streaming...")],
    };

    let block = Block::default()
        .title(" Viewer ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_feed_form(frame: &mut Frame, app: &App) {
    let Some(form) = &app.form else {
        return;
    };

    let area = centered_rect(60, 25, frame.area());

    let block = Block::default()
        .title(" Add Live Feed (Tab: switch field, Enter: save, Esc: cancel) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(area);

    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let field = |label: &'static str, value: &str, focused: bool| {
        let cursor = if focused { "_" } else { "" };
        let style = if focused {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Line::from(vec![
            Span::styled(label, Style::default().fg(Color::Blue)),
            Span::styled(format!("{value}{cursor}"), style),
        ])
    };

    let lines = vec![
        field("Name: ", &form.name, form.focus == FormField::Name),
        Line::from(""),
        field("URL:  ", &form.url, form.focus == FormField::Url),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_delete_confirm(frame: &mut Frame, app: &App) {
    let area = centered_rect(50, 20, frame.area());
    let name = app
        .pending_delete_card()
        .map(|c| c.name.as_str())
        .unwrap_or("this feed");

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(format!("Remove \"{name}\" from history? (y/n)"))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(50, 60, frame.area());

    let help_text = vec![
        "",
        " Navigation:",
        "   j / ↓    Move down",
        "   k / ↑    Move up",
        "   < / >    Jump to top / bottom",
        "   Enter    Watch selected feed",
        "",
        " Actions:",
        "   a        Add a feed",
        "   d        Delete selected feed",
        "   o        Open stream in browser",
        "   r        Reload from storage",
        "",
        " General:",
        "   ?        Toggle this help",
        "   q        Quit",
        "",
        " Press any key to close",
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
