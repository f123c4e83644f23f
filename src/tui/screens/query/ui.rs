//! Query screen rendering

use super::state::{AppState, ResultsView, Tab};
use crate::render::Entry;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

pub struct QueryUi;

impl QueryUi {
    pub fn render(frame: &mut Frame, state: &AppState, account: Option<&str>, model: &str) {
        let area = frame.area();

        let constraints = match state.tab {
            Tab::Query => vec![
                Constraint::Length(3), // status bar
                Constraint::Min(5),    // results
                Constraint::Length(3), // input
                Constraint::Length(1), // help
            ],
            Tab::Groups => vec![
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
            ],
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        Self::render_status_bar(frame, chunks[0], state, account, model);
        match state.tab {
            Tab::Query => {
                Self::render_results(frame, chunks[1], state);
                Self::render_input(frame, chunks[2], state);
                Self::render_help_bar(frame, chunks[3], state);
            }
            Tab::Groups => {
                Self::render_groups(frame, chunks[1], state);
                Self::render_help_bar(frame, chunks[2], state);
            }
        }
    }

    fn render_status_bar(
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        account: Option<&str>,
        model: &str,
    ) {
        let tab_indicator = match state.tab {
            Tab::Query => Span::styled(
                " Query ",
                Style::default().fg(Color::Black).bg(Color::Cyan),
            ),
            Tab::Groups => Span::styled(
                " Log Groups ",
                Style::default().fg(Color::Black).bg(Color::Green),
            ),
        };

        let loading_indicator = if state.loading {
            let frames = ["⠋", "⠙", "⠹", "⠸"];
            Span::styled(
                format!(" {} ", frames[state.loading_frame]),
                Style::default().fg(Color::Yellow),
            )
        } else {
            Span::raw("")
        };

        let status_msg = state
            .status_message
            .as_ref()
            .map(|s| Span::styled(format!(" │ {s} "), Style::default().fg(Color::DarkGray)))
            .unwrap_or_else(|| Span::raw(""));

        let status_line = Line::from(vec![
            Span::styled(" 🔍 Logscope ", Style::default().fg(Color::Cyan)),
            Span::styled("│ ", Style::default().fg(Color::DarkGray)),
            tab_indicator,
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("account: {}", account.unwrap_or("unknown")),
                Style::default().fg(Color::White),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(model.to_string(), Style::default().fg(Color::Magenta)),
            loading_indicator,
            status_msg,
        ]);

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        frame.render_widget(Paragraph::new(status_line).block(block), area);
    }

    fn render_results(frame: &mut Frame, area: Rect, state: &AppState) {
        let mut lines: Vec<Line> = Vec::new();

        if let Some(notice) = &state.notice {
            lines.push(Line::from(Span::styled(
                notice.clone(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            )));
            lines.push(Line::from(""));
        }

        if state.show_raw {
            if let Some(raw) = &state.raw_view {
                lines.push(Line::from(Span::styled(
                    "Raw response:",
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                for raw_line in raw.lines() {
                    lines.push(Line::from(raw_line.to_string()));
                }
            }
        } else {
            lines.extend(view_lines(&state.results));
        }

        if state.loading {
            let frames = ["⠋", "⠙", "⠹", "⠸"];
            lines.push(Line::from(Span::styled(
                format!("{} Running query...", frames[state.loading_frame]),
                Style::default().fg(Color::Yellow),
            )));
        }

        Self::render_scrolled(frame, area, lines, state.results.scroll_offset);
    }

    fn render_groups(frame: &mut Frame, area: Rect, state: &AppState) {
        let mut lines = view_lines(&state.groups);
        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "No log groups loaded. Press r to refresh.",
                Style::default().fg(Color::DarkGray),
            )));
        }
        Self::render_scrolled(frame, area, lines, state.groups.scroll_offset);
    }

    fn render_scrolled(frame: &mut Frame, area: Rect, lines: Vec<Line>, offset: u16) {
        let inner_height = area.height.saturating_sub(2) as usize;
        let max_scroll = lines.len().saturating_sub(inner_height) as u16;
        let scroll = offset.min(max_scroll);

        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::DarkGray));
        let para = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0));
        frame.render_widget(para, area);
    }

    fn render_input(frame: &mut Frame, area: Rect, state: &AppState) {
        let input_style = if state.loading {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };

        let display_input = if state.loading {
            "Waiting for the agent...".to_string()
        } else if state.input.is_empty() {
            "e.g. find messages with Tx_id 00002 in the rebooking log groups".to_string()
        } else {
            let mut shown = state.input.clone();
            if state.cursor_pos >= shown.len() {
                shown.push('_');
            } else {
                shown.insert(state.cursor_pos, '|');
            }
            shown
        };

        let input_line = Line::from(vec![
            Span::styled(
                "> ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(display_input, input_style),
        ]);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if state.loading {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Cyan)
            })
            .title(" Query ");
        frame.render_widget(Paragraph::new(input_line).block(block), area);
    }

    fn render_help_bar(frame: &mut Frame, area: Rect, state: &AppState) {
        let help_text = if state.loading {
            Line::from(Span::styled(
                " Running... please wait ",
                Style::default().fg(Color::Yellow),
            ))
        } else {
            match state.tab {
                Tab::Query => Line::from(vec![
                    Span::styled(" Enter", Style::default().fg(Color::Green)),
                    Span::raw(": Run │ "),
                    Span::styled("↑/↓", Style::default().fg(Color::Green)),
                    Span::raw(": Select │ "),
                    Span::styled("Space", Style::default().fg(Color::Green)),
                    Span::raw(": Expand │ "),
                    Span::styled("Tab", Style::default().fg(Color::Green)),
                    Span::raw(": Groups │ "),
                    Span::styled("q", Style::default().fg(Color::Red)),
                    Span::raw(": Exit "),
                ]),
                Tab::Groups => Line::from(vec![
                    Span::styled(" r", Style::default().fg(Color::Green)),
                    Span::raw(": Refresh │ "),
                    Span::styled("↑/↓", Style::default().fg(Color::Green)),
                    Span::raw(": Select │ "),
                    Span::styled("Enter", Style::default().fg(Color::Green)),
                    Span::raw(": Expand │ "),
                    Span::styled("Tab", Style::default().fg(Color::Green)),
                    Span::raw(": Query │ "),
                    Span::styled("q", Style::default().fg(Color::Red)),
                    Span::raw(": Exit "),
                ]),
            }
        };
        frame.render_widget(Paragraph::new(help_text), area);
    }
}

/// Flatten a section tree into styled lines, honoring the view's expanded
/// set and selection cursor.
fn view_lines(view: &ResultsView) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut ordinal = 0usize;

    for section in &view.sections {
        if let Some(title) = &section.title {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                title.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )));
        }

        for entry in &section.entries {
            match entry {
                Entry::Collapsible { title, lines: body } => {
                    let expanded = view.expanded.contains(&ordinal);
                    let marker = if expanded { "▾" } else { "▸" };
                    let style = if ordinal == view.selected {
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::White)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::White)
                    };
                    lines.push(Line::from(Span::styled(
                        format!("{marker} {title}"),
                        style,
                    )));
                    if expanded {
                        for body_line in body {
                            lines.push(Line::from(Span::styled(
                                format!("  {body_line}"),
                                Style::default().fg(Color::Gray),
                            )));
                        }
                    }
                    ordinal += 1;
                }
                Entry::Text(text) => {
                    for text_line in text.lines() {
                        lines.push(Line::from(text_line.to_string()));
                    }
                    if text.is_empty() {
                        lines.push(Line::from(""));
                    }
                }
            }
        }
    }

    lines
}
