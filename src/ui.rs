use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, InputMode};
use crate::groq;
use crate::qalog;
use crate::session::Role;

/// Render `**bold**` in model output as styled spans, leaving everything
/// else untouched.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        match rest[start + 2..].find("**") {
            Some(len) => {
                if start > 0 {
                    spans.push(Span::raw(rest[..start].to_string()));
                }
                let bold = &rest[start + 2..start + 2 + len];
                if !bold.is_empty() {
                    spans.push(Span::styled(
                        bold.to_string(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ));
                }
                rest = &rest[start + 2 + len + 2..];
            }
            // No closing marker, treat the rest as literal
            None => break,
        }
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    if app.show_help {
        let [chat_area, help_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(34)]).areas(body_area);
        render_chat(app, frame, chat_area);
        render_help(app, frame, help_area);
    } else {
        render_chat(app, frame, body_area);
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let turn_count = app.session.len();
    let turn_indicator = if turn_count > 0 {
        format!(" [{} turns]", turn_count)
    } else {
        String::new()
    };

    let title = Line::from(vec![
        Span::styled(" AI Q&A ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(turn_indicator, Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Transcript on top, input at the bottom
    let [transcript_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    // Store transcript dimensions for scroll calculations (inner size minus borders)
    app.transcript_height = transcript_area.height.saturating_sub(2);
    app.transcript_width = transcript_area.width.saturating_sub(2);

    render_transcript(app, frame, transcript_area);
    render_input(app, frame, input_area);
}

fn render_transcript(app: &App, frame: &mut Frame, area: Rect) {
    let transcript_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" Groq: {} ", groq::MODEL));

    let empty = app.session.is_empty() && app.pending_question.is_none() && !app.loading;
    let transcript_text = if empty {
        Text::from(Span::styled(
            "Ask any question to get an AI-powered answer...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for turn in app.session.turns() {
            match turn.role {
                Role::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    for line in turn.content.lines() {
                        lines.push(Line::from(line.to_string()));
                    }
                    lines.push(Line::default());
                }
                Role::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "AI:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    for line in turn.content.lines() {
                        lines.push(parse_markdown_line(line));
                    }
                    lines.push(Line::default());
                }
                // The system instruction is added at request time and never
                // stored in the session.
                Role::System => {}
            }
        }

        // The in-flight (or just-failed) question lives outside the session
        // until its exchange succeeds
        if let Some(question) = &app.pending_question {
            lines.push(Line::from(Span::styled(
                "You:",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
            for line in question.lines() {
                lines.push(Line::from(line.to_string()));
            }
            lines.push(Line::default());
        }

        // A failed turn is displayed here but never stored as a turn
        if let Some(error) = &app.last_error {
            for line in error.lines() {
                lines.push(Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(Color::Red),
                )));
            }
            lines.push(Line::default());
        }

        if app.loading {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let transcript = Paragraph::new(transcript_text)
        .block(transcript_block)
        .wrap(Wrap { trim: true })
        .scroll((app.transcript_scroll, 0));

    frame.render_widget(transcript, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let input_border_color = if app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let title = if app.query_task.is_some() {
        " Waiting for answer... "
    } else {
        " Ask your question (Enter to send) "
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    // Show cursor when editing
    if app.input_mode == InputMode::Editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_help(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" About ");

    let section = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);

    let lines = vec![
        Line::from(Span::styled("AI Question-Answering", section)),
        Line::from("Powered by Groq (Llama 3.3)"),
        Line::default(),
        Line::from(Span::styled("How to use:", section)),
        Line::from("1. Type your question"),
        Line::from("2. Press Enter to send"),
        Line::from("3. Wait for the AI answer"),
        Line::from("4. Continue the conversation"),
        Line::default(),
        Line::from(Span::styled("Example questions:", section)),
        Line::from("- What is bioinformatics?"),
        Line::from("- Explain DNA sequencing"),
        Line::from("- How does CRISPR work?"),
        Line::default(),
        Line::from(Span::styled("Session:", section)),
        Line::from(format!("Messages: {}", app.session.len())),
        Line::from(format!("Exchanges: {}", app.session.exchanges())),
        Line::default(),
        Line::from(vec![
            Span::raw("API key: "),
            Span::styled(app.key_source, dim),
        ]),
        Line::from(vec![
            Span::raw("Log: "),
            Span::styled(format!("{}/{}", qalog::LOG_DIR, qalog::LOG_FILE), dim),
        ]),
    ];

    let help = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(help, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.input_mode {
        InputMode::Normal => " MENU ",
        InputMode::Editing => " ASK ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" menu ", label_style),
        ],
        InputMode::Normal => vec![
            Span::styled(" i ", key_style),
            Span::styled(" ask ", label_style),
            Span::styled(" c ", key_style),
            Span::styled(" clear ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" ? ", key_style),
            Span::styled(" help ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    spans.extend(hints);

    let footer = Paragraph::new(Line::from(spans));
    frame.render_widget(footer, area);
}
