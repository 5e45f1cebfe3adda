use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::ui::positioning::{Phase, ViewState};
use crate::ui::theme::{ACCENT, BORDER, BUTTON_BG, MUTED_TEXT, STATUS_ERROR, STATUS_OK, TEXT};

/// Spinner animation frames.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const FOOTER_HINT: &str = " s/Enter: start/stop   q: quit ";

pub fn draw(frame: &mut Frame<'_>, state: &ViewState, animation_tick: u8) {
    let [body, footer] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .areas(frame.area());

    let title = match &state.map {
        Some(map) if !map.title.is_empty() => format!(" {} ", map.title),
        _ => " Indoor positioning ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER));

    let paragraph = Paragraph::new(body_lines(state, animation_tick))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, body);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            FOOTER_HINT,
            Style::default().fg(MUTED_TEXT),
        ))),
        footer,
    );
}

/// Content of the main panel.
pub fn body_lines(state: &ViewState, animation_tick: u8) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(""), status_line(state, animation_tick)];

    if let Some(error) = &state.error {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  Error: ", Style::default().fg(STATUS_ERROR)),
            Span::styled(error.message.clone(), Style::default().fg(TEXT)),
        ]));
        lines.push(Line::from(Span::styled(
            format!("         {}", error.details),
            Style::default().fg(MUTED_TEXT),
        )));
    }

    if let Some(details) = state.location.as_ref().filter(|d| d.visible) {
        lines.push(Line::from(""));
        for text in details.lines() {
            lines.push(Line::from(Span::styled(
                format!("  {}", text),
                Style::default().fg(TEXT),
            )));
        }
    }

    if state.button_visible {
        lines.push(Line::from(""));
        lines.push(button_line(state));
    }

    lines
}

fn status_line(state: &ViewState, animation_tick: u8) -> Line<'static> {
    let color = match state.phase {
        Phase::Started => STATUS_OK,
        Phase::FailedToStart => STATUS_ERROR,
        _ => ACCENT,
    };
    let marker = if state.progress_visible {
        SPINNER_FRAMES[(animation_tick as usize) % SPINNER_FRAMES.len()]
    } else {
        "●"
    };

    Line::from(vec![
        Span::styled(format!("  {} ", marker), Style::default().fg(color)),
        Span::styled(state.status_message(), Style::default().fg(TEXT)),
    ])
}

fn button_line(state: &ViewState) -> Line<'static> {
    let fg = if state.phase == Phase::FailedToStart {
        STATUS_ERROR
    } else {
        TEXT
    };
    let style = Style::default()
        .fg(fg)
        .bg(BUTTON_BG)
        .add_modifier(Modifier::BOLD);

    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!(" {} ", state.button_label.as_str()), style),
    ])
}
