pub mod layout;
pub mod math_text;
mod quiz;
mod results;
mod topics;
mod upload;

use crate::app::App;
use crate::session::Stage;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub use layout::{calculate_quiz_chunks, calculate_results_chunks, calculate_screen_chunks};
pub use math_text::render_math_text;
pub use quiz::draw_quiz;
pub use results::draw_results;
pub use topics::draw_topics;
pub use upload::draw_upload;

pub fn draw(f: &mut Frame, app: &App) {
    let status = app.status.as_deref();
    match app.controller.stage() {
        Stage::Upload(state) => draw_upload(f, state, &app.view.path_input, status),
        Stage::Topics(state) => draw_topics(f, state, app.view.topic_index, status),
        Stage::Quiz(state) => draw_quiz(f, state, &app.view, status),
        Stage::Results(state) => draw_results(f, state, &app.view, status),
    }
}

fn key_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

fn header_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

fn error_style() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

fn draw_header(f: &mut Frame, area: Rect, title: &str) {
    let header = Paragraph::new(title.to_string())
        .style(header_style())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

/// Key hints on the first line, the last rejected action (if any) on the second.
fn draw_help(f: &mut Frame, area: Rect, hints: &[(&str, &str)], status: Option<&str>) {
    let mut spans = Vec::new();
    for (i, (key, label)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::from("  "));
        }
        spans.push(Span::styled(key.to_string(), key_style()));
        spans.push(Span::from(format!(" {}", label)));
    }

    let mut help_text = vec![Line::from(spans)];
    if let Some(status) = status {
        help_text.push(Line::from(Span::styled(status.to_string(), error_style())));
    }

    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, area);
}
