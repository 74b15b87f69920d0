use super::{draw_header, draw_help, error_style};
use crate::session::UploadState;
use crate::ui::layout::calculate_screen_chunks;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn draw_upload(f: &mut Frame, state: &UploadState, path_input: &str, status: Option<&str>) {
    let layout = calculate_screen_chunks(f.area());
    draw_header(f, layout.header_area, "Syllabus Quiz");

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(layout.content_area);

    let input_text = if path_input.is_empty() {
        Span::styled(
            "[Type the path to a syllabus PDF...]",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )
    } else {
        Span::from(path_input.to_string())
    };
    let input = Paragraph::new(Line::from(input_text))
        .block(Block::default().borders(Borders::ALL).title("PDF File"));
    f.render_widget(input, chunks[0]);

    if !state.pending {
        let typed = path_input.chars().count().min(u16::MAX as usize) as u16;
        let cursor_x = chunks[0].x + 1 + typed.min(chunks[0].width.saturating_sub(2));
        f.set_cursor_position((cursor_x, chunks[0].y + 1));
    }

    let mut text = Text::default();
    match &state.document {
        Some(document) => text.push_line(Line::from(vec![
            Span::styled("Selected: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::from(document.file_name.clone()),
        ])),
        None => text.push_line(Line::from("No document selected")),
    }
    text.push_line(Line::from(""));
    if state.pending {
        text.push_line(Line::from(Span::styled(
            "Processing document...",
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(error) = &state.error {
        text.push_line(Line::from(Span::styled(error.clone(), error_style())));
    } else {
        text.push_line(Line::from(
            "Upload a syllabus to extract its topics and generate a quiz.",
        ));
    }

    let body = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(body, chunks[1]);

    draw_help(
        f,
        layout.help_area,
        &[("Enter", "Upload"), ("Esc/Ctrl+C", "Quit")],
        status,
    );
}
