use super::{draw_header, draw_help, error_style};
use crate::session::TopicsState;
use crate::ui::layout::calculate_screen_chunks;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn draw_topics(f: &mut Frame, state: &TopicsState, selected: usize, status: Option<&str>) {
    let layout = calculate_screen_chunks(f.area());
    let title = format!("Topics - {}", state.source.document.file_name);
    draw_header(f, layout.header_area, &title);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(layout.content_area);

    let topics = &state.source.intake.topics;
    let items: Vec<ListItem> = if topics.is_empty() {
        vec![ListItem::new("No topics found in this document").style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )]
    } else {
        topics
            .iter()
            .enumerate()
            .map(|(i, topic)| {
                let pending = state.pending_topic.as_deref() == Some(topic.as_str());
                let style = if i == selected {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else if pending {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                };
                ListItem::new(format!("{}. {}", i + 1, topic)).style(style)
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title("Choose a topic"),
    );
    f.render_widget(list, chunks[0]);

    let message = if let Some(topic) = &state.pending_topic {
        Line::from(Span::styled(
            format!("Generating questions for '{}'...", topic),
            Style::default().fg(Color::Yellow),
        ))
    } else if let Some(error) = &state.error {
        Line::from(Span::styled(error.clone(), error_style()))
    } else {
        Line::from(format!(
            "{} topics extracted from the syllabus",
            topics.len()
        ))
    };
    let message = Paragraph::new(message)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, chunks[1]);

    draw_help(
        f,
        layout.help_area,
        &[
            ("↑/↓", "Navigate"),
            ("Enter/1-9", "Select"),
            ("Esc", "Start Over"),
            ("q", "Quit"),
        ],
        status,
    );
}

#[cfg(test)]
mod tests {
    use crate::app::App;
    use crate::session::tests::intake;
    use crate::session::{QuizController, ServiceResponse};
    use crate::ui::tests::render;

    fn app_in_topics() -> App {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("physics.pdf");
        std::fs::write(&path, b"%PDF").unwrap();
        let mut app = App::new(QuizController::default());
        app.open_document(&path).unwrap();
        app.controller.apply(ServiceResponse::DocumentParsed {
            epoch: app.controller.epoch(),
            result: Ok(intake()),
        });
        app.sync_view();
        app
    }

    #[test]
    fn test_topics_are_numbered_from_one() {
        let app = app_in_topics();
        let screen = render(&app, 80, 20);
        assert!(screen.contains("Topics - physics.pdf"));
        assert!(screen.contains("1. A"));
        assert!(screen.contains("2. B"));
    }

    #[test]
    fn test_topics_show_pending_generation() {
        let mut app = app_in_topics();
        app.controller.select_topic("B").unwrap();
        let screen = render(&app, 80, 20);
        assert!(screen.contains("Generating questions for 'B'..."));
    }
}
