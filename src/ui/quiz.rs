use super::{draw_help, header_style};
use crate::app::ViewState;
use crate::models::Question;
use crate::session::QuizState;
use crate::ui::layout::calculate_quiz_chunks;
use crate::ui::math_text::render_math_text;
use crate::utils::{calculate_max_scroll, estimate_text_height};
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Answer keys come from the current question's own option letters.
fn answer_key_hint(question: &Question) -> String {
    let letters: Vec<&str> = question.options.letters().collect();
    if letters.is_empty() {
        "Enter".to_string()
    } else {
        format!("Enter/{}", letters.join("/"))
    }
}

pub fn draw_quiz(f: &mut Frame, state: &QuizState, view: &ViewState, status: Option<&str>) {
    let layout = calculate_quiz_chunks(f.area());
    let total = state.quiz.len();

    let Some(question) = state.quiz.questions.get(view.question_index) else {
        let header = Paragraph::new(format!("{} - no questions", state.quiz.topic))
            .style(header_style())
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(header, layout.header_area);
        let empty = Paragraph::new("The service returned no questions for this topic.")
            .block(Block::default().borders(Borders::ALL).title("Question"));
        f.render_widget(empty, layout.question_area);
        draw_help(f, layout.help_area, &[("Ctrl+S", "Submit"), ("Esc", "Topics")], status);
        return;
    };

    let progress = format!(
        "Question {} / {} - {}  ({} answered)",
        view.question_index + 1,
        total,
        state.quiz.topic,
        state.answered()
    );
    let header = Paragraph::new(progress)
        .style(header_style())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    let prompt = Text::from(render_math_text(&question.prompt, Style::default()));
    let visible_height = layout.question_area.height.saturating_sub(2) as usize;
    let text_width = layout.question_area.width.saturating_sub(2) as usize;
    let overflow = calculate_max_scroll(estimate_text_height(&prompt, text_width), visible_height);
    let title = if overflow > 0 {
        "Question (truncated)"
    } else {
        "Question"
    };
    let prompt = Paragraph::new(prompt)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(prompt, layout.question_area);

    let chosen = state.answers.get(&question.id).map(String::as_str);
    let mut options = Text::default();
    for (i, (letter, text)) in question.options.iter().enumerate() {
        let is_cursor = i == view.option_index;
        let is_chosen = chosen == Some(letter);
        let style = if is_chosen {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else if is_cursor {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let marker = match (is_cursor, is_chosen) {
            (true, true) => "> (•) ",
            (true, false) => "> ( ) ",
            (false, true) => "  (•) ",
            (false, false) => "  ( ) ",
        };
        let mut lines = render_math_text(text, style).into_iter();
        let mut first = vec![
            Span::styled(marker, style),
            Span::styled(format!("{}. ", letter), style),
        ];
        if let Some(line) = lines.next() {
            first.extend(line.spans);
        }
        options.push_line(Line::from(first));
        for line in lines {
            let mut spans = vec![Span::raw("      ")];
            spans.extend(line.spans);
            options.push_line(Line::from(spans));
        }
    }

    let answer_title = match chosen {
        Some(letter) => format!("Options - answered {}", letter),
        None => "Options".to_string(),
    };
    let answers = Paragraph::new(options)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(answer_title));
    f.render_widget(answers, layout.answer_area);

    let answer_keys = answer_key_hint(question);
    draw_help(
        f,
        layout.help_area,
        &[
            ("←/→", "Question"),
            ("↑/↓", "Option"),
            (answer_keys.as_str(), "Answer"),
            ("Ctrl+S", "Submit"),
            ("Esc", "Topics"),
        ],
        status,
    );
}
