use super::{draw_header, draw_help, error_style};
use crate::app::ViewState;
use crate::models::{ExplanationState, Question};
use crate::session::ResultsState;
use crate::ui::layout::calculate_results_chunks;
use crate::ui::math_text::{math_text_line, render_math_text};
use crate::utils::{calculate_max_scroll, estimate_text_height, truncate_string};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

const HINTS: &[(&str, &str)] = &[
    ("↑/↓", "Question"),
    ("e", "Explain"),
    ("PgUp/PgDn", "Scroll"),
    ("t", "Topics"),
    ("n", "New Document"),
    ("q", "Quit"),
];

fn correct_style() -> Style {
    Style::default().fg(Color::Green)
}

fn incorrect_style() -> Style {
    Style::default().fg(Color::Red)
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub fn draw_results(f: &mut Frame, state: &ResultsState, view: &ViewState, status: Option<&str>) {
    let layout = calculate_results_chunks(f.area());
    let score = state.score();
    let title = format!(
        "Results - {}: {} ({}%)",
        state.quiz.topic,
        score,
        score.percentage()
    );
    draw_header(f, layout.header_area, &title);

    let label_width = layout.list_area.width.saturating_sub(8) as usize;
    let items: Vec<ListItem> = state
        .quiz
        .questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let incorrect = state.is_incorrect(question);
            let (mark, mark_style) = if incorrect {
                ("✗", incorrect_style())
            } else {
                ("✓", correct_style())
            };
            let label_style = if i == view.result_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", mark), mark_style),
                Span::styled(
                    format!(
                        "{}. {}",
                        i + 1,
                        truncate_string(&math_text_line(&question.prompt), label_width)
                    ),
                    label_style,
                ),
            ]))
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title("Questions"),
    );
    f.render_widget(list, layout.list_area);

    let detail = match state.quiz.questions.get(view.result_index) {
        Some(question) => question_detail(state, question),
        None => Text::from("No questions in this quiz."),
    };
    let visible_height = layout.detail_area.height.saturating_sub(2) as usize;
    let text_width = layout.detail_area.width.saturating_sub(2) as usize;
    let max_scroll = calculate_max_scroll(estimate_text_height(&detail, text_width), visible_height);
    let scroll_y = view.detail_scroll.min(max_scroll);

    let detail = Paragraph::new(detail)
        .wrap(Wrap { trim: false })
        .scroll((scroll_y, 0))
        .block(Block::default().borders(Borders::ALL).title("Review"));
    f.render_widget(detail, layout.detail_area);

    draw_help(f, layout.help_area, HINTS, status);
}

fn question_detail(state: &ResultsState, question: &Question) -> Text<'static> {
    let user_answer = state.answers.get(&question.id).map(String::as_str);
    let incorrect = state.is_incorrect(question);

    let mut text = Text::default();
    for line in render_math_text(&question.prompt, bold()) {
        text.push_line(line);
    }
    text.push_line(Line::from(""));

    for (letter, option) in question.options.iter() {
        let style = if question.is_correct(letter) {
            correct_style().add_modifier(Modifier::BOLD)
        } else if user_answer == Some(letter) {
            incorrect_style()
        } else {
            Style::default()
        };
        let mut spans = vec![Span::styled(format!("{}. ", letter), style)];
        for (i, line) in render_math_text(option, style).into_iter().enumerate() {
            if i > 0 {
                text.push_line(Line::from(std::mem::take(&mut spans)));
                spans.push(Span::raw("   "));
            }
            spans.extend(line.spans);
        }
        text.push_line(Line::from(spans));
    }
    text.push_line(Line::from(""));

    let your_style = if incorrect {
        incorrect_style()
    } else {
        correct_style()
    };
    text.push_line(Line::from(vec![
        Span::styled("Your answer: ", bold()),
        Span::styled(user_answer.unwrap_or("-").to_string(), your_style),
    ]));
    // A correct letter outside the options is shown as "?".
    let correct_label = match question.correct_text() {
        Some(_) => question.correct_letter.clone(),
        None => "?".to_string(),
    };
    text.push_line(Line::from(vec![
        Span::styled("Correct answer: ", bold()),
        Span::styled(correct_label, correct_style()),
    ]));

    if !incorrect {
        return text;
    }

    text.push_line(Line::from(""));
    text.push_line(Line::from(Span::styled("Explanation:", bold())));
    match state.explanation(&question.id) {
        None => text.push_line(Line::from(Span::styled(
            "Press e to ask why this answer is wrong.",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))),
        Some(ExplanationState::Pending) => text.push_line(Line::from(Span::styled(
            "Loading explanation...",
            Style::default().fg(Color::Yellow),
        ))),
        Some(ExplanationState::Ready(explanation)) => {
            for line in render_math_text(explanation, Style::default()) {
                text.push_line(line);
            }
        }
        Some(ExplanationState::Failed(message)) => text.push_line(Line::from(Span::styled(
            format!("Could not load explanation: {}", message),
            error_style(),
        ))),
    }
    text
}
