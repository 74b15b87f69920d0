use crate::app::App;
use crate::session::{ServiceRequest, Stage};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::PathBuf;

/// Applies one key press. Returns the service request it triggered, if any.
pub fn handle_key(app: &mut App, key: KeyEvent) -> Option<ServiceRequest> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return None;
    }

    let request = match app.controller.stage() {
        Stage::Upload(_) => handle_upload_input(app, key),
        Stage::Topics(_) => handle_topics_input(app, key),
        Stage::Quiz(_) => handle_quiz_input(app, key),
        Stage::Results(_) => handle_results_input(app, key),
    };
    app.sync_view();
    request
}

fn handle_upload_input(app: &mut App, key: KeyEvent) -> Option<ServiceRequest> {
    match key.code {
        KeyCode::Esc => {
            app.should_quit = true;
            None
        }
        KeyCode::Enter => {
            let path = app.view.path_input.trim().to_string();
            if path.is_empty() {
                app.submit_document()
            } else {
                app.open_document(&PathBuf::from(path))
            }
        }
        KeyCode::Backspace => {
            app.view.path_input.pop();
            None
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.view.path_input.push(c);
            None
        }
        _ => None,
    }
}

fn handle_topics_input(app: &mut App, key: KeyEvent) -> Option<ServiceRequest> {
    let Stage::Topics(topics) = app.controller.stage() else {
        return None;
    };
    let labels = &topics.source.intake.topics;
    let last = labels.len().saturating_sub(1);

    let choice = match key.code {
        KeyCode::Up => {
            app.view.topic_index = app.view.topic_index.saturating_sub(1);
            None
        }
        KeyCode::Down => {
            app.view.topic_index = (app.view.topic_index + 1).min(last);
            None
        }
        KeyCode::Enter => labels.get(app.view.topic_index).cloned(),
        KeyCode::Char(d @ '1'..='9') => {
            let index = d as usize - '1' as usize;
            labels.get(index).cloned().inspect(|_| app.view.topic_index = index)
        }
        KeyCode::Esc | KeyCode::Char('u') => {
            let result = app.controller.start_over().map(|_| None::<ServiceRequest>);
            return app.settle(result);
        }
        KeyCode::Char('q') => {
            app.should_quit = true;
            None
        }
        _ => None,
    };

    let label = choice?;
    let result = app.controller.select_topic(&label);
    app.settle(result)
}

fn handle_quiz_input(app: &mut App, key: KeyEvent) -> Option<ServiceRequest> {
    let Stage::Quiz(state) = app.controller.stage() else {
        return None;
    };
    let total = state.quiz.len();
    let Some(question) = state.quiz.questions.get(app.view.question_index) else {
        // Only an empty quiz has no current question.
        match key.code {
            KeyCode::Esc => {
                let result = app.controller.back().map(|_| None::<ServiceRequest>);
                app.settle(result);
            }
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let result = app.controller.submit().map(|_| None::<ServiceRequest>);
                app.settle(result);
            }
            _ => {}
        }
        return None;
    };
    let id = question.id.clone();
    let letters: Vec<String> = question.options.letters().map(str::to_string).collect();

    let picked = match key.code {
        KeyCode::Left | KeyCode::BackTab => {
            let index = app.view.question_index.saturating_sub(1);
            move_to_question(app, index);
            None
        }
        KeyCode::Right | KeyCode::Tab => {
            let index = (app.view.question_index + 1).min(total.saturating_sub(1));
            move_to_question(app, index);
            None
        }
        KeyCode::Up => {
            app.view.option_index = app.view.option_index.saturating_sub(1);
            None
        }
        KeyCode::Down => {
            app.view.option_index =
                (app.view.option_index + 1).min(letters.len().saturating_sub(1));
            None
        }
        KeyCode::Enter | KeyCode::Char(' ') => letters.get(app.view.option_index).cloned(),
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let result = app.controller.submit().map(|_| None::<ServiceRequest>);
            return app.settle(result);
        }
        KeyCode::Esc => {
            let result = app.controller.back().map(|_| None::<ServiceRequest>);
            return app.settle(result);
        }
        KeyCode::Char(c) => letters
            .iter()
            .find(|letter| letter.eq_ignore_ascii_case(&c.to_string()))
            .cloned(),
        _ => None,
    };

    let letter = picked?;
    match app.controller.set_answer(&id, &letter) {
        Ok(()) => {
            app.status = None;
            let next = app.view.question_index + 1;
            if next < total {
                move_to_question(app, next);
            } else {
                app.view.option_index = letters.iter().position(|l| *l == letter).unwrap_or(0);
            }
        }
        Err(e) => app.report(e),
    }
    None
}

/// Moves to question `index`, placing the option cursor on its answer.
fn move_to_question(app: &mut App, index: usize) {
    app.view.question_index = index;
    app.view.option_index = 0;
    if let Stage::Quiz(state) = app.controller.stage()
        && let Some(question) = state.quiz.questions.get(index)
        && let Some(answer) = state.answers.get(&question.id)
    {
        app.view.option_index = question
            .options
            .letters()
            .position(|l| l == answer)
            .unwrap_or(0);
    }
}

fn handle_results_input(app: &mut App, key: KeyEvent) -> Option<ServiceRequest> {
    let Stage::Results(results) = app.controller.stage() else {
        return None;
    };
    let last = results.quiz.len().saturating_sub(1);
    let current = results
        .quiz
        .questions
        .get(app.view.result_index)
        .map(|q| q.id.clone());

    match key.code {
        KeyCode::Up => {
            app.view.result_index = app.view.result_index.saturating_sub(1);
            app.view.detail_scroll = 0;
            None
        }
        KeyCode::Down => {
            app.view.result_index = (app.view.result_index + 1).min(last);
            app.view.detail_scroll = 0;
            None
        }
        KeyCode::PageUp => {
            app.view.detail_scroll = app.view.detail_scroll.saturating_sub(5);
            None
        }
        KeyCode::PageDown => {
            app.view.detail_scroll = app.view.detail_scroll.saturating_add(5);
            None
        }
        KeyCode::Enter | KeyCode::Char('e') => {
            let id = current?;
            let result = app.controller.request_explanation(&id);
            app.settle(result)
        }
        KeyCode::Char('t') => {
            let result = app.controller.back_to_topics().map(|_| None::<ServiceRequest>);
            app.settle(result)
        }
        KeyCode::Char('n') => {
            let result = app.controller.start_over().map(|_| None::<ServiceRequest>);
            app.settle(result)
        }
        KeyCode::Esc | KeyCode::Char('q') => {
            app.should_quit = true;
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExplanationState, QuestionId};
    use crate::session::tests::{intake, question, questions};
    use crate::session::{QuizController, ServiceResponse, StageKind};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn app_in_topics() -> App {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("syllabus.pdf");
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

    fn app_in_quiz(quiz: Vec<crate::models::Question>) -> App {
        let mut app = app_in_topics();
        handle_key(&mut app, key(KeyCode::Enter)).unwrap();
        app.controller.apply(ServiceResponse::QuizGenerated {
            epoch: app.controller.epoch(),
            topic: "A".to_string(),
            result: Ok(quiz),
        });
        app.sync_view();
        app
    }

    #[test]
    fn test_ctrl_c_quits_from_any_stage() {
        let mut app = App::new(QuizController::default());
        handle_key(&mut app, ctrl('c'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_typing_path_and_empty_submit() {
        let mut app = App::new(QuizController::default());
        for c in "a.pd".chars() {
            handle_key(&mut app, key(KeyCode::Char(c)));
        }
        handle_key(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.view.path_input, "a.p");

        app.view.path_input.clear();
        assert!(handle_key(&mut app, key(KeyCode::Enter)).is_none());
        assert_eq!(app.status.as_deref(), Some("Please select a PDF file"));
    }

    #[test]
    fn test_topic_selection_by_number_and_enter() {
        let mut app = app_in_topics();
        let request = handle_key(&mut app, key(KeyCode::Char('2')));
        match request {
            Some(ServiceRequest::GenerateQuiz { topic, .. }) => assert_eq!(topic, "B"),
            other => panic!("unexpected {:?}", other),
        }
        // Pending: a second selection produces nothing.
        assert!(handle_key(&mut app, key(KeyCode::Enter)).is_none());
        assert!(handle_key(&mut app, key(KeyCode::Char('9'))).is_none());
    }

    #[test]
    fn test_topic_cursor_is_clamped() {
        let mut app = app_in_topics();
        for _ in 0..5 {
            handle_key(&mut app, key(KeyCode::Down));
        }
        assert_eq!(app.view.topic_index, 1);
        handle_key(&mut app, key(KeyCode::Up));
        handle_key(&mut app, key(KeyCode::Up));
        assert_eq!(app.view.topic_index, 0);
    }

    #[test]
    fn test_escape_in_topics_starts_over() {
        let mut app = app_in_topics();
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.controller.kind(), StageKind::Upload);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_answering_by_letter_advances() {
        let mut app = app_in_quiz(questions(2));
        handle_key(&mut app, key(KeyCode::Char('b')));
        assert_eq!(app.view.question_index, 1);
        handle_key(&mut app, key(KeyCode::Down));
        handle_key(&mut app, key(KeyCode::Enter));

        let Stage::Quiz(state) = app.controller.stage() else {
            panic!("expected quiz");
        };
        assert_eq!(
            state.answers.get(&QuestionId::from(1)).map(String::as_str),
            Some("B")
        );
        assert_eq!(
            state.answers.get(&QuestionId::from(2)).map(String::as_str),
            Some("B")
        );
        assert_eq!(app.view.option_index, 1);
    }

    #[test]
    fn test_returning_to_question_restores_option_cursor() {
        let mut app = app_in_quiz(questions(2));
        handle_key(&mut app, key(KeyCode::Char('c')));
        handle_key(&mut app, key(KeyCode::Left));
        assert_eq!(app.view.question_index, 0);
        assert_eq!(app.view.option_index, 2);
    }

    #[test]
    fn test_submit_incomplete_shows_status() {
        let mut app = app_in_quiz(questions(2));
        handle_key(&mut app, key(KeyCode::Char('a')));
        handle_key(&mut app, ctrl('s'));
        assert_eq!(app.controller.kind(), StageKind::Quiz);
        assert_eq!(
            app.status.as_deref(),
            Some("Answer all questions before submitting (1/2 answered)")
        );
        handle_key(&mut app, key(KeyCode::Char('a')));
        handle_key(&mut app, ctrl('s'));
        assert_eq!(app.controller.kind(), StageKind::Results);
        assert!(app.status.is_none());
    }

    #[test]
    fn test_results_explain_only_once() {
        let mut app = app_in_quiz(vec![question(1, "A"), question(2, "A")]);
        handle_key(&mut app, key(KeyCode::Char('a')));
        handle_key(&mut app, key(KeyCode::Char('d')));
        handle_key(&mut app, ctrl('s'));

        // First question was right.
        assert!(handle_key(&mut app, key(KeyCode::Char('e'))).is_none());
        assert_eq!(
            app.status.as_deref(),
            Some("Question 1 was answered correctly")
        );

        handle_key(&mut app, key(KeyCode::Down));
        assert!(handle_key(&mut app, key(KeyCode::Char('e'))).is_some());
        assert!(handle_key(&mut app, key(KeyCode::Enter)).is_none());

        let Stage::Results(results) = app.controller.stage() else {
            panic!("expected results");
        };
        assert_eq!(
            results.explanation(&QuestionId::from(2)),
            Some(&ExplanationState::Pending)
        );
    }

    #[test]
    fn test_results_navigation_keys() {
        let mut app = app_in_quiz(questions(1));
        handle_key(&mut app, key(KeyCode::Char('a')));
        handle_key(&mut app, ctrl('s'));
        handle_key(&mut app, key(KeyCode::Char('t')));
        assert_eq!(app.controller.kind(), StageKind::Topics);
    }

    #[test]
    fn test_empty_quiz_can_still_submit_or_go_back() {
        let mut app = app_in_quiz(vec![]);
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.controller.kind(), StageKind::Topics);
    }
}
