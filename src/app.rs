use crate::models::Document;
use crate::session::{QuizController, ServiceRequest, Stage, StageKind, TransitionError};
use std::path::Path;

/// Cursor and scroll positions; nothing here affects session semantics.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub path_input: String,
    pub topic_index: usize,
    pub question_index: usize,
    pub option_index: usize,
    pub result_index: usize,
    pub detail_scroll: u16,
}

#[derive(Debug)]
pub struct App {
    pub controller: QuizController,
    pub view: ViewState,
    /// One-line message for rejected actions.
    pub status: Option<String>,
    pub should_quit: bool,
    shown_stage: StageKind,
}

impl App {
    pub fn new(controller: QuizController) -> Self {
        let shown_stage = controller.kind();
        Self {
            controller,
            view: ViewState::default(),
            status: None,
            should_quit: false,
            shown_stage,
        }
    }

    /// Loads the PDF at `path` and submits it for parsing.
    pub fn open_document(&mut self, path: &Path) -> Option<ServiceRequest> {
        match Document::from_path(path) {
            Ok(document) => {
                if let Err(e) = self.controller.select_document(document) {
                    self.report(e);
                    return None;
                }
                self.submit_document()
            }
            Err(e) => {
                self.status = Some(e.to_string());
                None
            }
        }
    }

    pub fn submit_document(&mut self) -> Option<ServiceRequest> {
        let result = self.controller.submit_document();
        self.settle(result)
    }

    /// Clears the status line on success, shows the rejection otherwise.
    pub fn settle<T>(&mut self, result: Result<Option<T>, TransitionError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.status = None;
                value
            }
            Err(e) => {
                self.report(e);
                None
            }
        }
    }

    pub fn report(&mut self, error: TransitionError) {
        self.status = Some(error.to_string());
    }

    /// Resets per-stage cursors after a stage change. Call after every event.
    pub fn sync_view(&mut self) {
        let kind = self.controller.kind();
        if kind == self.shown_stage {
            return;
        }
        self.shown_stage = kind;
        let path_input = std::mem::take(&mut self.view.path_input);
        self.view = ViewState::default();
        if kind == StageKind::Upload
            && matches!(self.controller.stage(), Stage::Upload(upload) if upload.document.is_some())
        {
            self.view.path_input = path_input;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ServiceResponse;
    use crate::session::tests::intake;

    #[test]
    fn test_open_document_rejects_non_pdf() {
        let mut app = App::new(QuizController::default());
        assert!(app.open_document(Path::new("notes.txt")).is_none());
        assert_eq!(app.status.as_deref(), Some("Please select a PDF file"));
    }

    #[test]
    fn test_open_document_issues_parse_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("syllabus.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let mut app = App::new(QuizController::default());
        let request = app.open_document(&path);
        assert!(matches!(request, Some(ServiceRequest::ParseDocument { .. })));
        assert!(app.status.is_none());
    }

    #[test]
    fn test_sync_view_resets_cursors_on_stage_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("syllabus.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let mut app = App::new(QuizController::default());
        app.view.path_input = path.display().to_string();
        app.open_document(&path);
        app.view.topic_index = 3;
        app.controller.apply(ServiceResponse::DocumentParsed {
            epoch: app.controller.epoch(),
            result: Ok(intake()),
        });
        app.sync_view();
        assert_eq!(app.view, ViewState::default());
    }
}
