//! Scripted service for tests.

use crate::models::{Document, Intake, Question};
use crate::service::{ExplainRequest, QuizService, ServiceError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ParseDocument(String),
    GenerateQuiz { topic: String, count: usize },
    ExplainAnswer(String),
}

/// Explanations are scripted per question prompt; an unscripted prompt fails.
#[derive(Default)]
pub struct MockQuizService {
    intake: Option<Result<Intake, ServiceError>>,
    questions: Option<Result<Vec<Question>, ServiceError>>,
    explanations: HashMap<String, Result<String, ServiceError>>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<Call>>,
}

impl MockQuizService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_intake(mut self, result: Result<Intake, ServiceError>) -> Self {
        self.intake = Some(result);
        self
    }

    pub fn with_questions(mut self, result: Result<Vec<Question>, ServiceError>) -> Self {
        self.questions = Some(result);
        self
    }

    pub fn with_explanation(
        mut self,
        prompt: &str,
        result: Result<String, ServiceError>,
    ) -> Self {
        self.explanations.insert(prompt.to_string(), result);
        self
    }

    /// Delays the explanation for `prompt`, to force out-of-order completion.
    pub fn with_delay(mut self, prompt: &str, delay: Duration) -> Self {
        self.delays.insert(prompt.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl QuizService for MockQuizService {
    async fn parse_document(&self, document: &Document) -> Result<Intake, ServiceError> {
        self.record(Call::ParseDocument(document.file_name.clone()));
        self.intake
            .clone()
            .unwrap_or_else(|| Err(ServiceError::Service("no intake scripted".to_string())))
    }

    async fn generate_quiz(
        &self,
        _extracted_text: &str,
        topic: &str,
        count: usize,
    ) -> Result<Vec<Question>, ServiceError> {
        self.record(Call::GenerateQuiz {
            topic: topic.to_string(),
            count,
        });
        self.questions
            .clone()
            .unwrap_or_else(|| Err(ServiceError::Service("no quiz scripted".to_string())))
    }

    async fn explain_answer(&self, request: &ExplainRequest) -> Result<String, ServiceError> {
        self.record(Call::ExplainAnswer(request.question.clone()));
        if let Some(delay) = self.delays.get(&request.question) {
            sleep(*delay).await;
        }
        self.explanations
            .get(&request.question)
            .cloned()
            .unwrap_or_else(|| Err(ServiceError::Service("no explanation scripted".to_string())))
    }
}
