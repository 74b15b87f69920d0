use crate::logger;
use crate::models::{
    AnswerMap, Document, ExplanationState, Intake, Question, QuestionId, Quiz, Score,
};
use crate::service::{ExplainRequest, ServiceError, DEFAULT_QUESTION_COUNT};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Advances whenever quiz state is discarded, so completions of requests
/// issued before the reset can be recognised and dropped.
pub type Epoch = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceRequest {
    ParseDocument {
        epoch: Epoch,
        document: Document,
    },
    GenerateQuiz {
        epoch: Epoch,
        extracted_text: String,
        topic: String,
        count: usize,
    },
    ExplainAnswer {
        epoch: Epoch,
        question_id: QuestionId,
        request: ExplainRequest,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceResponse {
    DocumentParsed {
        epoch: Epoch,
        result: Result<Intake, ServiceError>,
    },
    QuizGenerated {
        epoch: Epoch,
        topic: String,
        result: Result<Vec<Question>, ServiceError>,
    },
    Explained {
        epoch: Epoch,
        question_id: QuestionId,
        result: Result<String, ServiceError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Upload,
    Topics,
    Quiz,
    Results,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageKind::Upload => "upload",
            StageKind::Topics => "topics",
            StageKind::Quiz => "quiz",
            StageKind::Results => "results",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Cannot {action} in the {stage} stage")]
    WrongStage {
        action: &'static str,
        stage: StageKind,
    },
    #[error("Please select a PDF file")]
    NoDocument,
    #[error("A request is already in progress")]
    RequestPending,
    #[error("Unknown topic: {0}")]
    UnknownTopic(String),
    #[error("Unknown question: {0}")]
    UnknownQuestion(QuestionId),
    #[error("Question {question} has no option {letter}")]
    UnknownOption { question: QuestionId, letter: String },
    #[error("Answer all questions before submitting ({answered}/{total} answered)")]
    Incomplete { answered: usize, total: usize },
    #[error("Question {0} was answered correctly")]
    AnsweredCorrectly(QuestionId),
}

/// The uploaded document together with what the service extracted from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub document: Document,
    pub intake: Intake,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadState {
    pub document: Option<Document>,
    pub pending: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicsState {
    pub source: Source,
    pub pending_topic: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizState {
    pub source: Source,
    pub quiz: Quiz,
    pub answers: AnswerMap,
}

impl QuizState {
    pub fn answered(&self) -> usize {
        self.quiz
            .questions
            .iter()
            .filter(|q| self.answers.contains_key(&q.id))
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.answered() == self.quiz.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsState {
    pub source: Source,
    pub quiz: Quiz,
    pub answers: AnswerMap,
    pub explanations: HashMap<QuestionId, ExplanationState>,
}

impl ResultsState {
    pub fn score(&self) -> Score {
        Score::compute(&self.quiz, &self.answers)
    }

    pub fn is_incorrect(&self, question: &Question) -> bool {
        !self
            .answers
            .get(&question.id)
            .is_some_and(|letter| question.is_correct(letter))
    }

    pub fn explanation(&self, id: &QuestionId) -> Option<&ExplanationState> {
        self.explanations.get(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Upload(UploadState),
    Topics(TopicsState),
    Quiz(QuizState),
    Results(ResultsState),
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Upload(_) => StageKind::Upload,
            Stage::Topics(_) => StageKind::Topics,
            Stage::Quiz(_) => StageKind::Quiz,
            Stage::Results(_) => StageKind::Results,
        }
    }
}

/// Owns all session state and runs the Upload → Topics → Quiz → Results
/// state machine. Transitions that need the service return the request to
/// dispatch; completions come back through [`QuizController::apply`].
#[derive(Debug)]
pub struct QuizController {
    stage: Stage,
    epoch: Epoch,
    question_count: usize,
}

impl Default for QuizController {
    fn default() -> Self {
        Self::new(DEFAULT_QUESTION_COUNT)
    }
}

impl QuizController {
    pub fn new(question_count: usize) -> Self {
        Self {
            stage: Stage::Upload(UploadState::default()),
            epoch: 0,
            question_count,
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn kind(&self) -> StageKind {
        self.stage.kind()
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn question_count(&self) -> usize {
        self.question_count
    }

    /// Score of a submitted quiz, recomputed on every call.
    pub fn score(&self) -> Option<Score> {
        match &self.stage {
            Stage::Results(results) => Some(results.score()),
            _ => None,
        }
    }

    fn wrong_stage(&self, action: &'static str) -> TransitionError {
        TransitionError::WrongStage {
            action,
            stage: self.kind(),
        }
    }

    pub fn select_document(&mut self, document: Document) -> Result<(), TransitionError> {
        let Stage::Upload(upload) = &mut self.stage else {
            return Err(self.wrong_stage("select a document"));
        };
        if upload.pending {
            return Err(TransitionError::RequestPending);
        }
        logger::log(&format!("Selected document {}", document.file_name));
        upload.document = Some(document);
        upload.error = None;
        Ok(())
    }

    pub fn submit_document(&mut self) -> Result<Option<ServiceRequest>, TransitionError> {
        let epoch = self.epoch;
        let Stage::Upload(upload) = &mut self.stage else {
            return Err(self.wrong_stage("upload a document"));
        };
        if upload.pending {
            return Ok(None);
        }
        let Some(document) = &upload.document else {
            return Err(TransitionError::NoDocument);
        };

        upload.pending = true;
        upload.error = None;
        logger::log(&format!("Requesting parse of {}", document.file_name));
        Ok(Some(ServiceRequest::ParseDocument {
            epoch,
            document: document.clone(),
        }))
    }

    pub fn select_topic(&mut self, label: &str) -> Result<Option<ServiceRequest>, TransitionError> {
        let epoch = self.epoch;
        let count = self.question_count;
        let Stage::Topics(topics) = &mut self.stage else {
            return Err(self.wrong_stage("select a topic"));
        };
        if topics.pending_topic.is_some() {
            return Ok(None);
        }
        if !topics.source.intake.topics.iter().any(|t| t == label) {
            return Err(TransitionError::UnknownTopic(label.to_string()));
        }

        topics.pending_topic = Some(label.to_string());
        topics.error = None;
        logger::log(&format!("Requesting {} questions for topic '{}'", count, label));
        Ok(Some(ServiceRequest::GenerateQuiz {
            epoch,
            extracted_text: topics.source.intake.extracted_text.clone(),
            topic: label.to_string(),
            count,
        }))
    }

    pub fn set_answer(&mut self, id: &QuestionId, letter: &str) -> Result<(), TransitionError> {
        let Stage::Quiz(state) = &mut self.stage else {
            return Err(self.wrong_stage("answer a question"));
        };
        let question = state
            .quiz
            .get(id)
            .ok_or_else(|| TransitionError::UnknownQuestion(id.clone()))?;
        if !question.options.contains(letter) {
            return Err(TransitionError::UnknownOption {
                question: id.clone(),
                letter: letter.to_string(),
            });
        }
        state.answers.insert(id.clone(), letter.to_string());
        Ok(())
    }

    pub fn submit(&mut self) -> Result<(), TransitionError> {
        let Stage::Quiz(state) = &self.stage else {
            return Err(self.wrong_stage("submit answers"));
        };
        if !state.is_complete() {
            return Err(TransitionError::Incomplete {
                answered: state.answered(),
                total: state.quiz.len(),
            });
        }

        let Stage::Quiz(state) = self.take_stage() else {
            unreachable!("stage checked above");
        };
        let results = ResultsState {
            source: state.source,
            quiz: state.quiz,
            answers: state.answers,
            explanations: HashMap::new(),
        };
        let score = results.score();
        logger::log(&format!("Quiz submitted: {} ({}%)", score, score.percentage()));
        self.stage = Stage::Results(results);
        Ok(())
    }

    /// Quiz → Topics, discarding the quiz and its answers.
    pub fn back(&mut self) -> Result<(), TransitionError> {
        if self.kind() != StageKind::Quiz {
            return Err(self.wrong_stage("go back"));
        }
        let Stage::Quiz(state) = self.take_stage() else {
            unreachable!("stage checked above");
        };
        self.return_to_topics(state.source);
        Ok(())
    }

    /// Results → Topics, discarding the quiz, answers and explanations.
    pub fn back_to_topics(&mut self) -> Result<(), TransitionError> {
        if self.kind() != StageKind::Results {
            return Err(self.wrong_stage("return to topics"));
        }
        let Stage::Results(state) = self.take_stage() else {
            unreachable!("stage checked above");
        };
        self.return_to_topics(state.source);
        Ok(())
    }

    /// Full reset to an empty Upload stage.
    pub fn start_over(&mut self) -> Result<(), TransitionError> {
        match self.kind() {
            StageKind::Topics | StageKind::Results => {
                self.epoch += 1;
                self.stage = Stage::Upload(UploadState::default());
                logger::log(&format!("Started over (epoch {})", self.epoch));
                Ok(())
            }
            _ => Err(self.wrong_stage("start over")),
        }
    }

    pub fn request_explanation(
        &mut self,
        id: &QuestionId,
    ) -> Result<Option<ServiceRequest>, TransitionError> {
        let epoch = self.epoch;
        let Stage::Results(results) = &mut self.stage else {
            return Err(self.wrong_stage("request an explanation"));
        };
        let question = results
            .quiz
            .get(id)
            .ok_or_else(|| TransitionError::UnknownQuestion(id.clone()))?;
        if !results.is_incorrect(question) {
            return Err(TransitionError::AnsweredCorrectly(id.clone()));
        }
        if results.explanations.contains_key(id) {
            return Ok(None);
        }

        let request = ExplainRequest {
            question: question.prompt.clone(),
            options: question.options.clone(),
            correct_answer: question.correct_letter.clone(),
            user_answer: results.answers.get(id).cloned().unwrap_or_default(),
            topic: results.quiz.topic.clone(),
        };
        results
            .explanations
            .insert(id.clone(), ExplanationState::Pending);
        logger::log(&format!("Requesting explanation for question {}", id));
        Ok(Some(ServiceRequest::ExplainAnswer {
            epoch,
            question_id: id.clone(),
            request,
        }))
    }

    /// Applies a service completion. Returns `false` when the response no
    /// longer matches the session and was dropped.
    pub fn apply(&mut self, response: ServiceResponse) -> bool {
        let response_epoch = match &response {
            ServiceResponse::DocumentParsed { epoch, .. }
            | ServiceResponse::QuizGenerated { epoch, .. }
            | ServiceResponse::Explained { epoch, .. } => *epoch,
        };
        if response_epoch != self.epoch {
            logger::log(&format!(
                "Dropping response from epoch {} (current {})",
                response_epoch, self.epoch
            ));
            return false;
        }

        match response {
            ServiceResponse::DocumentParsed { result, .. } => self.apply_document_parsed(result),
            ServiceResponse::QuizGenerated { topic, result, .. } => {
                self.apply_quiz_generated(topic, result)
            }
            ServiceResponse::Explained {
                question_id,
                result,
                ..
            } => self.apply_explained(question_id, result),
        }
    }

    fn apply_document_parsed(&mut self, result: Result<Intake, ServiceError>) -> bool {
        let Stage::Upload(upload) = &mut self.stage else {
            logger::log("Dropping parse result outside the upload stage");
            return false;
        };
        if !upload.pending {
            return false;
        }

        match result {
            Ok(intake) => {
                let Some(document) = upload.document.take() else {
                    return false;
                };
                logger::log(&format!(
                    "Parsed {}: {} topics, {} chars",
                    document.file_name,
                    intake.topics.len(),
                    intake.extracted_text.len()
                ));
                self.stage = Stage::Topics(TopicsState {
                    source: Source { document, intake },
                    pending_topic: None,
                    error: None,
                });
            }
            Err(e) => {
                logger::log(&format!("Parse failed: {}", e));
                upload.pending = false;
                upload.error = Some(e.to_string());
            }
        }
        true
    }

    fn apply_quiz_generated(
        &mut self,
        topic: String,
        result: Result<Vec<Question>, ServiceError>,
    ) -> bool {
        let Stage::Topics(topics) = &mut self.stage else {
            logger::log("Dropping quiz outside the topics stage");
            return false;
        };
        if topics.pending_topic.as_deref() != Some(topic.as_str()) {
            return false;
        }

        match result {
            Ok(questions) => {
                logger::log(&format!(
                    "Generated {} questions for '{}'",
                    questions.len(),
                    topic
                ));
                let Stage::Topics(topics) = self.take_stage() else {
                    unreachable!("stage checked above");
                };
                self.stage = Stage::Quiz(QuizState {
                    source: topics.source,
                    quiz: Quiz { topic, questions },
                    answers: AnswerMap::new(),
                });
            }
            Err(e) => {
                logger::log(&format!("Quiz generation for '{}' failed: {}", topic, e));
                topics.pending_topic = None;
                topics.error = Some(e.to_string());
            }
        }
        true
    }

    fn apply_explained(&mut self, id: QuestionId, result: Result<String, ServiceError>) -> bool {
        let Stage::Results(results) = &mut self.stage else {
            return false;
        };
        let Some(entry) = results.explanations.get_mut(&id) else {
            return false;
        };
        if *entry != ExplanationState::Pending {
            return false;
        }

        *entry = match result {
            Ok(text) => {
                logger::log(&format!("Explanation ready for question {}", id));
                ExplanationState::Ready(text)
            }
            Err(e) => {
                logger::log(&format!("Explanation for question {} failed: {}", id, e));
                ExplanationState::Failed(e.to_string())
            }
        };
        true
    }

    fn return_to_topics(&mut self, source: Source) {
        self.epoch += 1;
        self.stage = Stage::Topics(TopicsState {
            source,
            pending_topic: None,
            error: None,
        });
        logger::log(&format!("Returned to topics (epoch {})", self.epoch));
    }

    fn take_stage(&mut self) -> Stage {
        std::mem::replace(&mut self.stage, Stage::Upload(UploadState::default()))
    }
}
