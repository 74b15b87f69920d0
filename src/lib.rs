pub mod app;
pub mod config;
pub mod input;
pub mod logger;
pub mod math;
pub mod models;
pub mod service;
pub mod session;
pub mod ui;
pub mod utils;
pub mod worker;

// Re-exports for convenience
pub use app::{App, ViewState};
pub use config::Args;
pub use input::handle_key;
pub use math::{segment, Segment};
pub use models::{
    Document, DocumentError, ExplanationState, Intake, OptionSet, Question, QuestionId, Quiz,
    Score,
};
pub use service::{ExplainRequest, HttpQuizService, QuizService, ServiceError};
pub use session::{QuizController, ServiceRequest, ServiceResponse, Stage, TransitionError};
pub use worker::spawn_request;
