pub mod client;
pub mod error;
#[cfg(test)]
pub mod mock;

// Public API exports
pub use client::{
    ExplainRequest, HttpQuizService, QuizService, DEFAULT_QUESTION_COUNT, DEFAULT_SERVER_URL,
};
pub use error::ServiceError;
