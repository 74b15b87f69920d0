use thiserror::Error;

/// Failure of one external call, carrying the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("Error connecting to server: {0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("{0}")]
    Service(String),
    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}
