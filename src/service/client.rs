use crate::logger;
use crate::models::{Document, Intake, OptionSet, Question};
use crate::service::ServiceError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";
pub const DEFAULT_QUESTION_COUNT: usize = 5;

const UPLOAD_PATH: &str = "/api/upload-syllabus";
const GENERATE_PATH: &str = "/api/generate-quiz";
const EXPLAIN_PATH: &str = "/api/explain";

/// The three operations of the question-generation service.
#[async_trait]
pub trait QuizService: Send + Sync {
    async fn parse_document(&self, document: &Document) -> Result<Intake, ServiceError>;

    async fn generate_quiz(
        &self,
        extracted_text: &str,
        topic: &str,
        count: usize,
    ) -> Result<Vec<Question>, ServiceError>;

    async fn explain_answer(&self, request: &ExplainRequest) -> Result<String, ServiceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplainRequest {
    pub question: String,
    pub options: OptionSet,
    pub correct_answer: String,
    pub user_answer: String,
    pub topic: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    topics: Vec<String>,
    syllabus_text: String,
}

#[derive(Debug, Serialize)]
struct GenerateQuizRequest<'a> {
    syllabus_text: &'a str,
    topic: &'a str,
    num_questions: usize,
}

#[derive(Debug, Deserialize)]
struct GenerateQuizResponse {
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct ExplainResponse {
    explanation: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct HttpQuizService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpQuizService {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ServiceError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(base_url, http))
    }

    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl QuizService for HttpQuizService {
    async fn parse_document(&self, document: &Document) -> Result<Intake, ServiceError> {
        let url = self.endpoint(UPLOAD_PATH);
        logger::log(&format!(
            "POST {} ({}, {} bytes)",
            url,
            document.file_name,
            document.bytes.len()
        ));

        let part = Part::bytes(document.bytes.clone())
            .file_name(document.file_name.clone())
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        let response = self.http.post(url).multipart(form).send().await?;
        let body: UploadResponse = read_json(response, "Failed to process document").await?;

        Ok(Intake {
            extracted_text: body.syllabus_text,
            topics: body.topics,
        })
    }

    async fn generate_quiz(
        &self,
        extracted_text: &str,
        topic: &str,
        count: usize,
    ) -> Result<Vec<Question>, ServiceError> {
        let url = self.endpoint(GENERATE_PATH);
        logger::log(&format!("POST {} (topic '{}', {} questions)", url, topic, count));

        let response = self
            .http
            .post(url)
            .json(&GenerateQuizRequest {
                syllabus_text: extracted_text,
                topic,
                num_questions: count,
            })
            .send()
            .await?;
        let body: GenerateQuizResponse = read_json(response, "Failed to generate quiz").await?;
        Ok(body.questions)
    }

    async fn explain_answer(&self, request: &ExplainRequest) -> Result<String, ServiceError> {
        let url = self.endpoint(EXPLAIN_PATH);
        logger::log(&format!("POST {}", url));

        let response = self.http.post(url).json(request).send().await?;
        let body: ExplainResponse = read_json(response, "Failed to load explanation").await?;
        Ok(body.explanation)
    }
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    fallback: &str,
) -> Result<T, ServiceError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let message = error_detail(&body).unwrap_or_else(|| failure_message(fallback, status));
        logger::log(&format!("Service returned {}: {}", status, message));
        return Err(ServiceError::Service(message));
    }

    serde_json::from_slice(&body).map_err(|e| ServiceError::Decode(e.to_string()))
}

/// Extracts a non-empty string `detail` from an error body.
fn error_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail),
        _ => None,
    }
}

fn failure_message(fallback: &str, status: StatusCode) -> String {
    format!("{} (status {})", fallback, status.as_u16())
}
