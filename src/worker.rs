use crate::logger;
use crate::service::QuizService;
use crate::session::{ServiceRequest, ServiceResponse};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Runs one request on the current runtime and posts its completion to `tx`.
/// Requests are independent: explanation calls for different questions may
/// be in flight together and complete in any order.
pub fn spawn_request(
    service: Arc<dyn QuizService>,
    request: ServiceRequest,
    tx: UnboundedSender<ServiceResponse>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let response = run_request(service.as_ref(), request).await;
        if tx.send(response).is_err() {
            logger::log("Response channel closed, dropping response");
        }
    })
}

pub async fn run_request(service: &dyn QuizService, request: ServiceRequest) -> ServiceResponse {
    match request {
        ServiceRequest::ParseDocument { epoch, document } => {
            logger::log(&format!("Worker parsing {}", document.file_name));
            let result = service.parse_document(&document).await;
            ServiceResponse::DocumentParsed { epoch, result }
        }
        ServiceRequest::GenerateQuiz {
            epoch,
            extracted_text,
            topic,
            count,
        } => {
            logger::log(&format!("Worker generating quiz for '{}'", topic));
            let result = service.generate_quiz(&extracted_text, &topic, count).await;
            ServiceResponse::QuizGenerated {
                epoch,
                topic,
                result,
            }
        }
        ServiceRequest::ExplainAnswer {
            epoch,
            question_id,
            request,
        } => {
            logger::log(&format!("Worker explaining question {}", question_id));
            let result = service.explain_answer(&request).await;
            ServiceResponse::Explained {
                epoch,
                question_id,
                result,
            }
        }
    }
}
