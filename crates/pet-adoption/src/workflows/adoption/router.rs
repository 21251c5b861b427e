use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::directory::{NeedCatalog, PetDirectory, QuestionBank};
use super::domain::{AdoptionRequestId, AlternativeId, PetId, QuestionId, UserId};
use super::error::AdoptionError;
use super::ledger::AdoptionRequestSummary;
use super::repository::AdoptionRepository;
use super::service::AdoptionFormService;

/// Header carrying the authenticated caller, set by the auth layer in front of this service.
pub const CALLER_HEADER: &str = "x-user-id";

/// Body of an answer submission. Without `question_id` the answer goes to the
/// question the session is waiting on.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AnswerRequest {
    #[serde(default, alias = "questionId")]
    pub question_id: Option<QuestionId>,
    #[serde(alias = "alternativeId")]
    pub alternative_id: AlternativeId,
}

/// Router builder exposing the questionnaire and request ledger endpoints.
pub fn adoption_router<C, R>(service: Arc<AdoptionFormService<C, R>>) -> Router
where
    C: PetDirectory + QuestionBank + NeedCatalog + 'static,
    R: AdoptionRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/form/adopt/:pet_id",
            get(progress_handler::<C, R>).post(answer_handler::<C, R>),
        )
        .route("/api/v1/form/:request_id", get(request_handler::<C, R>))
        .route("/api/v1/pet/forms/:pet_id", get(list_requests_handler::<C, R>))
        .route("/api/v1/pet/needs", get(needs_handler::<C, R>))
        .with_state(service)
}

pub(crate) async fn progress_handler<C, R>(
    State(service): State<Arc<AdoptionFormService<C, R>>>,
    Path(pet_id): Path<u32>,
    headers: HeaderMap,
) -> Response
where
    C: PetDirectory + QuestionBank + NeedCatalog + 'static,
    R: AdoptionRepository + 'static,
{
    let caller = match caller_id(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match service.get_progress(caller, PetId(pet_id)) {
        Ok(progress) => (StatusCode::OK, axum::Json(progress)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn answer_handler<C, R>(
    State(service): State<Arc<AdoptionFormService<C, R>>>,
    Path(pet_id): Path<u32>,
    headers: HeaderMap,
    axum::Json(answer): axum::Json<AnswerRequest>,
) -> Response
where
    C: PetDirectory + QuestionBank + NeedCatalog + 'static,
    R: AdoptionRepository + 'static,
{
    let caller = match caller_id(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    let pet_id = PetId(pet_id);
    let outcome = match answer.question_id {
        Some(question_id) => service.answer(caller, pet_id, question_id, answer.alternative_id),
        None => service.answer_current(caller, pet_id, answer.alternative_id),
    };

    match outcome {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_requests_handler<C, R>(
    State(service): State<Arc<AdoptionFormService<C, R>>>,
    Path(pet_id): Path<u32>,
    headers: HeaderMap,
) -> Response
where
    C: PetDirectory + QuestionBank + NeedCatalog + 'static,
    R: AdoptionRepository + 'static,
{
    let caller = match caller_id(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match service.list_requests(PetId(pet_id), caller) {
        Ok(requests) => {
            let summaries: Vec<AdoptionRequestSummary> =
                requests.iter().map(|request| request.summary()).collect();
            (StatusCode::OK, axum::Json(summaries)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn request_handler<C, R>(
    State(service): State<Arc<AdoptionFormService<C, R>>>,
    Path(request_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    C: PetDirectory + QuestionBank + NeedCatalog + 'static,
    R: AdoptionRepository + 'static,
{
    let caller = match caller_id(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match service.request_detail(caller, &AdoptionRequestId(request_id)) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn needs_handler<C, R>(
    State(service): State<Arc<AdoptionFormService<C, R>>>,
) -> Response
where
    C: PetDirectory + QuestionBank + NeedCatalog + 'static,
    R: AdoptionRepository + 'static,
{
    match service.active_needs() {
        Ok(needs) => (StatusCode::OK, axum::Json(needs)).into_response(),
        Err(error) => error_response(error),
    }
}

fn caller_id(headers: &HeaderMap) -> Result<UserId, Response> {
    headers
        .get(CALLER_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u32>().ok())
        .map(UserId)
        .ok_or_else(|| {
            let payload = json!({
                "error": format!("missing or invalid {CALLER_HEADER} header"),
                "kind": "unauthenticated",
            });
            (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
        })
}

pub(crate) fn error_response(error: AdoptionError) -> Response {
    let status = match error {
        AdoptionError::NotFound(_) => StatusCode::NOT_FOUND,
        AdoptionError::InvalidState(_) => StatusCode::BAD_REQUEST,
        AdoptionError::Forbidden(_) => StatusCode::FORBIDDEN,
        AdoptionError::Conflict(_) => StatusCode::CONFLICT,
        AdoptionError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };

    let payload = json!({
        "error": error.to_string(),
        "kind": error.kind(),
    });
    (status, axum::Json(payload)).into_response()
}
