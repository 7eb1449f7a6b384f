use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{ModuleId, UserId};
use super::recommendation::validate_sequence;
use super::repository::{
    AssessmentRepository, AssessmentSubmission, CompletionPublisher, RepositoryError,
};
use super::scoring::normalize;
use super::service::{WellnessService, WellnessServiceError};

/// Router builder exposing assessment intake, scoring, and recommendations.
pub fn wellness_router<R, P>(service: Arc<WellnessService<R, P>>) -> Router
where
    R: AssessmentRepository + 'static,
    P: CompletionPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/users/:user_id/assessments",
            post(log_assessment_handler::<R, P>),
        )
        .route(
            "/api/v1/users/:user_id/modules/:module_id/completion",
            post(complete_module_handler::<R, P>),
        )
        .route(
            "/api/v1/users/:user_id/wellness",
            get(wellness_handler::<R, P>),
        )
        .route(
            "/api/v1/users/:user_id/recommendation",
            get(recommendation_handler::<R, P>),
        )
        .route("/api/v1/users/:user_id/report", get(report_handler::<R, P>))
        .route("/api/v1/wellness/normalize", post(normalize_handler))
        .route("/api/v1/modules/sequence", post(sequence_handler))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct NormalizeRequest {
    pub(crate) assessment_type: String,
    pub(crate) raw_score: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SequenceRequest {
    pub(crate) modules: Vec<ModuleId>,
}

pub(crate) async fn log_assessment_handler<R, P>(
    State(service): State<Arc<WellnessService<R, P>>>,
    Path(user_id): Path<String>,
    axum::Json(submission): axum::Json<AssessmentSubmission>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: CompletionPublisher + 'static,
{
    let user = UserId(user_id);
    match service.log_assessment(&user, submission, Utc::now()) {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn complete_module_handler<R, P>(
    State(service): State<Arc<WellnessService<R, P>>>,
    Path((user_id, module_id)): Path<(String, String)>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: CompletionPublisher + 'static,
{
    let Ok(module_id) = module_id.trim().parse::<u8>() else {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": format!("module {module_id} is not in the intervention catalog"),
                "field": "module_id",
            })),
        )
            .into_response();
    };

    let user = UserId(user_id);
    match service.complete_module(&user, ModuleId(module_id), Utc::now()) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn wellness_handler<R, P>(
    State(service): State<Arc<WellnessService<R, P>>>,
    Path(user_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: CompletionPublisher + 'static,
{
    match service.wellness(&UserId(user_id), Utc::now()) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn recommendation_handler<R, P>(
    State(service): State<Arc<WellnessService<R, P>>>,
    Path(user_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: CompletionPublisher + 'static,
{
    match service.recommendation(&UserId(user_id), Utc::now()) {
        Ok(recommendation) => (StatusCode::OK, axum::Json(recommendation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_handler<R, P>(
    State(service): State<Arc<WellnessService<R, P>>>,
    Path(user_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: CompletionPublisher + 'static,
{
    match service.report(&UserId(user_id), Utc::now()) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn normalize_handler(axum::Json(request): axum::Json<NormalizeRequest>) -> Response {
    match normalize(&request.assessment_type, request.raw_score) {
        Ok(normalized_score) => (
            StatusCode::OK,
            axum::Json(json!({ "normalized_score": normalized_score })),
        )
            .into_response(),
        Err(error) => error_response(WellnessServiceError::Scoring(error)),
    }
}

pub(crate) async fn sequence_handler(axum::Json(request): axum::Json<SequenceRequest>) -> Response {
    let valid = validate_sequence(&request.modules);
    (StatusCode::OK, axum::Json(json!({ "valid": valid }))).into_response()
}

fn error_response(error: WellnessServiceError) -> Response {
    let (status, payload) = match &error {
        WellnessServiceError::Scoring(scoring) => (
            StatusCode::BAD_REQUEST,
            json!({ "error": scoring.to_string(), "field": scoring.field() }),
        ),
        WellnessServiceError::UnknownModule(_) => (
            StatusCode::BAD_REQUEST,
            json!({ "error": error.to_string(), "field": "module_id" }),
        ),
        WellnessServiceError::Repository(RepositoryError::Conflict) => (
            StatusCode::CONFLICT,
            json!({ "error": error.to_string() }),
        ),
        WellnessServiceError::Repository(_) | WellnessServiceError::Publish(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": error.to_string() }),
        ),
    };

    (status, axum::Json(payload)).into_response()
}
