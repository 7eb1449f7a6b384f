use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::wellness::repository::AssessmentRepository;
use crate::wellness::router::{
    complete_module_handler, log_assessment_handler, recommendation_handler,
};
use crate::wellness::WellnessService;

fn json_request(method: &str, uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn assessment_route_returns_created_view() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/users/student-42/assessments",
            json!({ "assessment_type": "GAD-7", "raw_score": 0 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["assessment_type"], "GAD-7");
    assert_eq!(payload["normalized_score"], 10.0);
    assert_eq!(payload["user_id"], "student-42");
}

#[tokio::test]
async fn out_of_range_score_names_the_field() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/users/student-42/assessments",
            json!({ "assessment_type": "Daily Mood", "raw_score": 6 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "raw_score");
}

#[tokio::test]
async fn unknown_assessment_type_names_the_field() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/wellness/normalize",
            json!({ "assessment_type": "XYZ", "raw_score": 5 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "assessment_type");
}

#[tokio::test]
async fn normalize_route_maps_onto_wellness_scale() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/wellness/normalize",
            json!({ "assessment_type": "Daily Mood", "raw_score": 1 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["normalized_score"], 2.0);
}

#[tokio::test]
async fn sequence_route_checks_progression() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/modules/sequence",
            json!({ "modules": [3, 4] }),
        ))
        .await
        .expect("route executes");
    assert_eq!(read_json_body(response).await["valid"], true);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/modules/sequence",
            json!({ "modules": [8, 1] }),
        ))
        .await
        .expect("route executes");
    assert_eq!(read_json_body(response).await["valid"], false);
}

#[tokio::test]
async fn completion_route_rejects_unknown_module() {
    let (service, _, publisher) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::post("/api/v1/users/student-42/modules/9/completion")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "module_id");
    assert!(publisher.events().is_empty());
}

#[tokio::test]
async fn completion_route_rejects_unparseable_module_ids() {
    let (service, repository, publisher) = build_service();
    let router = router_with_service(service);

    for segment in ["300", "-1", "breathing"] {
        let response = router
            .clone()
            .oneshot(
                Request::post(format!("/api/v1/users/student-42/modules/{segment}/completion"))
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "segment {segment}");
        let payload = read_json_body(response).await;
        assert_eq!(payload["field"], "module_id");
    }

    assert!(repository
        .completed_modules(&user())
        .expect("completions")
        .is_empty());
    assert!(publisher.events().is_empty());
}

#[tokio::test]
async fn completion_handler_reports_new_completion() {
    let (service, _, publisher) = build_service();

    let response = complete_module_handler::<MemoryRepository, MemoryPublisher>(
        State(Arc::new(service)),
        Path(("student-42".to_string(), "5".to_string())),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["newly_completed"], true);
    assert_eq!(payload["module_name"], "Behavioral Activation");
    assert_eq!(publisher.events().len(), 1);
}

#[tokio::test]
async fn duplicate_submission_returns_conflict() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);

    let first = log_assessment_handler::<MemoryRepository, MemoryPublisher>(
        State(service.clone()),
        Path("student-42".to_string()),
        axum::Json(submission("PHQ-9", 11.0, 2)),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = log_assessment_handler::<MemoryRepository, MemoryPublisher>(
        State(service),
        Path("student-42".to_string()),
        axum::Json(submission("PHQ-9", 11.0, 2)),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn recommendation_route_reflects_latest_assessment() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let router = crate::wellness::wellness_router(service.clone());

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users/student-42/assessments",
            json!({ "assessment_type": "GAD-7", "raw_score": 18 }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .oneshot(
            Request::get("/api/v1/users/student-42/recommendation")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["module_name"], "Cognitive Restructuring");
    assert_eq!(payload["priority"], "high");
}

#[tokio::test]
async fn wellness_route_defaults_to_neutral_score() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/users/newcomer/wellness")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["wellness_score"], 5.0);
    assert_eq!(payload["records_in_window"], 0);
}

#[tokio::test]
async fn report_route_returns_trend() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/users/newcomer/report")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["trend"], "insufficient_data");
    assert_eq!(payload["recommendation"]["module_name"], "Sleep Hygiene");
}

#[tokio::test]
async fn repository_outage_returns_internal_error() {
    let service = Arc::new(WellnessService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryPublisher::default()),
        wellness_config(),
    ));

    let response = recommendation_handler::<UnavailableRepository, MemoryPublisher>(
        State(service),
        Path("student-42".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
