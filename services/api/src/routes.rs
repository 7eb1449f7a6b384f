use crate::infra::{deserialize_optional_date, end_of_day, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{NaiveDate, Utc};
use mindful_horizon::error::AppError;
use mindful_horizon::wellness::{
    build_report, wellness_router, AssessmentHistoryImporter, AssessmentRepository,
    CompletionPublisher, ModuleCompletionSet, ModuleId, RecommendationEngine, WellnessReport,
    WellnessService,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryReportRequest {
    pub(crate) history_csv: String,
    #[serde(default)]
    pub(crate) completed: Vec<ModuleId>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) window_days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct HistoryReportResponse {
    pub(crate) records_imported: usize,
    pub(crate) window_days: u32,
    pub(crate) report: WellnessReport,
}

pub(crate) fn with_wellness_routes<R, P>(service: Arc<WellnessService<R, P>>) -> axum::Router
where
    R: AssessmentRepository + 'static,
    P: CompletionPublisher + 'static,
{
    let window_days = service.window_days();
    let engine = Arc::new(service.engine().clone());

    wellness_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/wellness/history-report",
            axum::routing::post(move |Json(payload): Json<HistoryReportRequest>| {
                let engine = engine.clone();
                async move { history_report_endpoint(&engine, window_days, payload) }
            }),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Score an uploaded history export without storing it.
pub(crate) fn history_report_endpoint(
    engine: &RecommendationEngine,
    configured_window: u32,
    payload: HistoryReportRequest,
) -> Result<Json<HistoryReportResponse>, AppError> {
    let HistoryReportRequest {
        history_csv,
        completed,
        as_of,
        window_days,
    } = payload;

    let records = AssessmentHistoryImporter::from_reader(Cursor::new(history_csv.into_bytes()))?;
    let completed: ModuleCompletionSet = completed.into_iter().collect();
    let window_days = window_days
        .filter(|days| *days > 0)
        .unwrap_or(configured_window);
    let as_of = as_of.map(end_of_day).unwrap_or_else(Utc::now);

    let report = build_report(engine, &records, &completed, as_of, window_days);

    Ok(Json(HistoryReportResponse {
        records_imported: records.len(),
        window_days,
        report,
    }))
}
