use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAssessmentRepository, InMemoryCompletionPublisher};
use crate::routes::with_wellness_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use mindful_horizon::config::AppConfig;
use mindful_horizon::error::AppError;
use mindful_horizon::telemetry;
use mindful_horizon::wellness::WellnessService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let window_days = config.wellness.window_days;
    let wellness_service = Arc::new(WellnessService::new(
        Arc::new(InMemoryAssessmentRepository::default()),
        Arc::new(InMemoryCompletionPublisher::default()),
        config.wellness.clone(),
    ));

    let app = with_wellness_routes(wellness_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, window_days, "wellness engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
