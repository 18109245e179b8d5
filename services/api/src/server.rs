use crate::cli::ServeArgs;
use crate::infra::{build_engine, AppState, RecommendationService};
use crate::routes::recommendation_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use strategy_agent::config::AppConfig;
use strategy_agent::error::AppError;
use strategy_agent::telemetry;
use strategy_agent::workflows::recommendation::FileReportStore;
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

    let engine = build_engine(&config, &config.data.dir, config.pipeline.clone()).await?;
    let archive = FileReportStore::new(config.output.report_dir.clone());
    info!(report_dir = %archive.dir().display(), "archiving reports to disk");
    let service = Arc::new(RecommendationService::new(Arc::new(engine), Some(archive)));

    let app = recommendation_router(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "strategy agent ready");

    axum::serve(listener, app).await?;
    Ok(())
}
