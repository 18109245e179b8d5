use crate::infra::{AppState, RecommendationService};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use strategy_agent::error::AppError;
use strategy_agent::workflows::catalogue::CustomerId;
use strategy_agent::workflows::recommendation::{
    CustomerClassification, RecommendationReport, StoredReport,
};

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendationRequest {
    pub(crate) customer_id: String,
    /// Overrides the configured upsell enablement for this run.
    #[serde(default)]
    pub(crate) upsell: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecommendationResponse {
    pub(crate) stored: StoredReport,
    pub(crate) report: RecommendationReport,
}

#[derive(Debug, Serialize)]
pub(crate) struct CustomerEntry {
    pub(crate) customer_id: CustomerId,
    pub(crate) customer_name: String,
    pub(crate) country: Option<String>,
    pub(crate) region: Option<String>,
    pub(crate) catalogue_items: usize,
    pub(crate) classification: Option<CustomerClassification>,
}

pub(crate) fn recommendation_router(service: Arc<RecommendationService>) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/customers", get(customers_endpoint))
        .route(
            "/api/v1/recommendations",
            axum::routing::post(generate_endpoint),
        )
        .route(
            "/api/v1/recommendations/:customer_id",
            get(latest_report_endpoint),
        )
        .with_state(service)
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

pub(crate) async fn customers_endpoint(
    State(service): State<Arc<RecommendationService>>,
) -> Json<Vec<CustomerEntry>> {
    let engine = service.engine();
    let dataset = engine.dataset();
    let customers = dataset
        .customers()
        .iter()
        .map(|customer| CustomerEntry {
            customer_id: customer.id.clone(),
            customer_name: customer.name.clone(),
            country: customer.country.clone(),
            region: customer.region.clone(),
            catalogue_items: dataset.catalogue_for(&customer.id).count(),
            classification: engine.classify(&customer.id),
        })
        .collect();
    Json(customers)
}

pub(crate) async fn generate_endpoint(
    State(service): State<Arc<RecommendationService>>,
    Json(payload): Json<RecommendationRequest>,
) -> Result<Json<RecommendationResponse>, AppError> {
    let customer_id = parse_customer_id(&payload.customer_id)?;
    let (report, stored) = service.generate(&customer_id, payload.upsell).await?;
    Ok(Json(RecommendationResponse { stored, report }))
}

pub(crate) async fn latest_report_endpoint(
    State(service): State<Arc<RecommendationService>>,
    Path(customer_id): Path<String>,
) -> Result<Json<RecommendationReport>, AppError> {
    let customer_id = parse_customer_id(&customer_id)?;
    service
        .latest(&customer_id)?
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound(format!("no recommendations stored for customer {customer_id}"))
        })
}

fn parse_customer_id(raw: &str) -> Result<CustomerId, AppError> {
    if raw.trim().is_empty() {
        return Err(AppError::BadRequest("customer_id is required".to_string()));
    }
    Ok(CustomerId::normalized(raw))
}
