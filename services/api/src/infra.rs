use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use strategy_agent::config::{AppConfig, ConfigError};
use strategy_agent::error::AppError;
use strategy_agent::workflows::catalogue::{CustomerId, Dataset};
use strategy_agent::workflows::recommendation::{
    ChatCompletionsClient, FileReportStore, HttpEmbedder, PipelineConfig, ReasoningAdjudicator,
    RecommendationEngine, RecommendationReport, ReportRepository, ReportStoreError, StoredReport,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Latest report per customer, kept for the lifetime of the process.
#[derive(Default, Clone)]
pub(crate) struct InMemoryReportStore {
    reports: Arc<Mutex<HashMap<CustomerId, RecommendationReport>>>,
}

impl ReportRepository for InMemoryReportStore {
    fn save(&self, report: &RecommendationReport) -> Result<StoredReport, ReportStoreError> {
        let mut guard = self
            .reports
            .lock()
            .map_err(|_| ReportStoreError::Unavailable("report cache poisoned".to_string()))?;
        guard.insert(report.customer_id().clone(), report.clone());
        Ok(StoredReport {
            customer_id: report.customer_id().clone(),
            location: format!("memory://{}", report.customer_id()),
        })
    }

    fn latest(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<RecommendationReport>, ReportStoreError> {
        let guard = self
            .reports
            .lock()
            .map_err(|_| ReportStoreError::Unavailable("report cache poisoned".to_string()))?;
        Ok(guard.get(customer_id).cloned())
    }
}

/// Runs the engine and keeps what it produces: in memory for quick retrieval
/// and, when configured, as a JSON artifact on disk.
pub(crate) struct RecommendationService {
    engine: Arc<RecommendationEngine>,
    cache: InMemoryReportStore,
    archive: Option<FileReportStore>,
}

impl RecommendationService {
    pub(crate) fn new(engine: Arc<RecommendationEngine>, archive: Option<FileReportStore>) -> Self {
        Self {
            engine,
            cache: InMemoryReportStore::default(),
            archive,
        }
    }

    pub(crate) fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    pub(crate) async fn generate(
        &self,
        customer_id: &CustomerId,
        upsell_enabled: Option<bool>,
    ) -> Result<(RecommendationReport, StoredReport), AppError> {
        let upsell_enabled = upsell_enabled.unwrap_or(self.engine.config().upsell_enabled);
        let report = self.engine.run_with(customer_id, upsell_enabled).await?;

        // Cache only once the archive has accepted the report.
        let archived = match &self.archive {
            Some(archive) => Some(archive.save(&report)?),
            None => None,
        };
        let cached = self.cache.save(&report)?;
        Ok((report, archived.unwrap_or(cached)))
    }

    pub(crate) fn latest(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<RecommendationReport>, AppError> {
        if let Some(report) = self.cache.latest(customer_id)? {
            return Ok(Some(report));
        }
        match &self.archive {
            Some(archive) => Ok(archive.latest(customer_id)?),
            None => Ok(None),
        }
    }
}

/// Wires the dataset, the embedding service and the hosted reasoning service
/// into an engine.
pub(crate) async fn build_engine(
    config: &AppConfig,
    data_dir: &Path,
    pipeline: PipelineConfig,
) -> Result<RecommendationEngine, AppError> {
    let dataset = Dataset::from_dir(data_dir)?;

    let api_key = config
        .reasoning
        .api_key
        .clone()
        .ok_or(ConfigError::MissingApiKey)?;
    let client = ChatCompletionsClient::new(config.reasoning.clone(), api_key)?;
    let embedder = HttpEmbedder::new(config.embedding.clone());

    tracing::info!(
        embedding_model = %config.embedding.model,
        reasoning_model = %config.reasoning.model,
        threshold = pipeline.similarity_threshold,
        top_k = pipeline.top_k,
        "building recommendation engine"
    );

    let engine = RecommendationEngine::build(
        Arc::new(dataset),
        Arc::new(embedder),
        Arc::new(ReasoningAdjudicator::new(client)),
        pipeline,
    )
    .await?;
    Ok(engine)
}
