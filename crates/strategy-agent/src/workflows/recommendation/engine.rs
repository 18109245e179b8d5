use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use super::adjudicator::{AdjudicationRequest, Adjudicator, ReasoningError};
use super::classifier::{classify, CustomerClassification};
use super::config::PipelineConfig;
use super::domain::{Candidate, Decision, FailureStage, ItemFailure};
use super::embedding::{Embedder, EmbeddingError};
use super::history::PurchaseHistoryFilter;
use super::ranker::{ProductIndex, SimilarityRanker};
use super::report::{ItemOutcome, RecommendationReport, ReportAssembler};
use super::upsell::UpsellEvaluator;
use crate::workflows::catalogue::{CatalogueItem, CustomerId, Dataset, PurchaseHistory};

#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("customer {0} not found")]
    CustomerNotFound(CustomerId),
    #[error("failed to build product embedding index: {0}")]
    ProductIndex(#[source] EmbeddingError),
}

/// Runs the cross-sell and upsell pipeline for one customer at a time. Holds
/// no per-run state, so one engine serves concurrent runs.
pub struct RecommendationEngine {
    dataset: Arc<Dataset>,
    ranker: SimilarityRanker,
    adjudicator: Arc<dyn Adjudicator>,
    upsell: UpsellEvaluator,
    config: PipelineConfig,
}

impl RecommendationEngine {
    /// Embeds the product table up front; an embedding failure here aborts.
    pub async fn build(
        dataset: Arc<Dataset>,
        embedder: Arc<dyn Embedder>,
        adjudicator: Arc<dyn Adjudicator>,
        config: PipelineConfig,
    ) -> Result<Self, RecommendationError> {
        let index = ProductIndex::build(embedder.as_ref(), dataset.products())
            .await
            .map_err(RecommendationError::ProductIndex)?;
        let ranker = SimilarityRanker::new(
            embedder,
            index,
            config.similarity_threshold,
            config.top_k,
        );
        if ranker.index().is_empty() {
            tracing::warn!("product table is empty; no cross-sell candidates can be ranked");
        } else {
            tracing::info!(products = ranker.index().len(), "product index ready");
        }

        Ok(Self {
            dataset,
            ranker,
            adjudicator,
            upsell: UpsellEvaluator::new(config.upsell_margin),
            config,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn classify(&self, customer_id: &CustomerId) -> Option<CustomerClassification> {
        self.dataset.customer(customer_id)?;
        let history = self.dataset.purchase_history(customer_id);
        Some(classify(
            history.total_quantity(),
            self.dataset.store_count(customer_id),
        ))
    }

    pub async fn run(
        &self,
        customer_id: &CustomerId,
    ) -> Result<RecommendationReport, RecommendationError> {
        self.run_with(customer_id, self.config.upsell_enabled).await
    }

    /// Same as [`run`](Self::run) with upsell enablement chosen per call.
    pub async fn run_with(
        &self,
        customer_id: &CustomerId,
        upsell_enabled: bool,
    ) -> Result<RecommendationReport, RecommendationError> {
        let customer = self
            .dataset
            .customer(customer_id)
            .ok_or_else(|| RecommendationError::CustomerNotFound(customer_id.clone()))?;

        let history = self.dataset.purchase_history(customer_id);
        let classification = classify(
            history.total_quantity(),
            self.dataset.store_count(customer_id),
        );
        tracing::info!(
            customer_id = %customer_id,
            customer = %customer.name,
            tier = classification.customer_type.label(),
            total_quantity_sold = classification.total_quantity_sold,
            stores = classification.number_of_stores,
            "customer classified"
        );

        let mut assembler = ReportAssembler::new(customer, classification, upsell_enabled);
        for item in self.dataset.catalogue_for(customer_id) {
            let outcome = self.process_item(item, &history, upsell_enabled).await;
            assembler.push(outcome);
        }

        let report = assembler.finish(Utc::now());
        tracing::info!(
            customer_id = %customer_id,
            accepted = report.summary.total_cross_sell,
            rejected = report.summary.total_rejected,
            already_purchased = report.summary.total_already_purchased,
            upsell = report.summary.total_up_sell,
            failed_items = report.summary.total_failed_items,
            "recommendation run complete"
        );
        Ok(report)
    }

    async fn process_item(
        &self,
        item: &CatalogueItem,
        history: &PurchaseHistory,
        upsell_enabled: bool,
    ) -> ItemOutcome {
        let mut outcome = ItemOutcome::new(item.clone());

        match self.ranker.rank(item).await {
            Ok(candidates) => {
                let (decisions, errors) = self.adjudicate(item, &candidates).await;
                outcome.decisions = PurchaseHistoryFilter::new(history).apply_all(decisions);
                if let Some(failure) = adjudication_failure(item, candidates.len(), errors) {
                    outcome.failures.push(failure);
                }
            }
            Err(err) => {
                tracing::warn!(catalogue_item = %item.id, error = %err, "similarity ranking failed");
                outcome.failures.push(ItemFailure {
                    catalogue_item_id: item.id.clone(),
                    product_name: item.product_name.clone(),
                    stage: FailureStage::Similarity,
                    error: err.to_string(),
                });
            }
        }

        if upsell_enabled {
            let linked = item
                .linked_item_id
                .as_ref()
                .and_then(|id| self.dataset.product(id));
            outcome.upsell = self.upsell.evaluate(item, history, linked);
        }

        outcome
    }

    /// Adjudicates candidates with bounded concurrency; results keep
    /// candidate order.
    async fn adjudicate(
        &self,
        item: &CatalogueItem,
        candidates: &[Candidate],
    ) -> (Vec<Decision>, Vec<ReasoningError>) {
        let requests: Vec<AdjudicationRequest<'_>> = candidates
            .iter()
            .map(|candidate| AdjudicationRequest {
                item,
                candidate,
                product_description: self
                    .dataset
                    .product(&candidate.product_id)
                    .and_then(|product| product.description.as_deref()),
            })
            .collect();
        let pending: Vec<_> = requests
            .iter()
            .map(|request| self.adjudicator.adjudicate(request))
            .collect();
        let results: Vec<Result<Decision, ReasoningError>> = stream::iter(pending)
            .buffered(self.config.adjudication_concurrency.max(1))
            .collect()
            .await;

        let mut decisions = Vec::with_capacity(results.len());
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(decision) => decisions.push(decision),
                Err(err) => errors.push(err),
            }
        }
        (decisions, errors)
    }
}

fn adjudication_failure(
    item: &CatalogueItem,
    attempted: usize,
    errors: Vec<ReasoningError>,
) -> Option<ItemFailure> {
    let first = errors.first()?;
    tracing::warn!(
        catalogue_item = %item.id,
        failed = errors.len(),
        attempted,
        error = %first,
        "adjudication failed"
    );
    Some(ItemFailure {
        catalogue_item_id: item.id.clone(),
        product_name: item.product_name.clone(),
        stage: FailureStage::Adjudication,
        error: format!("{} of {attempted} adjudications failed: {first}", errors.len()),
    })
}
