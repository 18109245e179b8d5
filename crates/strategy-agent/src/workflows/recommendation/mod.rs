//! Cross-sell and upsell recommendation pipeline: similarity ranking, AI
//! adjudication, purchase-history filtering, upsell evaluation and report
//! assembly for one customer per run.

pub mod adjudicator;
pub mod classifier;
mod config;
pub mod domain;
pub mod embedding;
pub mod engine;
pub mod history;
pub mod ranker;
pub mod report;
pub mod repository;
pub mod similarity;
pub mod upsell;

#[cfg(test)]
pub(crate) mod tests;

pub use adjudicator::{
    AdjudicationRequest, Adjudicator, ChatCompletionsClient, ReasoningAdjudicator,
    ReasoningClient, ReasoningConfig, ReasoningError,
};
pub use classifier::{classify, ClassificationCriteria, CustomerClassification, CustomerTier};
pub use config::PipelineConfig;
pub use domain::{
    Candidate, Decision, DecisionStatus, FailureStage, ItemFailure, UpsellKind, UpsellSuggestion,
};
pub use embedding::{Embedder, EmbeddingConfig, EmbeddingError, HttpEmbedder};
pub use engine::{RecommendationEngine, RecommendationError};
pub use report::{CustomerInfo, ItemRecommendations, RecommendationReport, ReportSummary};
pub use repository::{FileReportStore, ReportRepository, ReportStoreError, StoredReport};
