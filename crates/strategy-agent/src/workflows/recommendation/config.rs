use serde::{Deserialize, Serialize};

/// Tunables for a recommendation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum cosine similarity (inclusive) for a product to become a candidate.
    pub similarity_threshold: f64,
    /// Candidates kept per ingredient.
    pub top_k: usize,
    pub upsell_enabled: bool,
    /// Safety margin applied on top of the required quantity, e.g. `0.10` for 10%.
    pub upsell_margin: f64,
    /// Adjudication calls allowed in flight for one catalogue item.
    pub adjudication_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.7,
            top_k: 3,
            upsell_enabled: true,
            upsell_margin: 0.10,
            adjudication_concurrency: 1,
        }
    }
}
