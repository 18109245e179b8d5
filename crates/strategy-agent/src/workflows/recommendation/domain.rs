use crate::workflows::catalogue::{CatalogueItemId, ProductId};
use serde::{Deserialize, Serialize};

/// A product proposed for one ingredient of a catalogue item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub ingredient: String,
    pub suggested_product: String,
    pub product_id: ProductId,
    pub similarity_score: f64,
    pub category: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Accepted,
    Rejected,
    AlreadyPurchased,
}

impl DecisionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
            Self::AlreadyPurchased => "Already Purchased",
        }
    }
}

/// Outcome of adjudicating one candidate. `ai_reasoning` is the reasoning
/// service reply, verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub status: DecisionStatus,
    pub ai_reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsellKind {
    QuantityIncrease,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsellSuggestion {
    #[serde(rename = "type")]
    pub kind: UpsellKind,
    pub product_id: ProductId,
    pub quantity_sold: u64,
    pub quantity_required: u64,
    pub recommended_quantity: u64,
    pub estimated_revenue: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Similarity,
    Adjudication,
}

impl FailureStage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Similarity => "similarity ranking",
            Self::Adjudication => "AI adjudication",
        }
    }
}

/// A catalogue item whose processing hit an external service failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub catalogue_item_id: CatalogueItemId,
    pub product_name: String,
    pub stage: FailureStage,
    pub error: String,
}
