use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::classifier::CustomerClassification;
use super::super::domain::{Decision, ItemFailure, UpsellSuggestion};
use crate::workflows::catalogue::{CatalogueItemId, Customer, CustomerId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub customer_type: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
}

impl From<&Customer> for CustomerInfo {
    fn from(customer: &Customer) -> Self {
        Self {
            customer_id: customer.id.clone(),
            customer_name: customer.name.clone(),
            customer_type: customer.customer_type.clone(),
            country: customer.country.clone(),
            region: customer.region.clone(),
        }
    }
}

/// One catalogue item's decisions within a single bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecommendations {
    pub catalogue_item_id: CatalogueItemId,
    pub product_name: String,
    pub quantity_required: u64,
    pub ingredients: Vec<String>,
    pub cross_sell: Vec<Decision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_sell: Option<UpsellSuggestion>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_up_sell: usize,
    /// Accepted cross-sell decisions only.
    pub total_cross_sell: usize,
    pub total_rejected: usize,
    pub total_already_purchased: usize,
    pub total_recommendations: usize,
    pub total_failed_items: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub customer: CustomerInfo,
    pub classification: CustomerClassification,
    pub upsell_enabled: bool,
    pub accepted: Vec<ItemRecommendations>,
    pub rejected: Vec<ItemRecommendations>,
    pub already_purchased: Vec<ItemRecommendations>,
    #[serde(default)]
    pub failures: Vec<ItemFailure>,
    pub summary: ReportSummary,
    pub generated_at: DateTime<Utc>,
}

impl RecommendationReport {
    pub fn customer_id(&self) -> &CustomerId {
        &self.customer.customer_id
    }

    /// Every cross-sell decision across the three buckets.
    pub fn decisions(&self) -> impl Iterator<Item = &Decision> + '_ {
        self.accepted
            .iter()
            .chain(&self.rejected)
            .chain(&self.already_purchased)
            .flat_map(|entry| entry.cross_sell.iter())
    }

    pub fn upsells(&self) -> impl Iterator<Item = &UpsellSuggestion> + '_ {
        self.accepted.iter().filter_map(|entry| entry.up_sell.as_ref())
    }

    pub fn estimated_upsell_revenue(&self) -> f64 {
        self.upsells().map(|upsell| upsell.estimated_revenue).sum()
    }
}
