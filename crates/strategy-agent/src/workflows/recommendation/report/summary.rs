use chrono::{DateTime, Utc};

use super::views::{CustomerInfo, ItemRecommendations, RecommendationReport, ReportSummary};
use crate::workflows::catalogue::{CatalogueItem, Customer};
use crate::workflows::recommendation::classifier::CustomerClassification;
use crate::workflows::recommendation::domain::{
    Decision, DecisionStatus, ItemFailure, UpsellSuggestion,
};

/// Everything the pipeline produced for one catalogue item.
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    pub item: CatalogueItem,
    pub decisions: Vec<Decision>,
    pub upsell: Option<UpsellSuggestion>,
    pub failures: Vec<ItemFailure>,
}

impl ItemOutcome {
    pub fn new(item: CatalogueItem) -> Self {
        Self {
            item,
            decisions: Vec::new(),
            upsell: None,
            failures: Vec::new(),
        }
    }
}

/// Folds item outcomes, in catalogue order, into one report per customer.
#[derive(Debug)]
pub struct ReportAssembler {
    customer: CustomerInfo,
    classification: CustomerClassification,
    upsell_enabled: bool,
    accepted: Vec<ItemRecommendations>,
    rejected: Vec<ItemRecommendations>,
    already_purchased: Vec<ItemRecommendations>,
    failures: Vec<ItemFailure>,
}

impl ReportAssembler {
    pub fn new(
        customer: &Customer,
        classification: CustomerClassification,
        upsell_enabled: bool,
    ) -> Self {
        Self {
            customer: CustomerInfo::from(customer),
            classification,
            upsell_enabled,
            accepted: Vec::new(),
            rejected: Vec::new(),
            already_purchased: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: ItemOutcome) {
        let ItemOutcome {
            item,
            decisions,
            upsell,
            failures,
        } = outcome;

        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        let mut already_purchased = Vec::new();
        for decision in decisions {
            match decision.status {
                DecisionStatus::Accepted => accepted.push(decision),
                DecisionStatus::Rejected => rejected.push(decision),
                DecisionStatus::AlreadyPurchased => already_purchased.push(decision),
            }
        }

        if !accepted.is_empty() || upsell.is_some() {
            self.accepted.push(entry(&item, accepted, upsell));
        }
        if !rejected.is_empty() {
            self.rejected.push(entry(&item, rejected, None));
        }
        if !already_purchased.is_empty() {
            self.already_purchased
                .push(entry(&item, already_purchased, None));
        }
        self.failures.extend(failures);
    }

    pub fn finish(self, generated_at: DateTime<Utc>) -> RecommendationReport {
        let count = |bucket: &[ItemRecommendations]| -> usize {
            bucket.iter().map(|entry| entry.cross_sell.len()).sum()
        };

        let total_cross_sell = count(&self.accepted);
        let total_rejected = count(&self.rejected);
        let total_already_purchased = count(&self.already_purchased);
        let failed_items: std::collections::HashSet<_> = self
            .failures
            .iter()
            .map(|failure| &failure.catalogue_item_id)
            .collect();

        let summary = ReportSummary {
            total_up_sell: self
                .accepted
                .iter()
                .filter(|entry| entry.up_sell.is_some())
                .count(),
            total_cross_sell,
            total_rejected,
            total_already_purchased,
            total_recommendations: total_cross_sell + total_rejected + total_already_purchased,
            total_failed_items: failed_items.len(),
        };

        RecommendationReport {
            customer: self.customer,
            classification: self.classification,
            upsell_enabled: self.upsell_enabled,
            accepted: self.accepted,
            rejected: self.rejected,
            already_purchased: self.already_purchased,
            failures: self.failures,
            summary,
            generated_at,
        }
    }
}

fn entry(
    item: &CatalogueItem,
    cross_sell: Vec<Decision>,
    up_sell: Option<UpsellSuggestion>,
) -> ItemRecommendations {
    ItemRecommendations {
        catalogue_item_id: item.id.clone(),
        product_name: item.product_name.clone(),
        quantity_required: item.quantity_required,
        ingredients: item.ingredients.clone(),
        cross_sell,
        up_sell,
    }
}
