use super::domain::{Decision, DecisionStatus};
use crate::workflows::catalogue::PurchaseHistory;

/// Moves accepted decisions for products the customer already buys into the
/// already-purchased bucket. Reasoning text is kept as is.
#[derive(Debug, Clone, Copy)]
pub struct PurchaseHistoryFilter<'a> {
    history: &'a PurchaseHistory,
}

impl<'a> PurchaseHistoryFilter<'a> {
    pub fn new(history: &'a PurchaseHistory) -> Self {
        Self { history }
    }

    pub fn apply(&self, mut decision: Decision) -> Decision {
        if decision.status == DecisionStatus::Accepted
            && self.history.has_purchased(&decision.candidate.product_id)
        {
            tracing::debug!(
                product = %decision.candidate.product_id,
                "accepted candidate already purchased"
            );
            decision.status = DecisionStatus::AlreadyPurchased;
        }
        decision
    }

    pub fn apply_all(&self, decisions: Vec<Decision>) -> Vec<Decision> {
        decisions
            .into_iter()
            .map(|decision| self.apply(decision))
            .collect()
    }
}
