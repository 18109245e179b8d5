use super::domain::{UpsellKind, UpsellSuggestion};
use crate::workflows::catalogue::{CatalogueItem, Product, PurchaseHistory};

const BASIS_POINTS: u64 = 10_000;

/// Proposes a quantity increase where a customer buys less of a linked
/// product than its catalogue requires.
#[derive(Debug, Clone, Copy)]
pub struct UpsellEvaluator {
    margin_basis_points: u64,
}

impl UpsellEvaluator {
    pub fn new(margin: f64) -> Self {
        Self {
            margin_basis_points: (margin.max(0.0) * BASIS_POINTS as f64).round() as u64,
        }
    }

    /// Emits a suggestion iff the linked product has sales and those sales
    /// fall short of the required quantity.
    pub fn evaluate(
        &self,
        item: &CatalogueItem,
        history: &PurchaseHistory,
        linked_product: Option<&Product>,
    ) -> Option<UpsellSuggestion> {
        let linked_id = item.linked_item_id.as_ref()?;
        let quantity_sold = history.quantity_for(linked_id);
        let quantity_required = item.quantity_required;

        if quantity_sold == 0 || quantity_sold >= quantity_required {
            return None;
        }

        let recommended_quantity = self.recommended_quantity(quantity_required);
        let gap = recommended_quantity - quantity_sold;
        let (estimated_revenue, reasoning) = match linked_product.and_then(|product| product.price) {
            Some(price) => (
                round_currency(gap as f64 * price),
                format!(
                    "Customer requires {quantity_required} units but bought {quantity_sold}; \
                     increasing the order to {recommended_quantity} closes a gap of {gap} units."
                ),
            ),
            None => (
                0.0,
                format!(
                    "Customer requires {quantity_required} units but bought {quantity_sold}; \
                     increasing the order to {recommended_quantity} closes a gap of {gap} units. \
                     No unit price is on file for {linked_id}, so revenue is not estimated."
                ),
            ),
        };

        tracing::debug!(
            catalogue_item = %item.id,
            product = %linked_id,
            quantity_sold,
            recommended_quantity,
            "upsell suggested"
        );

        Some(UpsellSuggestion {
            kind: UpsellKind::QuantityIncrease,
            product_id: linked_id.clone(),
            quantity_sold,
            quantity_required,
            recommended_quantity,
            estimated_revenue,
            reasoning,
        })
    }

    /// Required quantity rounded up by the safety margin; never below the
    /// required quantity.
    pub fn recommended_quantity(&self, quantity_required: u64) -> u64 {
        let scaled = u128::from(quantity_required) * u128::from(BASIS_POINTS.saturating_add(self.margin_basis_points));
        let padded = scaled.div_ceil(u128::from(BASIS_POINTS));
        u64::try_from(padded).unwrap_or(u64::MAX).max(quantity_required)
    }
}

fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::catalogue::{CustomerId, ProductId, SalesRecord};
    use crate::workflows::recommendation::tests::common::{catalogue_item, product};

    fn history(quantity: u64) -> PurchaseHistory {
        let sales = vec![SalesRecord {
            customer_id: CustomerId("C001".to_string()),
            catalogue_item_id: None,
            item_id: ProductId("P-1".to_string()),
            quantity_sold: quantity,
            store_id: None,
        }];
        PurchaseHistory::from_sales(&sales)
    }

    fn linked_item(required: u64) -> CatalogueItem {
        let mut item = catalogue_item("CAT-1", "Chocolate Chip Cookie", "Biscuit Dough");
        item.linked_item_id = Some(ProductId("P-1".to_string()));
        item.quantity_required = required;
        item
    }

    #[test]
    fn shortfall_produces_quantity_increase_with_revenue() {
        let evaluator = UpsellEvaluator::new(0.10);
        let linked = product("P-1", "Cookie Dough", 2.5);

        let suggestion = evaluator
            .evaluate(&linked_item(1_000), &history(400), Some(&linked))
            .expect("suggestion");

        assert_eq!(suggestion.kind, UpsellKind::QuantityIncrease);
        assert_eq!(suggestion.recommended_quantity, 1_100);
        assert!((suggestion.estimated_revenue - 1_750.0).abs() < 1e-9);
        assert_eq!(suggestion.quantity_sold, 400);
    }

    #[test]
    fn never_sold_or_fully_supplied_items_get_nothing() {
        let evaluator = UpsellEvaluator::new(0.10);
        let linked = product("P-1", "Cookie Dough", 2.5);

        assert!(evaluator
            .evaluate(&linked_item(1_000), &PurchaseHistory::default(), Some(&linked))
            .is_none());
        assert!(evaluator
            .evaluate(&linked_item(1_000), &history(1_000), Some(&linked))
            .is_none());
        assert!(evaluator
            .evaluate(&linked_item(1_000), &history(1_500), Some(&linked))
            .is_none());
    }

    #[test]
    fn unlinked_items_get_nothing() {
        let item = catalogue_item("CAT-2", "Bun", "Flour");
        assert!(UpsellEvaluator::new(0.1)
            .evaluate(&item, &history(5), None)
            .is_none());
    }

    #[test]
    fn unknown_price_still_suggests_without_revenue() {
        let suggestion = UpsellEvaluator::new(0.0)
            .evaluate(&linked_item(10), &history(3), None)
            .expect("suggestion");

        assert_eq!(suggestion.recommended_quantity, 10);
        assert_eq!(suggestion.estimated_revenue, 0.0);
        assert!(suggestion.reasoning.contains("No unit price"));
    }

    #[test]
    fn blank_product_price_is_treated_as_unknown() {
        let mut linked = product("P-1", "Cookie Dough", 2.5);
        linked.price = None;

        let suggestion = UpsellEvaluator::new(0.10)
            .evaluate(&linked_item(1_000), &history(400), Some(&linked))
            .expect("suggestion");

        assert_eq!(suggestion.recommended_quantity, 1_100);
        assert_eq!(suggestion.estimated_revenue, 0.0);
        assert!(suggestion.reasoning.contains("No unit price is on file for P-1"));
    }

    #[test]
    fn recommended_quantity_rounds_up() {
        let evaluator = UpsellEvaluator::new(0.10);
        assert_eq!(evaluator.recommended_quantity(7), 8);
        assert_eq!(evaluator.recommended_quantity(0), 0);
    }
}
