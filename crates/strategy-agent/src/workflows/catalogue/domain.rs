use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Ingredients too generic to be worth matching against the product table.
const COMMODITY_INGREDIENTS: [&str; 3] = ["water", "salt", "sugar"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub String);

impl CustomerId {
    /// Customer identifiers are matched case-insensitively by upper-casing input.
    pub fn normalized(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogueItemId(pub String);

impl fmt::Display for CatalogueItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub customer_type: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub total_stores: Option<u32>,
}

/// One row of a customer's catalogue. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogueItem {
    pub id: CatalogueItemId,
    pub customer_id: CustomerId,
    pub product_name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    /// `;`-separated groups exactly as listed in the catalogue.
    pub ingredients: Vec<String>,
    pub linked_item_id: Option<ProductId>,
    pub quantity_required: u64,
}

impl CatalogueItem {
    /// Individual ingredient terms eligible for cross-sell matching: every
    /// group split on `,`, trimmed, de-duplicated, commodities removed.
    pub fn ingredient_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        for group in &self.ingredients {
            for part in group.split(',') {
                let term = part.trim();
                if term.is_empty() || is_commodity(term) {
                    continue;
                }
                if terms.iter().any(|seen| seen.eq_ignore_ascii_case(term)) {
                    continue;
                }
                terms.push(term.to_string());
            }
        }
        terms
    }

    pub fn ingredients_text(&self) -> String {
        self.ingredients.join("; ")
    }
}

fn is_commodity(term: &str) -> bool {
    COMMODITY_INGREDIENTS
        .iter()
        .any(|commodity| commodity.eq_ignore_ascii_case(term))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub description: Option<String>,
    /// Unit price; `None` when the products table leaves it blank.
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub customer_id: CustomerId,
    pub catalogue_item_id: Option<CatalogueItemId>,
    pub item_id: ProductId,
    pub quantity_sold: u64,
    pub store_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    pub customer_id: CustomerId,
}

/// A customer's sales summed per product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurchaseHistory {
    by_item: HashMap<ProductId, u64>,
    total_quantity: u64,
}

impl PurchaseHistory {
    pub fn from_sales<'a, I>(sales: I) -> Self
    where
        I: IntoIterator<Item = &'a SalesRecord>,
    {
        let mut history = Self::default();
        for record in sales {
            *history.by_item.entry(record.item_id.clone()).or_default() += record.quantity_sold;
            history.total_quantity += record.quantity_sold;
        }
        history
    }

    pub fn quantity_for(&self, item_id: &ProductId) -> u64 {
        self.by_item.get(item_id).copied().unwrap_or(0)
    }

    pub fn has_purchased(&self, item_id: &ProductId) -> bool {
        self.quantity_for(item_id) > 0
    }

    pub fn total_quantity(&self) -> u64 {
        self.total_quantity
    }
}
