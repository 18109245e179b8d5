use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::workflows::catalogue::parser::split_ingredient_groups;
use crate::workflows::catalogue::{
    CatalogueItem, CatalogueItemId, Customer, CustomerId, Dataset, Product, ProductId,
    SalesRecord, Store,
};
use crate::workflows::recommendation::adjudicator::{ReasoningClient, ReasoningError};
use crate::workflows::recommendation::classifier::classify;
use crate::workflows::recommendation::domain::{Candidate, Decision, DecisionStatus};
use crate::workflows::recommendation::embedding::{Embedder, EmbeddingError};
use crate::workflows::recommendation::report::{
    ItemOutcome, RecommendationReport, ReportAssembler,
};

pub(crate) fn catalogue_item(id: &str, name: &str, ingredients: &str) -> CatalogueItem {
    CatalogueItem {
        id: CatalogueItemId(id.to_string()),
        customer_id: CustomerId("C001".to_string()),
        product_name: name.to_string(),
        category: Some("Bakery".to_string()),
        description: Some(format!("{name} baked daily")),
        ingredients: split_ingredient_groups(ingredients),
        linked_item_id: None,
        quantity_required: 100,
    }
}

pub(crate) fn product(id: &str, name: &str, price: f64) -> Product {
    Product {
        id: ProductId(id.to_string()),
        name: name.to_string(),
        category: Some("Bakery Supplies".to_string()),
        subcategory: None,
        description: Some(format!("{name} for industrial bakeries")),
        price: Some(price),
    }
}

pub(crate) fn customer(id: &str, name: &str) -> Customer {
    Customer {
        id: CustomerId(id.to_string()),
        name: name.to_string(),
        customer_type: Some("Retail".to_string()),
        country: Some("UK".to_string()),
        region: Some("North".to_string()),
        total_stores: None,
    }
}

pub(crate) fn sale(customer_id: &str, product_id: &str, quantity: u64) -> SalesRecord {
    SalesRecord {
        customer_id: CustomerId(customer_id.to_string()),
        catalogue_item_id: None,
        item_id: ProductId(product_id.to_string()),
        quantity_sold: quantity,
        store_id: None,
    }
}

pub(crate) fn store(id: &str, customer_id: &str) -> Store {
    Store {
        id: id.to_string(),
        customer_id: CustomerId(customer_id.to_string()),
    }
}

pub(crate) fn candidate(ingredient: &str, product_id: &str, name: &str, score: f64) -> Candidate {
    Candidate {
        ingredient: ingredient.to_string(),
        suggested_product: name.to_string(),
        product_id: ProductId(product_id.to_string()),
        similarity_score: score,
        category: Some("Bakery Supplies".to_string()),
        price: Some(2.0),
    }
}

pub(crate) fn decision(product_id: &str, status: DecisionStatus, reasoning: &str) -> Decision {
    Decision {
        candidate: candidate("Biscuit Dough", product_id, "Cookie Dough", 0.8),
        status,
        ai_reasoning: reasoning.to_string(),
    }
}

/// Unit vector in the plane whose cosine with `[1, 0]` is `score`.
pub(crate) fn at_similarity(score: f32) -> Vec<f32> {
    vec![score, (1.0 - score * score).sqrt()]
}

/// Embedder answering from a fixed table; unknown text is an error.
#[derive(Debug, Default)]
pub(crate) struct FakeEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub(crate) fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub(crate) fn failing_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(text) {
            return Err(EmbeddingError::Status {
                status: 503,
                body: "embedding model offline".to_string(),
            });
        }
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| EmbeddingError::EmptyResponse(text.to_string()))
    }
}

/// Reasoning client that answers by the product named in the prompt.
#[derive(Debug, Default, Clone)]
pub(crate) struct ScriptedReasoning {
    replies: HashMap<String, String>,
    failing: HashSet<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedReasoning {
    pub(crate) fn reply(mut self, product_name: &str, reply: &str) -> Self {
        self.replies
            .insert(product_name.to_string(), reply.to_string());
        self
    }

    pub(crate) fn failing_for(mut self, product_name: &str) -> Self {
        self.failing.insert(product_name.to_string());
        self
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log poisoned").clone()
    }
}

#[async_trait]
impl ReasoningClient for ScriptedReasoning {
    async fn complete(&self, prompt: &str) -> Result<String, ReasoningError> {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.to_string());

        let product_name = prompt
            .lines()
            .find_map(|line| line.strip_prefix("Potential Product: "))
            .unwrap_or_default();
        if self.failing.contains(product_name) {
            return Err(ReasoningError::Status {
                status: 500,
                body: "upstream error".to_string(),
            });
        }
        Ok(self
            .replies
            .get(product_name)
            .cloned()
            .unwrap_or_else(|| "Unclear.".to_string()))
    }
}

/// One customer, one catalogue item, two candidate products scoring 0.723
/// and 0.742 against the item's only ingredient.
pub(crate) fn cookie_dataset(sales: Vec<SalesRecord>) -> Dataset {
    let mut item = catalogue_item("CAT-1", "Chocolate Chip Cookie", "Biscuit Dough");
    item.linked_item_id = Some(ProductId("P-9".to_string()));
    item.quantity_required = 1_000;

    Dataset::new(
        vec![customer("C001", "Northwind Bakeries")],
        vec![item],
        vec![
            product("P-1", "Cookie Dough", 2.0),
            product("P-2", "Shortbread Base", 3.0),
            product("P-3", "Paper Cups", 0.1),
            product("P-9", "Chocolate Chip Cookie", 1.5),
        ],
        sales,
        vec![store("S1", "C001"), store("S2", "C001")],
    )
}

pub(crate) fn cookie_embedder() -> FakeEmbedder {
    FakeEmbedder::default()
        .with("Biscuit Dough", vec![1.0, 0.0])
        .with("Cookie Dough", at_similarity(0.723))
        .with("Shortbread Base", at_similarity(0.742))
        .with("Paper Cups", vec![0.0, 1.0])
        .with("Chocolate Chip Cookie", at_similarity(0.2))
}

pub(crate) fn cookie_reasoning() -> ScriptedReasoning {
    ScriptedReasoning::default()
        .reply(
            "Cookie Dough",
            "YES - cookie dough is the base of a chocolate chip cookie.",
        )
        .reply(
            "Shortbread Base",
            "NO - shortbread is a different biscuit style.",
        )
}

pub(crate) fn sample_report(customer_id: &str) -> RecommendationReport {
    let customer = customer(customer_id, "Northwind Bakeries");
    let mut assembler = ReportAssembler::new(&customer, classify(1_000, 2), true);

    let mut outcome = ItemOutcome::new(catalogue_item(
        "CAT-1",
        "Chocolate Chip Cookie",
        "Biscuit Dough",
    ));
    outcome.decisions = vec![
        decision("P-1", DecisionStatus::Accepted, "YES - fits"),
        decision("P-2", DecisionStatus::Rejected, "NO - unrelated"),
    ];
    assembler.push(outcome);

    assembler.finish(
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp"),
    )
}
