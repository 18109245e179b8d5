use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::domain::Candidate;
use super::embedding::{Embedder, EmbeddingError};
use super::similarity::top_k_matches;
use crate::workflows::catalogue::{CatalogueItem, Product};

/// Product table paired with one embedding per product, in table order.
#[derive(Debug, Clone, Default)]
pub struct ProductIndex {
    products: Vec<Product>,
    vectors: Vec<Vec<f32>>,
}

impl ProductIndex {
    /// Embeds every product name once. Vectors must share one dimension.
    pub async fn build(
        embedder: &dyn Embedder,
        products: &[Product],
    ) -> Result<Self, EmbeddingError> {
        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(products.len());
        for product in products {
            let vector = embedder.embed(&product.name).await?;
            if let Some(first) = vectors.first() {
                if first.len() != vector.len() {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected: first.len(),
                        actual: vector.len(),
                    });
                }
            }
            vectors.push(vector);
        }

        tracing::debug!(products = products.len(), "product embedding index built");

        Ok(Self {
            products: products.to_vec(),
            vectors,
        })
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn dimension(&self) -> Option<usize> {
        self.vectors.first().map(Vec::len)
    }
}

/// Proposes cross-sell candidates for a catalogue item's ingredients.
pub struct SimilarityRanker {
    embedder: Arc<dyn Embedder>,
    index: ProductIndex,
    threshold: f64,
    top_k: usize,
    ingredient_cache: Mutex<HashMap<String, Arc<Vec<f32>>>>,
}

impl SimilarityRanker {
    pub fn new(embedder: Arc<dyn Embedder>, index: ProductIndex, threshold: f64, top_k: usize) -> Self {
        Self {
            embedder,
            index,
            threshold,
            top_k,
            ingredient_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn index(&self) -> &ProductIndex {
        &self.index
    }

    /// Candidates for every ingredient term of `item`, grouped by ingredient in
    /// listing order and best match first within an ingredient. Items without
    /// ingredients yield no candidates.
    pub async fn rank(&self, item: &CatalogueItem) -> Result<Vec<Candidate>, EmbeddingError> {
        let terms = item.ingredient_terms();
        if terms.is_empty() || self.index.is_empty() {
            return Ok(Vec::new());
        }

        let mut candidates = Vec::new();
        for term in terms {
            let query = self.ingredient_vector(&term).await?;
            if let Some(expected) = self.index.dimension() {
                if expected != query.len() {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected,
                        actual: query.len(),
                    });
                }
            }

            for (position, score) in
                top_k_matches(&query, &self.index.vectors, self.threshold, self.top_k)
            {
                let product = &self.index.products[position];
                tracing::debug!(
                    catalogue_item = %item.id,
                    ingredient = %term,
                    product = %product.id,
                    similarity = score,
                    "candidate match"
                );
                candidates.push(Candidate {
                    ingredient: term.clone(),
                    suggested_product: product.name.clone(),
                    product_id: product.id.clone(),
                    similarity_score: score,
                    category: product.category.clone(),
                    price: product.price,
                });
            }
        }

        Ok(candidates)
    }

    async fn ingredient_vector(&self, term: &str) -> Result<Arc<Vec<f32>>, EmbeddingError> {
        let key = term.to_lowercase();
        let cached = self.cache().get(&key).cloned();
        if let Some(hit) = cached {
            return Ok(hit);
        }

        let vector = Arc::new(self.embedder.embed(term).await?);
        self.cache().insert(key, Arc::clone(&vector));
        Ok(vector)
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Vec<f32>>>> {
        self.ingredient_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
