//! Sentence-embedding service client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingConfig {
    /// Base URL of an Ollama-compatible server.
    pub endpoint: String,
    pub model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "all-minilm".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("embedding service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("embedding service returned no vector for '{0}'")]
    EmptyResponse(String),
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Turns text into a fixed-length vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: Client,
    config: EmbeddingConfig,
}

impl HttpEmbedder {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/api/embed", self.config.endpoint.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest {
                model: &self.config.model,
                input: text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: EmbedResponse = response.json().await?;
        payload
            .embeddings
            .into_iter()
            .next()
            .filter(|vector| !vector.is_empty())
            .ok_or_else(|| EmbeddingError::EmptyResponse(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("test server");
        });
        format!("http://{addr}")
    }

    fn embedder(endpoint: String) -> HttpEmbedder {
        HttpEmbedder::new(EmbeddingConfig {
            endpoint,
            model: "all-minilm".to_string(),
        })
    }

    #[tokio::test]
    async fn embed_posts_model_and_input() {
        let router = Router::new().route(
            "/api/embed",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "all-minilm");
                let width = body["input"].as_str().map(str::len).unwrap_or(0) as f32;
                Json(json!({ "embeddings": [[width, 1.0, 0.5]] }))
            }),
        );
        let endpoint = spawn(router).await;

        let vector = embedder(endpoint)
            .embed("Biscuit Dough")
            .await
            .expect("embedding");
        assert_eq!(vector, vec![13.0, 1.0, 0.5]);
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_body() {
        let router = Router::new().route(
            "/api/embed",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model loading") }),
        );
        let endpoint = spawn(router).await;

        match embedder(endpoint).embed("Flour").await {
            Err(EmbeddingError::Status { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "model loading");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_embedding_list_is_an_error() {
        let router = Router::new().route(
            "/api/embed",
            post(|| async { Json(json!({ "embeddings": [] })) }),
        );
        let endpoint = spawn(router).await;

        match embedder(endpoint).embed("Flour").await {
            Err(EmbeddingError::EmptyResponse(text)) => assert_eq!(text, "Flour"),
            other => panic!("expected empty response error, got {other:?}"),
        }
    }
}
