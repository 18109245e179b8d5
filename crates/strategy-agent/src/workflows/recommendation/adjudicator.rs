//! Candidate adjudication through a hosted reasoning service.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::domain::{Candidate, Decision, DecisionStatus};
use crate::workflows::catalogue::CatalogueItem;

#[derive(Clone, PartialEq)]
pub struct ReasoningConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.perplexity.ai/chat/completions".to_string(),
            model: "sonar".to_string(),
            max_tokens: 100,
            temperature: 0.1,
            timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for ReasoningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReasoningConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReasoningError {
    #[error("reasoning request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("reasoning service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("reasoning service returned no choices")]
    EmptyResponse,
}

/// Free-text completion for a single prompt.
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ReasoningError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: String,
}

/// Chat-completions client (Perplexity and OpenAI wire format).
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    config: ReasoningConfig,
    api_key: String,
}

impl ChatCompletionsClient {
    pub fn new(config: ReasoningConfig, api_key: String) -> Result<Self, ReasoningError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            api_key,
        })
    }
}

#[async_trait]
impl ReasoningClient for ChatCompletionsClient {
    async fn complete(&self, prompt: &str) -> Result<String, ReasoningError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReasoningError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: ChatResponse = response.json().await?;
        payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or(ReasoningError::EmptyResponse)
    }
}

/// One pairing to judge, with the context the prompt needs.
#[derive(Debug, Clone, Copy)]
pub struct AdjudicationRequest<'a> {
    pub item: &'a CatalogueItem,
    pub candidate: &'a Candidate,
    pub product_description: Option<&'a str>,
}

/// Decides whether a candidate product complements a catalogue item.
#[async_trait]
pub trait Adjudicator: Send + Sync {
    async fn adjudicate(
        &self,
        request: &AdjudicationRequest<'_>,
    ) -> Result<Decision, ReasoningError>;
}

/// Adjudicator that asks a [`ReasoningClient`] for a YES/NO verdict.
#[derive(Debug, Clone)]
pub struct ReasoningAdjudicator<C> {
    client: C,
}

impl<C> ReasoningAdjudicator<C>
where
    C: ReasoningClient,
{
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C> Adjudicator for ReasoningAdjudicator<C>
where
    C: ReasoningClient,
{
    async fn adjudicate(
        &self,
        request: &AdjudicationRequest<'_>,
    ) -> Result<Decision, ReasoningError> {
        let prompt = build_prompt(request);
        let reply = self.client.complete(&prompt).await?;
        let status = parse_verdict(&reply);

        tracing::debug!(
            catalogue_item = %request.item.id,
            product = %request.candidate.product_id,
            verdict = status.label(),
            "candidate adjudicated"
        );

        Ok(Decision {
            candidate: request.candidate.clone(),
            status,
            ai_reasoning: reply,
        })
    }
}

pub fn build_prompt(request: &AdjudicationRequest<'_>) -> String {
    let item = request.item;
    let candidate = request.candidate;
    let category = item.category.as_deref().unwrap_or("Unknown");
    let description = item.description.as_deref().unwrap_or("No description");

    let mut prompt = format!(
        "Please analyze if the product \"{product}\" can be used as an ingredient of \"{name}\".\n\n\
         Catalogue Item Details:\n\
         - Product Name: {name}\n\
         - Product Category: {category}\n\
         - Description: {description}\n\
         - Ingredients: {ingredients}\n\n\
         Potential Ingredient: {ingredient}\n\
         Potential Product: {product}\n",
        product = candidate.suggested_product,
        name = item.product_name,
        ingredients = item.ingredients_text(),
        ingredient = candidate.ingredient,
    );
    if let Some(product_description) = request.product_description {
        prompt.push_str(&format!("Product Description: {product_description}\n"));
    }
    prompt.push_str(
        "\nPlease answer with ONLY \"YES\" or \"NO\" followed by a brief reasoning (max 50 words).",
    );
    prompt
}

/// A reply is affirmative only when its first word is `yes` (any case).
/// Anything else, including an unclear reply, is a rejection.
pub fn parse_verdict(reply: &str) -> DecisionStatus {
    let first_word: String = reply
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .chars()
        .take_while(|c| c.is_alphabetic())
        .collect();

    if first_word.eq_ignore_ascii_case("yes") {
        DecisionStatus::Accepted
    } else {
        DecisionStatus::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::recommendation::tests::common::{candidate, catalogue_item};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    #[test]
    fn verdict_accepts_leading_yes_in_any_case() {
        assert_eq!(parse_verdict("YES - dough is a base"), DecisionStatus::Accepted);
        assert_eq!(parse_verdict("  yes, it fits"), DecisionStatus::Accepted);
        assert_eq!(parse_verdict("**Yes**. Chips are used"), DecisionStatus::Accepted);
    }

    #[test]
    fn verdict_rejects_negative_and_unclear_replies() {
        assert_eq!(parse_verdict("NO - unrelated"), DecisionStatus::Rejected);
        assert_eq!(parse_verdict("Yesterday I would say no"), DecisionStatus::Rejected);
        assert_eq!(parse_verdict("It depends on the recipe"), DecisionStatus::Rejected);
        assert_eq!(parse_verdict(""), DecisionStatus::Rejected);
    }

    #[test]
    fn prompt_carries_item_context_and_answer_format() {
        let item = catalogue_item("CAT-1", "Chocolate Chip Cookie", "Biscuit Dough; Chocolate Chips");
        let candidate = candidate("Biscuit Dough", "P-1", "Cookie Dough", 0.723);
        let prompt = build_prompt(&AdjudicationRequest {
            item: &item,
            candidate: &candidate,
            product_description: Some("Frozen dough pucks"),
        });

        assert!(prompt.contains("\"Cookie Dough\" can be used as an ingredient of \"Chocolate Chip Cookie\""));
        assert!(prompt.contains("- Ingredients: Biscuit Dough; Chocolate Chips"));
        assert!(prompt.contains("Potential Ingredient: Biscuit Dough"));
        assert!(prompt.contains("Product Description: Frozen dough pucks"));
        assert!(prompt.ends_with("(max 50 words)."));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = ReasoningConfig {
            api_key: Some("pplx-secret".to_string()),
            ..ReasoningConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("pplx-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("test server");
        });
        format!("http://{addr}/chat/completions")
    }

    fn client(endpoint: String) -> ChatCompletionsClient {
        let config = ReasoningConfig {
            endpoint,
            ..ReasoningConfig::default()
        };
        ChatCompletionsClient::new(config, "pplx-test".to_string()).expect("client")
    }

    #[tokio::test]
    async fn chat_client_sends_bearer_token_and_reads_first_choice() {
        let router = Router::new().route(
            "/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|value| value.to_str().ok())
                    == Some("Bearer pplx-test");
                if !authorized {
                    return (StatusCode::UNAUTHORIZED, Json(json!({})));
                }
                assert_eq!(body["model"], "sonar");
                assert_eq!(body["max_tokens"], 100);
                assert_eq!(body["messages"][0]["role"], "user");
                (
                    StatusCode::OK,
                    Json(json!({
                        "choices": [{ "message": { "content": "  YES - dough is the base.\n" } }]
                    })),
                )
            }),
        );
        let endpoint = spawn(router).await;

        let reply = client(endpoint).complete("prompt").await.expect("reply");
        assert_eq!(reply, "YES - dough is the base.");
    }

    #[tokio::test]
    async fn chat_client_surfaces_error_status() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let endpoint = spawn(router).await;

        match client(endpoint).complete("prompt").await {
            Err(ReasoningError::Status { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn chat_client_rejects_empty_choices() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let endpoint = spawn(router).await;

        match client(endpoint).complete("prompt").await {
            Err(ReasoningError::EmptyResponse) => {}
            other => panic!("expected empty response, got {other:?}"),
        }
    }
}
