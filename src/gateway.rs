// Model Gateway - remote chat-completion calls (OpenRouter)
//
// The gateway never fails across its boundary: transport errors, non-200
// statuses and malformed upstream JSON all degrade to readable answer text.
// Callers always get a String they can show the user.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::prompt::SYSTEM_PERSONA;

/// Hard cap on a single completion round-trip
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Attribution headers OpenRouter expects alongside the bearer token
const HTTP_REFERER: &str = "http://localhost";
const APP_TITLE: &str = "BankStatementMVP";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AnswerMessage,
}

#[derive(Debug, Deserialize)]
struct AnswerMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelInfo>,
}

/// One entry from the remote model catalog
#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pricing: ModelPricing,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelPricing {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub completion: String,
}

impl ModelInfo {
    /// Free tier: zero prompt or completion pricing
    pub fn is_free(&self) -> bool {
        self.pricing.prompt == "0" || self.pricing.completion == "0"
    }
}

// ============================================================================
// Gateway
// ============================================================================

/// Client for the remote chat-completion API
pub struct Gateway {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl Gateway {
    /// Build a gateway from explicit configuration
    pub fn new(config: &Config) -> Result<Gateway> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client for model API")?;

        Ok(Gateway {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Send a built prompt and return the answer text.
    ///
    /// Every call is a fresh round-trip: no caching, no retries. Remote
    /// failures come back as the answer string, not as an error.
    pub async fn ask(&self, prompt: &str) -> String {
        let url = format!("{}/chat/completions", self.base_url);
        let body = CompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PERSONA,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        info!(model = %self.model, prompt_bytes = prompt.len(), "Sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", HTTP_REFERER)
            .header("X-Title", APP_TITLE)
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Completion request failed before a response arrived");
                return format!("Error calling model API: {}", e);
            }
        };

        let status = response.status().as_u16();
        debug!(status, "Received completion response");

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "Failed to read completion response body");
                return format!("Error reading model response: {}", e);
            }
        };

        if status != 200 {
            warn!(status, "Model API returned an error status");
        }

        answer_from_response(status, &text)
    }

    /// Fetch the remote model catalog (diagnostic surface)
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/models", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", HTTP_REFERER)
            .header("X-Title", APP_TITLE)
            .send()
            .await
            .context("Model catalog request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Model catalog returned HTTP {}: {}", status, body);
        }

        let catalog: ModelsResponse = response
            .json()
            .await
            .context("Failed to parse model catalog JSON")?;

        info!(models = catalog.data.len(), "Fetched model catalog");
        Ok(catalog.data)
    }

    /// Catalog entries with a free pricing tier
    pub async fn list_free_models(&self) -> Result<Vec<ModelInfo>> {
        let mut models = self.list_models().await?;
        models.retain(|m| m.is_free());
        Ok(models)
    }
}

/// Turn a raw status/body pair into the answer string.
///
/// This is the whole error discipline of the gateway in one place:
/// - 200 with well-formed JSON: the first choice's message content.
/// - 200 with malformed JSON or no choices: a readable diagnostic string.
/// - any other status: a string embedding the status code and raw body.
pub fn answer_from_response(status: u16, body: &str) -> String {
    if status != 200 {
        return format!("Error from model: {} - {}", status, body);
    }

    match serde_json::from_str::<CompletionResponse>(body) {
        Ok(parsed) => match parsed.choices.into_iter().next() {
            Some(choice) => choice.message.content,
            None => "Error from model: response contained no choices".to_string(),
        },
        Err(e) => format!("Error from model: malformed response ({})", e),
    }
}
