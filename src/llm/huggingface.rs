//! Hugging Face Inference API client
//!
//! Uses a long-lived reqwest::Client for connection pooling.

use super::{GenerationConfig, TextGenerator};
use crate::error::AgentError;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_API_URL: &str = "https://api-inference.huggingface.co/models";

/// Reusable Hugging Face client (connection-pooled)
pub struct HuggingFaceClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    config: GenerationConfig,
}

impl HuggingFaceClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            model: model.into(),
            config: GenerationConfig::default(),
        })
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.api_url, model)
    }

    async fn post<T: Serialize + ?Sized>(&self, model: &str, body: &T) -> Result<Value> {
        if self.api_key.is_empty() {
            return Err(AgentError::Generation(
                "HUGGINGFACE_API_KEY not configured".to_string(),
            ));
        }

        let response = self
            .client
            .post(self.model_url(model))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(model, "Hugging Face request failed: {}", e);
                AgentError::Generation(format!("Hugging Face request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!(model, %status, "Hugging Face error response: {}", error_text);
            return Err(AgentError::Generation(format!(
                "Hugging Face returned {}: {}",
                status, error_text
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AgentError::Generation(format!("Hugging Face parse error: {}", e)))
    }

    /// Generate text with an explicit model, bypassing the default
    pub async fn generate_with(&self, model: &str, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            inputs: prompt,
            parameters: GenerateParameters {
                config: &self.config,
                return_full_text: false,
            },
        };

        info!(model, prompt_chars = prompt.len(), "Calling Hugging Face inference");
        let body = self.post(model, &request).await?;
        let generated = extract_generated_text(&body)?;
        Ok(strip_prompt(&generated, prompt))
    }
}

#[async_trait]
impl TextGenerator for HuggingFaceClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with(&self.model, prompt).await
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters<'a>,
}

#[derive(Debug, Serialize)]
struct GenerateParameters<'a> {
    #[serde(flatten)]
    config: &'a GenerationConfig,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    #[serde(default)]
    generated_text: String,
}

fn extract_generated_text(body: &Value) -> Result<String> {
    let candidates: Vec<GeneratedText> = serde_json::from_value(body.clone())
        .map_err(|e| AgentError::Generation(format!("Hugging Face parse error: {}", e)))?;

    candidates
        .into_iter()
        .next()
        .map(|c| c.generated_text)
        .ok_or_else(|| AgentError::Generation("Empty response from Hugging Face".to_string()))
}

/// Some endpoints echo the prompt even with `return_full_text: false`
fn strip_prompt(generated: &str, prompt: &str) -> String {
    generated
        .strip_prefix(prompt)
        .unwrap_or(generated)
        .trim()
        .to_string()
}
