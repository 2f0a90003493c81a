use async_trait::async_trait;
use log::{debug, error, warn};
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{CompletionRequest, CompletionResponse, Provider, http_client};
use crate::errors::ProviderError;

/// Ollama client for interacting with the Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
    /// Optional rate limit in requests per minute
    rate_limit: Option<u32>,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Format to return a response in
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    /// Whether to stream the response
    stream: bool,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl From<CompletionRequest> for GenerationRequest {
    fn from(request: CompletionRequest) -> Self {
        Self {
            model: request.model,
            prompt: request.prompt,
            system: request.system,
            options: request
                .temperature
                .map(|temperature| GenerationOptions { temperature: Some(temperature) }),
            format: request.json.then(|| "json".to_string()),
            stream: false,
        }
    }
}

impl Ollama {
    /// Create a new Ollama client with retry and rate-limit settings
    ///
    /// Ollama speaks HTTP/1.1, so HTTP/2 is not negotiated.
    pub fn new_with_config(
        endpoint: impl Into<String>,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        rate_limit: Option<u32>,
    ) -> Self {
        let endpoint = endpoint.into();
        let base_url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", endpoint.trim_end_matches('/'))
        };

        Self {
            base_url,
            client: http_client(
                Client::builder()
                    .timeout(Duration::from_secs(timeout_secs))
                    .http1_only()
                    .pool_idle_timeout(Duration::from_secs(90))
                    .tcp_keepalive(Duration::from_secs(60)),
                "ollama",
            ),
            max_retries,
            backoff_base_ms,
            rate_limit,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generate text from the Ollama API with retry logic
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                tokio::time::sleep(self.retry_delay(attempt)).await;
            }

            match self.generate_once(&url, request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    warn!(
                        "Ollama request failed (attempt {}/{}): {}",
                        attempt + 1,
                        self.max_retries + 1,
                        e
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn generate_once(
        &self,
        url: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        let response = self.client.post(url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let response_text = response.text().await?;
        parse_generation_response(&response_text)
    }

    // Exponential backoff plus jitter, never faster than the rate limit allows
    fn retry_delay(&self, attempt: u32) -> Duration {
        let backoff = self.backoff_base_ms.saturating_mul(1 << (attempt - 1).min(16));
        let jitter = rand::rng().random_range(0..=self.backoff_base_ms / 4 + 1);
        let rate_floor = self.rate_limit.filter(|r| *r > 0).map_or(0, |r| 60_000 / r as u64);
        Duration::from_millis((backoff + jitter).max(rate_floor))
    }
}

/// Parse a generate response, accepting a streamed JSONL body as well.
pub fn parse_generation_response(body: &str) -> Result<GenerationResponse, ProviderError> {
    if let Ok(response) = serde_json::from_str::<GenerationResponse>(body) {
        return Ok(response);
    }

    // Streaming bodies carry one JSON object per line; the text is the
    // concatenation of every "response" piece.
    let mut pieces = Vec::new();
    let mut last: Option<serde_json::Value> = None;
    for line in body.lines().filter(|l| !l.trim().is_empty()) {
        let value: serde_json::Value = serde_json::from_str(line).map_err(|e| {
            ProviderError::ParseError(format!(
                "{} (body starts with: {})",
                e,
                body.chars().take(200).collect::<String>()
            ))
        })?;
        if let Some(piece) = value.get("response").and_then(|v| v.as_str()) {
            pieces.push(piece.to_string());
        }
        last = Some(value);
    }

    let last = last.ok_or_else(|| ProviderError::ParseError("Empty Ollama response".to_string()))?;
    debug!("Assembled Ollama response from {} streamed chunks", pieces.len());
    Ok(GenerationResponse {
        model: last.get("model").and_then(|v| v.as_str()).unwrap_or("unknown").to_string(),
        response: pieces.concat(),
        done: last.get("done").and_then(|v| v.as_bool()).unwrap_or(true),
        prompt_eval_count: last.get("prompt_eval_count").and_then(|v| v.as_u64()),
        eval_count: last.get("eval_count").and_then(|v| v.as_u64()),
    })
}

#[async_trait]
impl Provider for Ollama {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let request = GenerationRequest::from(request);
        let response = self.generate(&request).await?;
        Ok(CompletionResponse {
            text: response.response,
            prompt_tokens: response.prompt_eval_count,
            completion_tokens: response.eval_count,
        })
    }
}
