/*!
 * LLM provider clients.
 *
 * Translation and the neural entity tagger are delegated to a language
 * model reached through one of these clients:
 * - Ollama: local LLM server
 * - OpenAI: OpenAI API, also used for OpenAI-compatible servers (LM Studio)
 * - Mock: scripted provider for tests
 */

use async_trait::async_trait;
use log::warn;
use reqwest::{Client, ClientBuilder};
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{ProviderConfig, TranslationProvider};
use crate::errors::ProviderError;

/// Provider-independent completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model name
    pub model: String,
    /// System message guiding the model
    pub system: Option<String>,
    /// User prompt
    pub prompt: String,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Ask the provider to constrain output to JSON
    pub json: bool,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            prompt: prompt.into(),
            temperature: None,
            json: false,
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }
}

/// Completion text plus token accounting when the provider reports it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResponse {
    pub text: String,
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
}

/// Common trait for all LLM providers
///
/// Implementations are used interchangeably by the translator and the
/// neural recognizer.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Complete a request using this provider
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;
}

/// Build the client for a configured provider
pub fn build_provider(
    provider: &TranslationProvider,
    config: &ProviderConfig,
    retry_count: u32,
    retry_backoff_ms: u64,
) -> Arc<dyn Provider> {
    match provider {
        TranslationProvider::Ollama => Arc::new(ollama::Ollama::new_with_config(
            &config.endpoint,
            config.timeout_secs,
            retry_count,
            retry_backoff_ms,
            config.rate_limit,
        )),
        TranslationProvider::OpenAI | TranslationProvider::LMStudio => Arc::new(
            openai::OpenAI::new(&config.api_key, &config.endpoint, config.timeout_secs)
                .with_name(provider.to_lowercase_string()),
        ),
    }
}

/// Build an HTTP client, falling back to reqwest's defaults if the
/// configured builder is rejected (the fallback has no timeout).
pub fn http_client(builder: ClientBuilder, owner: &str) -> Client {
    builder.build().unwrap_or_else(|e| {
        warn!("{}: could not build configured HTTP client ({}), using defaults", owner, e);
        Client::new()
    })
}

pub mod mock;
pub mod ollama;
pub mod openai;
