use async_trait::async_trait;
use log::{debug, trace};
use std::sync::Arc;
use std::time::Instant;

use super::{TranslationCache, Translator};
use crate::errors::TranslationError;
use crate::language_utils;
use crate::providers::{CompletionRequest, Provider};

/// Translator asking an LLM for the single best translation of a sentence
#[derive(Debug)]
pub struct LlmTranslator {
    provider: Arc<dyn Provider>,
    model: String,
    system_prompt: String,
    temperature: f32,
    source_language: String,
    target_language: String,
    cache: TranslationCache,
}

impl LlmTranslator {
    /// Create a translator.
    ///
    /// `{source_language}` and `{target_language}` in the prompt template are
    /// replaced by language names when the codes are known, and by the codes
    /// themselves otherwise.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        prompt_template: &str,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        let source_language = source_language.into();
        let target_language = target_language.into();
        let system_prompt = render_prompt(prompt_template, &source_language, &target_language);

        Self {
            provider,
            model: model.into(),
            system_prompt,
            temperature: 0.0,
            source_language,
            target_language,
            cache: TranslationCache::new(false),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_cache(mut self, cache: TranslationCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }
}

fn render_prompt(template: &str, source_language: &str, target_language: &str) -> String {
    let name_of = |code: &str| language_utils::get_language_name(code).unwrap_or_else(|_| code.to_string());
    template
        .replace("{source_language}", &name_of(source_language))
        .replace("{target_language}", &name_of(target_language))
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslationError> {
        if let Some(cached) = self.cache.get(text, &self.source_language, &self.target_language) {
            return Ok(cached);
        }

        let start_time = Instant::now();
        let request = CompletionRequest::new(&self.model, text)
            .system(&self.system_prompt)
            .temperature(self.temperature);
        let response = self.provider.complete(request).await?;

        let translated = response.text.trim().to_string();
        if translated.is_empty() && !text.trim().is_empty() {
            return Err(TranslationError::EmptyOutput(text.chars().count()));
        }

        debug!(
            "{} translated {} chars in {:?} (tokens: {:?}/{:?})",
            self.provider.name(),
            text.chars().count(),
            start_time.elapsed(),
            response.prompt_tokens,
            response.completion_tokens
        );
        trace!("Translation: {:?} -> {:?}", text, translated);

        self.cache
            .store(text, &self.source_language, &self.target_language, &translated);
        Ok(translated)
    }
}
