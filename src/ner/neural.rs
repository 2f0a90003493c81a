use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;
use std::sync::Arc;

use super::EntityRecognizer;
use crate::entities::{EntitySource, EntitySpan};
use crate::errors::RecognizerError;
use crate::providers::{CompletionRequest, Provider};

/// Labels produced by the neural tagger
pub const LABELS: &[&str] = &["PER", "LOC", "ORG", "MISC"];

const TAGGER_PROMPT: &str = "You are a named-entity tagger. Find every person (PER), location (LOC), \
organization (ORG) and other named entity (MISC) in the user's text. Answer with JSON only, in the form \
{\"entities\": [{\"text\": \"<exact span from the text>\", \"label\": \"PER|LOC|ORG|MISC\"}]}. \
Copy each span exactly as written. Answer {\"entities\": []} when there are none.";

#[derive(Debug, Deserialize)]
struct TaggerOutput {
    #[serde(default)]
    entities: Vec<EntitySpan>,
}

/// Sequence tagger delegated to an LLM
#[derive(Debug)]
pub struct LlmRecognizer {
    provider: Arc<dyn Provider>,
    model: String,
}

impl LlmRecognizer {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

/// Map a label onto the PER/LOC/ORG/MISC set
pub fn normalize_label(label: &str) -> &'static str {
    match label.trim().to_uppercase().as_str() {
        "PER" | "PERSON" => "PER",
        "LOC" | "LOCATION" | "GPE" => "LOC",
        "ORG" | "ORGANIZATION" | "ORGANISATION" => "ORG",
        _ => "MISC",
    }
}

/// Parse the tagger's answer.
///
/// Markdown code fences and text around the JSON object are tolerated.
/// Spans that do not occur in `text` (ignoring case) are dropped.
pub fn parse_tagger_output(answer: &str, text: &str) -> Result<Vec<EntitySpan>, RecognizerError> {
    let json = match (answer.find('{'), answer.rfind('}')) {
        (Some(start), Some(end)) if start < end => &answer[start..=end],
        _ => {
            return Err(RecognizerError::MalformedResponse(format!(
                "no JSON object in tagger answer: {}",
                answer.chars().take(200).collect::<String>()
            )));
        }
    };

    let output: TaggerOutput =
        serde_json::from_str(json).map_err(|e| RecognizerError::MalformedResponse(e.to_string()))?;

    let haystack = text.to_lowercase();
    let mut spans = Vec::with_capacity(output.entities.len());
    for entity in output.entities {
        let surface = entity.text.trim();
        if surface.is_empty() {
            continue;
        }
        if !haystack.contains(&surface.to_lowercase()) {
            warn!("Dropping tagged span not present in text: {:?}", surface);
            continue;
        }
        spans.push(EntitySpan::new(surface, normalize_label(&entity.label)));
    }
    Ok(spans)
}

#[async_trait]
impl EntityRecognizer for LlmRecognizer {
    fn name(&self) -> &str {
        "neural"
    }

    fn source(&self) -> EntitySource {
        EntitySource::Neural
    }

    async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, RecognizerError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let request = CompletionRequest::new(&self.model, text)
            .system(TAGGER_PROMPT)
            .temperature(0.0)
            .json();
        let response = self.provider.complete(request).await?;
        let spans = parse_tagger_output(&response.text, text)?;
        debug!("{} tagger found {} entities", self.provider.name(), spans.len());
        Ok(spans)
    }
}
