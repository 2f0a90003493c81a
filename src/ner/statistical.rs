use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::EntityRecognizer;
use crate::entities::{EntitySource, EntitySpan};
use crate::errors::RecognizerError;
use crate::providers::http_client;

/// Client for a spaCy entity service.
///
/// The service exposes `POST /ent` taking `{"text", "model"}` and answering
/// with a list of `{"start", "end", "type"}` objects, where the offsets
/// count characters of the submitted text.
#[derive(Debug)]
pub struct SpacyRecognizer {
    client: Client,
    endpoint: String,
    model: String,
}

/// Request body for the entity endpoint
#[derive(Debug, Serialize)]
struct EntityRequest<'a> {
    text: &'a str,
    model: &'a str,
}

/// One entity reported by the service
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceEntity {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub label: String,
}

impl SpacyRecognizer {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: http_client(Client::builder().timeout(Duration::from_secs(timeout_secs)), "spacy"),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_entities(&self, text: &str) -> Result<Vec<ServiceEntity>, RecognizerError> {
        let url = format!("{}/ent", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&EntityRequest {
                text,
                model: &self.model,
            })
            .send()
            .await
            .map_err(|e| RecognizerError::Service(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Entity service error ({}): {}", status, error_text);
            return Err(RecognizerError::Service(format!("{} - {}", status, error_text)));
        }

        response
            .json::<Vec<ServiceEntity>>()
            .await
            .map_err(|e| RecognizerError::MalformedResponse(e.to_string()))
    }
}

/// Cut the reported character ranges out of `text`
pub fn spans_from_offsets(text: &str, entities: &[ServiceEntity]) -> Result<Vec<EntitySpan>, RecognizerError> {
    let chars: Vec<char> = text.chars().collect();
    entities
        .iter()
        .map(|entity| {
            if entity.start > entity.end || entity.end > chars.len() {
                return Err(RecognizerError::MalformedResponse(format!(
                    "entity range {}..{} outside text of {} chars",
                    entity.start,
                    entity.end,
                    chars.len()
                )));
            }
            let surface: String = chars[entity.start..entity.end].iter().collect();
            Ok(EntitySpan::new(surface, entity.label.clone()))
        })
        .collect()
}

#[async_trait]
impl EntityRecognizer for SpacyRecognizer {
    fn name(&self) -> &str {
        "spacy"
    }

    fn source(&self) -> EntitySource {
        EntitySource::Statistical
    }

    async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, RecognizerError> {
        let entities = self.fetch_entities(text).await?;
        let spans = spans_from_offsets(text, &entities)?;
        debug!("spaCy ({}) found {} entities", self.model, spans.len());
        Ok(spans)
    }
}
