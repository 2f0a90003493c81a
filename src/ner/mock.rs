/*!
 * Fixed recognizer for testing the pipeline without entity models.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use super::EntityRecognizer;
use crate::entities::{EntitySource, EntitySpan};
use crate::errors::RecognizerError;

/// Recognizer returning the same spans for every input
#[derive(Debug, Clone)]
pub struct StaticRecognizer {
    name: String,
    source: EntitySource,
    spans: Vec<EntitySpan>,
    failing: bool,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl StaticRecognizer {
    pub fn new(source: EntitySource, spans: Vec<EntitySpan>) -> Self {
        Self {
            name: format!("static-{}", source),
            source,
            spans,
            failing: false,
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Recognizer that finds nothing
    pub fn empty(source: EntitySource) -> Self {
        Self::new(source, Vec::new())
    }

    /// Recognizer whose service is down
    pub fn failing(source: EntitySource) -> Self {
        Self {
            failing: true,
            ..Self::empty(source)
        }
    }

    /// Texts this recognizer was asked about, shared between clones
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().clone()
    }
}

#[async_trait]
impl EntityRecognizer for StaticRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn source(&self) -> EntitySource {
        self.source
    }

    async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, RecognizerError> {
        self.inputs.lock().push(text.to_string());
        if self.failing {
            return Err(RecognizerError::Service("Simulated recognizer outage".to_string()));
        }
        Ok(self.spans.clone())
    }
}
