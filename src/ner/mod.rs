/*!
 * Named-entity recognizers.
 *
 * Three independent recognizers run over the true-cased translation, in
 * this order, each writing into the shared entity map:
 * - `statistical`: spaCy entity service over HTTP
 * - `chunker`: rule-based part-of-speech chunker
 * - `neural`: sequence tagging delegated to an LLM
 * - `mock`: fixed recognizer for tests
 */

use async_trait::async_trait;

use crate::entities::{EntitySource, EntitySpan};
use crate::errors::RecognizerError;

pub use self::chunker::ChunkRecognizer;
pub use self::neural::LlmRecognizer;
pub use self::statistical::SpacyRecognizer;

pub mod chunker;
pub mod mock;
pub mod neural;
pub mod statistical;

/// A named-entity recognizer
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Short identifier used in logs and errors
    fn name(&self) -> &str;

    /// Stage recorded on the map entries this recognizer writes
    fn source(&self) -> EntitySource;

    /// Entity spans found in `text`, in text order
    async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, RecognizerError>;
}
