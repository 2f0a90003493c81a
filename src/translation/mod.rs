/*!
 * Translation step of the anonymization pipeline.
 *
 * The input sentence is translated into the target language before entity
 * extraction, since the recognizers only understand the target language.
 *
 * - `llm`: translator backed by an LLM provider
 * - `cache`: in-memory memoization of translations
 */

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::TranslationError;

pub use self::cache::TranslationCache;
pub use self::llm::LlmTranslator;

pub mod cache;
pub mod llm;

// A trailing word, optionally followed by a single newline
static ENDS_IN_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w\n?\z").unwrap());

/// Translates one sentence into the target language
#[async_trait]
pub trait Translator: Send + Sync {
    /// Single best translation of `text`
    async fn translate(&self, text: &str) -> Result<String, TranslationError>;
}

/// Append "." when the sentence ends in a word character.
///
/// A sentence ending in one newline after a word also gets the period,
/// appended after the newline. Anything ending in punctuation, whitespace
/// or another non-word character is returned unchanged.
pub fn ensure_terminal_period(sentence: &str) -> String {
    if ENDS_IN_WORD.is_match(sentence) {
        format!("{}.", sentence)
    } else {
        sentence.to_string()
    }
}
