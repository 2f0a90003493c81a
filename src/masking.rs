/*!
 * Masking pass.
 *
 * Replaces whole-word occurrences of every entity key in the lower-cased
 * text by the key's label, then replaces every digit by a placeholder.
 */

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

use crate::entities::EntityMap;
use crate::errors::AnonymizerError;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]").expect("digit pattern is valid"));
static WORD_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w$").expect("word pattern is valid"));

/// Order in which entity keys are substituted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionOrder {
    /// Longest key first, ties broken lexicographically
    #[default]
    LongestFirst,
    /// Map insertion order
    Insertion,
}

/// Applies an entity map to text
#[derive(Debug, Clone)]
pub struct Masker {
    order: SubstitutionOrder,
    digit_placeholder: String,
}

impl Default for Masker {
    fn default() -> Self {
        Self::new(SubstitutionOrder::default(), "X")
    }
}

impl Masker {
    pub fn new(order: SubstitutionOrder, digit_placeholder: impl Into<String>) -> Self {
        Self {
            order,
            digit_placeholder: digit_placeholder.into(),
        }
    }

    pub fn order(&self) -> SubstitutionOrder {
        self.order
    }

    /// Lower-case `text`, substitute entities, then mask digits
    pub fn mask(&self, text: &str, entities: &EntityMap) -> Result<String, AnonymizerError> {
        let lowered = text.to_lowercase();
        let substituted = self.substitute(&lowered, entities)?;
        Ok(self.mask_digits(&substituted))
    }

    /// Replace whole-word occurrences of each key by its label.
    ///
    /// `text` is expected to be lower-cased already. Labels are inserted
    /// verbatim, so running this twice with the same map is a no-op the
    /// second time as long as no label is itself a lower-case key.
    pub fn substitute(&self, text: &str, entities: &EntityMap) -> Result<String, AnonymizerError> {
        let mut result = text.to_string();
        for (key, label) in self.ordered_keys(entities) {
            if key.trim().is_empty() {
                continue;
            }
            let pattern = whole_word_pattern(key).map_err(|e| AnonymizerError::Pattern {
                key: key.to_string(),
                message: e.to_string(),
            })?;
            result = pattern.replace_all(&result, NoExpand(label)).into_owned();
        }
        Ok(result)
    }

    /// Replace every ASCII digit by the placeholder
    pub fn mask_digits(&self, text: &str) -> String {
        DIGITS
            .replace_all(text, NoExpand(&self.digit_placeholder))
            .into_owned()
    }

    fn ordered_keys<'a>(&self, entities: &'a EntityMap) -> Vec<(&'a str, &'a str)> {
        let mut keys: Vec<(&str, &str)> = entities
            .iter()
            .map(|(key, entry)| (key, entry.label.as_str()))
            .collect();

        if self.order == SubstitutionOrder::LongestFirst {
            keys.sort_by(|a, b| {
                b.0.chars()
                    .count()
                    .cmp(&a.0.chars().count())
                    .then_with(|| a.0.cmp(b.0))
            });
        }
        keys
    }
}

/// Build a pattern matching `key` as a whole word.
///
/// `\b` is only added on a side where the key starts or ends with a word
/// character; a boundary next to punctuation would never match.
pub fn whole_word_pattern(key: &str) -> Result<Regex, regex::Error> {
    let starts_with_word = key.chars().next().is_some_and(is_word_char);
    let ends_with_word = key.chars().last().is_some_and(is_word_char);

    let mut pattern = String::with_capacity(key.len() + 8);
    if starts_with_word {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(key));
    if ends_with_word {
        pattern.push_str(r"\b");
    }
    Regex::new(&pattern)
}

/// Same definition of a word character as the `\b` assertions use.
fn is_word_char(c: char) -> bool {
    WORD_CHAR.is_match(c.encode_utf8(&mut [0; 4]))
}
