/*!
 * Shared entity mapping.
 *
 * Every extraction stage writes into one `EntityMap`, keyed by the
 * lower-cased surface form of the entity. The last writer for a key wins.
 */

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Label given to every gazetteer entry
pub const COMPANY_LABEL: &str = "COMP";

/// Stage that produced a mapping entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitySource {
    Gazetteer,
    Statistical,
    RuleBased,
    Neural,
}

impl fmt::Display for EntitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gazetteer => "gazetteer",
            Self::Statistical => "statistical",
            Self::RuleBased => "rule_based",
            Self::Neural => "neural",
        };
        write!(f, "{}", name)
    }
}

/// An entity span as reported by a recognizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Surface text of the span, as it appears in the input
    pub text: String,
    /// Category label assigned by the recognizer
    pub label: String,
}

impl EntitySpan {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// Value stored for one key of the map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityEntry {
    pub label: String,
    pub source: EntitySource,
}

/// Mapping from lower-cased entity text to its label.
///
/// Keys keep the order in which they were first inserted; overwriting a key
/// replaces its value but not its position.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntityMap {
    entries: HashMap<String, EntityEntry>,
    #[serde(skip)]
    order: Vec<String>,
}

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `lower(text) -> label`, returning the entry it replaced.
    pub fn insert(
        &mut self,
        text: &str,
        label: impl Into<String>,
        source: EntitySource,
    ) -> Option<EntityEntry> {
        let key = text.to_lowercase();
        let entry = EntityEntry {
            label: label.into(),
            source,
        };

        match self.entries.insert(key.clone(), entry) {
            Some(previous) => {
                if let Some(current) = self.entries.get(&key) {
                    if previous.label != current.label {
                        debug!(
                            "Entity '{}' relabelled {} ({}) -> {} ({})",
                            key, previous.label, previous.source, current.label, current.source
                        );
                    }
                }
                Some(previous)
            }
            None => {
                self.order.push(key);
                None
            }
        }
    }

    /// Insert every span, in order, under the given source
    pub fn extend_spans(&mut self, spans: &[EntitySpan], source: EntitySource) {
        for span in spans {
            self.insert(&span.text, span.label.clone(), source);
        }
    }

    pub fn get(&self, text: &str) -> Option<&EntityEntry> {
        self.entries.get(&text.to_lowercase())
    }

    pub fn label_of(&self, text: &str) -> Option<&str> {
        self.get(text).map(|entry| entry.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityEntry)> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key).map(|entry| (key.as_str(), entry)))
    }

    /// Number of entries currently attributed to `source`
    pub fn count_from(&self, source: EntitySource) -> usize {
        self.entries.values().filter(|e| e.source == source).count()
    }
}
