/*!
 * True-casing of translated text.
 *
 * The statistical true-caser keeps, for unigrams, bigrams and trigrams of
 * normalized (lower-cased) tokens, the most frequent original casing seen
 * in a training corpus. Casing is then restored longest n-gram first.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::errors::ModelError;

static WORD_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,.?!:;\s]+").expect("separator pattern is valid"));

/// Minimum number of occurrences for a bigram or trigram casing to be kept
const NGRAM_MIN_FREQUENCY: u32 = 10;

/// Restores conventional capitalization
pub trait TrueCaser: Send + Sync {
    fn truecase(&self, text: &str) -> String;
}

type CaseMap = HashMap<String, String>;

/// N-gram case model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatisticalTrueCaser {
    unigrams: CaseMap,
    bigrams: CaseMap,
    trigrams: CaseMap,
}

impl StatisticalTrueCaser {
    /// Load a JSON model written by `save`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&content).map_err(|e| ModelError::Invalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(
            "Loaded true-case model {:?} ({} unigrams, {} bigrams, {} trigrams)",
            path,
            model.unigrams.len(),
            model.bigrams.len(),
            model.trigrams.len()
        );
        Ok(model)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let path = path.as_ref();
        let json = serde_json::to_string(self).map_err(|e| ModelError::Invalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, json)?;
        Ok(())
    }

    pub fn train_on_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let text = fs::read_to_string(path)?;
        Ok(Self::train_on_text(&text))
    }

    /// Train on a corpus with one sentence per line
    pub fn train_on_text(text: &str) -> Self {
        let mut unigram_stats = CaseStats::default();
        let mut bigram_stats = CaseStats::default();
        let mut trigram_stats = CaseStats::default();

        for sentence in text.lines().filter(|s| is_sentence_sane(s)) {
            let tokens: Vec<Token> = padded_tokens(sentence)
                .into_iter()
                .filter(Token::is_meaningful)
                .collect();

            for token in &tokens {
                unigram_stats.add(&token.normalized, &token.original);
            }
            for window in tokens.windows(2) {
                let ngram = Token::ngram(window);
                bigram_stats.add(&ngram.normalized, &ngram.original);
            }
            for window in tokens.windows(3) {
                let ngram = Token::ngram(window);
                trigram_stats.add(&ngram.normalized, &ngram.original);
            }
        }

        Self {
            unigrams: unigram_stats.into_most_common(1),
            bigrams: bigram_stats.into_most_common(NGRAM_MIN_FREQUENCY),
            trigrams: trigram_stats.into_most_common(NGRAM_MIN_FREQUENCY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.unigrams.is_empty()
    }

    fn select_from_ngrams(
        size: usize,
        source: &CaseMap,
        words: &[(usize, &Token)],
        result: &mut [Option<String>],
    ) {
        for slice in words.windows(size) {
            let normalized = slice
                .iter()
                .map(|(_, token)| token.normalized.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            if let Some(cased) = source.get(&normalized) {
                for (word, (index, _)) in cased.split(' ').zip(slice.iter()) {
                    result[*index].get_or_insert_with(|| word.to_owned());
                }
            }
        }
    }
}

impl TrueCaser for StatisticalTrueCaser {
    fn truecase(&self, text: &str) -> String {
        let tokens = padded_tokens(text);
        let words: Vec<(usize, &Token)> = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.is_meaningful())
            .collect();

        let mut cased: Vec<Option<String>> = vec![None; tokens.len()];
        Self::select_from_ngrams(3, &self.trigrams, &words, &mut cased);
        Self::select_from_ngrams(2, &self.bigrams, &words, &mut cased);

        cased
            .into_iter()
            .zip(tokens.iter())
            .map(|(choice, token)| {
                choice
                    .or_else(|| {
                        token
                            .is_meaningful()
                            .then(|| self.unigrams.get(&token.normalized).cloned())
                            .flatten()
                    })
                    .unwrap_or_else(|| token.original.clone())
            })
            .collect()
    }
}

/// Fallback used when no case model is available: capitalizes the first
/// letter of each sentence and the pronoun "i".
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceCaser;

impl TrueCaser for SentenceCaser {
    fn truecase(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut sentence_start = true;

        for token in padded_tokens(text) {
            match token.kind {
                TokenKind::Separator => {
                    if token.original.contains(['.', '!', '?']) {
                        sentence_start = true;
                    }
                    result.push_str(&token.original);
                }
                TokenKind::Padding => {}
                _ => {
                    if sentence_start || token.normalized == "i" {
                        result.push_str(&capitalize(&token.original));
                    } else {
                        result.push_str(&token.original);
                    }
                    sentence_start = false;
                }
            }
        }
        result
    }
}

/// Load the model at `path`, falling back to `SentenceCaser` when absent
pub fn load_or_fallback<P: AsRef<Path>>(path: P) -> Result<Box<dyn TrueCaser>, ModelError> {
    let path = path.as_ref();
    if path.is_file() {
        Ok(Box::new(StatisticalTrueCaser::load(path)?))
    } else {
        warn!(
            "True-case model not found at {:?}, falling back to sentence casing",
            path
        );
        Ok(Box::new(SentenceCaser))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Counts how often each casing of a normalized form is seen
#[derive(Default)]
struct CaseStats {
    stats: HashMap<String, HashMap<String, u32>>,
}

impl CaseStats {
    fn add(&mut self, normalized: &str, original: &str) {
        *self
            .stats
            .entry(normalized.to_owned())
            .or_default()
            .entry(original.to_owned())
            .or_insert(0) += 1;
    }

    fn into_most_common(self, min_frequency: u32) -> CaseMap {
        self.stats
            .into_iter()
            .filter_map(|(normalized, casings)| {
                casings
                    .into_iter()
                    .filter(|(_, frequency)| *frequency >= min_frequency)
                    // Ties resolved on the casing itself so training is deterministic
                    .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
                    .map(|(casing, _)| (normalized, casing))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Ngram,
    Separator,
    Padding,
}

#[derive(Debug, Clone)]
struct Token {
    original: String,
    normalized: String,
    kind: TokenKind,
}

impl Token {
    fn new(text: &str, kind: TokenKind) -> Self {
        Self {
            original: text.to_owned(),
            normalized: text.to_lowercase(),
            kind,
        }
    }

    fn padding() -> Self {
        Self::new("", TokenKind::Padding)
    }

    fn ngram(tokens: &[Token]) -> Self {
        let original: Vec<&str> = tokens.iter().map(|t| t.original.as_str()).collect();
        let normalized: Vec<&str> = tokens.iter().map(|t| t.normalized.as_str()).collect();
        Self {
            original: original.join(" "),
            normalized: normalized.join(" "),
            kind: TokenKind::Ngram,
        }
    }

    fn is_meaningful(&self) -> bool {
        self.kind != TokenKind::Separator
    }
}

/// Split into word and separator tokens, with one padding token on each end
fn padded_tokens(text: &str) -> Vec<Token> {
    let mut tokens = vec![Token::padding()];
    let mut last = 0;
    for separator in WORD_SEPARATORS.find_iter(text) {
        if separator.start() > last {
            tokens.push(Token::new(&text[last..separator.start()], TokenKind::Word));
        }
        tokens.push(Token::new(separator.as_str(), TokenKind::Separator));
        last = separator.end();
    }
    if last < text.len() {
        tokens.push(Token::new(&text[last..], TokenKind::Word));
    }
    tokens.push(Token::padding());
    tokens
}

fn is_sentence_sane(sentence: &str) -> bool {
    !sentence
        .chars()
        .filter(|c| c.is_alphabetic())
        .all(char::is_uppercase)
}
