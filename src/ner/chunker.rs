/*!
 * Rule-based entity chunker.
 *
 * Tags tokens with a coarse part of speech, groups consecutive proper nouns
 * into chunks and labels each chunk from its surface and context. Labels
 * follow the classic chunker tag set: PERSON, ORGANIZATION, GPE, LOCATION
 * and FACILITY.
 */

use async_trait::async_trait;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::EntityRecognizer;
use crate::entities::{EntitySource, EntitySpan};
use crate::errors::RecognizerError;

pub const PERSON: &str = "PERSON";
pub const ORGANIZATION: &str = "ORGANIZATION";
pub const GPE: &str = "GPE";
pub const LOCATION: &str = "LOCATION";
pub const FACILITY: &str = "FACILITY";

// Words, numbers with separators, and single punctuation marks
static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:[.,:]\d+)*|\w+(?:['’\-&]\w+)*|[^\w\s]").unwrap());

const ORG_SUFFIX: &[&str] = &[
    "inc", "corp", "corporation", "incorporated", "ltd", "limited", "llc", "plc", "co", "company", "gmbh",
    "ag", "sa", "nv", "bv", "ab", "as", "oü", "group", "holding", "holdings", "bank", "university", "college",
    "institute", "foundation", "agency", "ministry", "association", "union", "council",
];

const HONORIFIC: &[&str] = &["mr", "mrs", "ms", "miss", "dr", "prof", "sir", "madam", "mister"];

const LOC_PREPOSITION: &[&str] = &["in", "from", "to", "near", "into", "across", "via", "around"];

const FACILITY_HEAD: &[&str] = &[
    "airport", "station", "hospital", "bridge", "stadium", "street", "road", "avenue", "square", "harbour",
    "harbor", "port", "centre", "center", "building", "tower", "hall", "church", "cathedral", "museum",
    "library", "highway", "park",
];

const LOCATION_HEAD: &[&str] = &[
    "river", "lake", "sea", "ocean", "bay", "gulf", "island", "islands", "mountain", "mountains", "valley",
    "coast", "peninsula", "forest", "desert", "region",
];

// Closed-class words never tagged as proper nouns, even when capitalized
const CLOSED_CLASS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "i", "you", "he", "she", "it", "we", "they", "me",
    "him", "her", "us", "them", "my", "your", "his", "its", "our", "their", "in", "on", "at", "to", "for",
    "from", "by", "with", "of", "into", "near", "about", "after", "before", "and", "but", "or", "so", "yet",
    "if", "because", "when", "where", "who", "what", "why", "how", "is", "are", "was", "were", "be", "been",
    "has", "have", "had", "do", "does", "did", "not", "no", "yes", "there", "here", "today", "yesterday",
    "tomorrow", "now", "then", "please", "thanks", "hello", "dear", "monday", "tuesday", "wednesday",
    "thursday", "friday", "saturday", "sunday",
];

/// Coarse part-of-speech tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosTag {
    ProperNoun,
    Cardinal,
    Closed,
    Punctuation,
    Other,
}

/// A token and its tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken<'a> {
    pub text: &'a str,
    pub tag: PosTag,
}

/// Split text into word, number and punctuation tokens
pub fn tokenize(text: &str) -> Vec<&str> {
    TOKEN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Tag tokens from capitalization, digits and closed-class word lists
pub fn pos_tag<'a>(tokens: &[&'a str]) -> Vec<TaggedToken<'a>> {
    tokens
        .iter()
        .map(|&text| {
            let lower = text.to_lowercase();
            let first = text.chars().next();
            let tag = if first.is_some_and(|c| c.is_ascii_digit()) {
                PosTag::Cardinal
            } else if first.is_some_and(|c| !c.is_alphanumeric()) {
                PosTag::Punctuation
            } else if CLOSED_CLASS.contains(&lower.as_str()) {
                PosTag::Closed
            } else if first.is_some_and(char::is_uppercase) {
                PosTag::ProperNoun
            } else {
                PosTag::Other
            };
            TaggedToken { text, tag }
        })
        .collect()
}

/// A run of proper nouns with its position in the token list
#[derive(Debug, Clone, PartialEq)]
struct Chunk<'a> {
    start: usize,
    words: Vec<&'a str>,
}

fn is_honorific(token: &TaggedToken<'_>) -> bool {
    HONORIFIC.contains(&token.text.to_lowercase().as_str())
}

// Proper-noun runs; "of" joins two runs ("Bank of America"), honorifics are
// left out of the chunk they introduce.
fn chunk<'a>(tagged: &[TaggedToken<'a>]) -> Vec<Chunk<'a>> {
    let mut chunks = Vec::new();
    let mut i = 0;

    while i < tagged.len() {
        if tagged[i].tag != PosTag::ProperNoun || is_honorific(&tagged[i]) {
            i += 1;
            continue;
        }

        let start = i;
        let mut words = vec![tagged[i].text];
        i += 1;
        while i < tagged.len() {
            if tagged[i].tag == PosTag::ProperNoun && !is_honorific(&tagged[i]) {
                words.push(tagged[i].text);
                i += 1;
            } else if tagged[i].text.eq_ignore_ascii_case("of")
                && tagged.get(i + 1).is_some_and(|next| next.tag == PosTag::ProperNoun)
            {
                words.push(tagged[i].text);
                words.push(tagged[i + 1].text);
                i += 2;
            } else {
                break;
            }
        }
        chunks.push(Chunk { start, words });
    }

    chunks
}

// Token before the chunk, skipping the period of an abbreviated honorific
fn preceding_word<'a>(tagged: &[TaggedToken<'a>], start: usize) -> Option<&'a str> {
    let mut idx = start.checked_sub(1)?;
    if tagged[idx].text == "." {
        idx = idx.checked_sub(1)?;
        if !is_honorific(&tagged[idx]) {
            return None;
        }
    }
    Some(tagged[idx].text)
}

fn classify(chunk: &Chunk<'_>, tagged: &[TaggedToken<'_>]) -> &'static str {
    let lower: Vec<String> = chunk.words.iter().map(|w| w.to_lowercase()).collect();
    let last = lower.last().map(String::as_str).unwrap_or_default();
    let previous = preceding_word(tagged, chunk.start).map(str::to_lowercase);

    if ORG_SUFFIX.contains(&last) {
        return ORGANIZATION;
    }
    if previous.as_deref().is_some_and(|p| HONORIFIC.contains(&p)) {
        return PERSON;
    }
    if FACILITY_HEAD.contains(&last) {
        return FACILITY;
    }
    if LOCATION_HEAD.contains(&last) {
        return LOCATION;
    }
    if lower.iter().any(|w| w == "of") {
        return ORGANIZATION;
    }
    if chunk.words.len() == 1 && is_acronym(chunk.words[0]) {
        return ORGANIZATION;
    }
    if previous.as_deref().is_some_and(|p| LOC_PREPOSITION.contains(&p)) {
        return GPE;
    }
    PERSON
}

fn is_acronym(word: &str) -> bool {
    word.chars().count() >= 2 && word.chars().all(|c| c.is_uppercase() || c.is_ascii_digit())
}

/// Rule-based chunking recognizer
#[derive(Debug, Default, Clone)]
pub struct ChunkRecognizer;

impl ChunkRecognizer {
    pub fn new() -> Self {
        Self
    }

    /// Labelled chunks of `text`; chunk text is its tokens joined by a space
    pub fn extract(&self, text: &str) -> Vec<EntitySpan> {
        let tokens = tokenize(text);
        let tagged = pos_tag(&tokens);
        chunk(&tagged)
            .iter()
            .map(|c| EntitySpan::new(c.words.join(" "), classify(c, &tagged)))
            .collect()
    }
}

#[async_trait]
impl EntityRecognizer for ChunkRecognizer {
    fn name(&self) -> &str {
        "chunker"
    }

    fn source(&self) -> EntitySource {
        EntitySource::RuleBased
    }

    async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, RecognizerError> {
        let spans = self.extract(text);
        debug!("Chunker found {} entities", spans.len());
        Ok(spans)
    }
}
