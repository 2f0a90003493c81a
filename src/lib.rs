/*!
 * # Anonymizer - named-entity anonymization of free text
 *
 * A Rust library that replaces people, places, organizations, known company
 * names and digits in a sentence by category labels.
 *
 * ## Pipeline
 *
 * One call processes one sentence:
 * 1. Company names from a gazetteer become `COMP` entries
 * 2. The sentence is translated into the target language by an LLM
 * 3. Capitalization of the translation is restored
 * 4. Three recognizers (spaCy service, rule-based chunker, LLM tagger) add
 *    entries; the last one to report a key decides its label
 * 5. Every whole-word occurrence of each key in the lower-cased text is
 *    replaced by its label and every digit becomes `X`
 *
 * ## Architecture
 *
 * - `app_config`: Configuration management
 * - `pipeline`: The `Anonymizer` tying the stages together
 * - `gazetteer`: Company-name list loading
 * - `translation`: Translator trait, LLM translator and cache
 * - `truecase`: Case restoration models
 * - `ner`: Entity recognizers
 * - `entities`: Shared entity mapping
 * - `masking`: Whole-word substitution and digit masking
 * - `models`: Model files fetched on first use
 * - `providers`: Clients for LLM providers (Ollama, OpenAI-compatible)
 * - `app_controller`: Text, file and directory processing for the CLI
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod entities;
pub mod errors;
pub mod file_utils;
pub mod gazetteer;
pub mod language_utils;
pub mod masking;
pub mod models;
pub mod ner;
pub mod pipeline;
pub mod providers;
pub mod translation;
pub mod truecase;

// Re-export main types for easier usage
pub use app_config::Config;
pub use entities::{EntityMap, EntitySource, EntitySpan};
pub use errors::{AnonymizerError, AppError, ProviderError, RecognizerError, TranslationError};
pub use gazetteer::Gazetteer;
pub use masking::{Masker, SubstitutionOrder};
pub use pipeline::{AnonymizationReport, Anonymizer, PipelineOptions};
