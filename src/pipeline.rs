/*!
 * The anonymization pipeline.
 *
 * One call handles one sentence: gazetteer entries, translation,
 * true-casing, the three recognizers in order, then masking. The entity
 * map lives for the duration of the call only.
 */

use log::{debug, info};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

use crate::app_config::Config;
use crate::entities::{EntityMap, EntitySource};
use crate::errors::AnonymizerError;
use crate::gazetteer::Gazetteer;
use crate::masking::Masker;
use crate::models::ModelStore;
use crate::ner::{ChunkRecognizer, EntityRecognizer, LlmRecognizer, SpacyRecognizer};
use crate::providers::build_provider;
use crate::translation::{LlmTranslator, TranslationCache, Translator, ensure_terminal_period};
use crate::truecase::{self, TrueCaser};

/// Behavior switches of the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Append "." to input ending in a word character before translation
    pub append_terminal_period: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            append_terminal_period: true,
        }
    }
}

/// Every intermediate result of one anonymization call
#[derive(Debug, Clone, Serialize)]
pub struct AnonymizationReport {
    /// Sentence as given by the caller
    pub input: String,
    /// Translation of the (punctuated) input
    pub translated: String,
    /// Translation after case restoration
    pub truecased: String,
    /// Merged entity mapping used for masking
    pub entities: EntityMap,
    /// Masked output
    pub output: String,
}

/// Sentence anonymizer owning its model handles
pub struct Anonymizer {
    translator: Box<dyn Translator>,
    truecaser: Box<dyn TrueCaser>,
    recognizers: Vec<Box<dyn EntityRecognizer>>,
    masker: Masker,
    options: PipelineOptions,
}

impl Anonymizer {
    /// Assemble a pipeline from ready-made parts.
    ///
    /// Recognizers run in the order given; the last one to report a key
    /// decides its label.
    pub fn new(
        translator: Box<dyn Translator>,
        truecaser: Box<dyn TrueCaser>,
        recognizers: Vec<Box<dyn EntityRecognizer>>,
        masker: Masker,
        options: PipelineOptions,
    ) -> Self {
        Self {
            translator,
            truecaser,
            recognizers,
            masker,
            options,
        }
    }

    /// Build every component from configuration, fetching missing models first
    pub async fn from_config(config: &Config) -> Result<Self, AnonymizerError> {
        ModelStore::from_config(&config.models).ensure_assets().await?;

        let common = &config.translation.common;
        let provider_config = config.translation.resolved_provider_config();
        let provider = build_provider(
            &config.translation.provider,
            &provider_config,
            common.retry_count,
            common.retry_backoff_ms,
        );
        info!(
            "Translating {} -> {} with {} ({})",
            config.source_language,
            config.target_language,
            config.translation.provider.display_name(),
            provider_config.model
        );
        let translator = LlmTranslator::new(
            provider,
            &provider_config.model,
            &common.system_prompt,
            &config.source_language,
            &config.target_language,
        )
        .with_temperature(common.temperature)
        .with_cache(TranslationCache::new(common.cache_enabled));

        let truecaser = truecase::load_or_fallback(config.truecase_model_path())?;

        let mut recognizers: Vec<Box<dyn EntityRecognizer>> = Vec::new();
        let ner = &config.ner;
        if ner.statistical.enabled {
            recognizers.push(Box::new(SpacyRecognizer::new(
                &ner.statistical.endpoint,
                &ner.statistical.model,
                ner.statistical.timeout_secs,
            )));
        }
        if ner.rule_based.enabled {
            recognizers.push(Box::new(ChunkRecognizer::new()));
        }
        if ner.neural.enabled {
            let neural_config = ner.neural.provider_config();
            let neural_provider = build_provider(
                &ner.neural.provider,
                &neural_config,
                common.retry_count,
                common.retry_backoff_ms,
            );
            recognizers.push(Box::new(LlmRecognizer::new(neural_provider, neural_config.model)));
        }

        let masker = Masker::new(config.masking.order, &config.masking.digit_placeholder);
        let options = PipelineOptions {
            append_terminal_period: config.pipeline.append_terminal_period,
        };

        Ok(Self::new(Box::new(translator), truecaser, recognizers, masker, options))
    }

    /// Names of the active recognizers, in run order
    pub fn recognizer_names(&self) -> Vec<&str> {
        self.recognizers.iter().map(|r| r.name()).collect()
    }

    /// Anonymize `sentence`, reading company names from `gazetteer_path`.
    ///
    /// The gazetteer is read again on every call.
    pub async fn anonymize<P: AsRef<Path>>(
        &self,
        sentence: &str,
        gazetteer_path: P,
    ) -> Result<String, AnonymizerError> {
        let gazetteer = Gazetteer::load(gazetteer_path)?;
        self.anonymize_with_gazetteer(sentence, &gazetteer).await
    }

    /// Anonymize `sentence` with an already loaded gazetteer
    pub async fn anonymize_with_gazetteer(
        &self,
        sentence: &str,
        gazetteer: &Gazetteer,
    ) -> Result<String, AnonymizerError> {
        Ok(self.anonymize_with_report(sentence, gazetteer).await?.output)
    }

    /// Anonymize `sentence` and keep every intermediate result
    pub async fn anonymize_with_report(
        &self,
        sentence: &str,
        gazetteer: &Gazetteer,
    ) -> Result<AnonymizationReport, AnonymizerError> {
        let start_time = Instant::now();
        let mut entities = EntityMap::new();
        gazetteer.apply(&mut entities);

        let prepared = if self.options.append_terminal_period {
            ensure_terminal_period(sentence)
        } else {
            sentence.to_string()
        };

        let translated = self.translator.translate(&prepared).await?;
        debug!("Translated: {:?}", translated);

        let truecased = self.truecaser.truecase(&translated);
        debug!("True-cased: {:?}", truecased);

        for recognizer in &self.recognizers {
            let spans = recognizer
                .recognize(&truecased)
                .await
                .map_err(|source| AnonymizerError::Recognizer {
                    recognizer: recognizer.name().to_string(),
                    source,
                })?;
            debug!("{} reported {} spans", recognizer.name(), spans.len());
            entities.extend_spans(&spans, recognizer.source());
        }

        let output = self.masker.mask(&truecased, &entities)?;
        debug!(
            "Anonymized in {:?}: {} entities ({} from gazetteer)",
            start_time.elapsed(),
            entities.len(),
            entities.count_from(EntitySource::Gazetteer)
        );

        Ok(AnonymizationReport {
            input: sentence.to_string(),
            translated,
            truecased,
            entities,
            output,
        })
    }
}
