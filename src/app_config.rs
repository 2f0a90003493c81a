use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use url::Url;

use crate::masking::SubstitutionOrder;

/// Application configuration module
/// This module handles loading, validating and saving the anonymizer
/// configuration. Every section has defaults so a partial `conf.json` works.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language of the input text (ISO)
    pub source_language: String,

    /// Language the text is translated into before entity extraction (ISO)
    pub target_language: String,

    /// Company-name list used when the caller does not give one
    #[serde(default = "default_gazetteer_path")]
    pub gazetteer_path: String,

    /// Translation config
    pub translation: TranslationConfig,

    /// True-casing config
    #[serde(default)]
    pub truecase: TrueCaseConfig,

    /// Entity recognizer config
    #[serde(default)]
    pub ner: NerConfig,

    /// Masking config
    #[serde(default)]
    pub masking: MaskingConfig,

    /// Pipeline behavior switches
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Model files kept on disk
    #[serde(default)]
    pub models: ModelsConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// LLM provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: OpenAI
    OpenAI,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI)
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(&provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(&provider_type),
            timeout_secs: default_timeout_secs(),
            rate_limit: default_rate_limit(&provider_type),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template for translation
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Memoize translations of identical sentences within a process
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            cache_enabled: true,
        }
    }
}

/// True-casing configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TrueCaseConfig {
    /// Case model file; when unset, the `truecase` asset inside `models.dir`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
}

/// Named-entity recognizer configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct NerConfig {
    #[serde(default)]
    pub statistical: StatisticalNerConfig,

    #[serde(default)]
    pub rule_based: RuleBasedNerConfig,

    #[serde(default)]
    pub neural: NeuralNerConfig,
}

/// spaCy entity service settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StatisticalNerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL of the entity service
    #[serde(default = "default_spacy_endpoint")]
    pub endpoint: String,

    /// spaCy pipeline name passed with each request
    #[serde(default = "default_spacy_model")]
    pub model: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StatisticalNerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_spacy_endpoint(),
            model: default_spacy_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Rule-based chunker settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RuleBasedNerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for RuleBasedNerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// LLM sequence tagger settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NeuralNerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub provider: TranslationProvider,

    /// Model name, provider default when empty
    #[serde(default = "String::new")]
    pub model: String,

    /// Service URL, provider default when empty
    #[serde(default = "String::new")]
    pub endpoint: String,

    #[serde(default = "String::new")]
    pub api_key: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl NeuralNerConfig {
    /// Provider settings with defaults filled in for empty fields
    pub fn provider_config(&self) -> ProviderConfig {
        let mut config = ProviderConfig::new(self.provider.clone());
        if !self.model.is_empty() {
            config.model = self.model.clone();
        }
        if !self.endpoint.is_empty() {
            config.endpoint = self.endpoint.clone();
        }
        config.api_key = self.api_key.clone();
        config.timeout_secs = self.timeout_secs;
        config
    }
}

impl Default for NeuralNerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: TranslationProvider::default(),
            model: String::new(),
            endpoint: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Masking settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MaskingConfig {
    /// Order in which entity keys are substituted
    #[serde(default)]
    pub order: SubstitutionOrder,

    /// Replacement for every digit
    #[serde(default = "default_digit_placeholder")]
    pub digit_placeholder: String,
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            order: SubstitutionOrder::default(),
            digit_placeholder: default_digit_placeholder(),
        }
    }
}

/// Pipeline behavior switches
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Append "." to sentences ending in a word character before translating
    #[serde(default = "default_true")]
    pub append_terminal_period: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            append_terminal_period: true,
        }
    }
}

/// A model file fetched on first use
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ModelAsset {
    /// Name used in logs
    pub name: String,

    /// File name inside `models.dir`
    pub file: String,

    /// Where to download the file from when it is missing
    #[serde(default)]
    pub url: Option<String>,

    /// Expected SHA-256 of the file, hex encoded
    #[serde(default)]
    pub sha256: Option<String>,
}

/// Model storage settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModelsConfig {
    /// Directory holding model files
    #[serde(default = "default_models_dir")]
    pub dir: String,

    /// Files to fetch when missing
    #[serde(default = "default_model_assets")]
    pub assets: Vec<ModelAsset>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            dir: default_models_dir(),
            assets: default_model_assets(),
        }
    }
}

impl ModelsConfig {
    /// Where `asset` is stored
    pub fn asset_path(&self, asset: &ModelAsset) -> PathBuf {
        Path::new(&self.dir).join(&asset.file)
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_temperature() -> f32 {
    0.0
}

fn default_true() -> bool {
    true
}

fn default_gazetteer_path() -> String {
    "companies.txt".to_string()
}

fn default_endpoint(provider: &TranslationProvider) -> String {
    match provider {
        TranslationProvider::Ollama => "http://localhost:11434".to_string(),
        TranslationProvider::OpenAI => "https://api.openai.com/v1".to_string(),
        // LM Studio's OpenAI-compatible server listens on 1234 under /v1
        TranslationProvider::LMStudio => "http://localhost:1234/v1".to_string(),
    }
}

fn default_model(provider: &TranslationProvider) -> String {
    match provider {
        TranslationProvider::Ollama => "llama3.1:8b".to_string(),
        TranslationProvider::OpenAI => "gpt-4o-mini".to_string(),
        TranslationProvider::LMStudio => "local-model".to_string(),
    }
}

fn default_rate_limit(provider: &TranslationProvider) -> Option<u32> {
    match provider {
        TranslationProvider::OpenAI => Some(60),
        _ => None,
    }
}

fn default_system_prompt() -> String {
    "You are a machine translation engine. Translate the user's text from {source_language} to {target_language}. Output only the translation, without quotes, notes or explanations.".to_string()
}

fn default_spacy_endpoint() -> String {
    "http://localhost:8080".to_string()
}

fn default_spacy_model() -> String {
    "en_core_web_lg".to_string()
}

fn default_digit_placeholder() -> String {
    "X".to_string()
}

fn default_models_dir() -> String {
    "models".to_string()
}

/// Asset name of the true-case model
pub const TRUECASE_ASSET: &str = "truecase";

fn default_model_assets() -> Vec<ModelAsset> {
    vec![ModelAsset {
        name: TRUECASE_ASSET.to_string(),
        file: "truecase.json".to_string(),
        url: None,
        sha256: None,
    }]
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open config file: {:?}", path))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write config to file: {:?}", path.as_ref()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::get_language_name(&self.source_language)?;
        crate::language_utils::get_language_name(&self.target_language)?;

        let provider = &self.translation.provider;
        if provider.requires_api_key() && self.translation.get_api_key().is_empty() {
            return Err(anyhow!(
                "Translation API key is required for {} provider",
                provider.display_name()
            ));
        }
        validate_endpoint("translation", &self.translation.get_endpoint())?;

        if self.ner.statistical.enabled {
            validate_endpoint("ner.statistical", &self.ner.statistical.endpoint)?;
        }

        let neural = &self.ner.neural;
        if neural.enabled {
            if neural.provider.requires_api_key() && neural.api_key.is_empty() {
                return Err(anyhow!(
                    "API key is required for {} neural recognizer",
                    neural.provider.display_name()
                ));
            }
            validate_endpoint("ner.neural", &neural.provider_config().endpoint)?;
        }

        if self.masking.digit_placeholder.is_empty() {
            return Err(anyhow!("masking.digit_placeholder must not be empty"));
        }

        for asset in &self.models.assets {
            if let Some(url) = &asset.url {
                validate_endpoint(&format!("models.assets[{}]", asset.name), url)?;
            }
        }

        // A downloaded model must land where the true-caser looks for it
        if let (Some(explicit), Some(asset)) = (&self.truecase.model_path, self.truecase_asset()) {
            let downloaded = self.models.asset_path(asset);
            if asset.url.is_some() && Path::new(explicit) != downloaded {
                return Err(anyhow!(
                    "truecase.model_path {:?} differs from the downloaded model {:?}",
                    explicit,
                    downloaded
                ));
            }
        }

        Ok(())
    }

    /// Path of the true-case model.
    ///
    /// An explicit `truecase.model_path` wins; otherwise the `truecase`
    /// asset inside `models.dir`.
    pub fn truecase_model_path(&self) -> PathBuf {
        match (&self.truecase.model_path, self.truecase_asset()) {
            (Some(explicit), _) => PathBuf::from(explicit),
            (None, Some(asset)) => self.models.asset_path(asset),
            (None, None) => Path::new(&self.models.dir).join("truecase.json"),
        }
    }

    fn truecase_asset(&self) -> Option<&ModelAsset> {
        self.models.assets.iter().find(|asset| asset.name == TRUECASE_ASSET)
    }
}

fn validate_endpoint(field: &str, endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint).with_context(|| format!("Invalid URL for {}: {}", field, endpoint))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(anyhow!("Unsupported scheme '{}' for {}", other, field)),
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "et".to_string(),
            target_language: "en".to_string(),
            gazetteer_path: default_gazetteer_path(),
            translation: TranslationConfig::default(),
            truecase: TrueCaseConfig::default(),
            ner: NerConfig::default(),
            masking: MaskingConfig::default(),
            pipeline: PipelineConfig::default(),
            models: ModelsConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Active provider settings with defaults filled in for empty fields
    pub fn resolved_provider_config(&self) -> ProviderConfig {
        let mut resolved = ProviderConfig::new(self.provider.clone());
        if let Some(configured) = self.get_active_provider_config() {
            if !configured.model.is_empty() {
                resolved.model = configured.model.clone();
            }
            if !configured.endpoint.is_empty() {
                resolved.endpoint = configured.endpoint.clone();
            }
            resolved.api_key = configured.api_key.clone();
            resolved.timeout_secs = configured.timeout_secs;
            resolved.rate_limit = configured.rate_limit;
        }
        resolved
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        self.resolved_provider_config().model
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.resolved_provider_config().api_key
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        self.resolved_provider_config().endpoint
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Ollama),
                ProviderConfig::new(TranslationProvider::OpenAI),
                ProviderConfig::new(TranslationProvider::LMStudio),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
