/*!
 * Tests for application configuration functionality
 */

use anonymizer::app_config::{Config, LogLevel, ModelAsset, ProviderConfig, TranslationProvider};
use anonymizer::masking::SubstitutionOrder;
use std::path::PathBuf;
use std::str::FromStr;

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "et");
    assert_eq!(config.target_language, "en");
    assert_eq!(config.gazetteer_path, "companies.txt");
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.translation.get_endpoint(), "http://localhost:11434");
    assert!(config.ner.statistical.enabled);
    assert!(config.ner.rule_based.enabled);
    assert!(config.ner.neural.enabled);
    assert_eq!(config.masking.order, SubstitutionOrder::LongestFirst);
    assert_eq!(config.masking.digit_placeholder, "X");
    assert!(config.pipeline.append_terminal_period);
    assert_eq!(config.truecase_model_path(), PathBuf::from("models/truecase.json"));
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.source_language = "not-a-language".to_string();
    assert!(config.validate().is_err());
    config.source_language = "et".to_string();

    config.masking.digit_placeholder = String::new();
    assert!(config.validate().is_err());
    config.masking.digit_placeholder = "#".to_string();

    config.ner.statistical.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
    config.ner.statistical.enabled = false;
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_withHostedProviderWithoutKey_shouldFail() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::OpenAI;
    assert!(config.validate().is_err());

    for provider in config.translation.available_providers.iter_mut() {
        if provider.provider_type == "openai" {
            provider.api_key = "sk-test".to_string();
        }
    }
    assert!(config.validate().is_ok());

    config.ner.neural.provider = TranslationProvider::OpenAI;
    assert!(config.validate().is_err());
    config.ner.neural.api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_partialConfigFile_shouldFillDefaults() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "source_language": "et",
            "target_language": "en",
            "translation": { "provider": "lmstudio" },
            "masking": { "order": "insertion" },
            "ner": { "statistical": { "enabled": false } }
        }"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.translation.provider, TranslationProvider::LMStudio);
    assert_eq!(config.translation.get_endpoint(), "http://localhost:1234/v1");
    assert_eq!(config.masking.order, SubstitutionOrder::Insertion);
    assert!(!config.ner.statistical.enabled);
    assert_eq!(config.ner.statistical.model, "en_core_web_lg");
    assert!(config.ner.neural.enabled);
    assert_eq!(config.models.assets.len(), 1);
}

#[test]
fn test_truecaseModelPath_withCustomModelsDir_shouldFollowAsset() {
    let mut config = Config::default();
    config.models.dir = "/var/lib/anonymizer".to_string();

    assert_eq!(
        config.truecase_model_path(),
        PathBuf::from("/var/lib/anonymizer/truecase.json")
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_truecaseModelPath_withExplicitPath_shouldOverrideAsset() {
    let mut config = Config::default();
    config.truecase.model_path = Some("/opt/models/cased.json".to_string());

    assert_eq!(config.truecase_model_path(), PathBuf::from("/opt/models/cased.json"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_withDownloadedModelElsewhere_shouldFail() {
    let mut config = Config::default();
    config.models.dir = "/var/lib/anonymizer".to_string();
    config.models.assets = vec![ModelAsset {
        name: "truecase".to_string(),
        file: "truecase.json".to_string(),
        url: Some("https://models.example.com/truecase.json".to_string()),
        sha256: None,
    }];
    config.truecase.model_path = Some("models/truecase.json".to_string());

    assert!(config.validate().is_err());

    config.truecase.model_path = Some("/var/lib/anonymizer/truecase.json".to_string());
    assert!(config.validate().is_ok());
}

#[test]
fn test_saveThenLoad_shouldPreserveOverrides() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("conf.json");
    let mut config = Config::default();
    config.target_language = "de".to_string();
    config.ner.neural.model = "qwen2.5:7b".to_string();

    config.save(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.target_language, "de");
    assert_eq!(loaded.ner.neural.provider_config().model, "qwen2.5:7b");
}

#[test]
fn test_resolvedProviderConfig_withEmptyFields_shouldUseProviderDefaults() {
    let mut config = Config::default();
    config.translation.available_providers = vec![ProviderConfig {
        provider_type: "ollama".to_string(),
        model: String::new(),
        api_key: String::new(),
        endpoint: String::new(),
        timeout_secs: 5,
        rate_limit: None,
    }];

    let resolved = config.translation.resolved_provider_config();

    assert_eq!(resolved.model, "llama3.1:8b");
    assert_eq!(resolved.endpoint, "http://localhost:11434");
    assert_eq!(resolved.timeout_secs, 5);
}

#[test]
fn test_translationProvider_fromStr_shouldAcceptKnownNames() {
    assert_eq!(TranslationProvider::from_str("Ollama").unwrap(), TranslationProvider::Ollama);
    assert_eq!(TranslationProvider::from_str("lmstudio").unwrap(), TranslationProvider::LMStudio);
    assert!(TranslationProvider::from_str("anthropic").is_err());
    assert_eq!(TranslationProvider::OpenAI.to_string(), "openai");
}
