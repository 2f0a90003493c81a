/*!
 * Tests for error types and conversions
 */

use anonymizer::errors::{
    AnonymizerError, AppError, GazetteerError, ModelError, ProviderError, RecognizerError, TranslationError,
};
use std::path::PathBuf;

#[test]
fn test_providerError_fromStatus_shouldClassify() {
    assert!(matches!(
        ProviderError::from_status(401, "bad key".to_string()),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(429, "slow down".to_string()),
        ProviderError::RateLimitExceeded(_)
    ));
    assert!(matches!(
        ProviderError::from_status(500, "boom".to_string()),
        ProviderError::ApiError { status_code: 500, .. }
    ));
}

#[test]
fn test_providerError_isTransient_shouldOnlyRetryServerSideFailures() {
    assert!(ProviderError::ConnectionError("refused".to_string()).is_transient());
    assert!(ProviderError::from_status(503, String::new()).is_transient());
    assert!(!ProviderError::from_status(400, String::new()).is_transient());
    assert!(!ProviderError::ParseError("bad json".to_string()).is_transient());
}

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 502,
        message: "Bad gateway".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("502"));
    assert!(display.contains("Bad gateway"));
}

#[test]
fn test_anonymizerError_fromTranslationError_shouldWrapProvider() {
    let error: AnonymizerError = TranslationError::from(ProviderError::RequestFailed("timeout".to_string())).into();
    let display = format!("{}", error);
    assert!(display.contains("Translation error"));
    assert!(display.contains("timeout"));
}

#[test]
fn test_anonymizerError_recognizer_shouldNameRecognizer() {
    let error = AnonymizerError::Recognizer {
        recognizer: "spacy".to_string(),
        source: RecognizerError::Service("connection refused".to_string()),
    };
    let display = format!("{}", error);
    assert!(display.contains("spacy"));
    assert!(display.contains("connection refused"));
}

#[test]
fn test_gazetteerError_shouldIncludePath() {
    let error = GazetteerError::Io {
        path: PathBuf::from("missing/companies.txt"),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
    };
    assert!(format!("{}", error).contains("missing/companies.txt"));
}

#[test]
fn test_modelError_checksum_shouldShowBothDigests() {
    let error = ModelError::Checksum {
        name: "truecase".to_string(),
        expected: "aaaa".to_string(),
        actual: "bbbb".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("aaaa") && display.contains("bbbb"));
}

#[test]
fn test_appError_conversions_shouldWrapCorrectly() {
    let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    assert!(matches!(AppError::from(io_error), AppError::File(_)));

    let anyhow_error = anyhow::anyhow!("something odd");
    assert!(matches!(AppError::from(anyhow_error), AppError::Unknown(_)));

    let pipeline_error = AnonymizerError::Pattern {
        key: "(".to_string(),
        message: "unclosed group".to_string(),
    };
    assert!(matches!(AppError::from(pipeline_error), AppError::Anonymizer(_)));
}
