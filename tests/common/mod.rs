/*!
 * Common test utilities for the anonymizer test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use anonymizer::ner::EntityRecognizer;
use anonymizer::providers::mock::MockProvider;
use anonymizer::translation::LlmTranslator;
use anonymizer::truecase::SentenceCaser;
use anonymizer::{Anonymizer, Masker, PipelineOptions};

/// Route `log` output through the test harness; RUST_LOG picks the level
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a gazetteer file with one name per line
pub fn create_gazetteer(dir: &Path, names: &[&str]) -> Result<PathBuf> {
    create_test_file(dir, "companies.txt", &format!("{}\n", names.join("\n")))
}

/// Pipeline with a mock translator, sentence casing and the given recognizers
pub fn mock_anonymizer(translator: MockProvider, recognizers: Vec<Box<dyn EntityRecognizer>>) -> Anonymizer {
    let translator = LlmTranslator::new(
        Arc::new(translator),
        "mock-model",
        "Translate from {source_language} to {target_language}.",
        "et",
        "en",
    );
    Anonymizer::new(
        Box::new(translator),
        Box::new(SentenceCaser),
        recognizers,
        Masker::default(),
        PipelineOptions::default(),
    )
}
