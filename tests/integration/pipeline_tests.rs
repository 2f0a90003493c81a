/*!
 * End-to-end tests of the anonymization pipeline with mock models
 */

use anonymizer::entities::EntitySpan;
use anonymizer::errors::{AnonymizerError, TranslationError};
use anonymizer::ner::mock::StaticRecognizer;
use anonymizer::ner::{ChunkRecognizer, EntityRecognizer, LlmRecognizer};
use anonymizer::providers::mock::MockProvider;
use anonymizer::{EntitySource, Gazetteer};
use std::sync::Arc;

use crate::common;

fn statistical(spans: &[(&str, &str)]) -> StaticRecognizer {
    StaticRecognizer::new(
        EntitySource::Statistical,
        spans.iter().map(|(text, label)| EntitySpan::new(*text, *label)).collect(),
    )
}

#[tokio::test]
async fn test_anonymize_withGazetteerAndPersonSpan_shouldMaskBoth() {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir().unwrap();
    let gazetteer = common::create_gazetteer(temp_dir.path(), &["Acme Corp"]).unwrap();
    let recognizers: Vec<Box<dyn EntityRecognizer>> =
        vec![Box::new(statistical(&[("John Smith", "PERSON")]))];
    let anonymizer = common::mock_anonymizer(MockProvider::working(), recognizers);

    let output = anonymizer
        .anonymize("John Smith works at Acme Corp.", &gazetteer)
        .await
        .unwrap();

    assert_eq!(output, "PERSON works at COMP.");
}

#[tokio::test]
async fn test_anonymize_withEmptyGazetteer_shouldProduceNoCompanyLabel() {
    let temp_dir = common::create_temp_dir().unwrap();
    let gazetteer = common::create_test_file(temp_dir.path(), "companies.txt", "").unwrap();
    let anonymizer = common::mock_anonymizer(MockProvider::working(), vec![Box::new(ChunkRecognizer::new())]);

    let output = anonymizer
        .anonymize("Mari Tamm works at Acme Corp since 2019.", &gazetteer)
        .await
        .unwrap();

    assert!(!output.contains("COMP"));
    assert_eq!(output, "PERSON works at ORGANIZATION since XXXX.");
}

#[tokio::test]
async fn test_anonymize_withLaterRecognizer_shouldOverrideGazetteerLabel() {
    let anonymizer = common::mock_anonymizer(MockProvider::working(), vec![Box::new(ChunkRecognizer::new())]);
    let gazetteer = Gazetteer::from_names(["acme corp"]);

    let report = anonymizer
        .anonymize_with_report("John Smith works at Acme Corp.", &gazetteer)
        .await
        .unwrap();

    assert_eq!(report.entities.label_of("acme corp"), Some("ORGANIZATION"));
    assert_eq!(report.entities.count_from(EntitySource::Gazetteer), 0);
    assert_eq!(report.output, "PERSON works at ORGANIZATION.");
}

#[tokio::test]
async fn test_anonymize_withLabelCollision_shouldKeepNeuralLabel() {
    let tagger = MockProvider::responding(|_| {
        r#"{"entities":[{"text":"Tallinn","label":"LOC"},{"text":"Narnia","label":"LOC"}]}"#.to_string()
    });
    let recognizers: Vec<Box<dyn EntityRecognizer>> = vec![
        Box::new(statistical(&[("Tallinn", "GPE"), ("Mari", "PERSON")])),
        Box::new(ChunkRecognizer::new()),
        Box::new(LlmRecognizer::new(Arc::new(tagger.clone()), "tagger")),
    ];
    let anonymizer = common::mock_anonymizer(MockProvider::working(), recognizers);

    let report = anonymizer
        .anonymize_with_report("Mari moved to Tallinn", &Gazetteer::default())
        .await
        .unwrap();

    assert_eq!(report.translated, "Mari moved to Tallinn.");
    assert_eq!(report.entities.label_of("tallinn"), Some("LOC"));
    assert_eq!(report.entities.label_of("narnia"), None);
    assert_eq!(report.output, "PERSON moved to LOC.");
    assert_eq!(tagger.requests()[0].prompt, "Mari moved to Tallinn.");
    assert!(tagger.requests()[0].json);
}

#[tokio::test]
async fn test_anonymize_recognizersShouldSeeTrueCasedTranslation() {
    let translator = MockProvider::responding(|_| "john smith lives in tartu.".to_string());
    let recorder = statistical(&[]);
    let anonymizer = common::mock_anonymizer(translator, vec![Box::new(recorder.clone())]);

    let report = anonymizer
        .anonymize_with_report("John Smith elab Tartus", &Gazetteer::default())
        .await
        .unwrap();

    assert_eq!(recorder.inputs(), vec!["John smith lives in tartu.".to_string()]);
    assert_eq!(report.output, "john smith lives in tartu.");
}

#[tokio::test]
async fn test_anonymize_withFailingTranslator_shouldNotRunRecognizers() {
    let recorder = statistical(&[("John", "PERSON")]);
    let anonymizer = common::mock_anonymizer(MockProvider::failing(), vec![Box::new(recorder.clone())]);

    let result = anonymizer
        .anonymize_with_gazetteer("Tere, John.", &Gazetteer::default())
        .await;

    assert!(matches!(result, Err(AnonymizerError::Translation(TranslationError::Provider(_)))));
    assert!(recorder.inputs().is_empty());
}

#[tokio::test]
async fn test_anonymize_withEmptyTranslation_shouldFail() {
    let anonymizer = common::mock_anonymizer(MockProvider::empty(), Vec::new());

    let result = anonymizer
        .anonymize_with_gazetteer("Tere hommikust", &Gazetteer::default())
        .await;

    assert!(matches!(
        result,
        Err(AnonymizerError::Translation(TranslationError::EmptyOutput(_)))
    ));
}

#[tokio::test]
async fn test_anonymize_gazetteerIsReadOnEveryCall() {
    let temp_dir = common::create_temp_dir().unwrap();
    let gazetteer = common::create_gazetteer(temp_dir.path(), &["Globex"]).unwrap();
    let anonymizer = common::mock_anonymizer(MockProvider::working(), Vec::new());

    let before = anonymizer.anonymize("Globex hired Initech.", &gazetteer).await.unwrap();
    common::create_gazetteer(temp_dir.path(), &["Globex", "Initech"]).unwrap();
    let after = anonymizer.anonymize("Globex hired Initech.", &gazetteer).await.unwrap();

    assert_eq!(before, "COMP hired initech.");
    assert_eq!(after, "COMP hired COMP.");
}
