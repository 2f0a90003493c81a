/*!
 * Tests for text, file and directory processing through the controller
 */

use anonymizer::app_config::Config;
use anonymizer::app_controller::{Controller, OutputFormat};
use anonymizer::entities::EntitySpan;
use anonymizer::ner::EntityRecognizer;
use anonymizer::ner::mock::StaticRecognizer;
use anonymizer::providers::mock::MockProvider;
use anonymizer::{EntitySource, Gazetteer};
use std::fs;

use crate::common;

fn controller(provider: MockProvider) -> Controller {
    let recognizers: Vec<Box<dyn EntityRecognizer>> = vec![Box::new(StaticRecognizer::new(
        EntitySource::Statistical,
        vec![EntitySpan::new("John Smith", "PERSON")],
    ))];
    Controller::new(Config::default(), common::mock_anonymizer(provider, recognizers))
}

fn gazetteer() -> Gazetteer {
    Gazetteer::from_names(["Acme Corp"])
}

#[tokio::test]
async fn test_runFile_shouldWriteAnonymizedLinesNextToInput() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(
        temp_dir.path(),
        "letter.txt",
        "John Smith works at Acme Corp.\n\nPaid 300 euros.\n",
    )
    .unwrap();

    let output = controller(MockProvider::working())
        .run_file(&input, None, &gazetteer(), false)
        .await
        .unwrap();

    assert_eq!(output, temp_dir.path().join("letter.anon.txt"));
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "PERSON works at COMP.\n\npaid XXX euros.\n"
    );
}

#[tokio::test]
async fn test_runFile_withExistingOutput_shouldRequireForce() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(temp_dir.path(), "note.txt", "Tere.\n").unwrap();
    let output = common::create_test_file(temp_dir.path(), "out.txt", "keep me").unwrap();
    let controller = controller(MockProvider::working());

    let refused = controller
        .run_file(&input, Some(output.clone()), &gazetteer(), false)
        .await;
    assert!(refused.is_err());
    assert_eq!(fs::read_to_string(&output).unwrap(), "keep me");

    controller
        .run_file(&input, Some(output.clone()), &gazetteer(), true)
        .await
        .unwrap();
    assert_eq!(fs::read_to_string(&output).unwrap(), "tere.\n");
}

#[tokio::test]
async fn test_runFolder_shouldSkipExistingOutputsAndPreviousResults() {
    let temp_dir = common::create_temp_dir().unwrap();
    common::create_test_file(temp_dir.path(), "a.txt", "John Smith called.").unwrap();
    common::create_test_file(temp_dir.path(), "a.anon.txt", "already done\n").unwrap();
    common::create_test_file(temp_dir.path(), "nested/b.txt", "Acme Corp called.").unwrap();
    common::create_test_file(temp_dir.path(), "notes.md", "John Smith").unwrap();
    let provider = MockProvider::working();

    controller(provider.clone())
        .run_folder(temp_dir.path(), &gazetteer(), false)
        .await
        .unwrap();

    assert_eq!(
        fs::read_to_string(temp_dir.path().join("a.anon.txt")).unwrap(),
        "already done\n"
    );
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("nested/b.anon.txt")).unwrap(),
        "COMP called.\n"
    );
    assert!(!temp_dir.path().join("notes.anon.md").exists());
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_runFolder_withFailingTranslator_shouldReportFailure() {
    let temp_dir = common::create_temp_dir().unwrap();
    common::create_test_file(temp_dir.path(), "a.txt", "Tere.").unwrap();

    let result = controller(MockProvider::failing())
        .run_folder(temp_dir.path(), &gazetteer(), false)
        .await;

    assert!(result.is_err());
    assert!(!temp_dir.path().join("a.anon.txt").exists());
}

#[tokio::test]
async fn test_runFolder_withoutTextFiles_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();

    let result = controller(MockProvider::working())
        .run_folder(temp_dir.path(), &gazetteer(), false)
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_runText_withReportFormat_shouldEmitJson() {
    let controller = controller(MockProvider::working()).with_format(OutputFormat::Report);

    let rendered = controller
        .run_text("John Smith works at Acme Corp", &gazetteer())
        .await
        .unwrap();
    let report: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    assert_eq!(report["input"], "John Smith works at Acme Corp");
    assert_eq!(report["translated"], "John Smith works at Acme Corp.");
    assert_eq!(report["output"], "PERSON works at COMP.");
    assert_eq!(report["entities"]["entries"]["acme corp"]["label"], "COMP");
    assert_eq!(report["entities"]["entries"]["john smith"]["source"], "statistical");
}

#[test]
fn test_runLines_shouldPassBlankLinesThrough() {
    common::init_test_logging();
    let provider = MockProvider::working();
    let controller = controller(provider.clone());

    let result = tokio_test::block_on(async {
        controller
            .run_lines("John Smith left.\n   \nAcme Corp stayed.", &gazetteer(), None)
            .await
    });

    assert_eq!(result.unwrap(), "PERSON left.\n\nCOMP stayed.");
    assert_eq!(provider.request_count(), 2);
}

#[test]
fn test_loadGazetteer_shouldDefaultToConfiguredPath() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_gazetteer(temp_dir.path(), &["Acme Corp", "Globex"]).unwrap();
    let mut config = Config::default();
    config.gazetteer_path = path.to_string_lossy().to_string();
    let controller = Controller::new(config, common::mock_anonymizer(MockProvider::working(), Vec::new()));

    assert_eq!(controller.load_gazetteer(None).unwrap().len(), 2);
    assert!(controller.load_gazetteer(Some(temp_dir.path().join("missing.txt").as_path())).is_err());
}
