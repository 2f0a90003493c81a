/*!
 * Tests for true-case model training and loading
 */

use anonymizer::truecase::{self, StatisticalTrueCaser, TrueCaser};

use crate::common;

fn corpus() -> String {
    let mut lines = Vec::new();
    for _ in 0..12 {
        lines.push("Mari Tamm works for Acme Corp in Tallinn.");
        lines.push("The office of Acme Corp is in Tallinn.");
    }
    lines.join("\n")
}

#[test]
fn test_trainOnFile_thenSave_shouldRestoreCasing() {
    let temp_dir = common::create_temp_dir().unwrap();
    let corpus_path = common::create_test_file(temp_dir.path(), "corpus.txt", &corpus()).unwrap();
    let model_path = temp_dir.path().join("models/truecase.json");

    let model = StatisticalTrueCaser::train_on_file(&corpus_path).unwrap();
    model.save(&model_path).unwrap();
    let caser = truecase::load_or_fallback(&model_path).unwrap();

    assert_eq!(
        caser.truecase("mari tamm works for acme corp in tallinn."),
        "Mari Tamm works for Acme Corp in Tallinn."
    );
}

#[test]
fn test_truecase_withUnknownWords_shouldKeepOriginal() {
    let model = StatisticalTrueCaser::train_on_text(&corpus());
    let caser = truecase::load_or_fallback("/nonexistent/model.json").unwrap();

    assert_eq!(
        model.truecase("zorblax visited tallinn"),
        "zorblax visited Tallinn"
    );
    assert_eq!(caser.truecase("hello there. i am here"), "Hello there. I am here");
}

#[test]
fn test_load_withCorruptModel_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(temp_dir.path(), "truecase.json", "{ not json").unwrap();

    assert!(StatisticalTrueCaser::load(&path).is_err());
    assert!(truecase::load_or_fallback(&path).is_err());
}
