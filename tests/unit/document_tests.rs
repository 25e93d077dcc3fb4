/*!
 * Tests for path indexing and structural reassembly
 */

use anyhow::Result;
use serde_json::{Value, json};
use std::collections::HashMap;

use json_translator::app_config::ExclusionConfig;
use json_translator::document::{
    ExclusionReason, ExclusionRules, JsonPath, PathIndexer, Reassembler,
};
use json_translator::errors::DocumentError;
use json_translator::translation::TranslationResult;

fn translate_all(indexer: &PathIndexer, document: &Value, f: impl Fn(&str) -> String) -> Result<Value> {
    let entries = indexer.index(document)?;
    let results: HashMap<JsonPath, TranslationResult> = PathIndexer::translatable(&entries)
        .into_iter()
        .map(|e| (e.path.clone(), TranslationResult::new(e.path.clone(), f(&e.value))))
        .collect();
    Ok(Reassembler::new(indexer).reassemble(document, &results)?)
}

/// Test that nested arrays of objects are indexed with their positions
#[test]
fn test_index_withArrayOfObjects_shouldAddressEveryLeaf() -> Result<()> {
    let document = json!({
        "steps": [
            {"title": "First", "body": "Do this"},
            {"title": "Second", "tags": ["a", "b"]}
        ]
    });

    let entries = PathIndexer::default().index(&document)?;
    let paths: Vec<String> = entries.iter().map(|e| e.path.to_string()).collect();

    assert_eq!(
        paths,
        vec![
            "steps[0].title",
            "steps[0].body",
            "steps[1].title",
            "steps[1].tags[0]",
            "steps[1].tags[1]"
        ]
    );
    Ok(())
}

/// Test that every indexed path resolves back to its value
#[test]
fn test_index_withMixedDocument_shouldResolveEveryPath() -> Result<()> {
    let document = json!({
        "a": {"b": ["x", {"c": "y"}], "n": 1},
        "d": "z",
        "e": null
    });

    for entry in PathIndexer::default().index(&document)? {
        assert_eq!(entry.path.resolve(&document), Some(&Value::String(entry.value.clone())));
    }
    Ok(())
}

/// Test the default exclusion rules
#[test]
fn test_index_withTechnicalValues_shouldMarkThemExcluded() -> Result<()> {
    let document = json!({
        "app_version": "2.10.0-beta.1",
        "user_id": "abc",
        "translation_key": "home.title",
        "ID": "Main",
        "title": "Version 2"
    });

    let entries = PathIndexer::default().index(&document)?;
    let reasons: Vec<Option<ExclusionReason>> = entries.iter().map(|e| e.exclusion).collect();

    assert_eq!(
        reasons,
        vec![
            Some(ExclusionReason::Version),
            Some(ExclusionReason::TechnicalIdentifier),
            Some(ExclusionReason::TechnicalIdentifier),
            Some(ExclusionReason::TechnicalIdentifier),
            None
        ]
    );
    assert_eq!(PathIndexer::translatable(&entries).len(), 1);
    Ok(())
}

/// Test that exclusions can be switched off through configuration
#[test]
fn test_index_withExclusionsDisabled_shouldTranslateEverything() -> Result<()> {
    let config = ExclusionConfig {
        detect_versions: false,
        identifier_patterns: Vec::new(),
    };
    let indexer = PathIndexer::new(ExclusionRules::from_config(&config)?, 128);

    let entries = indexer.index(&json!({"id": "x", "version": "1.0.0"}))?;
    assert!(entries.iter().all(|e| e.is_translatable()));
    Ok(())
}

/// Test that a document deeper than the limit fails with the offending path
#[test]
fn test_index_withTooDeepDocument_shouldFailWithPath() {
    let indexer = PathIndexer::new(ExclusionRules::default(), 2);

    let err = indexer
        .index(&json!({"a": {"b": {"c": "deep"}}}))
        .unwrap_err();

    match err {
        DocumentError::Structure { path, .. } => assert_eq!(path.to_string(), "a.b.c"),
        other => panic!("unexpected error: {other}"),
    }
}

/// Test that reassembly keeps key order, non-string values and excluded strings
#[test]
fn test_reassemble_withMarkerTranslations_shouldKeepEverythingElse() -> Result<()> {
    let document: Value = serde_json::from_str(
        r#"{"zeta": "Last", "id": "home", "n": 1.5, "list": [true, "One", null], "alpha": {"v": "1.0.0"}}"#,
    )?;

    let translated = translate_all(&PathIndexer::default(), &document, |s| format!("<{s}>"))?;

    assert_eq!(
        serde_json::to_string(&translated)?,
        r#"{"zeta":"<Last>","id":"home","n":1.5,"list":[true,"<One>",null],"alpha":{"v":"1.0.0"}}"#
    );
    Ok(())
}

/// Test that identity translations give back the original document
#[test]
fn test_reassemble_withIdentityTranslations_shouldReproduceSource() -> Result<()> {
    let document = json!({
        "empty": {},
        "nothing": [],
        "nested": [[["deep"]]],
        "blank": "",
        "unicode": "Grüße 👋"
    });

    let translated = translate_all(&PathIndexer::default(), &document, |s| s.to_string())?;
    assert_eq!(translated, document);
    Ok(())
}

/// Test that a missing translation names the untranslated path
#[test]
fn test_reassemble_withMissingTranslation_shouldReportPath() -> Result<()> {
    let document = json!({"a": "A", "b": ["B"]});
    let indexer = PathIndexer::default();
    let mut results = HashMap::new();
    let a = JsonPath::from_keys(["a"]);
    results.insert(a.clone(), TranslationResult::new(a, "AA"));

    let err = Reassembler::new(&indexer)
        .reassemble(&document, &results)
        .unwrap_err();

    match err {
        DocumentError::MissingTranslation(path) => assert_eq!(path.to_string(), "b[0]"),
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

/// Test that a scalar root document passes through
#[test]
fn test_reassemble_withScalarRoot_shouldTranslateRootString() -> Result<()> {
    let translated = translate_all(&PathIndexer::default(), &json!("Hello"), |s| s.to_uppercase())?;
    assert_eq!(translated, json!("HELLO"));

    let number = translate_all(&PathIndexer::default(), &json!(42), |s| s.to_uppercase())?;
    assert_eq!(number, json!(42));
    Ok(())
}
