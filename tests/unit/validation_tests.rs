/*!
 * Tests for placeholder verification, structural checks and scoring
 */

use serde_json::json;
use std::collections::{BTreeMap, HashMap};

use json_translator::app_config::{Aggregation, ScoringConfig};
use json_translator::document::{JsonPath, PathIndexer};
use json_translator::errors::ValidationError;
use json_translator::validation::placeholders::{extract_tokens, verify};
use json_translator::validation::scoring::{
    FALLBACK_COMMENT, QualityCategory, QualityScorer, ScoreBucket, StringFeedback,
};
use json_translator::validation::structure::{self, IssueKind, ValueKind};
use json_translator::validation::{AggregateStats, ValidationService};

fn scores(values: [f64; 5]) -> BTreeMap<QualityCategory, f64> {
    QualityCategory::ALL.iter().copied().zip(values).collect()
}

/// Test the placeholder example from the documentation
#[test]
fn test_verify_withKeptAndLostPlaceholder_shouldReportOnlyLoss() {
    assert!(verify("You have {count} items", "Tienes {count} artículos").passed);

    let check = verify("You have {count} items", "Tienes articulos");
    assert!(!check.passed);
    assert_eq!(check.missing, vec!["{count}"]);
}

/// Test that positional printf tokens are kept verbatim
#[test]
fn test_extract_tokens_withPositionalPrintf_shouldKeepPositions() {
    assert_eq!(extract_tokens("%1$s of %2$d"), vec!["%1$s", "%2$d"]);
    assert!(!verify("%1$s of %2$d", "%s de %d").passed);
}

/// Test that identical documents match structurally
#[test]
fn test_structure_check_withIdenticalShape_shouldScoreHundred() {
    let original = json!({"a": ["x", 1, {"b": null}], "c": true});
    let translated = json!({"a": ["y", 1, {"b": null}], "c": true});

    let report = structure::check(&original, &translated).unwrap();
    assert!(report.is_match());
    assert_eq!(report.score, 100.0);
}

/// Test that a type change is reported at its path
#[test]
fn test_structure_check_withTypeChange_shouldFailAtPath() {
    let original = json!({"count": 3, "label": "x"});
    let translated = json!({"count": "3", "label": "y"});

    let err = structure::check(&original, &translated).unwrap_err();
    assert_eq!(err.json_path(), Some(&JsonPath::from_keys(["count"])));

    let ValidationError::StructuralMismatch { issues } = err;
    assert_eq!(
        issues[0].kind,
        IssueKind::TypeMismatch {
            expected: ValueKind::Number,
            found: ValueKind::String
        }
    );
}

/// Test that missing and extra keys are both listed
#[test]
fn test_structure_report_withRenamedKey_shouldListMissingAndExtra() {
    let original = json!({"a": "x", "b": "y"});
    let translated = json!({"a": "x", "c": "y"});

    let report = structure::report(&original, &translated);
    let kinds: Vec<(String, IssueKind)> = report
        .issues
        .iter()
        .map(|i| (i.path.to_string(), i.kind.clone()))
        .collect();

    assert_eq!(
        kinds,
        vec![
            ("b".to_string(), IssueKind::MissingPath),
            ("c".to_string(), IssueKind::ExtraPath)
        ]
    );
    assert_eq!(report.score, 0.0);
}

/// Test the default mean aggregation
#[test]
fn test_score_leaf_withJudgeFeedback_shouldAverageCategories() {
    let path = JsonPath::from_keys(["a"]);
    let feedback = StringFeedback {
        path: path.clone(),
        category_scores: scores([100.0, 90.0, 80.0, 100.0, 80.0]),
        comments: "ok".to_string(),
    };

    let record = QualityScorer::default().score_leaf(&path, "Save", "Guardar", Some(&feedback));
    assert_eq!(record.overall_score, 90.0);
    assert_eq!(record.bucket, ScoreBucket::Good);
    assert_eq!(record.comments, "ok");
}

/// Test weighted and minimum aggregation
#[test]
fn test_aggregate_withConfiguredStrategies_shouldFollowConfig() {
    let values = scores([100.0, 50.0, 100.0, 100.0, 100.0]);

    let weighted = QualityScorer::new(ScoringConfig {
        aggregation: Aggregation::WeightedMean,
        weights: [(QualityCategory::Accuracy, 4.0)].into_iter().collect(),
        ..ScoringConfig::default()
    });
    // (4*100 + 50 + 100 + 100 + 100) / 8
    assert_eq!(weighted.aggregate(&values), 93.75);

    let minimum = QualityScorer::new(ScoringConfig {
        aggregation: Aggregation::Minimum,
        ..ScoringConfig::default()
    });
    assert_eq!(minimum.aggregate(&values), 50.0);
}

/// Test that out-of-range judge scores are clamped
#[test]
fn test_score_leaf_withOutOfRangeScores_shouldClamp() {
    let path = JsonPath::from_keys(["a"]);
    let feedback = StringFeedback::uniform(path.clone(), 140.0, "generous");

    let record = QualityScorer::default().score_leaf(&path, "a", "b", Some(&feedback));
    assert_eq!(record.overall_score, 100.0);
    assert_eq!(record.bucket, ScoreBucket::Perfect);
}

/// Test that missing feedback falls back to the length ratio
#[test]
fn test_score_leaf_withoutFeedback_shouldUseLengthRatio() {
    let path = JsonPath::from_keys(["a"]);

    let record = QualityScorer::default().score_leaf(&path, "abcd", "abcdefgh", None);
    assert_eq!(record.overall_score, 50.0);
    assert_eq!(record.comments, FALLBACK_COMMENT);
    assert_eq!(record.bucket, ScoreBucket::Poor);
}

/// Test that a lost placeholder caps the formatting category
#[test]
fn test_score_leaf_withLostPlaceholder_shouldCapFormatting() {
    let path = JsonPath::from_keys(["items"]);
    let feedback = StringFeedback::uniform(path.clone(), 100.0, "fine");

    let record = QualityScorer::default().score_leaf(
        &path,
        "You have {count} items",
        "Tienes articulos",
        Some(&feedback),
    );

    assert_eq!(record.category_scores[&QualityCategory::Formatting], 50.0);
    assert_eq!(record.overall_score, 90.0);
    let warning = record.placeholder_warning.expect("warning expected");
    assert_eq!(warning.missing, vec!["{count}"]);
}

/// Test the bucket edges
#[test]
fn test_score_bucket_withEdgeScores_shouldUseHalfOpenRanges() {
    assert_eq!(ScoreBucket::from_score(100.0), ScoreBucket::Perfect);
    assert_eq!(ScoreBucket::from_score(99.99), ScoreBucket::Excellent);
    assert_eq!(ScoreBucket::from_score(95.0), ScoreBucket::Excellent);
    assert_eq!(ScoreBucket::from_score(94.99), ScoreBucket::Good);
    assert_eq!(ScoreBucket::from_score(90.0), ScoreBucket::Good);
    assert_eq!(ScoreBucket::from_score(80.0), ScoreBucket::Fair);
    assert_eq!(ScoreBucket::from_score(79.99), ScoreBucket::Poor);
}

/// Test the validation service end to end on one document
#[test]
fn test_validation_service_withMixedFeedback_shouldComputeStats() {
    let original = json!({"id": "main", "a": "Hello", "b": "Hi {name}", "c": "Bye"});
    let translated = json!({"id": "main", "a": "Hola", "b": "Hola", "c": "Adiós"});
    let entries = PathIndexer::default().index(&original).unwrap();

    let mut feedback = HashMap::new();
    for key in ["a", "b", "c"] {
        let path = JsonPath::from_keys([key]);
        feedback.insert(path.clone(), StringFeedback::uniform(path, 100.0, ""));
    }

    let validation = ValidationService::default()
        .score(&original, &translated, &entries, &feedback)
        .unwrap();

    assert_eq!(validation.records.len(), 3);
    assert_eq!(validation.placeholder_warnings().len(), 1);

    let stats: &AggregateStats = &validation.stats;
    assert_eq!(stats.count, 3);
    assert_eq!(stats.median, 100.0);
    assert_eq!(stats.min, 90.0);
    assert_eq!(stats.bucket_count(ScoreBucket::Perfect), 2);
    assert_eq!(stats.bucket_count(ScoreBucket::Good), 1);
}
