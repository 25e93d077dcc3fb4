/*!
 * End-to-end translation workflow tests
 *
 * Every test runs the controller over a temporary input directory with mock
 * collaborators and inspects the files written to the output directory.
 */

use anyhow::Result;
use serde_json::{Value, json};
use std::fs;

use json_translator::app_controller::Controller;
use json_translator::document::JsonPath;
use json_translator::file_utils::FileManager;
use json_translator::providers::Collaborators;
use json_translator::providers::mock::MockProvider;
use crate::common;

fn spanish_provider() -> MockProvider {
    MockProvider::working().with_translations(
        "es",
        [
            (JsonPath::from_keys(["welcome"]), "Bienvenido a nuestra aplicación"),
            (JsonPath::from_keys(["buttons", "save"]), "Guardar"),
            (JsonPath::from_keys(["buttons", "cancel"]), "Cancelar"),
        ],
    )
}

/// Test the documented Spanish example through the whole application
#[tokio::test]
async fn test_run_withWelcomeExample_shouldWriteSpanishFile() -> Result<()> {
    common::init_logging();
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    common::create_test_locale(input.path(), "common.json")?;

    let config = common::test_config(input.path(), output.path(), &["Spanish"]);
    let report = Controller::with_collaborators(config, Collaborators::from_provider(spanish_provider()))?
        .with_progress(false)
        .run(false)
        .await?;

    assert_eq!(report.success_count(), 1);
    assert!(!report.has_failures());

    let translated = fs::read_to_string(output.path().join("es/common.json"))?;
    let value: Value = serde_json::from_str(&translated)?;
    assert_eq!(
        serde_json::to_string(&value)?,
        r#"{"welcome":"Bienvenido a nuestra aplicación","buttons":{"save":"Guardar","cancel":"Cancelar"}}"#
    );
    Ok(())
}

/// Test that validation and run reports are written next to the output
#[tokio::test]
async fn test_run_withTwoLanguages_shouldWriteReports() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    common::create_test_locale(input.path(), "common.json")?;
    common::create_test_file(
        input.path(),
        "screens/home.json",
        r#"{"title": "Home", "items": ["One", "Two"], "id": "home"}"#,
    )?;

    let config = common::test_config(input.path(), output.path(), &["Spanish", "fr"]);
    let report = Controller::with_config(config)?
        .with_progress(false)
        .run(false)
        .await?;

    assert_eq!(report.success_count(), 4);
    assert_eq!(report.statistics.overall.count, 2 * (3 + 3));
    assert_eq!(report.statistics.by_language.len(), 2);
    assert_eq!(report.statistics.by_file.len(), 2);

    for code in ["es", "fr"] {
        assert!(output.path().join(code).join("common.json").exists());
        assert!(output.path().join(code).join("screens/home.json").exists());
        assert!(
            output
                .path()
                .join(format!("validated/screens/home_{}_validation.json", code))
                .exists()
        );
    }

    let home: Value = FileManager::read_json(output.path().join("fr/screens/home.json"))?;
    assert_eq!(
        home,
        json!({"title": "[fr] Home", "items": ["[fr] One", "[fr] Two"], "id": "home"})
    );

    let validation: Value =
        FileManager::read_json(output.path().join("validated/common_es_validation.json"))?;
    assert_eq!(validation["language"]["code"], "es");
    assert_eq!(validation["records"].as_array().map(Vec::len), Some(3));
    assert_eq!(validation["stats"]["buckets"]["Perfect"]["count"], 3);

    let logs = output.path().join("logs");
    let json_reports = common::files_with_prefix(&logs, "translation_report_")?;
    assert_eq!(json_reports.len(), 2);
    assert!(json_reports.iter().any(|p| p.extension().is_some_and(|e| e == "csv")));

    let run_report: Value = FileManager::read_json(
        json_reports
            .iter()
            .find(|p| p.extension().is_some_and(|e| e == "json"))
            .expect("json report"),
    )?;
    assert_eq!(run_report["files_processed"].as_array().map(Vec::len), Some(4));
    assert_eq!(run_report["mock_mode"], true);
    assert!(run_report["model_usage"]["o1"]["calls"].as_u64().unwrap_or(0) > 0);
    Ok(())
}

/// Test that one broken document does not affect the others
#[tokio::test]
async fn test_run_withBrokenAndFailingDocuments_shouldIsolateFailures() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    common::create_test_file(input.path(), "broken.json", "{\"a\": ")?;
    common::create_test_locale(input.path(), "good.json")?;

    let config = common::test_config(input.path(), output.path(), &["es", "fr"]);
    let report = Controller::with_collaborators(
        config,
        Collaborators::from_provider(MockProvider::failing_for("fr")),
    )?
    .with_progress(false)
    .run(false)
    .await?;

    assert_eq!(report.success_count(), 1);
    assert_eq!(report.failures.len(), 3);
    assert_eq!(report.files_processed[0].file, "good.json");
    assert_eq!(report.files_processed[0].language.code, "es");

    let failed: Vec<(&str, &str)> = report
        .failures
        .iter()
        .map(|f| (f.file.as_str(), f.language.as_str()))
        .collect();
    assert_eq!(
        failed,
        vec![("broken.json", "es"), ("broken.json", "fr"), ("good.json", "fr")]
    );

    assert!(output.path().join("es/good.json").exists());
    assert!(!output.path().join("fr/good.json").exists());
    assert!(!output.path().join("validated/good_fr_validation.json").exists());
    assert!(!output.path().join("es/broken.json").exists());

    // Failures are not part of the statistics
    assert_eq!(report.statistics.overall.count, 3);
    Ok(())
}

/// Test that a document nested too deeply fails with its path
#[tokio::test]
async fn test_run_withTooDeepDocument_shouldReportJsonPath() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    common::create_test_file(input.path(), "deep.json", r#"{"a": {"b": {"c": "x"}}}"#)?;

    let mut config = common::test_config(input.path(), output.path(), &["de"]);
    config.processing.max_depth = 2;
    let report = Controller::with_config(config)?
        .with_progress(false)
        .run(false)
        .await?;

    assert_eq!(report.success_count(), 0);
    assert_eq!(report.failures[0].json_path.as_deref(), Some("a.b.c"));
    assert!(!output.path().join("de/deep.json").exists());
    Ok(())
}

/// Test that lost placeholders are reported but the file is still written
#[tokio::test]
async fn test_run_withLostPlaceholders_shouldWarnAndWrite() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    common::create_test_file(
        input.path(),
        "cart.json",
        r#"{"items": "You have {count} items", "total": "Total: %s"}"#,
    )?;

    let config = common::test_config(input.path(), output.path(), &["it"]);
    let report = Controller::with_collaborators(
        config,
        Collaborators::from_provider(MockProvider::stripping_placeholders()),
    )?
    .with_progress(false)
    .run(false)
    .await?;

    assert_eq!(report.success_count(), 1);
    assert_eq!(report.files_processed[0].placeholder_warnings, 2);

    let cart: Value = FileManager::read_json(output.path().join("it/cart.json"))?;
    assert_eq!(cart, json!({"items": "[it] You have items", "total": "[it] Total:"}));

    let validation: Value =
        FileManager::read_json(output.path().join("validated/cart_it_validation.json"))?;
    assert_eq!(
        validation["records"][0]["placeholder_warning"]["missing"],
        json!(["{count}"])
    );
    assert_eq!(validation["records"][0]["category_scores"]["formatting"], 50.0);
    Ok(())
}

/// Test that nested and flat files with similar names keep separate reports
#[tokio::test]
async fn test_run_withSimilarNestedAndFlatNames_shouldWriteSeparateReports() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    common::create_test_file(input.path(), "screens/home.json", r#"{"title": "Home"}"#)?;
    common::create_test_file(
        input.path(),
        "screens_home.json",
        r#"{"title": "Start", "count": 1e2}"#,
    )?;

    let config = common::test_config(input.path(), output.path(), &["es"]);
    let report = Controller::with_config(config)?
        .with_progress(false)
        .run(false)
        .await?;

    assert_eq!(report.success_count(), 2);
    assert_ne!(
        report.files_processed[0].validation_report,
        report.files_processed[1].validation_report
    );

    let nested: Value =
        FileManager::read_json(output.path().join("validated/screens/home_es_validation.json"))?;
    let flat: Value =
        FileManager::read_json(output.path().join("validated/screens_home_es_validation.json"))?;
    assert_eq!(nested["file"], "screens/home.json");
    assert_eq!(nested["records"][0]["original"], "Home");
    assert_eq!(flat["file"], "screens_home.json");
    assert_eq!(flat["records"][0]["original"], "Start");

    // Numbers are copied with their source text
    let translated = fs::read_to_string(output.path().join("es/screens_home.json"))?;
    assert!(translated.contains("1e2"));
    Ok(())
}

/// Test that a document that cannot be written leaves no validation report behind
#[tokio::test]
async fn test_run_withUnwritableOutput_shouldNotKeepValidationReport() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    common::create_test_locale(input.path(), "common.json")?;
    // A directory where the translated file should go
    fs::create_dir_all(output.path().join("es/common.json"))?;

    let config = common::test_config(input.path(), output.path(), &["es"]);
    let report = Controller::with_config(config)?
        .with_progress(false)
        .run(true)
        .await?;

    assert_eq!(report.success_count(), 0);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].file, "common.json");
    assert!(report.failures[0].message.contains("Failed to write translated file"));
    assert!(!output.path().join("validated/common_es_validation.json").exists());
    assert_eq!(report.statistics.overall.count, 0);
    Ok(())
}
