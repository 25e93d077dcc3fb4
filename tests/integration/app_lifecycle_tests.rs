/*!
 * Integration tests for application lifecycle
 */

use anyhow::Result;
use std::fs;

use json_translator::app_config::Config;
use json_translator::app_controller::Controller;
use crate::common;

/// Test that the controller refuses to run without mock mode or collaborators
#[test]
fn test_controller_withoutMockMode_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = common::test_config(temp_dir.path(), &temp_dir.path().join("out"), &["es"]);
    config.mock_mode = false;

    assert!(Controller::with_config(config).is_err());
    Ok(())
}

/// Test that an invalid configuration is rejected before any work starts
#[test]
fn test_controller_withoutLanguages_shouldFail() {
    let config = Config {
        mock_mode: true,
        ..Config::default()
    };
    assert!(Controller::with_config(config).is_err());
}

/// Test the preflight checks on the input and output locations
#[test]
fn test_preflight_withBadLocations_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();

    let missing = common::test_config(&root.join("missing"), &root.join("out"), &["es"]);
    assert!(Controller::with_config(missing)?.preflight().is_err());

    let file_input = common::create_test_file(root, "input.json", "{}")?;
    let not_a_dir = common::test_config(&file_input, &root.join("out"), &["es"]);
    assert!(Controller::with_config(not_a_dir)?.preflight().is_err());

    let in_dir = root.join("in");
    fs::create_dir_all(&in_dir)?;
    let output_file = common::create_test_file(root, "out.txt", "")?;
    let output_is_file = common::test_config(&in_dir, &output_file, &["es"]);
    assert!(Controller::with_config(output_is_file)?.preflight().is_err());
    Ok(())
}

/// Test that an output directory inside the input directory is not re-read
#[test]
fn test_preflight_withNestedOutput_shouldSkipOutputFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_locale(root, "common.json")?;
    common::create_test_locale(root, "output/es/common.json")?;

    let config = common::test_config(root, &root.join("output"), &["es"]);
    let files = Controller::with_config(config)?.preflight()?;

    assert_eq!(files, vec![root.join("common.json")]);
    Ok(())
}

/// Test that an empty input directory produces an empty report
#[tokio::test]
async fn test_run_withEmptyInput_shouldSucceedWithNothingDone() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;

    let config = common::test_config(input.path(), output.path(), &["es"]);
    let report = Controller::with_config(config)?
        .with_progress(false)
        .run(false)
        .await?;

    assert_eq!(report.success_count(), 0);
    assert!(!report.has_failures());
    assert_eq!(report.statistics.overall.count, 0);
    Ok(())
}

/// Test that existing outputs are skipped unless overwriting is forced
#[tokio::test]
async fn test_run_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    common::create_test_locale(input.path(), "common.json")?;
    let existing = common::create_test_file(output.path(), "es/common.json", "{\"kept\": true}")?;

    let config = common::test_config(input.path(), output.path(), &["es", "fr"]);
    let controller = Controller::with_config(config)?.with_progress(false);

    let report = controller.run(false).await?;
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].language, "es");
    assert_eq!(report.success_count(), 1);
    assert_eq!(fs::read_to_string(&existing)?, "{\"kept\": true}");

    let report = controller.run(true).await?;
    assert!(report.skipped.is_empty());
    assert_eq!(report.success_count(), 2);
    assert!(fs::read_to_string(&existing)?.contains("[es] Save"));
    Ok(())
}
