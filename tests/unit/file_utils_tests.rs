/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use serde_json::json;
use std::path::{Path, PathBuf};

use json_translator::file_utils::FileManager;
use crate::common;

/// Test that a staged file only appears at its destination once persisted
#[test]
fn test_stage_json_withoutPersist_shouldLeaveDestinationUntouched() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("validated/common_es_validation.json");

    let staged = FileManager::stage_json(&path, &json!({"ok": true}))?;
    assert!(!path.exists());
    drop(staged);
    assert!(!path.exists());

    let staged = FileManager::stage_json(&path, &json!({"ok": true}))?;
    FileManager::persist_staged(staged, &path)?;
    assert_eq!(FileManager::read_json(&path)?, json!({"ok": true}));
    Ok(())
}

/// Test that only JSON files are discovered, in sorted order
#[test]
fn test_find_json_files_withMixedTree_shouldListJsonOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "z.json", "{}")?;
    common::create_test_file(root, "a/b.json", "{}")?;
    common::create_test_file(root, "a/readme.md", "")?;

    let files = FileManager::find_json_files(root, None)?;
    let relative: Vec<PathBuf> = files
        .iter()
        .map(|f| FileManager::relative_path(root, f))
        .collect();

    assert_eq!(relative, vec![PathBuf::from("a/b.json"), PathBuf::from("z.json")]);
    Ok(())
}

/// Test the output layout for a top-level file
#[test]
fn test_output_paths_withTopLevelFile_shouldUseLanguageDirectory() {
    let root = Path::new("/data/en");
    let file = Path::new("/data/en/common.json");
    let out = Path::new("/data/out");

    assert_eq!(
        FileManager::translated_output_path(root, file, out, "pt-BR"),
        PathBuf::from("/data/out/pt-BR/common.json")
    );
    assert_eq!(
        FileManager::validation_report_path(root, file, out, "pt-BR"),
        PathBuf::from("/data/out/validated/common_pt-BR_validation.json")
    );
}

/// Test that atomic writes create missing parent directories
#[test]
fn test_write_atomic_withMissingParents_shouldCreateThem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("deep/er/file.csv");

    FileManager::write_atomic(&path, b"a,b\n")?;
    assert_eq!(FileManager::read_to_string(&path)?, "a,b\n");
    Ok(())
}
