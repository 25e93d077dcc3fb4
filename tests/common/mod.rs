/*!
 * Common test utilities for the json-translator test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use json_translator::app_config::Config;


/// Initialise logging once for tests that want to see pipeline output
pub fn init_logging() {
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

/// Creates the welcome/buttons localization file used across the tests
pub fn create_test_locale(dir: &Path, filename: &str) -> Result<PathBuf> {
    let content = r#"{
  "welcome": "Welcome to our application",
  "buttons": {
    "save": "Save",
    "cancel": "Cancel"
  }
}
"#;
    create_test_file(dir, filename, content)
}

/// Mock-mode configuration reading `input` and writing `output`
pub fn test_config(input: &Path, output: &Path, languages: &[&str]) -> Config {
    Config {
        input_dir: input.to_string_lossy().to_string(),
        output_dir: output.to_string_lossy().to_string(),
        languages: languages.iter().map(|l| l.to_string()).collect(),
        mock_mode: true,
        ..Config::default()
    }
}

/// Files directly inside `dir` whose name starts with `prefix`
pub fn files_with_prefix(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().starts_with(prefix))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}
