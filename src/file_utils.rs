use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(normalized_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        result.sort();
        Ok(result)
    }

    /// Find JSON files below `dir`, skipping anything inside `exclude`
    pub fn find_json_files<P: AsRef<Path>>(dir: P, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
        let files = Self::find_files(dir, "json")?;
        let excluded = exclude.and_then(|e| fs::canonicalize(e).ok());

        Ok(files
            .into_iter()
            .filter(|file| match (&excluded, fs::canonicalize(file)) {
                (Some(excluded), Ok(file)) => !file.starts_with(excluded),
                _ => true,
            })
            .collect())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Read and parse a JSON file
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Value> {
        let content = Self::read_to_string(&path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON file: {:?}", path.as_ref()))
    }

    /// Write bytes to a file through a temporary file in the same directory.
    ///
    /// The destination either keeps its previous content or receives all of
    /// `content`, never a partial write.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        let path = path.as_ref();
        let staged = Self::stage(path, content)?;
        Self::persist_staged(staged, path)
    }

    /// Write a value as pretty-printed JSON, atomically
    pub fn write_json<P: AsRef<Path>, T: Serialize + ?Sized>(path: P, value: &T) -> Result<()> {
        let path = path.as_ref();
        let staged = Self::stage_json(path, value)?;
        Self::persist_staged(staged, path)
    }

    /// Write `content` to a temporary file next to `path` without touching `path`
    pub fn stage<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<NamedTempFile> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Self::ensure_dir(parent)?;

        let mut temp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;
        temp.write_all(content)
            .with_context(|| format!("Failed to write temporary file for {:?}", path))?;
        temp.flush()?;

        Ok(temp)
    }

    /// Stage a value as pretty-printed JSON next to `path`
    pub fn stage_json<P: AsRef<Path>, T: Serialize + ?Sized>(
        path: P,
        value: &T,
    ) -> Result<NamedTempFile> {
        let mut content = serde_json::to_vec_pretty(value)
            .with_context(|| format!("Failed to serialize JSON for {:?}", path.as_ref()))?;
        content.push(b'\n');
        Self::stage(path, &content)
    }

    /// Move a staged file onto its destination, replacing any previous file
    pub fn persist_staged(staged: NamedTempFile, path: &Path) -> Result<()> {
        staged
            .persist(path)
            .map_err(|e| anyhow!("Failed to move temporary file to {:?}: {}", path, e))?;
        Ok(())
    }

    // @generates: Output path for a translated document
    // @params: input_root, input_file, output_dir, language_code
    pub fn translated_output_path(
        input_root: &Path,
        input_file: &Path,
        output_dir: &Path,
        language_code: &str,
    ) -> PathBuf {
        output_dir
            .join(language_code)
            .join(Self::relative_path(input_root, input_file))
    }

    // @generates: Path of the per-document validation report
    // @note: Subdirectories of the input are mirrored below `validated/`
    pub fn validation_report_path(
        input_root: &Path,
        input_file: &Path,
        output_dir: &Path,
        language_code: &str,
    ) -> PathBuf {
        let relative = Self::relative_path(input_root, input_file);
        let stem = relative
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut path = output_dir.join("validated");
        if let Some(parent) = relative.parent() {
            path.push(parent);
        }
        path.join(format!("{}_{}_validation.json", stem, language_code))
    }

    /// Path of `file` relative to `root`, or its file name when outside `root`
    pub fn relative_path(root: &Path, file: &Path) -> PathBuf {
        match file.strip_prefix(root) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative.to_path_buf(),
            _ => file
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| file.to_path_buf()),
        }
    }
}
