/*!
 * Run and per-document reports.
 *
 * Every successfully validated document gets a validation report listing its
 * scored strings. At the end of a run a summary is written as JSON and CSV
 * with statistics over all successful documents, per language and per file,
 * together with the failures and the model usage of the run.
 */

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::app_config::StageModels;
use crate::file_utils::FileManager;
use crate::language_utils::TargetLanguage;
use crate::translation::usage::ModelUsage;
use crate::validation::scoring::{ScoreBucket, ValidationRecord};
use crate::validation::service::DocumentValidation;
use crate::validation::stats::AggregateStats;
use crate::validation::structure::StructureReport;

/// Validation report of one document in one language
#[derive(Debug, Serialize)]
pub struct ValidationReport<'a> {
    pub file: &'a str,
    pub language: &'a TargetLanguage,
    pub structure: &'a StructureReport,
    pub stats: &'a AggregateStats,
    pub records: &'a [ValidationRecord],
}

impl<'a> ValidationReport<'a> {
    pub fn new(file: &'a str, language: &'a TargetLanguage, validation: &'a DocumentValidation) -> Self {
        Self {
            file,
            language,
            structure: &validation.structure,
            stats: &validation.stats,
            records: &validation.records,
        }
    }

    /// Serialize the report next to `path`; nothing is visible until persisted
    pub fn stage(&self, path: &Path) -> Result<NamedTempFile> {
        FileManager::stage_json(path, self)
            .with_context(|| format!("Failed to write validation report: {:?}", path))
    }
}

/// A document translated and validated successfully
#[derive(Debug, Clone, Serialize)]
pub struct FileSuccess {
    pub file: String,
    pub language: TargetLanguage,
    pub output: PathBuf,
    pub validation_report: PathBuf,
    pub string_count: usize,
    pub excluded_count: usize,
    pub structure_score: f64,
    pub placeholder_warnings: usize,
    pub mean_score: f64,
    /// Kept for the run statistics, written only to the validation report
    #[serde(skip)]
    pub records: Vec<ValidationRecord>,
}

/// A document that could not be produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileFailure {
    pub file: String,
    pub language: String,
    /// Where in the document the failure was detected
    pub json_path: Option<String>,
    pub message: String,
}

/// A document left alone because its output already existed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSkipped {
    pub file: String,
    pub language: String,
    pub output: PathBuf,
}

/// Statistics of a run, computed over successful documents only
#[derive(Debug, Clone, Serialize)]
pub struct RunStatistics {
    pub overall: AggregateStats,
    pub by_language: BTreeMap<String, AggregateStats>,
    pub by_file: BTreeMap<String, AggregateStats>,
}

impl RunStatistics {
    pub fn from_successes(successes: &[FileSuccess]) -> Self {
        let overall = AggregateStats::from_records(successes.iter().flat_map(|s| &s.records));

        let mut languages: BTreeMap<String, Vec<&ValidationRecord>> = BTreeMap::new();
        let mut files: BTreeMap<String, Vec<&ValidationRecord>> = BTreeMap::new();
        for success in successes {
            languages
                .entry(success.language.code.clone())
                .or_default()
                .extend(&success.records);
            files
                .entry(success.file.clone())
                .or_default()
                .extend(&success.records);
        }

        let summarize = |groups: BTreeMap<String, Vec<&ValidationRecord>>| -> BTreeMap<String, AggregateStats> {
            groups
                .into_iter()
                .map(|(key, records)| (key, AggregateStats::from_records(records)))
                .collect()
        };

        Self {
            overall,
            by_language: summarize(languages),
            by_file: summarize(files),
        }
    }
}

/// Summary of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub timestamp: String,
    pub duration_secs: f64,
    pub input_directory: PathBuf,
    pub output_directory: PathBuf,
    pub languages: Vec<TargetLanguage>,
    pub models_used: StageModels,
    pub mock_mode: bool,
    pub statistics: RunStatistics,
    pub files_processed: Vec<FileSuccess>,
    pub failures: Vec<FileFailure>,
    pub skipped: Vec<FileSkipped>,
    pub model_usage: BTreeMap<String, ModelUsage>,
}

impl RunReport {
    /// Number of documents translated successfully
    pub fn success_count(&self) -> usize {
        self.files_processed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Write `translation_report_<timestamp>.json` and `.csv` into `logs_dir`
    pub fn write(&self, logs_dir: &Path, started: DateTime<Local>) -> Result<(PathBuf, PathBuf)> {
        let stem = format!("translation_report_{}", started.format("%Y%m%d_%H%M%S"));
        let json_path = logs_dir.join(format!("{}.json", stem));
        let csv_path = logs_dir.join(format!("{}.csv", stem));

        FileManager::write_json(&json_path, self)
            .with_context(|| format!("Failed to write run report: {:?}", json_path))?;

        let csv = self.to_csv()?;
        FileManager::write_atomic(&csv_path, &csv)
            .with_context(|| format!("Failed to write run report: {:?}", csv_path))?;

        Ok((json_path, csv_path))
    }

    /// Statistics rows: overall, then per language, then per file
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut wtr = csv::WriterBuilder::new().from_writer(Vec::new());

        wtr.serialize(StatsRow::new("overall", "all", &self.statistics.overall))?;
        for (language, stats) in &self.statistics.by_language {
            wtr.serialize(StatsRow::new("language", language, stats))?;
        }
        for (file, stats) in &self.statistics.by_file {
            wtr.serialize(StatsRow::new("file", file, stats))?;
        }

        wtr.into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to finish CSV report: {}", e))
    }
}

#[derive(Debug, Serialize)]
struct StatsRow<'a> {
    scope: &'a str,
    name: &'a str,
    count: usize,
    mean: String,
    median: String,
    std_dev: String,
    min: String,
    max: String,
    perfect: usize,
    excellent: usize,
    good: usize,
    fair: usize,
    poor: usize,
}

impl<'a> StatsRow<'a> {
    fn new(scope: &'a str, name: &'a str, stats: &AggregateStats) -> Self {
        let fixed = |value: f64| format!("{:.2}", value);
        Self {
            scope,
            name,
            count: stats.count,
            mean: fixed(stats.mean),
            median: fixed(stats.median),
            std_dev: fixed(stats.std_dev),
            min: fixed(stats.min),
            max: fixed(stats.max),
            perfect: stats.bucket_count(ScoreBucket::Perfect),
            excellent: stats.bucket_count(ScoreBucket::Excellent),
            good: stats.bucket_count(ScoreBucket::Good),
            fair: stats.bucket_count(ScoreBucket::Fair),
            poor: stats.bucket_count(ScoreBucket::Poor),
        }
    }
}
