use anyhow::{Context, Result, anyhow};
use chrono::Local;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::language_utils::{self, TargetLanguage};
use crate::providers::Collaborators;
use crate::providers::mock::MockProvider;
use crate::report::{FileFailure, FileSkipped, FileSuccess, RunReport, RunStatistics, ValidationReport};
use crate::translation::{DocumentOutcome, DocumentPipeline, ModelUsageTracker};

// @module: Application controller for JSON translation runs

/// Main application controller: translates every JSON file of the input
/// directory into every target language, isolating failures per document
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Collaborators backing the model stages
    collaborators: Collaborators,
    // @field: Draw progress bars on stderr
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        if !config.mock_mode {
            return Err(anyhow!(
                "No live model provider is bundled with this build; enable mock mode (--mock) \
                 or supply collaborators through Controller::with_collaborators"
            ));
        }

        Self::with_collaborators(config, Collaborators::from_provider(MockProvider::working()))
    }

    // @method: Create a controller backed by the given collaborators
    pub fn with_collaborators(config: Config, collaborators: Collaborators) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        Ok(Self {
            config,
            collaborators,
            show_progress: true,
        })
    }

    /// Enable or disable progress bars
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check the input and output locations and list the files to translate
    pub fn preflight(&self) -> Result<Vec<PathBuf>> {
        let input_dir = Path::new(&self.config.input_dir);
        let output_dir = Path::new(&self.config.output_dir);

        if !input_dir.exists() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }
        if !input_dir.is_dir() {
            return Err(anyhow!("Input path is not a directory: {:?}", input_dir));
        }
        if output_dir.is_file() {
            return Err(anyhow!("Output path is a file, not a directory: {:?}", output_dir));
        }
        FileManager::ensure_dir(output_dir)?;

        let files = FileManager::find_json_files(input_dir, Some(output_dir))?;
        if files.is_empty() {
            warn!("No JSON files found in {:?}", input_dir);
        }

        Ok(files)
    }

    /// Run the whole workflow and write the run report
    pub async fn run(&self, force_overwrite: bool) -> Result<RunReport> {
        let start_time = Instant::now();
        let started = Local::now();

        let languages = language_utils::resolve_target_languages(&self.config.languages)?;
        let files = self.preflight()?;

        let input_dir = PathBuf::from(&self.config.input_dir);
        let output_dir = PathBuf::from(&self.config.output_dir);

        let usage = ModelUsageTracker::new();
        let pipeline = DocumentPipeline::new(&self.config, self.collaborators.clone(), usage.clone())?;

        info!(
            "Translating {} files into {} languages: {}",
            files.len(),
            languages.len(),
            languages
                .iter()
                .map(|l| l.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let multi_progress = if self.show_progress {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };
        let total_documents = (files.len() * languages.len()) as u64;
        let run_pb = multi_progress.add(ProgressBar::new(total_documents));
        run_pb.set_style(Self::progress_style("documents"));
        run_pb.set_message("Processing files");

        let mut successes = Vec::new();
        let mut failures = Vec::new();
        let mut skipped = Vec::new();

        for file in &files {
            let relative = FileManager::relative_path(&input_dir, file);
            let file_name = relative.to_string_lossy().to_string();
            run_pb.set_message(format!("Processing: {}", file_name));

            let document = match FileManager::read_json(file) {
                Ok(document) => document,
                Err(e) => {
                    error!("Skipping {}: {:#}", file_name, e);
                    for language in &languages {
                        failures.push(FileFailure {
                            file: file_name.clone(),
                            language: language.code.clone(),
                            json_path: None,
                            message: format!("{:#}", e),
                        });
                    }
                    run_pb.inc(languages.len() as u64);
                    continue;
                }
            };

            for language in &languages {
                let output_path =
                    FileManager::translated_output_path(&input_dir, file, &output_dir, &language.code);

                if output_path.exists() && !force_overwrite {
                    warn!(
                        "Skipping {} ({}), translation already exists (use -f to force overwrite)",
                        file_name, language.code
                    );
                    skipped.push(FileSkipped {
                        file: file_name.clone(),
                        language: language.code.clone(),
                        output: output_path,
                    });
                    run_pb.inc(1);
                    continue;
                }

                let batch_pb = multi_progress.add(ProgressBar::new(0));
                batch_pb.set_style(Self::progress_style("batches"));
                batch_pb.set_message(format!("{} -> {}", file_name, language.name));

                let pb = batch_pb.clone();
                let result = pipeline
                    .process(&document, language, move |completed, total| {
                        pb.set_length(total as u64);
                        pb.set_position(completed as u64);
                    })
                    .await;
                batch_pb.finish_and_clear();

                match result {
                    Ok(outcome) => {
                        match self.write_outcome(&input_dir, file, &file_name, &output_path, outcome) {
                            Ok(success) => successes.push(success),
                            Err(e) => {
                                error!("Failed to write {} ({}): {:#}", file_name, language.code, e);
                                failures.push(FileFailure {
                                    file: file_name.clone(),
                                    language: language.code.clone(),
                                    json_path: None,
                                    message: format!("{:#}", e),
                                });
                            }
                        }
                    }
                    Err(e) => failures.push(Self::record_failure(&file_name, language, &e)),
                }

                run_pb.inc(1);
            }
        }

        run_pb.finish_and_clear();

        let duration = start_time.elapsed();
        info!(
            "Run completed in {}: {} translated, {} skipped, {} failed",
            Self::format_duration(duration),
            successes.len(),
            skipped.len(),
            failures.len()
        );
        usage.log_summary();

        let report = RunReport {
            timestamp: started.format("%Y-%m-%d %H:%M:%S").to_string(),
            duration_secs: duration.as_secs_f64(),
            input_directory: input_dir,
            output_directory: output_dir.clone(),
            languages,
            models_used: self.config.models.clone(),
            mock_mode: self.config.mock_mode,
            statistics: RunStatistics::from_successes(&successes),
            files_processed: successes,
            failures,
            skipped,
            model_usage: usage.snapshot(),
        };

        let (json_path, csv_path) = report.write(&output_dir.join("logs"), started)?;
        info!("Run report written to {:?} and {:?}", json_path, csv_path);

        Ok(report)
    }

    /// Write the validation report, then the translated document.
    ///
    /// Both files are staged before either is persisted, and the report is
    /// removed again when the document cannot be persisted.
    fn write_outcome(
        &self,
        input_dir: &Path,
        file: &Path,
        file_name: &str,
        output_path: &Path,
        outcome: DocumentOutcome,
    ) -> Result<FileSuccess> {
        let output_dir = Path::new(&self.config.output_dir);
        let report_path =
            FileManager::validation_report_path(input_dir, file, output_dir, &outcome.language.code);

        let staged_report = ValidationReport::new(file_name, &outcome.language, &outcome.validation)
            .stage(&report_path)?;
        let staged_document = FileManager::stage_json(output_path, &outcome.translated)
            .with_context(|| format!("Failed to write translated file: {:?}", output_path))?;

        FileManager::persist_staged(staged_report, &report_path)
            .with_context(|| format!("Failed to write validation report: {:?}", report_path))?;
        if let Err(e) = FileManager::persist_staged(staged_document, output_path) {
            if let Err(remove_err) = fs::remove_file(&report_path) {
                warn!("Failed to remove validation report {:?}: {}", report_path, remove_err);
            }
            return Err(e)
                .with_context(|| format!("Failed to write translated file: {:?}", output_path));
        }

        info!(
            "Wrote {:?} (mean quality {:.2}, {} placeholder warnings)",
            output_path,
            outcome.validation.stats.mean,
            outcome.validation.placeholder_warnings().len()
        );

        Ok(FileSuccess {
            file: file_name.to_string(),
            output: output_path.to_path_buf(),
            validation_report: report_path,
            string_count: outcome.string_count,
            excluded_count: outcome.excluded_count,
            structure_score: outcome.validation.structure.score,
            placeholder_warnings: outcome.validation.placeholder_warnings().len(),
            mean_score: outcome.validation.stats.mean,
            language: outcome.language,
            records: outcome.validation.records,
        })
    }

    fn record_failure(file_name: &str, language: &TargetLanguage, e: &PipelineError) -> FileFailure {
        let json_path = e.json_path().map(|p| p.to_string());
        match &json_path {
            Some(path) => error!(
                "Failed to translate {} into {} at '{}': {}",
                file_name, language.name, path, e
            ),
            None => error!("Failed to translate {} into {}: {}", file_name, language.name, e),
        }

        FileFailure {
            file: file_name.to_string(),
            language: language.code.clone(),
            json_path,
            message: e.to_string(),
        }
    }

    fn progress_style(unit: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
                unit
            ))
            .or_else(|_| {
                ProgressStyle::default_bar()
                    .template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}")
            })
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
