use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::default::Default;
use std::path::Path;

use crate::errors::ConfigError;
use crate::validation::scoring::QualityCategory;

/// Application configuration module
/// This module handles the run configuration: where files come from and go,
/// which languages to produce, how strings are batched and excluded, and how
/// quality scores are combined. One Config is loaded per run and handed to the
/// components that need it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory containing the source JSON files
    #[serde(default = "default_input_dir")]
    pub input_dir: String,

    /// Directory receiving translated files and reports
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Target languages (English names or ISO codes)
    #[serde(default)]
    pub languages: Vec<String>,

    /// Model names per pipeline stage
    #[serde(default)]
    pub models: StageModels,

    /// Batching and traversal settings
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Rules for leaves that must not be translated
    #[serde(default)]
    pub exclusions: ExclusionConfig,

    /// Quality score aggregation
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Bypass model calls and use deterministic mock collaborators
    #[serde(default)]
    pub mock_mode: bool,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Model used by each pipeline stage.
///
/// These are labels handed to the collaborators and used for usage
/// accounting; the pipeline itself never branches on them.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StageModels {
    #[serde(default = "default_options_model")]
    pub options_model: String,

    #[serde(default = "default_selection_model")]
    pub selection_model: String,

    #[serde(default = "default_refinement_model")]
    pub refinement_model: String,

    #[serde(default = "default_validation_model")]
    pub validation_model: String,
}

impl Default for StageModels {
    fn default() -> Self {
        Self {
            options_model: default_options_model(),
            selection_model: default_selection_model(),
            refinement_model: default_refinement_model(),
            validation_model: default_validation_model(),
        }
    }
}

/// Batching and traversal settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProcessingConfig {
    /// Maximum strings per translation batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Candidate translations generated per string
    #[serde(default = "default_options_count")]
    pub options_count: usize,

    /// Maximum batches in flight at once
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Deepest nesting accepted before a document is rejected
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            options_count: default_options_count(),
            concurrent_requests: default_concurrent_requests(),
            max_depth: default_max_depth(),
        }
    }
}

/// Exclusion rules for technical strings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExclusionConfig {
    /// Exclude values that look like semantic versions
    #[serde(default = "default_true")]
    pub detect_versions: bool,

    /// Case-insensitive regexes matched against the key holding a string
    #[serde(default = "default_identifier_patterns")]
    pub identifier_patterns: Vec<String>,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            detect_versions: true,
            identifier_patterns: default_identifier_patterns(),
        }
    }
}

/// How category scores are combined into an overall score
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Aggregation {
    /// Arithmetic mean of all category scores
    #[default]
    Mean,
    /// Mean weighted by `ScoringConfig::weights`
    WeightedMean,
    /// Lowest category score
    Minimum,
}

/// Quality scoring configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScoringConfig {
    #[serde(default)]
    pub aggregation: Aggregation,

    /// Per-category weights for `weighted-mean`; missing categories weigh 1.0
    #[serde(default)]
    pub weights: BTreeMap<QualityCategory, f64>,

    /// Highest formatting score allowed when placeholders were lost
    #[serde(default = "default_formatting_penalty_cap")]
    pub formatting_penalty_cap: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            aggregation: Aggregation::default(),
            weights: BTreeMap::new(),
            formatting_penalty_cap: default_formatting_penalty_cap(),
        }
    }
}

impl ScoringConfig {
    /// Weight of a category, defaulting to 1.0
    pub fn weight(&self, category: QualityCategory) -> f64 {
        self.weights.get(&category).copied().unwrap_or(1.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (category, weight) in &self.weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ConfigError::InvalidWeights(format!(
                    "weight for {} must be a non-negative number, got {}",
                    category, weight
                )));
            }
        }

        let total: f64 = QualityCategory::ALL.iter().map(|c| self.weight(*c)).sum();
        if total <= 0.0 {
            return Err(ConfigError::InvalidWeights(
                "category weights sum to zero".to_string(),
            ));
        }

        if !self.formatting_penalty_cap.is_finite()
            || !(0.0..=100.0).contains(&self.formatting_penalty_cap)
        {
            return Err(ConfigError::InvalidWeights(format!(
                "formatting penalty cap must be within [0, 100], got {}",
                self.formatting_penalty_cap
            )));
        }

        Ok(())
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_input_dir() -> String {
    "locales/en".to_string()
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_options_model() -> String {
    "o1".to_string()
}

fn default_selection_model() -> String {
    "gpt-4o".to_string()
}

fn default_refinement_model() -> String {
    "o1".to_string()
}

fn default_validation_model() -> String {
    "gpt-4o".to_string()
}

fn default_batch_size() -> usize {
    20
}

fn default_options_count() -> usize {
    3
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_max_depth() -> usize {
    // Same ceiling serde_json applies while parsing
    128
}

fn default_identifier_patterns() -> Vec<String> {
    vec!["^id$".to_string(), "_id$".to_string(), "_key$".to_string()]
}

fn default_formatting_penalty_cap() -> f64 {
    50.0
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.languages.iter().all(|l| l.trim().is_empty()) {
            return Err(ConfigError::MissingLanguages);
        }

        if self.processing.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(self.processing.batch_size));
        }

        if self.processing.options_count == 0 {
            return Err(ConfigError::InvalidOptionsCount(self.processing.options_count));
        }

        if self.processing.concurrent_requests == 0 {
            return Err(ConfigError::InvalidConcurrency(self.processing.concurrent_requests));
        }

        for pattern in &self.exclusions.identifier_patterns {
            regex::Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        }

        self.scoring.validate()
    }

    /// Load the configuration file, writing a default one when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;

        Ok(config)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            languages: Vec::new(),
            models: StageModels::default(),
            processing: ProcessingConfig::default(),
            exclusions: ExclusionConfig::default(),
            scoring: ScoringConfig::default(),
            mock_mode: false,
            log_level: LogLevel::default(),
        }
    }
}
