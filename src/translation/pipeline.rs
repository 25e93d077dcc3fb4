/*!
 * Per-document translation pipeline.
 *
 * One run of the pipeline turns a source document into one target language:
 * index the string leaves, batch the translatable ones, generate, select and
 * refine translations, reassemble the document, have the translations judged
 * and validate the result. Nothing is written here; the caller persists the
 * outcome only when every step succeeded.
 */

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::app_config::Config;
use crate::document::{JsonPath, LeafEntry, PathIndexer, Reassembler};
use crate::document::indexer::ExclusionRules;
use crate::errors::{ConfigError, PipelineError};
use crate::language_utils::TargetLanguage;
use crate::providers::{Collaborators, JudgeRequest, QualityJudge};
use crate::validation::scoring::{QualityCategory, StringFeedback};
use crate::validation::service::{DocumentValidation, ValidationService};

use super::batch::{BatchTranslator, batch_entries};
use super::core::index_results;
use super::usage::ModelUsageTracker;

/// Result of translating one document into one language
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub language: TargetLanguage,
    pub translated: Value,
    /// String leaves in the source
    pub string_count: usize,
    /// String leaves copied unchanged
    pub excluded_count: usize,
    pub validation: DocumentValidation,
}

/// Translates whole documents
#[derive(Debug, Clone)]
pub struct DocumentPipeline {
    indexer: PathIndexer,
    batch_size: usize,
    max_concurrent_requests: usize,
    translator: BatchTranslator,
    judge: Arc<dyn QualityJudge>,
    validation_model: String,
    validation: ValidationService,
    usage: ModelUsageTracker,
}

impl DocumentPipeline {
    /// Build a pipeline from a validated configuration
    pub fn new(
        config: &Config,
        collaborators: Collaborators,
        usage: ModelUsageTracker,
    ) -> Result<Self, ConfigError> {
        let processing = &config.processing;
        if processing.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(processing.batch_size));
        }
        config.scoring.validate()?;

        let rules = ExclusionRules::from_config(&config.exclusions)?;
        let judge = collaborators.judge.clone();

        Ok(Self {
            indexer: PathIndexer::new(rules, processing.max_depth),
            batch_size: processing.batch_size,
            max_concurrent_requests: processing.concurrent_requests.max(1),
            translator: BatchTranslator::new(
                collaborators,
                config.models.clone(),
                usage.clone(),
                processing.options_count,
                processing.concurrent_requests,
            ),
            judge,
            validation_model: config.models.validation_model.clone(),
            validation: ValidationService::new(config.scoring.clone()),
            usage,
        })
    }

    pub fn indexer(&self) -> &PathIndexer {
        &self.indexer
    }

    /// Translate `document` into `target`
    pub async fn process(
        &self,
        document: &Value,
        target: &TargetLanguage,
        progress_callback: impl Fn(usize, usize) + Sync,
    ) -> Result<DocumentOutcome, PipelineError> {
        let entries = self.indexer.index(document)?;
        let translatable = PathIndexer::translatable(&entries);
        let excluded_count = entries.len() - translatable.len();

        let batches = batch_entries(translatable.iter().copied(), self.batch_size)?;
        debug!(
            "{} strings to translate into {} in {} batches ({} excluded)",
            translatable.len(),
            target.name,
            batches.len(),
            excluded_count
        );

        let results = self
            .translator
            .translate_batches(&batches, target, progress_callback)
            .await?;
        let results = index_results(results);

        let translated = Reassembler::new(&self.indexer).reassemble(document, &results)?;

        let feedback = self.collect_feedback(&translatable, &translated, target).await;
        let validation = self
            .validation
            .score(document, &translated, &entries, &feedback)?;

        info!(
            "Translated {} strings into {} (mean quality {:.2})",
            validation.stats.count, target.name, validation.stats.mean
        );

        Ok(DocumentOutcome {
            language: target.clone(),
            translated,
            string_count: entries.len(),
            excluded_count,
            validation,
        })
    }

    /// Ask the judge about every translated string.
    ///
    /// A failing judge call is not fatal: the affected strings get no
    /// feedback and fall back to length-ratio scoring.
    async fn collect_feedback(
        &self,
        entries: &[&LeafEntry],
        translated: &Value,
        target: &TargetLanguage,
    ) -> HashMap<JsonPath, StringFeedback> {
        let requests: Vec<JudgeRequest> = entries
            .iter()
            .map(|entry| JudgeRequest {
                path: entry.path.clone(),
                original: entry.value.clone(),
                translated: entry
                    .path
                    .resolve(translated)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect();

        let responses = stream::iter(requests.chunks(self.batch_size))
            .map(|chunk| async move {
                self.usage.record(
                    &self.validation_model,
                    chunk
                        .iter()
                        .flat_map(|r| [r.original.as_str(), r.translated.as_str()]),
                );
                let result = self
                    .judge
                    .judge(chunk, &QualityCategory::ALL, target, &self.validation_model)
                    .await;
                (chunk, result)
            })
            .buffer_unordered(self.max_concurrent_requests)
            .collect::<Vec<_>>()
            .await;

        let mut feedback = HashMap::with_capacity(requests.len());
        for (chunk, result) in responses {
            match result {
                Ok(items) => {
                    let asked: HashSet<&JsonPath> = chunk.iter().map(|r| &r.path).collect();
                    for item in items.into_iter().filter(|f| asked.contains(&f.path)) {
                        feedback.entry(item.path.clone()).or_insert(item);
                    }
                }
                Err(e) => warn!(
                    "Quality judge failed for {} strings, using length ratio instead: {}",
                    chunk.len(),
                    e
                ),
            }
        }

        feedback
    }
}
