/*!
 * Batch translation processing.
 *
 * `batch_entries` splits the translatable entries of a document into
 * contiguous batches. `BatchTranslator` runs each batch through the option,
 * selection and refinement stages, with several batches in flight at once.
 */

use futures::stream::{self, StreamExt};
use log::{debug, error};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crate::app_config::StageModels;
use crate::document::LeafEntry;
use crate::errors::{ConfigError, PipelineError, ProviderError};
use crate::language_utils::TargetLanguage;
use crate::providers::Collaborators;

use super::core::{TranslationResult, match_by_path};
use super::usage::ModelUsageTracker;

/// A bounded run of consecutive entries
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationBatch<'a> {
    /// Position of the batch in the document
    pub batch_index: usize,
    pub entries: Vec<&'a LeafEntry>,
}

impl<'a> TranslationBatch<'a> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Source strings in entry order
    pub fn texts(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().map(|e| e.value.as_str())
    }
}

/// Split entries into batches of at most `max_batch_size`, keeping order
pub fn batch_entries<'a, I>(
    entries: I,
    max_batch_size: usize,
) -> Result<Vec<TranslationBatch<'a>>, ConfigError>
where
    I: IntoIterator<Item = &'a LeafEntry>,
{
    if max_batch_size == 0 {
        return Err(ConfigError::InvalidBatchSize(max_batch_size));
    }

    let entries: Vec<&'a LeafEntry> = entries.into_iter().collect();

    Ok(entries
        .chunks(max_batch_size)
        .enumerate()
        .map(|(batch_index, chunk)| TranslationBatch {
            batch_index,
            entries: chunk.to_vec(),
        })
        .collect())
}

/// Runs batches through the generation, selection and refinement stages
#[derive(Debug, Clone)]
pub struct BatchTranslator {
    collaborators: Collaborators,
    models: StageModels,
    usage: ModelUsageTracker,
    options_count: usize,
    max_concurrent_requests: usize,
}

impl BatchTranslator {
    pub fn new(
        collaborators: Collaborators,
        models: StageModels,
        usage: ModelUsageTracker,
        options_count: usize,
        max_concurrent_requests: usize,
    ) -> Self {
        Self {
            collaborators,
            models,
            usage,
            options_count: options_count.max(1),
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }

    /// Translate all batches of a document.
    ///
    /// Results come back in entry order. If any batch fails the document
    /// fails; completed batches are discarded.
    pub async fn translate_batches(
        &self,
        batches: &[TranslationBatch<'_>],
        target: &TargetLanguage,
        progress_callback: impl Fn(usize, usize) + Sync,
    ) -> Result<Vec<TranslationResult>, PipelineError> {
        let total_batches = batches.len();
        let processed_batches = AtomicUsize::new(0);

        let mut results = stream::iter(batches.iter())
            .map(|batch| {
                let processed_batches = &processed_batches;
                let progress_callback = &progress_callback;

                async move {
                    let start_time = Instant::now();
                    let result = self.translate_batch(batch, target).await;

                    let current = processed_batches.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(current, total_batches);

                    match &result {
                        Ok(_) => debug!(
                            "Batch {} of {} completed in {:?}",
                            batch.batch_index + 1,
                            total_batches,
                            start_time.elapsed()
                        ),
                        Err(e) => error!(
                            "Batch {} of {} failed: {}",
                            batch.batch_index + 1,
                            total_batches,
                            e
                        ),
                    }

                    (batch.batch_index, result)
                }
            })
            .buffer_unordered(self.max_concurrent_requests)
            .collect::<Vec<_>>()
            .await;

        // Sort results by batch index to maintain original order
        results.sort_by_key(|(index, _)| *index);

        let mut translated = Vec::new();
        for (_, result) in results {
            translated.extend(result?);
        }

        Ok(translated)
    }

    /// Generate options, select one per entry and refine the selection
    pub async fn translate_batch(
        &self,
        batch: &TranslationBatch<'_>,
        target: &TargetLanguage,
    ) -> Result<Vec<TranslationResult>, ProviderError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = self
            .collaborators
            .generator
            .generate_options(batch, target, self.options_count, &self.models.options_model)
            .await?;
        self.usage
            .record(&self.models.options_model, batch.texts());
        let candidates = match_by_path(&batch.entries, candidates)?;

        self.usage.record(
            &self.models.selection_model,
            candidates
                .iter()
                .flat_map(|c| c.options.iter().map(String::as_str)),
        );
        let selected = self
            .collaborators
            .selector
            .select(candidates, target, &self.models.selection_model)
            .await?;
        let selected = match_by_path(&batch.entries, selected)?;

        self.usage.record(
            &self.models.refinement_model,
            selected.iter().map(|r| r.translated_value.as_str()),
        );
        let refined = self
            .collaborators
            .refiner
            .refine(selected, target, &self.models.refinement_model)
            .await?;

        match_by_path(&batch.entries, refined)
    }
}
