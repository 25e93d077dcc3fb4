/*!
 * Collaborator interfaces for the model-backed pipeline stages.
 *
 * The pipeline never talks to a model directly. Each stage goes through one
 * of these traits, receives the model name configured for it, and answers
 * per leaf path:
 * - `OptionGenerator`: candidate translations for a batch
 * - `TranslationSelector`: one chosen translation per entry
 * - `TranslationRefiner`: polishes chosen translations
 * - `QualityJudge`: per-category quality scores
 *
 * `mock` provides deterministic implementations of all four.
 */

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;

use crate::document::JsonPath;
use crate::errors::ProviderError;
use crate::language_utils::TargetLanguage;
use crate::translation::batch::TranslationBatch;
use crate::translation::core::{TranslationCandidates, TranslationResult};
use crate::validation::scoring::{QualityCategory, StringFeedback};

pub mod mock;

/// Produces candidate translations
#[async_trait]
pub trait OptionGenerator: Send + Sync + Debug {
    /// Return up to `options_count` candidates for every entry of `batch`
    async fn generate_options(
        &self,
        batch: &TranslationBatch<'_>,
        target: &TargetLanguage,
        options_count: usize,
        model: &str,
    ) -> Result<Vec<TranslationCandidates>, ProviderError>;
}

/// Picks one candidate per entry
#[async_trait]
pub trait TranslationSelector: Send + Sync + Debug {
    async fn select(
        &self,
        candidates: Vec<TranslationCandidates>,
        target: &TargetLanguage,
        model: &str,
    ) -> Result<Vec<TranslationResult>, ProviderError>;
}

/// Improves chosen translations
#[async_trait]
pub trait TranslationRefiner: Send + Sync + Debug {
    async fn refine(
        &self,
        results: Vec<TranslationResult>,
        target: &TargetLanguage,
        model: &str,
    ) -> Result<Vec<TranslationResult>, ProviderError>;
}

/// One translated string to be judged
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JudgeRequest {
    pub path: JsonPath,
    pub original: String,
    pub translated: String,
}

/// Scores translations
#[async_trait]
pub trait QualityJudge: Send + Sync + Debug {
    /// Score `requests` in `categories`. Paths left unanswered are scored
    /// from the length ratio instead.
    async fn judge(
        &self,
        requests: &[JudgeRequest],
        categories: &[QualityCategory],
        target: &TargetLanguage,
        model: &str,
    ) -> Result<Vec<StringFeedback>, ProviderError>;
}

/// The four collaborators a pipeline run needs
#[derive(Debug, Clone)]
pub struct Collaborators {
    pub generator: Arc<dyn OptionGenerator>,
    pub selector: Arc<dyn TranslationSelector>,
    pub refiner: Arc<dyn TranslationRefiner>,
    pub judge: Arc<dyn QualityJudge>,
}

impl Collaborators {
    /// Use one provider for every stage
    pub fn from_provider<P>(provider: P) -> Self
    where
        P: OptionGenerator + TranslationSelector + TranslationRefiner + QualityJudge + 'static,
    {
        let provider = Arc::new(provider);
        Self {
            generator: provider.clone(),
            selector: provider.clone(),
            refiner: provider.clone(),
            judge: provider,
        }
    }
}
