/*!
 * Mock collaborators for offline runs and tests.
 *
 * The mock never calls a model. Option 0 is a marker translation
 * `[<code>] <source>` (or an explicit translation from a lookup table),
 * options 1.. append ` (alt i)`, selection keeps option 0, refinement
 * returns its input and the judge gives every category a fixed score.
 *
 * Behaviours:
 * - `MockProvider::working()` - Always succeeds
 * - `MockProvider::failing()` - Every call fails
 * - `MockProvider::failing_for(code)` - Fails for one target language only
 * - `MockProvider::dropping_every(n)` - Omits every nth generated entry
 * - `MockProvider::stripping_placeholders()` - Loses placeholders in translations
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::document::JsonPath;
use crate::errors::ProviderError;
use crate::language_utils::TargetLanguage;
use crate::translation::batch::TranslationBatch;
use crate::translation::core::{TranslationCandidates, TranslationResult};
use crate::validation::placeholders::strip_placeholders;
use crate::validation::scoring::{QualityCategory, StringFeedback};

use super::{
    JudgeRequest, OptionGenerator, QualityJudge, TranslationRefiner, TranslationSelector,
};

/// Comment attached to every mock judgement
pub const MOCK_JUDGE_COMMENT: &str = "Mock validation";

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Every call fails with an error
    Failing,
    /// Fails whenever the target language has this code
    FailingFor { language_code: String },
    /// Leaves out every nth entry from generated options
    DropEntries { every: usize },
    /// Translations lose their placeholders
    StripPlaceholders,
}

/// Deterministic implementation of every collaborator
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Explicit translations per target language code and path
    translations: HashMap<String, HashMap<JsonPath, String>>,
    /// Score given to every category, `None` to return no feedback
    judge_score: Option<f64>,
    /// Calls across all stages
    request_count: Arc<AtomicUsize>,
    /// Entries seen by the generator, for `DropEntries`
    entry_count: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            translations: HashMap::new(),
            judge_score: Some(100.0),
            request_count: Arc::new(AtomicUsize::new(0)),
            entry_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn failing_for(language_code: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailingFor {
            language_code: language_code.into(),
        })
    }

    pub fn dropping_every(every: usize) -> Self {
        Self::new(MockBehavior::DropEntries {
            every: every.max(1),
        })
    }

    pub fn stripping_placeholders() -> Self {
        Self::new(MockBehavior::StripPlaceholders)
    }

    /// Use fixed translations for a language; other paths get marker translations
    pub fn with_translations<I, S>(mut self, language_code: &str, translations: I) -> Self
    where
        I: IntoIterator<Item = (JsonPath, S)>,
        S: Into<String>,
    {
        self.translations
            .entry(language_code.to_string())
            .or_default()
            .extend(translations.into_iter().map(|(path, text)| (path, text.into())));
        self
    }

    /// Score the judge gives every category
    pub fn with_judge_score(mut self, score: f64) -> Self {
        self.judge_score = Some(score);
        self
    }

    /// Make the judge answer with no feedback at all
    pub fn without_judge_feedback(mut self) -> Self {
        self.judge_score = None;
        self
    }

    /// Number of collaborator calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn begin_call(&self, stage: &str, target: &TargetLanguage) -> Result<(), ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Failing => Err(ProviderError::RequestFailed(format!(
                "Mock {} failure",
                stage
            ))),
            MockBehavior::FailingFor { language_code } if *language_code == target.code => {
                Err(ProviderError::RequestFailed(format!(
                    "Mock {} failure for {}",
                    stage, target.code
                )))
            }
            _ => Ok(()),
        }
    }

    fn primary_translation(&self, path: &JsonPath, source: &str, target: &TargetLanguage) -> String {
        if let Some(text) = self
            .translations
            .get(&target.code)
            .and_then(|table| table.get(path))
        {
            return text.clone();
        }

        let source = match self.behavior {
            MockBehavior::StripPlaceholders => strip_placeholders(source),
            _ => source.to_string(),
        };
        format!("[{}] {}", target.code, source)
    }

    fn should_drop_next(&self) -> bool {
        let index = self.entry_count.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            MockBehavior::DropEntries { every } => index % every == every - 1,
            _ => false,
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::working()
    }
}

#[async_trait]
impl OptionGenerator for MockProvider {
    async fn generate_options(
        &self,
        batch: &TranslationBatch<'_>,
        target: &TargetLanguage,
        options_count: usize,
        _model: &str,
    ) -> Result<Vec<TranslationCandidates>, ProviderError> {
        self.begin_call("option generation", target)?;

        let mut candidates = Vec::with_capacity(batch.len());
        for entry in &batch.entries {
            if self.should_drop_next() {
                continue;
            }

            let primary = self.primary_translation(&entry.path, &entry.value, target);
            let options = (0..options_count.max(1))
                .map(|i| {
                    if i == 0 {
                        primary.clone()
                    } else {
                        format!("{} (alt {})", primary, i)
                    }
                })
                .collect();

            candidates.push(TranslationCandidates::new(
                entry.path.clone(),
                entry.value.clone(),
                options,
            ));
        }

        Ok(candidates)
    }
}

#[async_trait]
impl TranslationSelector for MockProvider {
    async fn select(
        &self,
        candidates: Vec<TranslationCandidates>,
        target: &TargetLanguage,
        _model: &str,
    ) -> Result<Vec<TranslationResult>, ProviderError> {
        self.begin_call("selection", target)?;
        Ok(candidates.into_iter().map(|c| c.into_result(0)).collect())
    }
}

#[async_trait]
impl TranslationRefiner for MockProvider {
    async fn refine(
        &self,
        results: Vec<TranslationResult>,
        target: &TargetLanguage,
        _model: &str,
    ) -> Result<Vec<TranslationResult>, ProviderError> {
        self.begin_call("refinement", target)?;
        Ok(results)
    }
}

#[async_trait]
impl QualityJudge for MockProvider {
    async fn judge(
        &self,
        requests: &[JudgeRequest],
        categories: &[QualityCategory],
        target: &TargetLanguage,
        _model: &str,
    ) -> Result<Vec<StringFeedback>, ProviderError> {
        self.begin_call("validation", target)?;

        let Some(score) = self.judge_score else {
            return Ok(Vec::new());
        };

        Ok(requests
            .iter()
            .map(|request| StringFeedback {
                path: request.path.clone(),
                category_scores: categories.iter().map(|c| (*c, score)).collect(),
                comments: MOCK_JUDGE_COMMENT.to_string(),
            })
            .collect())
    }
}
