/*!
 * Model usage accounting.
 *
 * Every collaborator call is recorded against the model configured for its
 * stage. Tokens are estimated from word counts since the collaborators are
 * not required to report them.
 */

use log::info;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Estimated tokens per word
const TOKENS_PER_WORD: f64 = 1.3;

/// Usage of a single model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModelUsage {
    pub calls: u64,
    pub words: u64,
    pub estimated_tokens: u64,
}

/// Thread-safe usage tracker shared by every batch of a run
#[derive(Debug, Clone, Default)]
pub struct ModelUsageTracker {
    usage: Arc<Mutex<BTreeMap<String, ModelUsage>>>,
}

impl ModelUsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call to `model` that carried `texts`
    pub fn record<'a, I>(&self, model: &str, texts: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let words: u64 = texts
            .into_iter()
            .map(|text| text.split_whitespace().count() as u64)
            .sum();

        let mut usage = self.usage.lock();
        let entry = usage.entry(model.to_string()).or_default();
        entry.calls += 1;
        entry.words += words;
        entry.estimated_tokens += (words as f64 * TOKENS_PER_WORD) as u64;
    }

    /// Usage of one model
    pub fn usage_for(&self, model: &str) -> ModelUsage {
        self.usage.lock().get(model).copied().unwrap_or_default()
    }

    /// Usage of every model, ordered by model name
    pub fn snapshot(&self) -> BTreeMap<String, ModelUsage> {
        self.usage.lock().clone()
    }

    /// Sum over all models
    pub fn totals(&self) -> ModelUsage {
        self.usage
            .lock()
            .values()
            .fold(ModelUsage::default(), |acc, u| ModelUsage {
                calls: acc.calls + u.calls,
                words: acc.words + u.words,
                estimated_tokens: acc.estimated_tokens + u.estimated_tokens,
            })
    }

    /// Log a per-model summary
    pub fn log_summary(&self) {
        let totals = self.totals();
        info!(
            "Model usage: {} calls, ~{} tokens",
            totals.calls, totals.estimated_tokens
        );
        for (model, usage) in self.snapshot() {
            info!(
                "  - {}: {} calls, ~{} tokens",
                model, usage.calls, usage.estimated_tokens
            );
        }
    }
}
