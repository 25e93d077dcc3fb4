/*!
 * Core translation types.
 *
 * Candidate generation and selection are two explicit stages: a collaborator
 * first returns `TranslationCandidates` for every entry of a batch, then a
 * selector turns each of them into exactly one `TranslationResult`. Results
 * are always matched back to their entries by path.
 */

use log::debug;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::document::{JsonPath, LeafEntry};
use crate::errors::ProviderError;

/// Candidate translations for one leaf
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationCandidates {
    /// Leaf the candidates belong to
    pub path: JsonPath,
    /// Original string
    pub source: String,
    /// Candidate translations, best guess first
    pub options: Vec<String>,
}

impl TranslationCandidates {
    pub fn new(path: JsonPath, source: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            path,
            source: source.into(),
            options,
        }
    }

    /// Choose one option as the translation, keeping the full list for reports.
    ///
    /// Falls back to the first option when `index` is out of range, and to the
    /// source string when there are no options at all.
    pub fn into_result(self, index: usize) -> TranslationResult {
        let translated_value = self
            .options
            .get(index)
            .or_else(|| self.options.first())
            .cloned()
            .unwrap_or_else(|| self.source.clone());

        TranslationResult {
            path: self.path,
            translated_value,
            option_candidates: self.options,
        }
    }
}

/// The translation chosen for one leaf
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationResult {
    pub path: JsonPath,
    pub translated_value: String,
    /// Every option that was considered, in generation order
    pub option_candidates: Vec<String>,
}

impl TranslationResult {
    /// Result without recorded candidates
    pub fn new(path: JsonPath, translated_value: impl Into<String>) -> Self {
        Self {
            path,
            translated_value: translated_value.into(),
            option_candidates: Vec::new(),
        }
    }

    /// Replace the translated value, keeping the candidate history
    pub fn refined(mut self, value: impl Into<String>) -> Self {
        self.translated_value = value.into();
        self
    }
}

/// Anything a collaborator returns that is keyed by a leaf path
pub trait PathKeyed {
    fn path(&self) -> &JsonPath;
}

impl PathKeyed for TranslationCandidates {
    fn path(&self) -> &JsonPath {
        &self.path
    }
}

impl PathKeyed for TranslationResult {
    fn path(&self) -> &JsonPath {
        &self.path
    }
}

/// Match collaborator output back to the entries it was asked about.
///
/// Output order is irrelevant. Items for unknown paths are dropped and
/// duplicates keep the first occurrence. Returns the matched items in entry
/// order, or `IncompleteResponse` when any entry got no answer.
pub fn match_by_path<T: PathKeyed>(
    entries: &[&LeafEntry],
    items: Vec<T>,
) -> Result<Vec<T>, ProviderError> {
    let wanted: HashSet<&JsonPath> = entries.iter().map(|e| &e.path).collect();
    let mut by_path: HashMap<JsonPath, T> = HashMap::with_capacity(entries.len());

    for item in items {
        if !wanted.contains(item.path()) {
            debug!("Ignoring response for unrequested path '{}'", item.path());
            continue;
        }
        if by_path.contains_key(item.path()) {
            debug!("Ignoring duplicate response for '{}'", item.path());
            continue;
        }
        by_path.insert(item.path().clone(), item);
    }

    let received = by_path.len();
    if received < entries.len() {
        return Err(ProviderError::IncompleteResponse {
            expected: entries.len(),
            received,
        });
    }

    Ok(entries
        .iter()
        .filter_map(|entry| by_path.remove(&entry.path))
        .collect())
}

/// Key a list of results by path for reassembly
pub fn index_results(results: Vec<TranslationResult>) -> HashMap<JsonPath, TranslationResult> {
    results
        .into_iter()
        .map(|result| (result.path.clone(), result))
        .collect()
}
