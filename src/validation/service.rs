/*!
 * Validation service combining the structural and quality checks.
 *
 * A reassembled document is first compared with its source; any structural
 * divergence fails the whole document. Only then is every translated leaf
 * scored and the scores summarized.
 */

use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::app_config::ScoringConfig;
use crate::document::{JsonPath, LeafEntry};
use crate::errors::{PlaceholderLossWarning, ValidationError};

use super::scoring::{QualityScorer, StringFeedback, ValidationRecord};
use super::stats::AggregateStats;
use super::structure::{self, StructureReport};

/// Validation outcome of one document in one language
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentValidation {
    pub structure: StructureReport,
    pub records: Vec<ValidationRecord>,
    pub stats: AggregateStats,
}

impl DocumentValidation {
    /// Placeholder warnings of all records, in traversal order
    pub fn placeholder_warnings(&self) -> Vec<&PlaceholderLossWarning> {
        self.records
            .iter()
            .filter_map(|r| r.placeholder_warning.as_ref())
            .collect()
    }
}

/// Validation service
#[derive(Debug, Clone, Default)]
pub struct ValidationService {
    scorer: QualityScorer,
}

impl ValidationService {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            scorer: QualityScorer::new(config),
        }
    }

    pub fn scorer(&self) -> &QualityScorer {
        &self.scorer
    }

    /// Validate a reassembled document against its source.
    ///
    /// `entries` is the index of `original`; one record is produced per
    /// translatable entry. Feedback is looked up by path.
    pub fn score(
        &self,
        original: &Value,
        reassembled: &Value,
        entries: &[LeafEntry],
        feedback: &HashMap<JsonPath, StringFeedback>,
    ) -> Result<DocumentValidation, ValidationError> {
        let structure = structure::check(original, reassembled)?;

        let records: Vec<ValidationRecord> = entries
            .iter()
            .filter(|entry| entry.is_translatable())
            .map(|entry| {
                let translated = entry
                    .path
                    .resolve(reassembled)
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                self.scorer
                    .score_leaf(&entry.path, &entry.value, translated, feedback.get(&entry.path))
            })
            .collect();

        for record in &records {
            if let Some(warning) = &record.placeholder_warning {
                warn!("{}", warning);
            }
        }

        let stats = AggregateStats::from_records(&records);
        debug!(
            "Validated {} strings: mean {:.2}, min {:.2}",
            stats.count, stats.mean, stats.min
        );

        Ok(DocumentValidation {
            structure,
            records,
            stats,
        })
    }
}
