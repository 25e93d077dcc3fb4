/*!
 * Per-string quality scoring.
 *
 * Category scores come from a quality judge. They are clamped to [0, 100],
 * the formatting category is capped when placeholders were lost, and the
 * categories are combined into an overall score using the configured
 * aggregation. Leaves the judge said nothing about are scored from the
 * length ratio of original and translation.
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::app_config::{Aggregation, ScoringConfig};
use crate::document::JsonPath;
use crate::errors::PlaceholderLossWarning;

use super::placeholders::PlaceholderSet;

/// Comment attached to scores derived from the length ratio
pub const FALLBACK_COMMENT: &str = "Fallback validation based on string length ratio";

/// Quality dimension scored by the judge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityCategory {
    Accuracy,
    Fluency,
    Terminology,
    CulturalAppropriateness,
    Formatting,
}

impl QualityCategory {
    pub const ALL: [QualityCategory; 5] = [
        Self::Accuracy,
        Self::Fluency,
        Self::Terminology,
        Self::CulturalAppropriateness,
        Self::Formatting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accuracy => "accuracy",
            Self::Fluency => "fluency",
            Self::Terminology => "terminology",
            Self::CulturalAppropriateness => "cultural-appropriateness",
            Self::Formatting => "formatting",
        }
    }
}

impl fmt::Display for QualityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reporting bucket of an overall score.
///
/// Edges are fixed: Perfect = 100, Excellent = [95, 100), Good = [90, 95),
/// Fair = [80, 90), Poor below 80.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ScoreBucket {
    Perfect,
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBucket {
    pub const ALL: [ScoreBucket; 5] = [
        Self::Perfect,
        Self::Excellent,
        Self::Good,
        Self::Fair,
        Self::Poor,
    ];

    pub fn from_score(score: f64) -> Self {
        if score >= 100.0 {
            Self::Perfect
        } else if score >= 95.0 {
            Self::Excellent
        } else if score >= 90.0 {
            Self::Good
        } else if score >= 80.0 {
            Self::Fair
        } else {
            // NaN lands here too
            Self::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Perfect => "Perfect",
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }
}

impl fmt::Display for ScoreBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the judge said about one translated leaf
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringFeedback {
    pub path: JsonPath,
    pub category_scores: BTreeMap<QualityCategory, f64>,
    #[serde(default)]
    pub comments: String,
}

impl StringFeedback {
    /// Same score for every category
    pub fn uniform(path: JsonPath, score: f64, comments: impl Into<String>) -> Self {
        Self {
            path,
            category_scores: QualityCategory::ALL.iter().map(|c| (*c, score)).collect(),
            comments: comments.into(),
        }
    }
}

/// Score of one translated leaf in one target language
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationRecord {
    pub path: JsonPath,
    pub original: String,
    pub translated: String,
    pub category_scores: BTreeMap<QualityCategory, f64>,
    pub overall_score: f64,
    pub comments: String,
    pub bucket: ScoreBucket,
    /// Placeholder tokens of the original
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub placeholders: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder_warning: Option<PlaceholderLossWarning>,
}

/// Similarity of lengths in characters, 0-100
pub fn length_ratio_score(original: &str, translated: &str) -> f64 {
    let original_len = original.chars().count() as f64;
    let translated_len = translated.chars().count() as f64;

    if original_len == 0.0 && translated_len == 0.0 {
        return 100.0;
    }
    if original_len == 0.0 || translated_len == 0.0 {
        return 0.0;
    }

    (translated_len / original_len).min(original_len / translated_len) * 100.0
}

/// Turns judge feedback into validation records
#[derive(Debug, Clone, Default)]
pub struct QualityScorer {
    config: ScoringConfig,
}

impl QualityScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a single leaf
    pub fn score_leaf(
        &self,
        path: &JsonPath,
        original: &str,
        translated: &str,
        feedback: Option<&StringFeedback>,
    ) -> ValidationRecord {
        let (mut category_scores, comments) = match feedback {
            Some(feedback) if !feedback.category_scores.is_empty() => (
                feedback
                    .category_scores
                    .iter()
                    .map(|(category, score)| (*category, clamp_score(*score)))
                    .collect::<BTreeMap<_, _>>(),
                feedback.comments.clone(),
            ),
            _ => {
                let fallback = StringFeedback::uniform(
                    path.clone(),
                    length_ratio_score(original, translated),
                    FALLBACK_COMMENT,
                );
                (fallback.category_scores, fallback.comments)
            }
        };

        let placeholders = PlaceholderSet::new(path.clone(), original);
        let check = placeholders.check(translated);
        let placeholder_warning = if check.passed {
            None
        } else {
            let cap = self.config.formatting_penalty_cap;
            let formatting = category_scores
                .entry(QualityCategory::Formatting)
                .or_insert(cap);
            *formatting = formatting.min(cap);

            Some(PlaceholderLossWarning {
                path: path.clone(),
                missing: check.missing,
            })
        };

        let overall_score = self.aggregate(&category_scores);

        ValidationRecord {
            path: path.clone(),
            original: original.to_string(),
            translated: translated.to_string(),
            category_scores,
            overall_score,
            comments,
            bucket: ScoreBucket::from_score(overall_score),
            placeholders: placeholders.tokens,
            placeholder_warning,
        }
    }

    /// Combine category scores into an overall score
    pub fn aggregate(&self, scores: &BTreeMap<QualityCategory, f64>) -> f64 {
        if scores.is_empty() {
            return 0.0;
        }

        match self.config.aggregation {
            Aggregation::Mean => scores.values().sum::<f64>() / scores.len() as f64,
            Aggregation::WeightedMean => {
                let total_weight: f64 = scores.keys().map(|c| self.config.weight(*c)).sum();
                if total_weight <= 0.0 {
                    return scores.values().sum::<f64>() / scores.len() as f64;
                }
                scores
                    .iter()
                    .map(|(category, score)| self.config.weight(*category) * score)
                    .sum::<f64>()
                    / total_weight
            }
            Aggregation::Minimum => scores.values().copied().fold(100.0, f64::min),
        }
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}
