/*!
 * Validation module for translation quality assurance.
 *
 * - `placeholders`: Detects placeholders and checks they survive translation
 * - `structure`: Compares the shape of a translation with its source
 * - `scoring`: Category scores, aggregation and score buckets
 * - `stats`: Aggregate statistics over validation records
 * - `service`: Runs the structural check, then scores every translated string
 */

pub mod placeholders;
pub mod scoring;
pub mod service;
pub mod stats;
pub mod structure;

// Re-export main types
pub use scoring::{QualityCategory, QualityScorer, ScoreBucket, StringFeedback, ValidationRecord};
pub use service::{DocumentValidation, ValidationService};
pub use stats::AggregateStats;
