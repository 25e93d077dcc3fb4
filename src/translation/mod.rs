/*!
 * Translation of JSON documents through model-backed collaborators.
 *
 * - `core`: Candidate and result types, path matching
 * - `batch`: Batching of entries and concurrent batch processing
 * - `usage`: Model usage accounting
 * - `pipeline`: End-to-end processing of one document in one language
 */

// Re-export main types for easier usage
pub use self::batch::{BatchTranslator, TranslationBatch, batch_entries};
pub use self::core::{TranslationCandidates, TranslationResult};
pub use self::pipeline::{DocumentOutcome, DocumentPipeline};
pub use self::usage::{ModelUsage, ModelUsageTracker};

// Submodules
pub mod batch;
pub mod core;
pub mod pipeline;
pub mod usage;
