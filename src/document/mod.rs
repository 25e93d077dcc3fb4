/*!
 * Document model for JSON localization files.
 *
 * - `path`: JSON paths locating leaves
 * - `indexer`: Ordered extraction of string leaves with exclusion rules
 * - `reassembler`: Rebuilds a document with translated leaves substituted in
 */

pub mod indexer;
pub mod path;
pub mod reassembler;

// Re-export main types
pub use indexer::{ExclusionReason, ExclusionRules, LeafEntry, PathIndexer};
pub use path::{JsonPath, PathSegment};
pub use reassembler::Reassembler;
