/*!
 * Error types for the json-translator application.
 *
 * Document, configuration and validation failures are typed with thiserror so
 * the controller can isolate them per file and per language. The application
 * edge (CLI, controller glue) works with anyhow.
 */

use thiserror::Error;

use crate::document::JsonPath;
use crate::validation::structure::StructuralIssue;

/// Errors raised while indexing or reassembling a document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The document shape cannot be processed
    #[error("Unsupported document structure at '{path}': {message}")]
    Structure {
        /// Where the problem was found
        path: JsonPath,
        /// What is wrong
        message: String,
    },

    /// A translatable leaf has no translation result
    #[error("Missing translation for '{0}'")]
    MissingTranslation(JsonPath),
}

/// Invalid configuration values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid batch size: {0} (must be at least 1)")]
    InvalidBatchSize(usize),

    #[error("Invalid options count: {0} (must be at least 1)")]
    InvalidOptionsCount(usize),

    #[error("Invalid concurrency: {0} (must be at least 1)")]
    InvalidConcurrency(usize),

    #[error("Invalid aggregation weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid identifier pattern '{pattern}': {message}")]
    InvalidPattern {
        pattern: String,
        message: String,
    },

    #[error("At least one target language is required")]
    MissingLanguages,
}

/// Errors raised by the validation scorer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Reassembled document diverges structurally from its source
    #[error("Structural mismatch at '{}': {} issue(s) found", first_path(.issues), .issues.len())]
    StructuralMismatch {
        issues: Vec<StructuralIssue>,
    },
}

fn first_path(issues: &[StructuralIssue]) -> String {
    issues
        .first()
        .map(|issue| issue.path.to_string())
        .unwrap_or_else(|| "$".to_string())
}

impl ValidationError {
    /// Path of the first structural issue
    pub fn json_path(&self) -> Option<&JsonPath> {
        match self {
            Self::StructuralMismatch { issues } => issues.first().map(|issue| &issue.path),
        }
    }
}

/// Placeholder tokens lost during translation.
///
/// This is a warning: it lowers the formatting score of the affected leaf and
/// is reported, but the translated value is still emitted.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PlaceholderLossWarning {
    pub path: JsonPath,
    pub missing: Vec<String>,
}

impl std::fmt::Display for PlaceholderLossWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Placeholder loss at '{}': missing {}",
            self.path,
            self.missing.join(", ")
        )
    }
}

/// Errors that can occur when calling an external collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when the request to the collaborator fails
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing a collaborator response fails
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The collaborator answered for fewer entries than it was given
    #[error("Incomplete response: expected {expected} entries, got {received}")]
    IncompleteResponse {
        expected: usize,
        received: usize,
    },
}

/// Failure of a single document (one file in one target language)
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("File error: {0}")]
    Io(String),
}

impl PipelineError {
    /// JSON path at which the failure was detected, when there is one
    pub fn json_path(&self) -> Option<&JsonPath> {
        match self {
            Self::Document(DocumentError::Structure { path, .. }) => Some(path),
            Self::Document(DocumentError::MissingTranslation(path)) => Some(path),
            Self::Validation(error) => error.json_path(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from the pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
