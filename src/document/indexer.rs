/*!
 * Path indexing of JSON documents.
 *
 * Walks a document depth-first (object keys in insertion order, array
 * elements in index order) and records every string leaf together with the
 * reason it must stay untranslated, if any.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use serde_json::Value;

use crate::app_config::ExclusionConfig;
use crate::errors::{ConfigError, DocumentError};

use super::path::JsonPath;

/// Semantic versions: `1.2`, `v2.1.0`, `3.0.0-beta.1`, `1.0.0+build.5`
static VERSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[vV]?\d+(?:\.\d+)+(?:-[0-9A-Za-z][0-9A-Za-z.-]*)?(?:\+[0-9A-Za-z.-]+)?$")
        .expect("Invalid version regex")
});

/// Why a string leaf is left untranslated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExclusionReason {
    /// Value is a version string
    Version,
    /// Key marks the value as an identifier
    TechnicalIdentifier,
}

impl ExclusionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::TechnicalIdentifier => "technical-identifier",
        }
    }
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string leaf found in a document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafEntry {
    /// Location in the document
    pub path: JsonPath,
    /// Original string value
    pub value: String,
    /// Set when the leaf must be copied unchanged
    pub exclusion: Option<ExclusionReason>,
}

impl LeafEntry {
    pub fn is_excluded(&self) -> bool {
        self.exclusion.is_some()
    }

    pub fn is_translatable(&self) -> bool {
        self.exclusion.is_none()
    }
}

/// Compiled exclusion rules, checked in order (first match wins)
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    detect_versions: bool,
    identifier_patterns: Vec<Regex>,
}

impl ExclusionRules {
    /// Compile rules from configuration
    pub fn from_config(config: &ExclusionConfig) -> Result<Self, ConfigError> {
        let identifier_patterns = config
            .identifier_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ConfigError::InvalidPattern {
                        pattern: pattern.clone(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            detect_versions: config.detect_versions,
            identifier_patterns,
        })
    }

    /// Rules that exclude nothing
    pub fn none() -> Self {
        Self {
            detect_versions: false,
            identifier_patterns: Vec::new(),
        }
    }

    /// Classify a string leaf
    pub fn classify(&self, path: &JsonPath, value: &str) -> Option<ExclusionReason> {
        if self.detect_versions && VERSION_REGEX.is_match(value.trim()) {
            return Some(ExclusionReason::Version);
        }

        if let Some(key) = path.last_key() {
            if self.identifier_patterns.iter().any(|re| re.is_match(key)) {
                return Some(ExclusionReason::TechnicalIdentifier);
            }
        }

        None
    }
}

impl Default for ExclusionRules {
    fn default() -> Self {
        // The default patterns are known to compile
        Self::from_config(&ExclusionConfig::default()).unwrap_or_else(|_| Self::none())
    }
}

/// Produces the ordered leaf entries of a document
#[derive(Debug, Clone)]
pub struct PathIndexer {
    rules: ExclusionRules,
    max_depth: usize,
}

impl PathIndexer {
    pub fn new(rules: ExclusionRules, max_depth: usize) -> Self {
        Self { rules, max_depth }
    }

    pub fn rules(&self) -> &ExclusionRules {
        &self.rules
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Index every string leaf of `document` in traversal order
    pub fn index(&self, document: &Value) -> Result<Vec<LeafEntry>, DocumentError> {
        let mut entries = Vec::new();
        self.walk(document, JsonPath::root(), &mut entries)?;

        debug!(
            "Indexed {} string leaves ({} excluded)",
            entries.len(),
            entries.iter().filter(|e| e.is_excluded()).count()
        );

        Ok(entries)
    }

    /// Entries that need a translation
    pub fn translatable(entries: &[LeafEntry]) -> Vec<&LeafEntry> {
        entries.iter().filter(|e| e.is_translatable()).collect()
    }

    /// Reject documents nested deeper than the configured limit
    pub(crate) fn check_depth(&self, path: &JsonPath) -> Result<(), DocumentError> {
        if path.depth() > self.max_depth {
            return Err(DocumentError::Structure {
                path: path.clone(),
                message: format!("nesting exceeds maximum depth of {}", self.max_depth),
            });
        }
        Ok(())
    }

    fn walk(
        &self,
        value: &Value,
        path: JsonPath,
        entries: &mut Vec<LeafEntry>,
    ) -> Result<(), DocumentError> {
        self.check_depth(&path)?;

        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    self.walk(child, path.key(key), entries)?;
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    self.walk(child, path.index(index), entries)?;
                }
            }
            Value::String(text) => {
                let exclusion = self.rules.classify(&path, text);
                entries.push(LeafEntry {
                    path,
                    value: text.clone(),
                    exclusion,
                });
            }
            // Numbers, booleans and null are carried through reassembly untouched
            Value::Number(_) | Value::Bool(_) | Value::Null => {}
        }

        Ok(())
    }
}

impl Default for PathIndexer {
    fn default() -> Self {
        Self::new(ExclusionRules::default(), 128)
    }
}
