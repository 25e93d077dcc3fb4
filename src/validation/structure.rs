/*!
 * Structural comparison of a source document with its translation.
 *
 * Both documents are walked together. A value whose kind differs from the
 * source is reported once and not descended into; keys and array elements
 * present on one side only are reported as missing or extra.
 */

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::document::JsonPath;
use crate::errors::ValidationError;

/// Kind of a JSON value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Object,
    Array,
    String,
    Number,
    Bool,
    Null,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Bool,
            Value::Null => Self::Null,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What is wrong at a path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum IssueKind {
    /// Same path, different value kind
    TypeMismatch { expected: ValueKind, found: ValueKind },
    /// Path exists only in the source
    MissingPath,
    /// Path exists only in the translation
    ExtraPath,
}

/// A single structural divergence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuralIssue {
    pub path: JsonPath,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl fmt::Display for StructuralIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::TypeMismatch { expected, found } => {
                write!(f, "{}: expected {}, found {}", self.path, expected, found)
            }
            IssueKind::MissingPath => write!(f, "{}: missing in translation", self.path),
            IssueKind::ExtraPath => write!(f, "{}: not present in source", self.path),
        }
    }
}

/// Result of a structural comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureReport {
    /// Values in the source, root excluded
    pub element_count: usize,
    pub issues: Vec<StructuralIssue>,
    /// `100 - issues / elements * 100`, floored at 0
    pub score: f64,
}

impl StructureReport {
    pub fn is_match(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Compare two documents and list every divergence in traversal order
pub fn compare(original: &Value, candidate: &Value) -> Vec<StructuralIssue> {
    let mut issues = Vec::new();
    compare_at(original, candidate, &JsonPath::root(), &mut issues);
    issues
}

/// Compare and score two documents without failing
pub fn report(original: &Value, candidate: &Value) -> StructureReport {
    let issues = compare(original, candidate);
    let element_count = count_elements(original);

    let score = if issues.is_empty() {
        100.0
    } else if element_count == 0 {
        0.0
    } else {
        (100.0 - issues.len() as f64 / element_count as f64 * 100.0).max(0.0)
    };

    StructureReport {
        element_count,
        issues,
        score,
    }
}

/// Compare two documents, failing on any divergence
pub fn check(original: &Value, candidate: &Value) -> Result<StructureReport, ValidationError> {
    let report = report(original, candidate);
    if report.is_match() {
        Ok(report)
    } else {
        Err(ValidationError::StructuralMismatch {
            issues: report.issues,
        })
    }
}

fn compare_at(original: &Value, candidate: &Value, path: &JsonPath, issues: &mut Vec<StructuralIssue>) {
    let expected = ValueKind::of(original);
    let found = ValueKind::of(candidate);

    if expected != found {
        issues.push(StructuralIssue {
            path: path.clone(),
            kind: IssueKind::TypeMismatch { expected, found },
        });
        return;
    }

    match (original, candidate) {
        (Value::Object(source), Value::Object(target)) => {
            for (key, value) in source {
                let child = path.key(key);
                match target.get(key) {
                    Some(other) => compare_at(value, other, &child, issues),
                    None => issues.push(StructuralIssue {
                        path: child,
                        kind: IssueKind::MissingPath,
                    }),
                }
            }
            for key in target.keys().filter(|k| !source.contains_key(*k)) {
                issues.push(StructuralIssue {
                    path: path.key(key),
                    kind: IssueKind::ExtraPath,
                });
            }
        }
        (Value::Array(source), Value::Array(target)) => {
            for (index, value) in source.iter().enumerate() {
                let child = path.index(index);
                match target.get(index) {
                    Some(other) => compare_at(value, other, &child, issues),
                    None => issues.push(StructuralIssue {
                        path: child,
                        kind: IssueKind::MissingPath,
                    }),
                }
            }
            for index in source.len()..target.len() {
                issues.push(StructuralIssue {
                    path: path.index(index),
                    kind: IssueKind::ExtraPath,
                });
            }
        }
        _ => {}
    }
}

fn count_elements(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.values().map(|v| 1 + count_elements(v)).sum(),
        Value::Array(items) => items.iter().map(|v| 1 + count_elements(v)).sum(),
        _ => 0,
    }
}
