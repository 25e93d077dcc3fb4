/*!
 * Placeholder detection and verification.
 *
 * Two placeholder families are recognized:
 * - brace style: `{name}`, `{0}` (`{{` and `}}` are literal braces)
 * - printf style: `%s`, `%d`, `%1$s`, `%.2f`, `%@` (`%%` is a literal percent)
 *
 * A translation keeps its placeholders when every token of the original
 * appears at least once in it. Order is free since languages reorder words.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

use crate::document::{JsonPath, LeafEntry};

/// Escapes come first so that `{{name}}` and `%%d` are consumed as literals
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?P<escape>\{\{|\}\}|%%)",
        r"|(?P<brace>\{(?:[A-Za-z_][A-Za-z0-9_]*|\d+)\})",
        r"|(?P<printf>%(?:\d+\$)?[-+0#]*\d*(?:\.\d+)?(?:ll|l|h)?[sdiufFeEgGxXoc@])",
    ))
    .expect("Invalid placeholder regex")
});

/// Placeholders found in one leaf
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceholderSet {
    pub path: JsonPath,
    /// Tokens in order of appearance, repeats included
    pub tokens: Vec<String>,
}

impl PlaceholderSet {
    pub fn new(path: JsonPath, text: &str) -> Self {
        Self {
            path,
            tokens: extract_tokens(text),
        }
    }

    pub fn for_entry(entry: &LeafEntry) -> Self {
        Self::new(entry.path.clone(), &entry.value)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Check that every token is present in `translated`
    pub fn check(&self, translated: &str) -> PlaceholderCheck {
        if self.tokens.is_empty() {
            return PlaceholderCheck::passed();
        }

        let found: HashSet<String> = extract_tokens(translated).into_iter().collect();
        let mut seen = HashSet::new();
        let missing: Vec<String> = self
            .tokens
            .iter()
            .filter(|token| !found.contains(*token))
            .filter(|token| seen.insert(token.as_str()))
            .cloned()
            .collect();

        if missing.is_empty() {
            PlaceholderCheck::passed()
        } else {
            debug!("Missing placeholders at {}: {:?}", self.path, missing);
            PlaceholderCheck::failed(missing)
        }
    }
}

/// Outcome of a placeholder check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceholderCheck {
    /// Whether all placeholders survived
    pub passed: bool,
    /// Original tokens absent from the translation, once each
    pub missing: Vec<String>,
}

impl PlaceholderCheck {
    /// Create a passing result
    pub fn passed() -> Self {
        Self {
            passed: true,
            missing: Vec::new(),
        }
    }

    /// Create a failing result
    pub fn failed(missing: Vec<String>) -> Self {
        Self {
            passed: missing.is_empty(),
            missing,
        }
    }
}

/// Literal placeholder tokens of `text`, in order of appearance
pub fn extract_tokens(text: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(text)
        .filter(|caps| caps.name("escape").is_none())
        .filter_map(|caps| caps.get(0).map(|m| m.as_str().to_string()))
        .collect()
}

/// Check that every placeholder of `original` is present in `translated`
pub fn verify(original: &str, translated: &str) -> PlaceholderCheck {
    PlaceholderSet::new(JsonPath::root(), original).check(translated)
}

/// Remove every placeholder from `text`, leaving escapes alone
pub fn strip_placeholders(text: &str) -> String {
    let stripped = PLACEHOLDER_REGEX.replace_all(text, |caps: &regex::Captures| {
        match caps.name("escape") {
            Some(escape) => escape.as_str().to_string(),
            None => String::new(),
        }
    });

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
