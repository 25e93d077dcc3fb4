use anyhow::{Result, anyhow};
use isolang::Language;
use log::warn;
use serde::Serialize;
use std::fmt;

/// Language utilities for target language resolution
///
/// Target languages are given either as English names ("Spanish",
/// "Simplified Chinese") or as ISO 639-1 / ISO 639-3 codes. Each one is
/// resolved to a display name handed to the collaborators and a short code
/// used for output directories and report file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TargetLanguage {
    /// English name
    pub name: String,
    /// Output code (ISO 639-1 when one exists)
    pub code: String,
}

impl TargetLanguage {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Regional variants that have no ISO 639 code of their own
fn regional_variant(input: &str) -> Option<TargetLanguage> {
    match input.to_lowercase().as_str() {
        "simplified chinese" | "chinese (simplified)" | "zh-cn" | "zh-hans" => {
            Some(TargetLanguage::new("Simplified Chinese", "zh-CN"))
        }
        "traditional chinese" | "chinese (traditional)" | "zh-tw" | "zh-hant" => {
            Some(TargetLanguage::new("Traditional Chinese", "zh-TW"))
        }
        "brazilian portuguese" | "portuguese (brazil)" | "pt-br" => {
            Some(TargetLanguage::new("Brazilian Portuguese", "pt-BR"))
        }
        _ => None,
    }
}

/// Look up a language by ISO code or English name
fn lookup(input: &str) -> Option<Language> {
    let lowered = input.to_lowercase();

    match lowered.len() {
        2 => {
            if let Some(lang) = Language::from_639_1(&lowered) {
                return Some(lang);
            }
        }
        3 => {
            if let Some(lang) = Language::from_639_3(&lowered) {
                return Some(lang);
            }
        }
        _ => {}
    }

    Language::from_name(input).or_else(|| Language::from_name(&capitalize(&lowered)))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Output code for a language: ISO 639-1 when available, ISO 639-3 otherwise
fn output_code(lang: Language) -> String {
    lang.to_639_1()
        .map(|code| code.to_string())
        .unwrap_or_else(|| lang.to_639_3().to_string())
}

/// Resolve a configured target language.
///
/// Unknown names are kept as given and use their lowercased form as code,
/// with a warning. Only blank input is rejected.
pub fn resolve_target_language(input: &str) -> Result<TargetLanguage> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Empty target language"));
    }

    if let Some(variant) = regional_variant(trimmed) {
        return Ok(variant);
    }

    if let Some(lang) = lookup(trimmed) {
        return Ok(TargetLanguage::new(lang.to_name(), output_code(lang)));
    }

    let code = trimmed.to_lowercase().replace(' ', "_");
    warn!(
        "Unknown language '{}', using '{}' as its output code",
        trimmed, code
    );
    Ok(TargetLanguage::new(trimmed, code))
}

/// Resolve every configured language, dropping duplicates by output code
pub fn resolve_target_languages(inputs: &[String]) -> Result<Vec<TargetLanguage>> {
    let mut resolved: Vec<TargetLanguage> = Vec::with_capacity(inputs.len());

    for input in inputs.iter().filter(|l| !l.trim().is_empty()) {
        let language = resolve_target_language(input)?;
        if resolved.iter().any(|l| l.code == language.code) {
            warn!("Ignoring duplicate target language '{}'", input);
            continue;
        }
        resolved.push(language);
    }

    if resolved.is_empty() {
        return Err(anyhow!("No target languages given"));
    }

    Ok(resolved)
}
