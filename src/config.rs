use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

/// The closed set of canonical keywords. Every language configuration maps
/// each of these to exactly one localized spelling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordMap {
    pub var: String,
    pub r#const: String,
    pub function: String,
    pub r#return: String,
    pub r#if: String,
    pub r#else: String,
    pub r#while: String,
    pub r#for: String,
    pub and: String,
    pub or: String,
    pub print: String,
    pub r#true: String,
    pub r#false: String,
    pub null: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub name: String,
    pub code: String,
    pub keywords: KeywordMap,
}

const BUILTIN: &[(&str, &str)] = &[
    ("en", include_str!("languages/en.json")),
    ("id", include_str!("languages/id.json")),
];

/// Look up a builtin language configuration by code (case-insensitive).
pub fn language_config(code: &str) -> Result<LanguageConfig> {
    let code = code.to_lowercase();
    for (builtin_code, json) in BUILTIN {
        if *builtin_code == code {
            return serde_json::from_str(json)
                .with_context(|| format!("builtin language table '{}' is malformed", code));
        }
    }
    bail!(
        "Language configuration not found for code: {}. Available: {}",
        code,
        available_languages().join(", ")
    )
}

pub fn available_languages() -> Vec<&'static str> {
    BUILTIN.iter().map(|(code, _)| *code).collect()
}

/// Load a custom language configuration from a JSON file.
pub fn load_language_config(path: &str) -> Result<LanguageConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read language config '{}'", path))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse language config '{}'", path))
}
