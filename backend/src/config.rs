//! Runtime settings.
//!
//! Values come from the process environment (after loading `.env` if present)
//! and can be overridden by CLI flags. The transliteration strategy is fixed
//! here, before any pipeline run.
//!
//! | Variable                     | Default            |
//! |------------------------------|--------------------|
//! | `ROMANIZE_STRATEGY`          | `rule`             |
//! | `ROMANIZE_SOURCE_SCRIPT`     | `devanagari`       |
//! | `ROMANIZE_TARGET_SCHEME`     | `phonetic`         |
//! | `ROMANIZE_ARTIFACT_DIR`      | `static`           |
//! | `ROMANIZE_OUTPUT_COLUMN`     | `Names_Pronounced` |
//! | `ROMANIZE_LLM_PROVIDER`      | `gemini`           |
//! | `ROMANIZE_LLM_MODEL`         | provider default   |
//! | `ROMANIZE_LLM_BASE_URL`      | provider default   |
//! | `ROMANIZE_LLM_MAX_ATTEMPTS`  | `1`                |
//! | `ROMANIZE_LLM_TIMEOUT_SECS`  | none               |
//! | `ROMANIZE_LLM_MAX_TOKENS`    | `4096`             |
//! | `ROMANIZE_SOURCE_LANGUAGE`   | from source script |
//! | `ROMANIZE_LLM_API_KEY`       | provider key below |
//! | `GEMINI_API_KEY` / `ANTHROPIC_API_KEY` | -        |

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ai::LlmProvider;
use crate::error::ConfigError;
use crate::table::DEFAULT_OUTPUT_COLUMN;
use crate::transliterate::{SourceScript, TargetScheme};

/// Default artifact directory (relative to current dir)
pub const DEFAULT_ARTIFACT_DIR: &str = "static";

/// Which transliteration strategy the pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Rule,
    Llm,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyKind::Rule => "rule",
            StrategyKind::Llm => "llm",
        })
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rule" | "rules" | "rule-based" => Ok(StrategyKind::Rule),
            "llm" | "ai" => Ok(StrategyKind::Llm),
            _ => Err(ConfigError::InvalidValue {
                key: "strategy",
                value: s.to_string(),
                expected: "rule, llm",
            }),
        }
    }
}

/// Settings of the batch LLM strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub api_key: Option<String>,
    /// Model name; provider default when unset.
    pub model: Option<String>,
    /// API root; provider default when unset.
    pub base_url: Option<String>,
    /// Total attempts per batch (1 = no retry).
    pub max_attempts: u32,
    pub timeout_secs: Option<u64>,
    /// Completion token limit; client default when unset.
    pub max_tokens: Option<u32>,
    /// Language named in the prompt; derived from the source script when unset.
    pub source_language: Option<String>,
}

/// All runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub strategy: StrategyKind,
    pub source_script: SourceScript,
    pub target_scheme: TargetScheme,
    pub artifact_dir: PathBuf,
    pub output_column: String,
    pub llm: LlmSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Rule,
            source_script: SourceScript::Devanagari,
            target_scheme: TargetScheme::Phonetic,
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            output_column: DEFAULT_OUTPUT_COLUMN.to_string(),
            llm: LlmSettings {
                max_attempts: 1,
                ..LlmSettings::default()
            },
        }
    }
}

impl Settings {
    /// Load settings from the environment, reading `.env` first.
    ///
    /// Entries in `overrides` take precedence over environment variables.
    pub fn from_env(overrides: &HashMap<&'static str, String>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| overrides.get(key).cloned().or_else(|| env::var(key).ok()))
    }

    /// Load settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut settings = Settings::default();

        if let Some(v) = get("ROMANIZE_STRATEGY") {
            settings.strategy = v.parse()?;
        }
        if let Some(v) = get("ROMANIZE_SOURCE_SCRIPT") {
            settings.source_script = v.parse()?;
        }
        if let Some(v) = get("ROMANIZE_TARGET_SCHEME") {
            settings.target_scheme = v.parse()?;
        }
        if let Some(v) = get("ROMANIZE_ARTIFACT_DIR") {
            settings.artifact_dir = PathBuf::from(v);
        }
        if let Some(v) = get("ROMANIZE_OUTPUT_COLUMN") {
            settings.output_column = v;
        }

        let llm = &mut settings.llm;
        if let Some(v) = get("ROMANIZE_LLM_PROVIDER") {
            llm.provider = v.parse()?;
        }
        llm.model = get("ROMANIZE_LLM_MODEL");
        llm.base_url = get("ROMANIZE_LLM_BASE_URL");
        llm.source_language = get("ROMANIZE_SOURCE_LANGUAGE");
        if let Some(v) = get("ROMANIZE_LLM_MAX_ATTEMPTS") {
            llm.max_attempts = parse_number("ROMANIZE_LLM_MAX_ATTEMPTS", &v)?;
        }
        if let Some(v) = get("ROMANIZE_LLM_TIMEOUT_SECS") {
            llm.timeout_secs = Some(parse_number("ROMANIZE_LLM_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = get("ROMANIZE_LLM_MAX_TOKENS") {
            llm.max_tokens = Some(parse_number("ROMANIZE_LLM_MAX_TOKENS", &v)?);
        }
        let provider = llm.provider;
        llm.api_key = get("ROMANIZE_LLM_API_KEY").or_else(|| match provider {
            LlmProvider::Gemini => get("GEMINI_API_KEY").or_else(|| get("Gemini_API_KEY")),
            LlmProvider::Anthropic => get("ANTHROPIC_API_KEY"),
        });

        Ok(settings)
    }

    /// Language named in LLM prompts.
    pub fn source_language(&self) -> String {
        self.llm
            .source_language
            .clone()
            .unwrap_or_else(|| self.source_script.default_language().to_string())
    }
}

fn parse_number<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        expected: "a non-negative integer",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.strategy, StrategyKind::Rule);
        assert_eq!(settings.output_column, "Names_Pronounced");
        assert_eq!(settings.llm.max_attempts, 1);
        assert_eq!(settings.source_language(), "Hindi");
    }

    #[test]
    fn test_llm_settings_from_env() {
        let settings = Settings::from_lookup(lookup(&[
            ("ROMANIZE_STRATEGY", "llm"),
            ("ROMANIZE_LLM_PROVIDER", "anthropic"),
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("GEMINI_API_KEY", "ignored"),
            ("ROMANIZE_LLM_MAX_ATTEMPTS", "3"),
            ("ROMANIZE_LLM_MAX_TOKENS", "8192"),
            ("ROMANIZE_LLM_TIMEOUT_SECS", "30"),
            ("ROMANIZE_SOURCE_SCRIPT", "bengali"),
        ]))
        .unwrap();

        assert_eq!(settings.strategy, StrategyKind::Llm);
        assert_eq!(settings.llm.provider, LlmProvider::Anthropic);
        assert_eq!(settings.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.llm.max_attempts, 3);
        assert_eq!(settings.llm.timeout_secs, Some(30));
        assert_eq!(settings.llm.max_tokens, Some(8192));
        assert_eq!(settings.source_language(), "Bengali");
    }

    #[test]
    fn test_legacy_gemini_key_name() {
        let settings = Settings::from_lookup(lookup(&[("Gemini_API_KEY", "g-key")])).unwrap();
        assert_eq!(settings.llm.api_key.as_deref(), Some("g-key"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(Settings::from_lookup(lookup(&[("ROMANIZE_STRATEGY", "magic")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("ROMANIZE_LLM_MAX_ATTEMPTS", "-1")])).is_err());
    }
}
