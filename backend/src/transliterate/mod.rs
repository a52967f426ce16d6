//! Transliteration strategies.
//!
//! A [`Transliterator`] turns an ordered list of native-script names into an
//! ordered list of romanized names. Two implementations exist:
//!
//! - [`RuleBasedTransliterator`] - deterministic script mapping, no I/O
//! - [`crate::ai::LlmTransliterator`] - one batched language-model request
//!
//! The pipeline holds an `Arc<dyn Transliterator>` chosen once from
//! [`Settings`]; it never inspects which variant it was given. Output length
//! is checked by [`crate::validation::validate_alignment`], not here.

pub mod rules;
pub mod scripts;

use std::sync::Arc;

use async_trait::async_trait;

use crate::ai::LlmTransliterator;
use crate::config::{Settings, StrategyKind};
use crate::error::{ConfigError, TransliterationResult};

pub use rules::{title_case, transliterate_one, RuleBasedTransliterator};
pub use scripts::{SourceScript, TargetScheme};

/// Interchangeable name transliteration algorithm.
#[async_trait]
pub trait Transliterator: Send + Sync {
    /// Short identifier reported in responses and logs.
    fn name(&self) -> &'static str;

    /// Transliterate every name, in order.
    async fn transliterate_batch(&self, names: &[String]) -> TransliterationResult<Vec<String>>;
}

/// Build the strategy selected by `settings`.
pub fn from_settings(settings: &Settings) -> Result<Arc<dyn Transliterator>, ConfigError> {
    let strategy: Arc<dyn Transliterator> = match settings.strategy {
        StrategyKind::Rule => Arc::new(RuleBasedTransliterator::new(
            settings.source_script,
            settings.target_scheme,
        )),
        StrategyKind::Llm => Arc::new(LlmTransliterator::from_settings(settings)?),
    };
    Ok(strategy)
}
