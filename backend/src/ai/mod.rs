//! Batch transliteration through a hosted language model.
//!
//! The whole column is sent in one request. Two providers are supported:
//! Google Gemini (`generateContent`, with a JSON array response schema) and
//! Anthropic (`messages`). The completion text is read back by
//! [`response::parse_name_list`]; its length is checked later by the pipeline.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use romanize::ai::{LlmProvider, LlmTransliterator};
//! use romanize::Transliterator;
//!
//! let llm = LlmTransliterator::new(LlmProvider::Gemini, api_key)
//!     .with_max_attempts(3);
//! let names = llm.transliterate_batch(&["राम".to_string()]).await?;
//! ```

pub mod prompt;
pub mod response;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::logs::{log_detail, log_warning, LogLevel, Stage};
use crate::config::Settings;
use crate::error::{ConfigError, TransliterationError, TransliterationResult};
use crate::transliterate::Transliterator;

pub use prompt::{system_prompt, user_prompt};
pub use response::parse_name_list;

/// Delay between retries in milliseconds
const RETRY_DELAY_MS: u64 = 1000;

/// Default completion budget. Long columns need room for every name.
const DEFAULT_MAX_TOKENS: u32 = 4096;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Hosted model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
    Anthropic,
}

impl LlmProvider {
    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini-2.0-flash",
            LlmProvider::Anthropic => "claude-sonnet-4-20250514",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com",
            LlmProvider::Anthropic => "https://api.anthropic.com",
        }
    }

    /// Environment variable holding the provider's API key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LlmProvider::Gemini => "gemini",
            LlmProvider::Anthropic => "anthropic",
        })
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "anthropic" | "claude" => Ok(LlmProvider::Anthropic),
            _ => Err(ConfigError::InvalidValue {
                key: "llm provider",
                value: s.to_string(),
                expected: "gemini, anthropic",
            }),
        }
    }
}

/// Batch LLM transliteration strategy.
#[derive(Clone)]
pub struct LlmTransliterator {
    http: reqwest::Client,
    provider: LlmProvider,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    max_attempts: u32,
    retry_delay: Duration,
    timeout: Option<Duration>,
    source_language: String,
}

impl fmt::Debug for LlmTransliterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmTransliterator")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

// Gemini envelopes

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

// Anthropic envelopes

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

/// Error body shared by both providers: `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl LlmTransliterator {
    /// Create a client with the provider's default model and endpoint.
    pub fn new(provider: LlmProvider, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            provider,
            api_key: api_key.into(),
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            max_attempts: 1,
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
            timeout: None,
            source_language: "Hindi".to_string(),
        }
    }

    /// Create a client from settings. Fails when no API key is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let llm = &settings.llm;
        let api_key = llm
            .api_key
            .clone()
            .ok_or_else(|| ConfigError::Missing(llm.provider.api_key_var().to_string()))?;

        let mut client = Self::new(llm.provider, api_key)
            .with_max_attempts(llm.max_attempts)
            .with_source_language(settings.source_language());
        if let Some(model) = &llm.model {
            client = client.with_model(model);
        }
        if let Some(base_url) = &llm.base_url {
            client = client.with_base_url(base_url);
        }
        if let Some(secs) = llm.timeout_secs {
            client = client.with_timeout(Duration::from_secs(secs));
        }
        if let Some(max_tokens) = llm.max_tokens {
            client = client.with_max_tokens(max_tokens);
        }
        Ok(client)
    }

    /// Set the model to use
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Point the client at another API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Completion token limit. A truncated completion fails to parse or to align.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Total attempts per batch. Values below 1 are treated as 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Per-request timeout. No timeout by default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Language named in the prompt.
    pub fn with_source_language(mut self, language: impl Into<String>) -> Self {
        self.source_language = language.into();
        self
    }

    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Single attempt: one request, one parse.
    async fn try_transliterate(&self, names: &[String]) -> TransliterationResult<Vec<String>> {
        let prompt = prompt::user_prompt(names, &self.source_language);
        let text = match self.provider {
            LlmProvider::Gemini => self.call_gemini(&prompt).await?,
            LlmProvider::Anthropic => self.call_anthropic(&prompt).await?,
        };
        log_detail(
            Stage::Transliterate,
            LogLevel::Success,
            format!("Received {} bytes", text.len()),
        );
        response::parse_name_list(&text)
    }

    async fn call_gemini(&self, prompt: &str) -> TransliterationResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let request_body = json!({
            "systemInstruction": { "parts": [{ "text": prompt::system_prompt() }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0,
                "maxOutputTokens": self.max_tokens,
                "responseMimeType": "application/json",
                "responseSchema": { "type": "ARRAY", "items": { "type": "STRING" } }
            }
        });

        let request = self
            .http
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body);
        let body = self.send(request).await?;

        let response: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| TransliterationError::InvalidJson(e.to_string()))?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(TransliterationError::EmptyResponse);
        }
        Ok(text)
    }

    async fn call_anthropic(&self, prompt: &str) -> TransliterationResult<String> {
        let request_body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": 0,
            "system": prompt::system_prompt(),
            "messages": [{ "role": "user", "content": prompt }]
        });

        let request = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body);
        let body = self.send(request).await?;

        let response: AnthropicResponse = serde_json::from_str(&body)
            .map_err(|e| TransliterationError::InvalidJson(e.to_string()))?;

        let text = response
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(TransliterationError::EmptyResponse);
        }
        Ok(text)
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: reqwest::RequestBuilder) -> TransliterationResult<String> {
        log_detail(
            Stage::Transliterate,
            LogLevel::Info,
            format!("Calling {} ({})", self.provider, self.model),
        );

        let request = match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };
        let response = request
            .send()
            .await
            .map_err(|e| TransliterationError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransliterationError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<ApiErrorEnvelope>(&body) {
                return Err(TransliterationError::ApiError(error.error.message));
            }
            return Err(TransliterationError::ApiError(format!("HTTP {}: {}", status, body)));
        }

        Ok(body)
    }
}

#[async_trait]
impl Transliterator for LlmTransliterator {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn transliterate_batch(&self, names: &[String]) -> TransliterationResult<Vec<String>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            match self.try_transliterate(names).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    log_warning(
                        Stage::Transliterate,
                        format!("Attempt {}/{} failed: {}", attempt, self.max_attempts, e),
                    );
                    last_error = Some(e);

                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| TransliterationError::ApiError("Unknown error".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LlmSettings, StrategyKind};

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Gemini".parse::<LlmProvider>().unwrap(), LlmProvider::Gemini);
        assert_eq!("claude".parse::<LlmProvider>().unwrap(), LlmProvider::Anthropic);
        assert!("openai".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn test_from_settings_applies_overrides() {
        let settings = Settings {
            strategy: StrategyKind::Llm,
            llm: LlmSettings {
                provider: LlmProvider::Anthropic,
                api_key: Some("key".into()),
                model: Some("claude-test".into()),
                base_url: Some("http://localhost:9999/".into()),
                max_attempts: 0,
                timeout_secs: Some(5),
                max_tokens: Some(1024),
                source_language: None,
            },
            ..Settings::default()
        };

        let client = LlmTransliterator::from_settings(&settings).unwrap();
        assert_eq!(client.provider(), LlmProvider::Anthropic);
        assert_eq!(client.model(), "claude-test");
        assert_eq!(client.base_url, "http://localhost:9999");
        assert_eq!(client.max_attempts, 1);
        assert_eq!(client.timeout, Some(Duration::from_secs(5)));
        assert_eq!(client.max_tokens, 1024);
        assert_eq!(client.source_language, "Hindi");
    }

    #[test]
    fn test_missing_key_names_variable() {
        let err = LlmTransliterator::from_settings(&Settings::default()).unwrap_err();
        assert_eq!(err, ConfigError::Missing("GEMINI_API_KEY".into()));
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        // unroutable base url: any request would fail
        let client = LlmTransliterator::new(LlmProvider::Gemini, "key")
            .with_base_url("http://127.0.0.1:1");
        assert!(client.transliterate_batch(&[]).await.unwrap().is_empty());
    }
}
