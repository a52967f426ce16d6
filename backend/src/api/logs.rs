//! Run progress, tagged by pipeline stage.
//!
//! Every entry names the [`Stage`] it came from, so a client following
//! `GET /api/logs` can tell where a run stopped without parsing messages.
//! Entries are echoed to stderr as `HH:MM:SS [stage] message`.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::PipelineError;

/// Entries kept for subscribers that fall behind.
const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Where in a run an entry was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Multipart request handling
    Upload,
    /// CSV decoding
    Parse,
    /// Name column lookup
    Select,
    /// Strategy call, including LLM requests and retries
    Transliterate,
    /// Alignment gate
    Validate,
    /// Artifact write
    Store,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Upload => "upload",
            Stage::Parse => "parse",
            Stage::Select => "select",
            Stage::Transliterate => "transliterate",
            Stage::Validate => "validate",
            Stage::Store => "store",
        }
    }
}

impl From<&PipelineError> for Stage {
    /// Stage that raised the error.
    fn from(error: &PipelineError) -> Self {
        match error {
            PipelineError::Csv(_) => Stage::Parse,
            PipelineError::InvalidColumn(_) => Stage::Select,
            PipelineError::Upstream(_) => Stage::Transliterate,
            PipelineError::Alignment(_) => Stage::Validate,
            PipelineError::Artifact(_) => Stage::Store,
        }
    }
}

/// One progress line of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub stage: Stage,
    pub message: String,
    /// Nesting depth for display
    #[serde(default)]
    pub indent: u8,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(level: LogLevel, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            level,
            stage,
            message: message.into(),
            indent: 0,
            timestamp: Utc::now(),
        }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Terminal rendering.
    fn render(&self) -> String {
        let marker = match self.level {
            LogLevel::Info => " ",
            LogLevel::Success => "✓",
            LogLevel::Warning => "⚠️",
            LogLevel::Error => "❌",
        };
        format!(
            "{} [{:<13}] {}{} {}",
            self.timestamp.format("%H:%M:%S"),
            self.stage.as_str(),
            "  ".repeat(self.indent as usize),
            marker,
            self.message
        )
    }
}

/// Process-wide broadcaster used by the pipeline and the SSE endpoint.
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Echo the entry to stderr and hand it to subscribers.
    pub fn log(&self, entry: LogEntry) {
        eprintln!("{}", entry.render());
        // no subscribers outside `serve`
        let _ = self.sender.send(entry);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log_info(stage: Stage, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Info, stage, msg));
}

pub fn log_success(stage: Stage, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Success, stage, msg));
}

pub fn log_warning(stage: Stage, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Warning, stage, msg));
}

pub fn log_error(stage: Stage, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Error, stage, msg));
}

/// Indented detail line, e.g. a single LLM request within a batch.
pub fn log_detail(stage: Stage, level: LogLevel, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(level, stage, msg).with_indent(1));
}

/// Log a failed run under the stage that raised `error`.
pub fn log_failure(error: &PipelineError) {
    log_error(
        Stage::from(error),
        format!("Run failed ({}): {}", error.kind(), error),
    );
}
