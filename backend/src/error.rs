//! Error types for the romanization pipeline.
//!
//! Each stage owns its error type:
//!
//! - [`CsvError`] - CSV decoding and serialization errors
//! - [`InvalidColumnError`] - requested column absent from the table
//! - [`TransliterationError`] - a strategy failed to produce output
//! - [`AlignmentError`] - output length differs from input length
//! - [`ArtifactError`] - artifact storage and retrieval errors
//! - [`ConfigError`] - invalid settings
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Conversions into [`PipelineError`] are provided via `From`, so `?` works
//! across stage boundaries.

use thiserror::Error;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while decoding or encoding CSV data.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Bytes could not be decoded with the detected encoding.
    #[error("Failed to decode content as {0}")]
    EncodingError(String),

    /// A record could not be read.
    #[error("Invalid CSV at line {line}: {message}")]
    ParseError { line: u64, message: String },

    /// Failed to serialize the table.
    #[error("Failed to write CSV: {0}")]
    WriteError(String),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Column Selection
// =============================================================================

/// The requested column is not part of the table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid column name '{requested}' (available: {})", available.join(", "))]
pub struct InvalidColumnError {
    /// Column name supplied by the caller.
    pub requested: String,
    /// Columns present in the table, in header order.
    pub available: Vec<String>,
}

// =============================================================================
// Transliteration Errors
// =============================================================================

/// Failures raised by a transliteration strategy itself.
#[derive(Debug, Error)]
pub enum TransliterationError {
    /// Missing API key.
    #[error("Missing API key: {0}")]
    MissingApiKey(String),

    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// Provider answered with an error status.
    #[error("API error: {0}")]
    ApiError(String),

    /// Provider envelope was not the JSON we expected.
    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    /// Provider returned no usable text.
    #[error("Empty response from model")]
    EmptyResponse,

    /// Text could not be read as a list of names.
    #[error("Unparseable model response: {0}")]
    UnparseableResponse(String),
}

// =============================================================================
// Alignment
// =============================================================================

/// Output sequence length does not match the input row count.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Alignment mismatch: expected {expected} names, got {actual}")]
pub struct AlignmentError {
    /// Number of input rows.
    pub expected: usize,
    /// Number of names produced by the strategy.
    pub actual: usize,
}

// =============================================================================
// Artifact Errors
// =============================================================================

/// Errors from the artifact store.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// No artifact has been written yet (or the run id is unknown).
    #[error("Artifact not found: {0}")]
    NotFound(String),

    /// Run identifier is not a SHA-256 hex digest.
    #[error("Invalid run id: {0}")]
    InvalidRunId(String),

    /// IO error.
    #[error("Artifact IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Configuration
// =============================================================================

/// Invalid or missing settings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Unknown value for an enumerated setting.
    #[error("Invalid value '{value}' for {key} (expected one of: {expected})")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    /// Required setting missing.
    #[error("Missing setting: {0}")]
    Missing(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// Every variant is terminal for the current run; the artifact is only
/// written after all stages succeed.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV parsing or serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Requested column is absent.
    #[error(transparent)]
    InvalidColumn(#[from] InvalidColumnError),

    /// Strategy failure.
    #[error("Upstream transliteration error: {0}")]
    Upstream(#[from] TransliterationError),

    /// Output length mismatch.
    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    /// Artifact storage error.
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

impl PipelineError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Csv(_) => "csv_error",
            PipelineError::InvalidColumn(_) => "invalid_column",
            PipelineError::Upstream(_) => "upstream_transliteration_error",
            PipelineError::Alignment(_) => "alignment_error",
            PipelineError::Artifact(ArtifactError::NotFound(_)) => "artifact_not_found",
            PipelineError::Artifact(_) => "artifact_error",
        }
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Artifact retrieval error.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Failed to bind or serve.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for transliteration strategies.
pub type TransliterationResult<T> = Result<T, TransliterationError>;

/// Result type for artifact operations.
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
