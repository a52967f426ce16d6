//! # Romanize - pronunciation-preserving name transliteration
//!
//! Romanize reads a CSV file, takes one column of personal names written in a
//! native script (Devanagari, Bengali, Tamil, ...) and adds a column with each
//! name in Latin script, spelled so that an English reader pronounces it
//! correctly.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌────────────────┐   ┌───────────┐   ┌────────────────────┐
//! │ CSV File │──▶│  Parser  │──▶│ Transliterator │──▶│ Alignment │──▶│ Artifact store     │
//! │ (any enc)│   │(auto-enc)│   │ (rules or LLM) │   │   check   │   │ processed_data.csv │
//! └──────────┘   └──────────┘   └────────────────┘   └───────────┘   └────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use romanize::{ArtifactStore, NamePipeline, RuleBasedTransliterator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let pipeline = NamePipeline::new(
//!         Arc::new(RuleBasedTransliterator::default()),
//!         ArtifactStore::new("static"),
//!     );
//!     let outcome = pipeline.run_bytes(&std::fs::read("names.csv").unwrap(), "Name").await.unwrap();
//!     println!("Romanized {} names", outcome.row_count);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`table`] - In-memory table
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transliterate`] - Strategy trait and the rule-based strategy
//! - [`ai`] - Batch LLM strategy
//! - [`validation`] - Alignment and schema checks
//! - [`artifact`] - Artifact storage
//! - [`pipeline`] - Orchestration
//! - [`config`] - Settings from the environment
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod table;

// Parsing
pub mod parser;

// Strategies
pub mod transliterate;
pub mod ai;

// Validation
pub mod validation;

// Storage
pub mod artifact;

// Orchestration
pub mod pipeline;
pub mod config;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AlignmentError, ArtifactError, ConfigError, CsvError, InvalidColumnError, PipelineError,
    ServerError, TransliterationError,
};

// =============================================================================
// Re-exports - Core API
// =============================================================================

pub use table::{Table, DEFAULT_OUTPUT_COLUMN};
pub use parser::{parse_bytes_auto, parse_csv_file_auto, write_csv, ParseResult};
pub use transliterate::{
    from_settings as strategy_from_settings, transliterate_one, RuleBasedTransliterator,
    SourceScript, TargetScheme, Transliterator,
};
pub use ai::{LlmProvider, LlmTransliterator};
pub use validation::validate_alignment;
pub use artifact::{ArtifactReceipt, ArtifactStore};
pub use pipeline::{NamePipeline, PipelineOutcome};
pub use config::{Settings, StrategyKind};
pub use api::start_server;
