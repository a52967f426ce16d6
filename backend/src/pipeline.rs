//! Name romanization pipeline.
//!
//! One run goes through these stages:
//!
//! 1. Select the name column (unknown column: no strategy call, no write)
//! 2. Transliterate the whole column with the configured strategy
//! 3. Check that the output has exactly one name per row
//! 4. Add the output column to the table
//! 5. Serialize and store the artifact
//!
//! A failure at any stage ends the run and leaves the previous artifact in place.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use romanize::{ArtifactStore, NamePipeline, RuleBasedTransliterator};
//!
//! let pipeline = NamePipeline::new(
//!     Arc::new(RuleBasedTransliterator::default()),
//!     ArtifactStore::new("static"),
//! );
//! let outcome = pipeline.run_bytes(&csv_bytes, "Name").await?;
//! println!("run {}", outcome.receipt.run_id);
//! ```

use std::sync::Arc;

use serde::Serialize;

use crate::api::logs::{log_error, log_failure, log_info, log_success, Stage};
use crate::artifact::{ArtifactReceipt, ArtifactStore};
use crate::error::{PipelineError, PipelineResult};
use crate::parser::{parse_bytes_auto, write_csv};
use crate::table::{Table, DEFAULT_OUTPUT_COLUMN};
use crate::transliterate::Transliterator;
use crate::validation::validate_alignment;

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutcome {
    /// Input table plus the output column.
    pub table: Table,
    pub receipt: ArtifactReceipt,
    /// Name of the strategy that produced the column.
    pub strategy: &'static str,
    pub row_count: usize,
}

/// Runs the stages against one strategy and one artifact store.
pub struct NamePipeline {
    transliterator: Arc<dyn Transliterator>,
    store: ArtifactStore,
    output_column: String,
}

impl NamePipeline {
    pub fn new(transliterator: Arc<dyn Transliterator>, store: ArtifactStore) -> Self {
        Self {
            transliterator,
            store,
            output_column: DEFAULT_OUTPUT_COLUMN.to_string(),
        }
    }

    /// Name the added column (default `Names_Pronounced`).
    pub fn with_output_column(mut self, name: impl Into<String>) -> Self {
        self.output_column = name.into();
        self
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn strategy_name(&self) -> &'static str {
        self.transliterator.name()
    }

    pub fn output_column(&self) -> &str {
        &self.output_column
    }

    /// Parse raw CSV bytes, then [`run`](Self::run).
    pub async fn run_bytes(&self, bytes: &[u8], column: &str) -> PipelineResult<PipelineOutcome> {
        log_info(Stage::Parse, "Reading CSV...");
        let parsed = parse_bytes_auto(bytes).map_err(|e| {
            log_error(Stage::Parse, e.to_string());
            PipelineError::from(e)
        })?;
        log_success(
            Stage::Parse,
            format!(
                "Read {} rows ({}, separator '{}')",
                parsed.table.row_count(),
                parsed.encoding,
                format_delimiter(parsed.delimiter)
            ),
        );
        self.run(&parsed.table, column).await
    }

    /// Romanize `column` of `table` and store the augmented table.
    pub async fn run(&self, table: &Table, column: &str) -> PipelineResult<PipelineOutcome> {
        let result = self.run_stages(table, column).await;
        if let Err(e) = &result {
            log_failure(e);
        }
        result
    }

    async fn run_stages(&self, table: &Table, column: &str) -> PipelineResult<PipelineOutcome> {
        let names = table.column(column)?;
        log_info(
            Stage::Transliterate,
            format!(
                "Transliterating {} names from '{}' with {}",
                names.len(),
                column,
                self.strategy_name()
            ),
        );

        let result = self.transliterator.transliterate_batch(&names).await?;
        let result = validate_alignment(names.len(), result)?;
        log_success(Stage::Validate, format!("{} names aligned", result.len()));

        let augmented = table.with_column(&self.output_column, result)?;
        let bytes = write_csv(&augmented)?;
        let receipt = self.store.write_async(bytes).await?;
        log_success(
            Stage::Store,
            format!(
                "Saved {} ({} bytes, run {})",
                receipt.path.display(),
                receipt.bytes,
                short_id(&receipt.run_id)
            ),
        );

        Ok(PipelineOutcome {
            row_count: augmented.row_count(),
            table: augmented,
            receipt,
            strategy: self.strategy_name(),
        })
    }
}

fn format_delimiter(delimiter: char) -> String {
    match delimiter {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn short_id(run_id: &str) -> &str {
    run_id.get(..12).unwrap_or(run_id)
}
