//! REST API response types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::pipeline::PipelineOutcome;

/// Response sent after a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    /// Latest artifact. Kept snake_case for existing upload clients.
    #[serde(rename = "download_url")]
    pub download_url: String,
    /// Artifact of this run
    pub run_url: String,
    pub run_id: String,
    pub row_count: usize,
    /// Name column that was transliterated
    pub column: String,
    /// Column added to the table
    pub output_column: String,
    pub strategy: String,
}

impl UploadResponse {
    pub fn from_outcome(outcome: &PipelineOutcome, column: &str, output_column: &str) -> Self {
        let run_id = outcome.receipt.run_id.clone();
        Self {
            message: "File processed successfully".to_string(),
            download_url: "/download".to_string(),
            run_url: format!("/download/{run_id}"),
            run_id,
            row_count: outcome.row_count,
            column: column.to_string(),
            output_column: output_column.to_string(),
            strategy: outcome.strategy.to_string(),
        }
    }
}

/// Create an error body: `{"status": "error", "kind": ..., "error": ...}`.
///
/// `details` is merged in when it is a JSON object.
pub fn error_response(kind: &str, error: &str, details: Option<Value>) -> Value {
    let mut body = json!({
        "status": "error",
        "kind": kind,
        "error": error,
    });
    if let (Some(Value::Object(extra)), Some(map)) = (details, body.as_object_mut()) {
        map.extend(extra);
    }
    body
}
