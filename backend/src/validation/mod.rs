//! Output validation.
//!
//! - [`validate_alignment`] - the single gate every strategy's output passes
//!   through before it touches the table. Lengths must match exactly; there is
//!   no truncation or padding.
//! - [`validate_name_list`] - JSON Schema check for structured model output
//!   (an array of strings).
//!
//! # Example
//!
//! ```rust,ignore
//! use romanize::validation::validate_alignment;
//!
//! let names = vec!["Ram".to_string(), "Sita".to_string()];
//! assert!(validate_alignment(2, names.clone()).is_ok());
//! assert!(validate_alignment(3, names).is_err());
//! ```

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::error::AlignmentError;

/// Schema of a structured transliteration answer.
static NAME_LIST_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "array",
        "items": { "type": "string" }
    })
});

/// Accept `result` only if it has exactly `request_len` elements.
pub fn validate_alignment(request_len: usize, result: Vec<String>) -> Result<Vec<String>, AlignmentError> {
    if result.len() != request_len {
        return Err(AlignmentError {
            expected: request_len,
            actual: result.len(),
        });
    }
    Ok(result)
}

/// Validate a JSON value against a JSON schema.
///
/// Returns every validation error message on failure.
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check that `data` is an array of strings.
pub fn validate_name_list(data: &Value) -> Result<(), Vec<String>> {
    validate(&NAME_LIST_SCHEMA, data)
}
