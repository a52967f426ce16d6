//! In-memory table of ordered rows with a shared column set.
//!
//! Rows are JSON objects keyed by header name. Construction normalizes every
//! row to the header set, so a column lookup never finds a hole.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AlignmentError, InvalidColumnError};

/// Default name of the column holding romanized names.
pub const DEFAULT_OUTPUT_COLUMN: &str = "Names_Pronounced";

/// Ordered rows sharing one ordered set of column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl Table {
    /// Build a table from loosely-shaped records.
    ///
    /// Cells missing from a record are filled with `""`; keys not present in
    /// `headers` are dropped. Non-object records become rows of empty cells.
    pub fn from_records(headers: Vec<String>, records: Vec<Value>) -> Self {
        let rows = records
            .into_iter()
            .map(|record| {
                let mut source = match record {
                    Value::Object(obj) => obj,
                    _ => Map::new(),
                };
                headers
                    .iter()
                    .map(|h| {
                        let cell = source.remove(h).unwrap_or_else(|| Value::String(String::new()));
                        (h.clone(), cell)
                    })
                    .collect()
            })
            .collect();

        Self { headers, rows }
    }

    /// Column names in order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Rows in order.
    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Select a column as an ordered list of strings.
    ///
    /// Fails fast when the column is missing, before any strategy runs.
    pub fn column(&self, name: &str) -> Result<Vec<String>, InvalidColumnError> {
        if !self.has_column(name) {
            return Err(InvalidColumnError {
                requested: name.to_string(),
                available: self.headers.clone(),
            });
        }

        Ok(self
            .rows
            .iter()
            .map(|row| row.get(name).map(cell_to_string).unwrap_or_default())
            .collect())
    }

    /// Return a copy of the table with `values` stored under `name`.
    ///
    /// An existing column keeps its header position and has its values
    /// replaced; otherwise the column is appended.
    pub fn with_column(&self, name: &str, values: Vec<String>) -> Result<Table, AlignmentError> {
        if values.len() != self.rows.len() {
            return Err(AlignmentError {
                expected: self.rows.len(),
                actual: values.len(),
            });
        }

        let mut headers = self.headers.clone();
        if !self.has_column(name) {
            headers.push(name.to_string());
        }

        let rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(row, value)| {
                let mut row = row.clone();
                row.insert(name.to_string(), Value::String(value));
                row
            })
            .collect();

        Ok(Table { headers, rows })
    }

    /// Rows as cell values in header order, coerced to strings.
    pub fn records(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows.iter().map(move |row| {
            self.headers
                .iter()
                .map(|h| row.get(h).map(cell_to_string).unwrap_or_default())
                .collect()
        })
    }
}

/// Coerce a cell to a string so malformed cells never reach a strategy as
/// anything but text.
pub fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Table {
        Table::from_records(
            vec!["Name".into(), "City".into()],
            vec![
                json!({"Name": "अमिताभ बच्चन", "City": "मुंबई"}),
                json!({"Name": 42, "City": null}),
                json!({"City": "Pune", "Extra": "dropped"}),
            ],
        )
    }

    #[test]
    fn test_rows_normalized_to_headers() {
        let table = sample();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.rows()[2]["Name"], "");
        assert!(table.rows()[2].get("Extra").is_none());
    }

    #[test]
    fn test_column_coerces_cells() {
        let names = sample().column("Name").unwrap();
        assert_eq!(names, vec!["अमिताभ बच्चन", "42", ""]);

        let cities = sample().column("City").unwrap();
        assert_eq!(cities[1], "");
    }

    #[test]
    fn test_missing_column_lists_available() {
        let err = sample().column("Surname").unwrap_err();
        assert_eq!(err.requested, "Surname");
        assert_eq!(err.available, vec!["Name", "City"]);
    }

    #[test]
    fn test_with_column_appends() {
        let table = sample();
        let augmented = table
            .with_column(DEFAULT_OUTPUT_COLUMN, vec!["a".into(), "b".into(), "c".into()])
            .unwrap();

        assert_eq!(augmented.headers(), &["Name", "City", DEFAULT_OUTPUT_COLUMN]);
        assert_eq!(augmented.row_count(), 3);
        assert_eq!(augmented.rows()[1][DEFAULT_OUTPUT_COLUMN], "b");
        // source table untouched
        assert_eq!(table.headers().len(), 2);
    }

    #[test]
    fn test_with_column_replaces_existing() {
        let augmented = sample()
            .with_column("City", vec!["x".into(), "y".into(), "z".into()])
            .unwrap();
        assert_eq!(augmented.headers(), &["Name", "City"]);
        assert_eq!(augmented.records().next().unwrap(), vec!["अमिताभ बच्चन", "x"]);
    }

    #[test]
    fn test_with_column_rejects_length_mismatch() {
        let err = sample().with_column("Out", vec!["only one".into()]).unwrap_err();
        assert_eq!(err, AlignmentError { expected: 3, actual: 1 });
    }

    #[test]
    fn test_empty_table() {
        let table = Table::from_records(vec!["Name".into()], vec![]);
        assert!(table.column("Name").unwrap().is_empty());
        let augmented = table.with_column("Out", vec![]).unwrap();
        assert_eq!(augmented.row_count(), 0);
        assert_eq!(augmented.headers(), &["Name", "Out"]);
    }
}
