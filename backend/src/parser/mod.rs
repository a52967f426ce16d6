//! CSV codec with encoding and delimiter auto-detection.
//!
//! Reads uploaded bytes into a [`Table`] and serializes tables back to CSV.
//! No transliteration logic here.

use std::path::Path;

use serde_json::Value;

use crate::error::{CsvError, CsvResult};
use crate::table::Table;

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed table
    pub table: Table,
    /// Detected encoding
    pub encoding: String,
    /// Detected delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        "utf-16le" | "utf-16be" => charset.to_lowercase(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Bytes that are valid UTF-8 are decoded as UTF-8 whatever `encoding` says.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Ok(s.trim_start_matches('\u{feff}').to_string());
    }

    let codec = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15,
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252,
        "utf-16le" => encoding_rs::UTF_16LE,
        "utf-16be" => encoding_rs::UTF_16BE,
        _ => return Ok(String::from_utf8_lossy(bytes).to_string()),
    };

    let (decoded, _, had_errors) = codec.decode(bytes);
    if had_errors {
        return Err(CsvError::EncodingError(encoding.to_string()));
    }
    Ok(decoded.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text with an explicit delimiter.
///
/// Blank lines are skipped; short records are padded with empty cells by
/// [`Table::from_records`], extra trailing fields are ignored.
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<Table> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CsvError::ParseError { line: 1, message: e.to_string() })?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| CsvError::ParseError {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        })?;

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let obj: serde_json::Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, field)| (h.clone(), Value::String(field.to_string())))
            .collect();
        records.push(Value::Object(obj));
    }

    Ok(Table::from_records(headers, records))
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    let table = parse_str(&content, delimiter)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

/// Serialize a table as comma-separated UTF-8, header row first.
pub fn write_csv(table: &Table) -> CsvResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(table.headers())
        .map_err(|e| CsvError::WriteError(e.to_string()))?;

    for record in table.records() {
        writer
            .write_record(&record)
            .map_err(|e| CsvError::WriteError(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| CsvError::WriteError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let table = parse_str("name;age\nAlice;30\nBob;25", ';').unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0]["name"], "Alice");
        assert_eq!(table.rows()[1]["age"], "25");
    }

    #[test]
    fn test_quoted_field_keeps_delimiter() {
        let csv = "Name,City\n\"Khan, Shahrukh\",Mumbai\n";
        let table = parse_str(csv, ',').unwrap();

        assert_eq!(table.column("Name").unwrap(), vec!["Khan, Shahrukh"]);
    }

    #[test]
    fn test_empty_lines_skipped() {
        let table = parse_str("a,b\n1,2\n\n3,4\n", ',').unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_missing_values() {
        let table = parse_str("a,b,c\n1,,3\n4", ',').unwrap();

        assert_eq!(table.rows()[0]["b"], "");
        assert_eq!(table.rows()[1]["c"], "");
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_str("", ','), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_bytes_auto(b""), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_header_only_is_empty_table() {
        let table = parse_str("Name\n", ',').unwrap();
        assert_eq!(table.headers(), &["Name"]);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("a|b|c"), '|');
        assert_eq!(detect_delimiter("Name"), ',');
    }

    #[test]
    fn test_auto_parse_devanagari_utf8() {
        let csv = "\u{feff}Name,Age\nअमिताभ बच्चन,81\nशाहरुख़ ख़ान,58\n";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.delimiter, ',');
        assert_eq!(result.table.headers(), &["Name", "Age"]);
        assert_eq!(result.table.column("Name").unwrap()[1], "शाहरुख़ ख़ान");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_write_csv_quotes_and_order() {
        let table = parse_str("Name,Note\n\"Khan, S\",x\nअमिताभ,y\n", ',').unwrap();
        let bytes = write_csv(&table).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(text, "Name,Note\n\"Khan, S\",x\nअमिताभ,y\n");
    }
}
