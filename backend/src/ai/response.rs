//! Extract an ordered list of names from a model completion.
//!
//! Structured output (a JSON array of strings) is tried first. Anything else
//! goes through a list-literal reader: locate the list, split on the `", "`
//! separator taught by the prompt (commas inside quoted names are kept), then
//! strip quotes and whitespace from each element.
//!
//! Length is not checked here.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{TransliterationError, TransliterationResult};
use crate::validation::validate_name_list;

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?(.*?)```").expect("code fence pattern")
});

/// Parse a completion into names.
pub fn parse_name_list(response: &str) -> TransliterationResult<Vec<String>> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(TransliterationError::EmptyResponse);
    }

    let body = strip_code_fence(trimmed);

    if let Some(names) = parse_json_list(body) {
        return Ok(names);
    }

    parse_list_literal(body)
}

/// Return the content of the first markdown code block, or the input.
fn strip_code_fence(text: &str) -> &str {
    CODE_FENCE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(text)
}

fn parse_json_list(text: &str) -> Option<Vec<String>> {
    let value: Value = serde_json::from_str(text).ok()?;
    validate_name_list(&value).ok()?;

    let names = value
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(|s| s.trim().to_string())
        .collect();
    Some(names)
}

/// Read a bracketed, comma-space separated list literal.
///
/// A quoted list starts at the first `[` whose next non-blank character is a
/// quote and ends at the first `]` after a closed item, so bracketed prose
/// around it is ignored. An unquoted list must be the only bracketed group in
/// the text. Items that still contain `[` or `]` are rejected.
pub fn parse_list_literal(text: &str) -> TransliterationResult<Vec<String>> {
    let chars: Vec<char> = text.chars().collect();

    let items = match quoted_list_start(&chars) {
        Some(start) => read_quoted_list(&chars, start + 1),
        None => read_bare_list(&chars),
    };

    match items {
        Some(items) if !items.iter().any(|item| item.contains(['[', ']'])) => {
            Ok(items.iter().map(|item| clean_item(item)).collect())
        }
        _ => Err(TransliterationError::UnparseableResponse(preview(text))),
    }
}

fn quoted_list_start(chars: &[char]) -> Option<usize> {
    (0..chars.len()).find(|&i| {
        chars[i] == '[' && chars.get(skip_blank(chars, i + 1)).is_some_and(|&c| is_quote(c))
    })
}

/// Items of a quoted list, `i` pointing just past its `[`. `None` when the
/// list is never closed.
fn read_quoted_list(chars: &[char], mut i: usize) -> Option<Vec<String>> {
    let mut items = Vec::new();

    loop {
        i = skip_blank(chars, i);
        let c = *chars.get(i)?;
        if c == ']' {
            return Some(items);
        }

        if is_quote(c) {
            let close = closing_quote(c);
            i += 1;
            let mut item = String::new();
            loop {
                let c = *chars.get(i)?;
                if c == '\\' {
                    if let Some(&escaped) = chars.get(i + 1) {
                        item.push(escaped);
                        i += 2;
                        continue;
                    }
                }
                if c == close && ends_item(chars, i + 1) {
                    i += 1;
                    break;
                }
                item.push(c);
                i += 1;
            }
            items.push(item);
        } else {
            let start = i;
            while i < chars.len() && chars[i] != ',' && chars[i] != ']' {
                i += 1;
            }
            items.push(chars[start..i].iter().collect());
        }

        i = skip_blank(chars, i);
        match chars.get(i)? {
            ',' => i += 1,
            ']' => return Some(items),
            _ => return None,
        }
    }
}

fn read_bare_list(chars: &[char]) -> Option<Vec<String>> {
    let start = chars.iter().position(|&c| c == '[')?;
    let end = start + 1 + chars[start + 1..].iter().position(|&c| c == ']')?;
    if chars[end + 1..].contains(&'[') {
        return None;
    }

    let inner: String = chars[start + 1..end].iter().collect();
    let inner = inner.trim();
    if inner.is_empty() {
        return Some(Vec::new());
    }
    Some(inner.split(", ").map(str::to_string).collect())
}

fn is_quote(c: char) -> bool {
    matches!(c, '\'' | '"' | '‘' | '’' | '“' | '”')
}

fn closing_quote(open: char) -> char {
    match open {
        '‘' => '’',
        '“' => '”',
        other => other,
    }
}

fn clean_item(item: &str) -> String {
    item.trim().trim_matches(is_quote).trim().to_string()
}

/// A closing quote only ends an item when a separator or the end of the
/// list follows, so apostrophes inside names survive.
fn ends_item(chars: &[char], i: usize) -> bool {
    matches!(chars.get(skip_blank(chars, i)), None | Some(',') | Some(']'))
}

fn skip_blank(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    i
}

fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}
