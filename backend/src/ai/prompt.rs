//! Prompt construction for batch name transliteration.
//!
//! The whole column goes into one prompt. The model is told the exact count,
//! to keep order, and to answer with a bare list in the same format as the
//! worked example.

/// Worked example shown to the model.
const EXAMPLE_INPUT: [&str; 2] = ["अमिताभ बच्चन", "शाहरुख़ ख़ान"];
const EXAMPLE_OUTPUT: [&str; 2] = ["Amitabh Bachchan", "Shahrukh Khan"];

/// Format names as a JSON array using `", "` between elements.
///
/// The response parser's fallback path splits on the same separator.
pub fn format_name_list<S: AsRef<str>>(names: &[S]) -> String {
    let items: Vec<String> = names
        .iter()
        .map(|n| serde_json::Value::String(n.as_ref().to_string()).to_string())
        .collect();
    format!("[{}]", items.join(", "))
}

/// System instructions (sent as the system prompt where the provider has one).
pub fn system_prompt() -> &'static str {
    "You are an expert in transliterating personal names between writing systems. \
     You preserve pronunciation, never translate meaning, and always answer with \
     exactly the list you are asked for and nothing else."
}

/// Build the user prompt for a batch of names.
pub fn user_prompt<S: AsRef<str>>(names: &[S], source_language: &str) -> String {
    let count = names.len();
    let example_input = format_name_list(&EXAMPLE_INPUT);
    let example_output = format_name_list(&EXAMPLE_OUTPUT);
    let list = format_name_list(names);

    format!(
        r#"You are provided with a list of {count} personal names written in {source_language}. Transliterate every name into English (Latin script) so that an English reader pronounces it correctly.

## Rules

1. Return exactly {count} names, one for each input name.
2. Keep the same order as the input list.
3. Do not translate, merge, split, drop or reorder names. An empty input string stays an empty string.
4. Capitalize every word of every name.
5. Return ONLY the transliterated list as a JSON array of strings, formatted like the example output. No explanations, no markdown.

## Example

Input: {example_input}
Output: {example_output}

## Names

{list}"#
    )
}
