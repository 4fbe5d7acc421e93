//! Minimal Atlassian Document Format writer.
//!
//! Only emits paragraphs of plain text. Reading ADF is deliberately not
//! supported.

use serde_json::{json, Value};

/// Wrap `text` in an ADF document, one paragraph per non-empty line.
pub fn document(text: &str) -> Value {
    let content: Vec<Value> = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(paragraph)
        .collect();
    json!({ "type": "doc", "version": 1, "content": content })
}

fn paragraph(text: &str) -> Value {
    json!({
        "type": "paragraph",
        "content": [{ "type": "text", "text": text }],
    })
}
