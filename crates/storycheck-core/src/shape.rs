//! Shape dispatch for a located criteria value.
//!
//! The criteria field arrives in one of a handful of shapes. Classification
//! looks only at the first byte of the located value, which is safe because
//! the locator has already anchored the match to the field's key:
//!
//! | value starts with | shape                 | raw blocks               |
//! |-------------------|-----------------------|--------------------------|
//! | `[`               | `StringArray`         | one per string element   |
//! | `"`               | `PlainString`         | exactly one              |
//! | `{`               | `RichText`            | the fixed sentinel       |
//! | anything else     | `Unrecognized`        | none                     |
//! | (not located)     | `Absent`              | none                     |

use serde::Serialize;

use crate::locator::{balanced_end, string_end};

/// Line produced for a rich-text (object) value, which is not parsed.
pub const RICH_TEXT_SENTINEL: &str = "Acceptance Criteria present (rich/ADF) — review in story.";

/// Classified criteria value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldShape {
    /// Field not present in the document
    Absent,
    /// `[...]`, holding the decoded string elements in document order
    StringArray(Vec<String>),
    /// A single decoded string
    PlainString(String),
    /// `{...}`, a structured rich-text document
    RichText,
    /// `null`, a number, a boolean, or a malformed value
    Unrecognized,
}

/// Shape label without payload, for logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Absent,
    StringArray,
    PlainString,
    RichText,
    Unrecognized,
}

impl ShapeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Absent => "absent",
            ShapeKind::StringArray => "string_array",
            ShapeKind::PlainString => "plain_string",
            ShapeKind::RichText => "rich_text",
            ShapeKind::Unrecognized => "unrecognized",
        }
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FieldShape {
    /// Classify a located, still-serialized value (or its absence).
    pub fn classify(raw: Option<&str>) -> Self {
        let Some(text) = raw else {
            return FieldShape::Absent;
        };
        match text.as_bytes().first() {
            Some(b'[') => FieldShape::StringArray(array_strings(text)),
            Some(b'"') => match string_end(text.as_bytes(), 0) {
                Some(end) => FieldShape::PlainString(decode_string_literal(&text[..end])),
                None => FieldShape::Unrecognized,
            },
            Some(b'{') => FieldShape::RichText,
            _ => FieldShape::Unrecognized,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            FieldShape::Absent => ShapeKind::Absent,
            FieldShape::StringArray(_) => ShapeKind::StringArray,
            FieldShape::PlainString(_) => ShapeKind::PlainString,
            FieldShape::RichText => ShapeKind::RichText,
            FieldShape::Unrecognized => ShapeKind::Unrecognized,
        }
    }

    /// Raw text blocks to feed the line normalizer.
    pub fn into_blocks(self) -> Vec<String> {
        match self {
            FieldShape::StringArray(items) => items,
            FieldShape::PlainString(text) => vec![text],
            FieldShape::RichText => vec![RICH_TEXT_SENTINEL.to_string()],
            FieldShape::Absent | FieldShape::Unrecognized => Vec::new(),
        }
    }
}

/// Decoded string elements sitting directly inside the outer array.
///
/// Strings nested deeper (inside objects or inner arrays) are skipped, as
/// are non-string elements.
fn array_strings(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let limit = balanced_end(bytes, 0).unwrap_or(bytes.len());
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < limit {
        match bytes[i] {
            b'"' => {
                let Some(end) = string_end(bytes, i) else {
                    break;
                };
                if depth == 1 {
                    items.push(decode_string_literal(&text[i..end]));
                }
                i = end;
                continue;
            }
            b'[' | b'{' => depth += 1,
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
    items
}

/// Decode a quoted JSON string literal, quotes included.
///
/// Standard JSON decoding is tried first. Literals that strict JSON rejects
/// (raw control characters, unknown escapes) fall back to a lenient decoder
/// that resolves the common escapes and keeps anything else verbatim.
pub fn decode_string_literal(literal: &str) -> String {
    serde_json::from_str::<String>(literal).unwrap_or_else(|_| {
        let inner = literal
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(literal);
        unescape_lenient(inner)
    })
}

fn unescape_lenient(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('u') => {
                let hex: String = (0..4).filter_map(|_| chars.next_if(char::is_ascii_hexdigit)).collect();
                match u32::from_str_radix(&hex, 16).ok().filter(|_| hex.len() == 4).and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::locate_field;

    fn shape_of(doc: &str) -> FieldShape {
        FieldShape::classify(locate_field(doc, "ac").map(|v| v.as_str()))
    }

    #[test]
    fn test_array_of_strings() {
        let shape = shape_of(r#"{"ac":["Given X, When Y, Then Z", "- Another line"]}"#);
        assert_eq!(
            shape,
            FieldShape::StringArray(vec![
                "Given X, When Y, Then Z".to_string(),
                "- Another line".to_string()
            ])
        );
    }

    #[test]
    fn test_array_skips_nested_and_non_string_elements() {
        let shape = shape_of(r#"{"ac":["a", 3, null, {"k":"nested"}, ["inner"], "b"]}"#);
        assert_eq!(
            shape,
            FieldShape::StringArray(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_empty_array_has_no_blocks() {
        let shape = shape_of(r#"{"ac":[]}"#);
        assert_eq!(shape.kind(), ShapeKind::StringArray);
        assert!(shape.into_blocks().is_empty());
    }

    #[test]
    fn test_plain_string_is_unescaped() {
        let shape = shape_of(r#"{"ac":"Line1\n- Line2 \"q\" \\ end"}"#);
        assert_eq!(
            shape,
            FieldShape::PlainString("Line1\n- Line2 \"q\" \\ end".to_string())
        );
    }

    #[test]
    fn test_object_yields_sentinel() {
        let shape = shape_of(r#"{"ac":{"type":"doc","version":1,"content":[]}}"#);
        assert_eq!(shape, FieldShape::RichText);
        assert_eq!(shape.into_blocks(), vec![RICH_TEXT_SENTINEL.to_string()]);
    }

    #[test]
    fn test_absent_and_null() {
        assert_eq!(shape_of(r#"{"summary":"x"}"#), FieldShape::Absent);
        assert_eq!(shape_of(r#"{"ac":null}"#), FieldShape::Unrecognized);
        assert_eq!(shape_of(r#"{"ac":true}"#).into_blocks(), Vec::<String>::new());
    }

    #[test]
    fn test_lenient_decode_of_raw_control_characters() {
        // Strict JSON forbids a literal newline inside a string.
        let decoded = decode_string_literal("\"a\nb \\\"c\\\" \\q\"");
        assert_eq!(decoded, "a\nb \"c\" \\q");
    }

    #[test]
    fn test_lenient_unicode_escape() {
        assert_eq!(unescape_lenient("\\u2022 item\tx"), "• item\tx");
        assert_eq!(unescape_lenient("\\u12"), "\\u12");
    }

    #[test]
    fn test_shape_kind_labels() {
        assert_eq!(ShapeKind::RichText.to_string(), "rich_text");
        assert_eq!(FieldShape::Absent.kind().as_str(), "absent");
    }
}
