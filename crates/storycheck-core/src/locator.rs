//! Escape-aware field locator.
//!
//! Finds the still-serialized value of a named field anywhere in a JSON
//! document without building a parse tree. The scanner walks the text once,
//! jumping over every string literal as a unit, so text inside string
//! content can never be mistaken for a key. A string only counts as a key
//! when the next non-whitespace byte is `:`.
//!
//! Value boundaries:
//! - string: the closing unescaped `"`
//! - array / object: the bracket that brings nesting back to zero, with
//!   brackets inside strings ignored
//! - anything else (`null`, numbers, booleans): up to the next `,` `}` `]`
//!   or whitespace
//!
//! Bracket kinds are not cross-checked; this is a locator, not a validator.

/// A located, still-serialized field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawValue<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> RawValue<'a> {
    pub(crate) fn new(text: &'a str, offset: usize) -> Self {
        RawValue { text, offset }
    }

    /// Serialized value text, e.g. `["a","b"]` or `"x\ny"`.
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Byte offset of the value within the document.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Locate the first value whose key equals `field`.
///
/// `field` is compared against the raw key text between the quotes. Returns
/// `None` when the key never appears as a key, or when the document is cut
/// off before the value ends.
pub fn locate_field<'a>(document: &'a str, field: &str) -> Option<RawValue<'a>> {
    let bytes = document.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'"' {
            i += 1;
            continue;
        }

        let end = string_end(bytes, i)?;
        let key = &document[i + 1..end - 1];
        let colon = skip_whitespace(bytes, end);

        if key == field && bytes.get(colon) == Some(&b':') {
            let start = skip_whitespace(bytes, colon + 1);
            let stop = value_end(bytes, start)?;
            return Some(RawValue::new(&document[start..stop], start));
        }
        i = end;
    }
    None
}

/// Index one past the closing quote of the string literal opening at `start`.
pub(crate) fn string_end(bytes: &[u8], start: usize) -> Option<usize> {
    debug_assert_eq!(bytes.get(start), Some(&b'"'));
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Index one past the bracket closing the array or object opening at `start`.
pub(crate) fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i = string_end(bytes, i)?;
                continue;
            }
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn value_end(bytes: &[u8], start: usize) -> Option<usize> {
    match bytes.get(start)? {
        b'"' => string_end(bytes, start),
        b'[' | b'{' => balanced_end(bytes, start),
        _ => {
            let stop = bytes[start..]
                .iter()
                .position(|&b| matches!(b, b',' | b'}' | b']') || b.is_ascii_whitespace())
                .map_or(bytes.len(), |n| start + n);
            (stop > start).then_some(stop)
        }
    }
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locate<'a>(doc: &'a str, field: &str) -> Option<&'a str> {
        locate_field(doc, field).map(|v| v.as_str())
    }

    #[test]
    fn test_locates_nested_field() {
        let doc = r#"{"key":"SCRUM-1","fields":{"summary":"Login","customfield_10059":"AC"}}"#;
        assert_eq!(locate(doc, "customfield_10059"), Some(r#""AC""#));
        assert_eq!(locate(doc, "summary"), Some(r#""Login""#));
    }

    #[test]
    fn test_absent_field() {
        assert_eq!(locate(r#"{"fields":{"summary":"x"}}"#, "customfield_10059"), None);
        assert_eq!(locate("", "summary"), None);
    }

    #[test]
    fn test_ignores_field_name_inside_string_content() {
        let doc = r#"{"summary":"mentions \"customfield_10059\": [\"fake\"]","customfield_10059":["real"]}"#;
        let raw = locate_field(doc, "customfield_10059").unwrap();
        assert_eq!(raw.as_str(), r#"["real"]"#);
        assert_eq!(&doc[raw.offset()..raw.offset() + 8], r#"["real"]"#);
    }

    #[test]
    fn test_ignores_field_name_used_as_value() {
        let doc = r#"{"name":"summary","summary":"real"}"#;
        assert_eq!(locate(doc, "summary"), Some(r#""real""#));
    }

    #[test]
    fn test_string_value_with_escaped_quotes_and_newlines() {
        let doc = r#"{"ac":"say \"hi\"\nthen \\ done","next":1}"#;
        assert_eq!(locate(doc, "ac"), Some(r#""say \"hi\"\nthen \\ done""#));
    }

    #[test]
    fn test_array_with_brackets_inside_strings() {
        let doc = r#"{"ac":["a ] b","c [ d"],"other":[]}"#;
        assert_eq!(locate(doc, "ac"), Some(r#"["a ] b","c [ d"]"#));
    }

    #[test]
    fn test_object_value_is_balanced() {
        let doc = r#"{"ac":{"type":"doc","content":[{"text":"}"}]},"z":0}"#;
        assert_eq!(
            locate(doc, "ac"),
            Some(r#"{"type":"doc","content":[{"text":"}"}]}"#)
        );
    }

    #[test]
    fn test_scalar_values() {
        let doc = "{\"ac\" : null, \"n\":42}";
        assert_eq!(locate(doc, "ac"), Some("null"));
        assert_eq!(locate(doc, "n"), Some("42"));
    }

    #[test]
    fn test_whitespace_around_colon() {
        let doc = "{\n  \"ac\"\n  :\n  \"x\"\n}";
        assert_eq!(locate(doc, "ac"), Some("\"x\""));
    }

    #[test]
    fn test_truncated_document_is_absent() {
        assert_eq!(locate(r#"{"ac":["never closed""#, "ac"), None);
        assert_eq!(locate(r#"{"ac":"open"#, "ac"), None);
        assert_eq!(locate(r#"{"ac":"#, "ac"), None);
    }

    #[test]
    fn test_multibyte_content_is_sliced_safely() {
        let doc = r#"{"summary":"Café • naïve","ac":"✓ ok"}"#;
        assert_eq!(locate(doc, "ac"), Some("\"✓ ok\""));
    }
}
