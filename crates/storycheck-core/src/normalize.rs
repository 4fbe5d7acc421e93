//! Line normalization for raw criteria blocks.
//!
//! Each block is split into fragments at line breaks (`\n`, `\r\n`, `\r`)
//! and at a `•` bullet followed by whitespace. Leading `-` / `*` bullet
//! markers are stripped, fragments are trimmed and empty ones dropped.
//! The concatenated result is deduplicated by exact string equality,
//! keeping the first occurrence.
//!
//! `normalize_lines(normalize_lines(x)) == normalize_lines(x)`.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\n|\r").expect("line break regex is valid"));

static DOT_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"•\s+").expect("dot bullet regex is valid"));

// Repeated markers such as "- * item" are stripped in one pass.
static LEADING_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*]\s+)+").expect("marker regex is valid"));

/// Normalize raw blocks into trimmed, non-empty, unique lines.
pub fn normalize_lines<I, S>(blocks: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut lines = Vec::new();

    for block in blocks {
        for line in LINE_BREAK.split(block.as_ref()) {
            for fragment in DOT_BULLET.split(line) {
                let Some(clean) = clean_fragment(fragment) else {
                    continue;
                };
                if seen.insert(clean.clone()) {
                    lines.push(clean);
                }
            }
        }
    }
    lines
}

fn clean_fragment(fragment: &str) -> Option<String> {
    let stripped = LEADING_MARKERS.replace(fragment, "");
    let trimmed = stripped.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
