//! Domain records for one storycheck run.

use jira_bridge::IssueKey;
use serde::{Deserialize, Serialize};

use crate::locator::locate_field;
use crate::normalize::normalize_lines;
use crate::shape::{FieldShape, ShapeKind};

/// Criterion used when the story yields no criteria lines at all.
pub const PLACEHOLDER_CRITERION: &str = "No Acceptance Criteria provided.";

/// Summary used when the story document carries none.
pub const MISSING_SUMMARY: &str = "(no summary)";

/// Key of the summary field in a story document.
pub const SUMMARY_FIELD: &str = "summary";

/// The source story, fetched once per run and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRecord {
    pub key: IssueKey,
    pub summary: String,
    /// Still-serialized criteria value, `None` when the field is absent.
    pub raw_field_value: Option<String>,
}

impl StoryRecord {
    /// Build a record from a raw story document.
    ///
    /// Both the summary and the criteria field are found with the
    /// escape-aware locator, so the document does not have to be valid JSON
    /// outside those two values.
    pub fn from_document(key: IssueKey, document: &str, field_id: &str) -> Self {
        let summary = match FieldShape::classify(
            locate_field(document, SUMMARY_FIELD).map(|v| v.as_str()),
        ) {
            FieldShape::PlainString(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => MISSING_SUMMARY.to_string(),
        };
        let raw_field_value = locate_field(document, field_id).map(|v| v.as_str().to_string());

        StoryRecord {
            key,
            summary,
            raw_field_value,
        }
    }

    /// Classify the criteria value and normalize it into criteria.
    pub fn extract_criteria(&self) -> Extraction {
        let shape = FieldShape::classify(self.raw_field_value.as_deref());
        let kind = shape.kind();
        let lines = normalize_lines(shape.into_blocks());
        Extraction {
            shape: kind,
            criteria: Criteria::from_lines(lines),
        }
    }
}

/// Outcome of criteria extraction for a story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Shape the criteria value was classified as
    pub shape: ShapeKind,
    pub criteria: Criteria,
}

/// One normalized criterion line with its position in the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceCriterion {
    pub text: String,
    /// 1-based
    pub index: usize,
    pub total: usize,
}

/// Ordered, never-empty criteria for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Criteria {
    items: Vec<AcceptanceCriterion>,
    placeholder: bool,
}

impl Criteria {
    /// Index normalized lines 1..=N.
    ///
    /// Zero lines become the single placeholder criterion. Blank lines are
    /// skipped so the non-empty invariant holds for any input.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut texts: Vec<String> = lines
            .into_iter()
            .map(Into::into)
            .filter(|line: &String| !line.trim().is_empty())
            .collect();

        let placeholder = texts.is_empty();
        if placeholder {
            texts.push(PLACEHOLDER_CRITERION.to_string());
        }

        let total = texts.len();
        let items = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| AcceptanceCriterion {
                text,
                index: i + 1,
                total,
            })
            .collect();

        Criteria { items, placeholder }
    }

    /// True when no lines were extracted and the placeholder stands in.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Number of criteria, always at least one.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AcceptanceCriterion> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[AcceptanceCriterion] {
        &self.items
    }

    /// Criterion texts in order.
    pub fn texts(&self) -> Vec<&str> {
        self.items.iter().map(|c| c.text.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a Criteria {
    type Item = &'a AcceptanceCriterion;
    type IntoIter = std::slice::Iter<'a, AcceptanceCriterion>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A synthesized test case, one per criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseDraft {
    pub title: String,
    pub body: String,
    /// Index of the criterion this draft was built from (1-based)
    pub source_index: usize,
}
