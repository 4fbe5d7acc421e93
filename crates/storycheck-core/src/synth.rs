//! Test-case draft synthesis.
//!
//! Drafts are a pure function of the story and its criteria: same input,
//! same titles and bodies, same order.

use jira_bridge::IssueKey;

use crate::domain::{AcceptanceCriterion, Criteria, StoryRecord, TestCaseDraft};

const SUGGESTED_STEPS: &str = "Suggested Steps:\n\
1) Review prerequisites\n\
2) Execute steps per AC (Given/When/Then)\n\
3) Capture actual result & evidence\n\
4) Record pass/fail and link defects";

/// One draft per criterion, in criterion order.
pub fn synthesize(story: &StoryRecord, criteria: &Criteria) -> Vec<TestCaseDraft> {
    criteria
        .iter()
        .map(|criterion| TestCaseDraft {
            title: render_title(&story.key, criterion.index),
            body: render_body(story, criterion),
            source_index: criterion.index,
        })
        .collect()
}

/// `[Auto-Test] SCRUM-1 - AC 2`
pub fn render_title(story_key: &IssueKey, index: usize) -> String {
    format!("[Auto-Test] {story_key} - AC {index}")
}

pub fn render_body(story: &StoryRecord, criterion: &AcceptanceCriterion) -> String {
    format!(
        "Generated from story: {key} — {summary}\n\n\
         Acceptance Criteria ({index}/{total}):\n\
         {text}\n\n\
         {SUGGESTED_STEPS}",
        key = story.key,
        summary = story.summary,
        index = criterion.index,
        total = criterion.total,
        text = criterion.text,
    )
}
