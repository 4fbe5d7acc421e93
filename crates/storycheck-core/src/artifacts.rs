//! On-disk test artifacts for repo mode.
//!
//! Layout under the output directory:
//!
//! ```text
//! <out_dir>/<STORY_KEY>/TC_01.md
//! <out_dir>/<STORY_KEY>/TC_02.md
//! <out_dir>/<STORY_KEY>/<STORY_KEY>.feature
//! ```

use std::path::{Path, PathBuf};

use crate::domain::{Criteria, StoryRecord, TestCaseDraft};
use crate::error::{PipelineError, Result};

/// Markdown file for one draft.
pub fn render_markdown(draft: &TestCaseDraft) -> String {
    format!("# {}\n\n{}\n", draft.title, draft.body)
}

/// Gherkin feature with one scenario per draft.
pub fn render_feature(story: &StoryRecord, criteria: &Criteria, drafts: &[TestCaseDraft]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Feature: {} ({})\n", story.summary, story.key));

    for draft in drafts {
        let criterion = criteria
            .iter()
            .find(|c| c.index == draft.source_index)
            .map(|c| c.text.as_str())
            .unwrap_or_default();
        out.push('\n');
        out.push_str(&format!("  Scenario: {}\n", draft.title));
        out.push_str(&format!("    Given the story {} is implemented\n", story.key));
        out.push_str(&format!("    When {criterion}\n"));
        out.push_str("    Then the acceptance criterion is satisfied\n");
    }
    out
}

/// `TC_01.md`, `TC_02.md`, ...
pub fn markdown_file_name(index: usize) -> String {
    format!("TC_{index:02}.md")
}

/// Write all artifacts for a story, returning the written paths in order.
///
/// Existing files with the same names are overwritten, so a rerun over an
/// unchanged story leaves identical files.
pub fn write_artifacts(
    out_dir: &Path,
    story: &StoryRecord,
    criteria: &Criteria,
    drafts: &[TestCaseDraft],
) -> Result<Vec<PathBuf>> {
    let base = out_dir.join(story.key.as_str());
    std::fs::create_dir_all(&base).map_err(|source| PipelineError::Artifact {
        path: base.clone(),
        source,
    })?;

    let mut written = Vec::with_capacity(drafts.len() + 1);
    for draft in drafts {
        let path = base.join(markdown_file_name(draft.source_index));
        write_file(&path, &render_markdown(draft))?;
        written.push(path);
    }

    let feature = base.join(format!("{}.feature", story.key));
    write_file(&feature, &render_feature(story, criteria, drafts))?;
    written.push(feature);

    Ok(written)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|source| PipelineError::Artifact {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::synthesize;
    use jira_bridge::IssueKey;

    fn fixture() -> (StoryRecord, Criteria, Vec<TestCaseDraft>) {
        let story = StoryRecord {
            key: IssueKey::parse("SCRUM-1").unwrap(),
            summary: "Login page".to_string(),
            raw_field_value: None,
        };
        let criteria = Criteria::from_lines(["User can log in", "Errors are shown"]);
        let drafts = synthesize(&story, &criteria);
        (story, criteria, drafts)
    }

    #[test]
    fn test_markdown_file_names_are_zero_padded() {
        assert_eq!(markdown_file_name(1), "TC_01.md");
        assert_eq!(markdown_file_name(12), "TC_12.md");
    }

    #[test]
    fn test_markdown_has_title_heading_and_body() {
        let (_, _, drafts) = fixture();
        let md = render_markdown(&drafts[0]);
        assert!(md.starts_with("# [Auto-Test] SCRUM-1 - AC 1\n\n"));
        assert!(md.contains("User can log in"));
    }

    #[test]
    fn test_feature_has_one_scenario_per_draft() {
        let (story, criteria, drafts) = fixture();
        let feature = render_feature(&story, &criteria, &drafts);

        assert!(feature.starts_with("Feature: Login page (SCRUM-1)\n"));
        assert_eq!(feature.matches("  Scenario: ").count(), 2);
        assert!(feature.contains("    When Errors are shown\n"));
        assert!(feature.contains("    Given the story SCRUM-1 is implemented\n"));
    }

    #[test]
    fn test_write_artifacts_layout() {
        let (story, criteria, drafts) = fixture();
        let dir = tempfile::tempdir().unwrap();

        let written = write_artifacts(dir.path(), &story, &criteria, &drafts).unwrap();
        let base = dir.path().join("SCRUM-1");
        assert_eq!(
            written,
            vec![
                base.join("TC_01.md"),
                base.join("TC_02.md"),
                base.join("SCRUM-1.feature")
            ]
        );
        for path in &written {
            assert!(path.is_file());
        }
    }

    #[test]
    fn test_unwritable_target_is_artifact_error() {
        let (story, criteria, drafts) = fixture();
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the story directory should go.
        std::fs::write(dir.path().join("SCRUM-1"), "occupied").unwrap();

        let err = write_artifacts(dir.path(), &story, &criteria, &drafts).unwrap_err();
        assert!(matches!(err, PipelineError::Artifact { .. }));
    }
}
