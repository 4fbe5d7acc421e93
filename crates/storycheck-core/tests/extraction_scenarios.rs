//! End-to-end extraction scenarios: story document in, drafts out.
//!
//! Each scenario goes through the public pipeline (locator, shape dispatch,
//! normalization, synthesis) without touching a tracker.

use jira_bridge::IssueKey;
use storycheck_core::{
    Orchestrator, RunConfig, ShapeKind, StoryRecord, PLACEHOLDER_CRITERION, RICH_TEXT_SENTINEL,
};
use tracing_test::traced_test;

const FIELD: &str = "customfield_10059";

fn story_with(criteria_json: Option<&str>) -> StoryRecord {
    let document = match criteria_json {
        Some(value) => format!(
            r#"{{"key":"SCRUM-1","fields":{{"summary":"Checkout flow","{FIELD}":{value}}}}}"#
        ),
        None => r#"{"key":"SCRUM-1","fields":{"summary":"Checkout flow"}}"#.to_string(),
    };
    StoryRecord::from_document(IssueKey::parse("SCRUM-1").unwrap(), &document, FIELD)
}

fn config() -> RunConfig {
    RunConfig::builder().build().unwrap()
}

#[traced_test]
#[test]
fn scenario_a_absent_field_yields_placeholder_and_warning() {
    let config = config();
    let plan = Orchestrator::new(&config).plan(story_with(None));

    assert_eq!(plan.shape, ShapeKind::Absent);
    assert!(plan.placeholder_used());
    assert_eq!(plan.drafts.len(), 1);
    assert_eq!(plan.drafts[0].title, "[Auto-Test] SCRUM-1 - AC 1");
    assert!(plan.drafts[0]
        .body
        .contains(&format!("Acceptance Criteria (1/1):\n{PLACEHOLDER_CRITERION}\n")));
    assert!(logs_contain(
        "No AC found in customfield_10059 for SCRUM-1; creating a placeholder test."
    ));
}

#[test]
fn scenario_b_string_array_strips_bullets() {
    let config = config();
    let plan = Orchestrator::new(&config).plan(story_with(Some(
        r#"["Given X, When Y, Then Z", "- Another line"]"#,
    )));

    assert_eq!(plan.shape, ShapeKind::StringArray);
    assert_eq!(
        plan.criteria.texts(),
        vec!["Given X, When Y, Then Z", "Another line"]
    );
    assert_eq!(plan.drafts.len(), 2);
    assert!(plan.drafts[0]
        .body
        .contains("Acceptance Criteria (1/2):\nGiven X, When Y, Then Z\n"));
    assert!(plan.drafts[1]
        .body
        .contains("Acceptance Criteria (2/2):\nAnother line\n"));
    assert!(!plan.placeholder_used());
}

#[test]
fn scenario_c_plain_string_is_split_and_deduplicated() {
    let config = config();
    let plan = Orchestrator::new(&config).plan(story_with(Some(r#""Line1\n- Line2\nLine1""#)));

    assert_eq!(plan.shape, ShapeKind::PlainString);
    assert_eq!(plan.criteria.texts(), vec!["Line1", "Line2"]);
    let titles: Vec<_> = plan.drafts.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["[Auto-Test] SCRUM-1 - AC 1", "[Auto-Test] SCRUM-1 - AC 2"]
    );
}

#[test]
fn scenario_d_rich_object_yields_single_sentinel_draft() {
    let config = config();
    let adf = r#"{"type":"doc","version":1,"content":[{"type":"paragraph","content":[{"type":"text","text":"Given a cart"}]}]}"#;
    let plan = Orchestrator::new(&config).plan(story_with(Some(adf)));

    assert_eq!(plan.shape, ShapeKind::RichText);
    assert_eq!(plan.criteria.texts(), vec![RICH_TEXT_SENTINEL]);
    assert_eq!(plan.drafts.len(), 1);
    assert!(!plan.placeholder_used());
}

#[test]
fn null_and_scalar_values_take_the_placeholder_path() {
    let config = config();
    for value in ["null", "42", "false"] {
        let plan = Orchestrator::new(&config).plan(story_with(Some(value)));
        assert_eq!(plan.shape, ShapeKind::Unrecognized, "value {value}");
        assert!(plan.placeholder_used(), "value {value}");
    }
}

#[test]
fn field_name_inside_summary_text_is_not_matched() {
    let document = format!(
        r#"{{"fields":{{"summary":"see \"{FIELD}\": [\"decoy\"]","{FIELD}":["real one"]}}}}"#
    );
    let story = StoryRecord::from_document(IssueKey::parse("SCRUM-1").unwrap(), &document, FIELD);
    let extraction = story.extract_criteria();

    assert_eq!(extraction.criteria.texts(), vec!["real one"]);
}

#[test]
fn configurable_field_identifier() {
    let config = RunConfig::builder()
        .field_id("customfield_20000")
        .build()
        .unwrap();
    let document = r#"{"fields":{"summary":"s","customfield_10059":["old"],"customfield_20000":["new"]}}"#;
    let story = StoryRecord::from_document(config.story_key.clone(), document, &config.field_id);
    let plan = Orchestrator::new(&config).plan(story);

    assert_eq!(plan.criteria.texts(), vec!["new"]);
}

#[test]
fn indices_are_consistent_across_the_run() {
    let config = config();
    let plan = Orchestrator::new(&config).plan(story_with(Some(
        r#""• one • two\r\n* three\n- one""#,
    )));

    let total = plan.criteria.count();
    assert_eq!(total, 3);
    for (pos, criterion) in plan.criteria.iter().enumerate() {
        assert_eq!(criterion.index, pos + 1);
        assert_eq!(criterion.total, total);
        assert_eq!(plan.drafts[pos].source_index, criterion.index);
    }
}
