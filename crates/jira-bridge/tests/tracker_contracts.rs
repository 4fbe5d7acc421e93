//! Contract tests for the IssueTracker port.
//!
//! These tests pin the behavior the pipeline relies on, using the in-memory
//! fake. Any conforming implementation must behave the same way.

use jira_bridge::fakes::{MemoryTracker, TrackerCall};
use jira_bridge::{DescriptionFormat, IssueKey, IssueTracker, LinkRequest, NewIssue, TrackerError};

fn key(s: &str) -> IssueKey {
    IssueKey::parse(s).unwrap()
}

fn new_issue(summary: &str) -> NewIssue {
    NewIssue {
        project_key: "SCRUM".to_string(),
        issue_type: "Test".to_string(),
        summary: summary.to_string(),
        description: "body".to_string(),
        format: DescriptionFormat::Plain,
        labels: vec![],
    }
}

// ===========================================================================
// fetch
// ===========================================================================

#[tokio::test]
async fn fetch_returns_raw_document() {
    let doc = r#"{"key":"SCRUM-1","fields":{"summary":"Login"}}"#;
    let tracker = MemoryTracker::new().with_document("SCRUM-1", doc);

    let fetched = tracker
        .fetch_issue(&key("SCRUM-1"), &["summary"])
        .await
        .unwrap();
    assert_eq!(fetched, doc);
}

#[tokio::test]
async fn fetch_unknown_issue_is_status_error_with_body() {
    let tracker = MemoryTracker::new();
    let err = tracker
        .fetch_issue(&key("SCRUM-404"), &["summary"])
        .await
        .unwrap_err();

    match err {
        TrackerError::Status { status, body, .. } => {
            assert_eq!(status, 404);
            assert!(body.contains("does not exist"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ===========================================================================
// create
// ===========================================================================

#[tokio::test]
async fn create_assigns_sequential_keys_in_project() {
    let tracker = MemoryTracker::new();
    let first = tracker.create_issue(&new_issue("one")).await.unwrap();
    let second = tracker.create_issue(&new_issue("two")).await.unwrap();

    assert_eq!(first, key("SCRUM-101"));
    assert_eq!(second, key("SCRUM-102"));
    assert_eq!(first.project(), "SCRUM");
}

#[tokio::test]
async fn create_records_the_filed_issue() {
    let tracker = MemoryTracker::new();
    let issue = new_issue("[Auto-Test] SCRUM-1 - AC 1");
    let created = tracker.create_issue(&issue).await.unwrap();

    let stored = tracker.created();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].0, created);
    assert_eq!(stored[0].1, issue);
}

#[tokio::test]
async fn injected_create_failure_hits_only_that_call() {
    let tracker = MemoryTracker::new().fail_create_on(2);

    assert!(tracker.create_issue(&new_issue("one")).await.is_ok());
    let err = tracker.create_issue(&new_issue("two")).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(tracker.create_issue(&new_issue("three")).await.is_ok());

    let keys: Vec<_> = tracker.created().into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec![key("SCRUM-101"), key("SCRUM-102")]);
}

// ===========================================================================
// link + comment
// ===========================================================================

#[tokio::test]
async fn link_is_recorded_with_direction() {
    let tracker = MemoryTracker::new();
    let link = LinkRequest::new(key("SCRUM-101"), key("SCRUM-1"), "Relates");
    tracker.link_issues(&link).await.unwrap();

    assert_eq!(tracker.links(), vec![link]);
}

#[tokio::test]
async fn injected_link_failure() {
    let tracker = MemoryTracker::new().fail_link_on(1);
    let link = LinkRequest::new(key("SCRUM-101"), key("SCRUM-1"), "Relates");
    let err = tracker.link_issues(&link).await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(tracker.links().is_empty());
}

#[tokio::test]
async fn comments_can_fail_independently() {
    let tracker = MemoryTracker::new().fail_comments();
    let err = tracker
        .add_comment(&key("SCRUM-1"), "note")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert!(tracker.comments().is_empty());
}

#[tokio::test]
async fn calls_are_logged_in_order() {
    let tracker = MemoryTracker::new().with_document("SCRUM-1", "{}");
    let story = key("SCRUM-1");

    tracker.fetch_issue(&story, &["summary"]).await.unwrap();
    let test = tracker.create_issue(&new_issue("one")).await.unwrap();
    tracker
        .link_issues(&LinkRequest::new(test.clone(), story.clone(), "Relates"))
        .await
        .unwrap();
    tracker.add_comment(&story, "done").await.unwrap();

    assert_eq!(
        tracker.calls(),
        vec![
            TrackerCall::Fetch(story.clone()),
            TrackerCall::Create("one".to_string()),
            TrackerCall::Link {
                from: test,
                to: story.clone(),
            },
            TrackerCall::Comment(story),
        ]
    );
}
