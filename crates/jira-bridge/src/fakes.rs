//! In-memory fakes for the tracker port (testing only)
//!
//! `MemoryTracker` satisfies the [`IssueTracker`] contract without a network
//! and records every call in order, so tests can assert sequencing. Failures
//! can be injected per operation and call number.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::TrackerError;
use crate::tracker::{IssueKey, IssueTracker, LinkRequest, NewIssue, TrackerResult};

/// One recorded tracker call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCall {
    Fetch(IssueKey),
    Create(String),
    Link { from: IssueKey, to: IssueKey },
    Comment(IssueKey),
}

#[derive(Debug, Default)]
struct TrackerState {
    documents: HashMap<String, String>,
    created: Vec<(IssueKey, NewIssue)>,
    links: Vec<LinkRequest>,
    comments: Vec<(IssueKey, String)>,
    calls: Vec<TrackerCall>,
    create_attempts: usize,
    link_attempts: usize,
    fail_create_on: Option<usize>,
    fail_link_on: Option<usize>,
    fail_comments: bool,
}

/// In-memory issue tracker.
///
/// Created issues get keys `<project>-101`, `<project>-102`, ... in creation
/// order.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    state: Mutex<TrackerState>,
}

const FIRST_ISSUE_NUMBER: usize = 101;

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `document` as the raw JSON of `key`.
    pub fn with_document(self, key: &str, document: impl Into<String>) -> Self {
        self.state()
            .documents
            .insert(key.to_string(), document.into());
        self
    }

    /// Fail the `n`th call (1-based) to `create_issue` with HTTP 400.
    pub fn fail_create_on(self, n: usize) -> Self {
        self.state().fail_create_on = Some(n);
        self
    }

    /// Fail the `n`th call (1-based) to `link_issues` with HTTP 404.
    pub fn fail_link_on(self, n: usize) -> Self {
        self.state().fail_link_on = Some(n);
        self
    }

    /// Fail every `add_comment` call with HTTP 403.
    pub fn fail_comments(self) -> Self {
        self.state().fail_comments = true;
        self
    }

    /// Issues created so far, in creation order.
    pub fn created(&self) -> Vec<(IssueKey, NewIssue)> {
        self.state().created.clone()
    }

    /// Links recorded so far, in order.
    pub fn links(&self) -> Vec<LinkRequest> {
        self.state().links.clone()
    }

    /// Comments recorded so far, in order.
    pub fn comments(&self) -> Vec<(IssueKey, String)> {
        self.state().comments.clone()
    }

    /// Every call received, successful or not, in order.
    pub fn calls(&self) -> Vec<TrackerCall> {
        self.state().calls.clone()
    }

    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn injected(operation: &str, target: &str, status: u16) -> TrackerError {
    TrackerError::Status {
        operation: operation.to_string(),
        target: target.to_string(),
        status,
        body: r#"{"errorMessages":["injected failure"]}"#.to_string(),
    }
}

#[async_trait]
impl IssueTracker for MemoryTracker {
    async fn fetch_issue(&self, key: &IssueKey, _fields: &[&str]) -> TrackerResult<String> {
        let mut state = self.state();
        state.calls.push(TrackerCall::Fetch(key.clone()));
        state
            .documents
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| TrackerError::Status {
                operation: "GET".to_string(),
                target: format!("issue/{key}"),
                status: 404,
                body: r#"{"errorMessages":["Issue does not exist or you do not have permission to see it."]}"#
                    .to_string(),
            })
    }

    async fn create_issue(&self, issue: &NewIssue) -> TrackerResult<IssueKey> {
        let mut state = self.state();
        state.calls.push(TrackerCall::Create(issue.summary.clone()));
        state.create_attempts += 1;
        if state.fail_create_on == Some(state.create_attempts) {
            return Err(injected("POST", "issue", 400));
        }
        let number = FIRST_ISSUE_NUMBER + state.created.len();
        let key = IssueKey::parse(&format!("{}-{}", issue.project_key, number))?;
        state.created.push((key.clone(), issue.clone()));
        Ok(key)
    }

    async fn link_issues(&self, link: &LinkRequest) -> TrackerResult<()> {
        let mut state = self.state();
        state.calls.push(TrackerCall::Link {
            from: link.from.clone(),
            to: link.to.clone(),
        });
        state.link_attempts += 1;
        if state.fail_link_on == Some(state.link_attempts) {
            return Err(injected("POST", "issueLink", 404));
        }
        state.links.push(link.clone());
        Ok(())
    }

    async fn add_comment(&self, key: &IssueKey, body: &str) -> TrackerResult<()> {
        let mut state = self.state();
        state.calls.push(TrackerCall::Comment(key.clone()));
        if state.fail_comments {
            return Err(injected("POST", &format!("issue/{key}/comment"), 403));
        }
        state.comments.push((key.clone(), body.to_string()));
        Ok(())
    }
}
