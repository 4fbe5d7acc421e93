//! Tracker port for storycheck
//!
//! The pipeline talks to the issue tracker only through [`IssueTracker`]:
//! - `fetch_issue`: raw JSON text of one issue, limited to the named fields
//! - `create_issue`: file a new issue, returning its key
//! - `link_issues`: record a directed relation between two issues
//! - `add_comment`: append a comment to an issue
//!
//! The trait is async and backend-agnostic. `JiraClient` talks to Jira Cloud;
//! `fakes::MemoryTracker` keeps everything in memory for tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;

use crate::adf;
use crate::error::{ConfigError, TrackerError};

/// Result type for tracker operations
pub type TrackerResult<T> = std::result::Result<T, TrackerError>;

// ---------------------------------------------------------------------------
// IssueKey
// ---------------------------------------------------------------------------

/// Tracker issue key of the form `PROJECT-123`.
///
/// The project part starts with an uppercase ASCII letter followed by
/// uppercase letters, digits or `_`; the number part is one or more digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IssueKey(String);

impl IssueKey {
    /// Validate and wrap a key.
    pub fn parse(raw: &str) -> TrackerResult<Self> {
        let raw = raw.trim();
        let Some((project, number)) = raw.rsplit_once('-') else {
            return Err(TrackerError::InvalidKey(raw.to_string()));
        };
        let mut project_chars = project.chars();
        let project_ok = project_chars
            .next()
            .is_some_and(|c| c.is_ascii_uppercase())
            && project_chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
        let number_ok = !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());
        if project_ok && number_ok {
            Ok(IssueKey(raw.to_string()))
        } else {
            Err(TrackerError::InvalidKey(raw.to_string()))
        }
    }

    /// Return the full key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Project part of the key (`SCRUM` for `SCRUM-7`).
    pub fn project(&self) -> &str {
        self.0.rsplit_once('-').map(|(p, _)| p).unwrap_or(&self.0)
    }
}

impl TryFrom<String> for IssueKey {
    type Error = TrackerError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        IssueKey::parse(&s)
    }
}

impl From<IssueKey> for String {
    fn from(key: IssueKey) -> Self {
        key.0
    }
}

impl std::fmt::Display for IssueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// How an issue description is sent to the tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionFormat {
    /// Plain string description
    #[default]
    Plain,
    /// Atlassian Document Format, one paragraph per non-empty line
    Adf,
}

impl FromStr for DescriptionFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(DescriptionFormat::Plain),
            "adf" => Ok(DescriptionFormat::Adf),
            other => Err(ConfigError::invalid(
                "description format",
                format!("expected `plain` or `adf`, got `{other}`"),
            )),
        }
    }
}

/// A new issue to be filed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    pub project_key: String,
    pub issue_type: String,
    pub summary: String,
    pub description: String,
    pub format: DescriptionFormat,
    pub labels: Vec<String>,
}

impl NewIssue {
    /// Body of `POST /rest/api/3/issue`.
    pub fn to_payload(&self) -> Value {
        let description = match self.format {
            DescriptionFormat::Plain => Value::String(self.description.clone()),
            DescriptionFormat::Adf => adf::document(&self.description),
        };
        let mut fields = json!({
            "project": { "key": self.project_key },
            "summary": self.summary,
            "issuetype": { "name": self.issue_type },
            "description": description,
        });
        if !self.labels.is_empty() {
            fields["labels"] = json!(self.labels);
        }
        json!({ "fields": fields })
    }
}

/// Directed relation `from -> to` of kind `relation` (e.g. `Relates`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRequest {
    pub from: IssueKey,
    pub to: IssueKey,
    pub relation: String,
}

impl LinkRequest {
    pub fn new(from: IssueKey, to: IssueKey, relation: impl Into<String>) -> Self {
        LinkRequest {
            from,
            to,
            relation: relation.into(),
        }
    }

    /// Body of `POST /rest/api/3/issueLink`.
    pub fn to_payload(&self) -> Value {
        json!({
            "type": { "name": self.relation },
            "inwardIssue": { "key": self.from },
            "outwardIssue": { "key": self.to },
        })
    }
}

// ---------------------------------------------------------------------------
// IssueTracker
// ---------------------------------------------------------------------------

/// Issue tracker operations consumed by the pipeline.
///
/// Guarantees expected from implementations:
/// - `create_issue` returns only after the issue exists, and the returned key
///   is the key the tracker assigned.
/// - Any non-success outcome is an `Err`; nothing is retried internally.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch the raw JSON text of `key`, restricted to `fields`.
    async fn fetch_issue(&self, key: &IssueKey, fields: &[&str]) -> TrackerResult<String>;

    /// File a new issue and return its key.
    async fn create_issue(&self, issue: &NewIssue) -> TrackerResult<IssueKey>;

    /// Record a directed link between two issues.
    async fn link_issues(&self, link: &LinkRequest) -> TrackerResult<()>;

    /// Append a plain-text comment to an issue.
    async fn add_comment(&self, key: &IssueKey, body: &str) -> TrackerResult<()>;
}
