//! Run configuration.
//!
//! [`RunConfig`] is the only way settings reach the pipeline. Nothing in
//! this crate reads the process environment; the binary resolves flags and
//! environment variables and hands the values to [`RunConfigBuilder`].

use std::path::PathBuf;
use std::str::FromStr;

use jira_bridge::{ConfigError, DescriptionFormat, IssueKey};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROJECT_KEY: &str = "SCRUM";
pub const DEFAULT_STORY_KEY: &str = "SCRUM-1";
pub const DEFAULT_ISSUE_TYPE: &str = "Test";
pub const DEFAULT_LINK_TYPE: &str = "Relates";
pub const DEFAULT_FIELD_ID: &str = "customfield_10059";
pub const DEFAULT_OUT_DIR: &str = "tests/generated";

/// Where generated drafts go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// File drafts as tracker issues linked to the story
    #[default]
    Jira,
    /// Write drafts to disk only
    Repo,
    /// Write to disk, then file
    Both,
}

impl RunMode {
    pub fn files_issues(&self) -> bool {
        matches!(self, RunMode::Jira | RunMode::Both)
    }

    pub fn writes_artifacts(&self) -> bool {
        matches!(self, RunMode::Repo | RunMode::Both)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Jira => "jira",
            RunMode::Repo => "repo",
            RunMode::Both => "both",
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jira" => Ok(RunMode::Jira),
            "repo" => Ok(RunMode::Repo),
            "both" => Ok(RunMode::Both),
            other => Err(ConfigError::invalid(
                "mode",
                format!("expected `jira`, `repo` or `both`, got `{other}`"),
            )),
        }
    }
}

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    pub project_key: String,
    pub story_key: IssueKey,
    pub issue_type: String,
    pub link_type: String,
    /// Identifier of the criteria field in the story document
    pub field_id: String,
    pub mode: RunMode,
    pub labels: Vec<String>,
    pub description_format: DescriptionFormat,
    /// Post a summary comment on the story after a successful run
    pub comment: bool,
    pub out_dir: PathBuf,
}

impl RunConfig {
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }
}

/// Builder for [`RunConfig`].
///
/// Unset or blank text settings fall back to their defaults. Values are
/// trimmed. Keys are validated in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct RunConfigBuilder {
    project_key: Option<String>,
    story_key: Option<String>,
    issue_type: Option<String>,
    link_type: Option<String>,
    field_id: Option<String>,
    mode: RunMode,
    labels: Vec<String>,
    description_format: DescriptionFormat,
    comment: bool,
    out_dir: Option<PathBuf>,
}

impl RunConfigBuilder {
    pub fn project_key(mut self, value: impl Into<String>) -> Self {
        self.project_key = Some(value.into());
        self
    }

    pub fn story_key(mut self, value: impl Into<String>) -> Self {
        self.story_key = Some(value.into());
        self
    }

    pub fn issue_type(mut self, value: impl Into<String>) -> Self {
        self.issue_type = Some(value.into());
        self
    }

    pub fn link_type(mut self, value: impl Into<String>) -> Self {
        self.link_type = Some(value.into());
        self
    }

    pub fn field_id(mut self, value: impl Into<String>) -> Self {
        self.field_id = Some(value.into());
        self
    }

    pub fn mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add one label. Blank labels are ignored.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.extend(labels.into_iter().map(Into::into));
        self
    }

    pub fn description_format(mut self, format: DescriptionFormat) -> Self {
        self.description_format = format;
        self
    }

    pub fn comment(mut self, enabled: bool) -> Self {
        self.comment = enabled;
        self
    }

    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> Result<RunConfig, ConfigError> {
        let project_key = or_default(self.project_key, DEFAULT_PROJECT_KEY);
        if !is_project_key(&project_key) {
            return Err(ConfigError::invalid(
                "project key",
                format!("`{project_key}` is not an uppercase project key"),
            ));
        }

        let story_key = or_default(self.story_key, DEFAULT_STORY_KEY);
        let story_key = IssueKey::parse(&story_key)
            .map_err(|e| ConfigError::invalid("story key", e.to_string()))?;

        let mut labels = Vec::new();
        for label in self.labels {
            let label = label.trim();
            if label.is_empty() {
                continue;
            }
            if label.chars().any(char::is_whitespace) {
                return Err(ConfigError::invalid(
                    "label",
                    format!("`{label}` contains whitespace"),
                ));
            }
            if !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
        }

        let out_dir = self
            .out_dir
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));

        Ok(RunConfig {
            project_key,
            story_key,
            issue_type: or_default(self.issue_type, DEFAULT_ISSUE_TYPE),
            link_type: or_default(self.link_type, DEFAULT_LINK_TYPE),
            field_id: or_default(self.field_id, DEFAULT_FIELD_ID),
            mode: self.mode,
            labels,
            description_format: self.description_format,
            comment: self.comment,
            out_dir,
        })
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn is_project_key(value: &str) -> bool {
    let mut chars = value.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
