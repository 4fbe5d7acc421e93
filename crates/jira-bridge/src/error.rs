//! Error types for jira-bridge

use thiserror::Error;

/// Errors raised while assembling tracker or run configuration.
///
/// Always raised before any request leaves the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// One or more required settings are unset or blank
    #[error("missing required settings: {}", .0.join(", "))]
    Missing(Vec<String>),

    /// A setting is present but unusable
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: String, reason: String },
}

impl ConfigError {
    /// Convenience for a single missing setting.
    pub fn missing(name: impl Into<String>) -> Self {
        ConfigError::Missing(vec![name.into()])
    }

    /// Convenience for an invalid setting.
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors returned by an [`IssueTracker`](crate::IssueTracker).
///
/// Every variant names the operation and its target so a failed run can be
/// diagnosed from the message alone.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// The request never produced a response (DNS, TLS, timeout, ...)
    #[error("{operation} {target} failed: {message}")]
    Transport {
        operation: String,
        target: String,
        message: String,
    },

    /// The tracker answered with a non-2xx status
    #[error("HTTP {status} for {operation} {target} ; body={body}")]
    Status {
        operation: String,
        target: String,
        status: u16,
        body: String,
    },

    /// The response arrived but did not carry what the operation needs
    #[error("{operation} {target}: could not parse {expected} from: {body}")]
    UnexpectedResponse {
        operation: String,
        target: String,
        expected: String,
        body: String,
    },

    /// A string that should be an issue key is not one
    #[error("invalid issue key: {0:?}")]
    InvalidKey(String),

    /// Building the HTTP client failed
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),
}

impl TrackerError {
    pub(crate) fn transport(operation: &str, target: &str, err: &reqwest::Error) -> Self {
        TrackerError::Transport {
            operation: operation.to_string(),
            target: target.to_string(),
            message: err.to_string(),
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            TrackerError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_lists_every_setting() {
        let err = ConfigError::Missing(vec!["JIRA_EMAIL".into(), "JIRA_API_TOKEN".into()]);
        assert_eq!(
            err.to_string(),
            "missing required settings: JIRA_EMAIL, JIRA_API_TOKEN"
        );
    }

    #[test]
    fn test_status_error_surfaces_body() {
        let err = TrackerError::Status {
            operation: "POST".into(),
            target: "https://example.atlassian.net/rest/api/3/issue".into(),
            status: 400,
            body: r#"{"errors":{"issuetype":"invalid"}}"#.into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("HTTP 400"));
        assert!(msg.contains("issuetype"));
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_invalid_key_display() {
        let err = TrackerError::InvalidKey("scrum-1".into());
        assert!(err.to_string().contains("\"scrum-1\""));
        assert_eq!(err.status(), None);
    }
}
