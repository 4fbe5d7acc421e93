//! Error taxonomy for a storycheck run.

use std::path::PathBuf;

use jira_bridge::{ConfigError, IssueKey, TrackerError};

/// Errors that end a run.
///
/// Extraction misses are not errors: they produce the placeholder criterion
/// and a warning instead.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A tracker call failed before any issue was created
    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),

    /// A tracker call failed after at least one issue was created.
    ///
    /// `created` lists every issue filed so far, in order. `unlinked` is the
    /// issue whose link call failed, if that was the failing step; it is
    /// also in `created`.
    #[error("run interrupted after {} created issue(s): {source}", .created.len())]
    Interrupted {
        created: Vec<IssueKey>,
        unlinked: Option<IssueKey>,
        #[source]
        source: TrackerError,
    },

    /// The mode needs a tracker but none was supplied
    #[error("{operation} requires a tracker connection")]
    TrackerUnavailable { operation: String },

    #[error("failed to write {}: {source}", .path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Issues created before the failure, in creation order.
    pub fn created(&self) -> &[IssueKey] {
        match self {
            PipelineError::Interrupted { created, .. } => created,
            _ => &[],
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
