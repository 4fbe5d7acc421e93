//! Storycheck Core Library
//!
//! Turns a story's acceptance-criteria field into ordered test-case drafts
//! and files them through an [`IssueTracker`](jira_bridge::IssueTracker).
//!
//! Data flows one way:
//!
//! ```text
//! document -> locator -> shape -> normalize -> Criteria -> synth -> drafts
//!                                                   \-> orchestrator -> tracker / disk
//! ```

pub mod artifacts;
pub mod config;
pub mod domain;
pub mod error;
pub mod fingerprint;
pub mod locator;
pub mod normalize;
pub mod obs;
pub mod orchestrator;
pub mod shape;
pub mod synth;
pub mod telemetry;

pub use config::{
    RunConfig, RunConfigBuilder, RunMode, DEFAULT_FIELD_ID, DEFAULT_ISSUE_TYPE, DEFAULT_LINK_TYPE,
    DEFAULT_OUT_DIR, DEFAULT_PROJECT_KEY, DEFAULT_STORY_KEY,
};
pub use domain::{
    AcceptanceCriterion, Criteria, Extraction, StoryRecord, TestCaseDraft, MISSING_SUMMARY,
    PLACEHOLDER_CRITERION,
};
pub use error::{PipelineError, Result};
pub use fingerprint::fingerprint;
pub use locator::{locate_field, RawValue};
pub use normalize::normalize_lines;
pub use orchestrator::{comment_text, Orchestrator, Progress, RunPlan, RunReport, SilentProgress};
pub use shape::{FieldShape, ShapeKind, RICH_TEXT_SENTINEL};
pub use synth::{render_body, render_title, synthesize};

pub use obs::{
    emit_criteria_extracted, emit_draft_filed, emit_placeholder_used, emit_run_aborted,
    emit_run_finished, emit_run_started, run_span, RunSpan,
};
pub use telemetry::init_tracing;

/// Storycheck version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
