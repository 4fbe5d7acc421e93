//! Structured lifecycle events for a storycheck run.
//!
//! - `RunSpan` tags everything logged during a run with the story key
//! - `emit_*` functions log one event each, with an `event` field naming it
//!
//! Normal progress is logged at `info!`; the placeholder path, a failed
//! comment and an aborted run at `warn!`.

use tracing::{info, warn};

/// RAII guard that enters a story-scoped span for the duration of a run.
///
/// ```ignore
/// let _span = RunSpan::enter("SCRUM-1");
/// // events below carry story_key = "SCRUM-1"
/// ```
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(story_key: &str) -> Self {
        Self {
            _span: run_span(story_key).entered(),
        }
    }
}

/// Story-scoped span for async code, to be attached with `Instrument`.
///
/// An entered guard must not be held across `.await`.
pub fn run_span(story_key: &str) -> tracing::Span {
    tracing::info_span!("storycheck.run", story_key = %story_key)
}

pub fn emit_run_started(story_key: &str, mode: &str) {
    info!(event = "run.started", story_key = %story_key, mode = %mode);
}

/// Emit event: criteria extracted, with the detected field shape.
pub fn emit_criteria_extracted(story_key: &str, field_id: &str, shape: &str, count: usize) {
    info!(
        event = "criteria.extracted",
        story_key = %story_key,
        field_id = %field_id,
        shape = %shape,
        count = count,
    );
}

/// Emit event: no criteria found, placeholder used (warning level).
pub fn emit_placeholder_used(story_key: &str, field_id: &str) {
    warn!(
        event = "criteria.placeholder",
        story_key = %story_key,
        field_id = %field_id,
        "No AC found in {field_id} for {story_key}; creating a placeholder test."
    );
}

/// Emit event: one draft created and linked.
pub fn emit_draft_filed(story_key: &str, issue_key: &str, index: usize, total: usize) {
    info!(
        event = "draft.filed",
        story_key = %story_key,
        issue_key = %issue_key,
        index = index,
        total = total,
    );
}

pub fn emit_artifact_written(story_key: &str, path: &str) {
    info!(event = "artifact.written", story_key = %story_key, path = %path);
}

/// Emit event: story comment could not be posted (warning level).
pub fn emit_comment_failed(story_key: &str, error: &dyn std::fmt::Display) {
    warn!(event = "comment.failed", story_key = %story_key, error = %error);
}

pub fn emit_run_finished(story_key: &str, duration_ms: u64, created: usize, fingerprint: &str) {
    info!(
        event = "run.finished",
        story_key = %story_key,
        duration_ms = duration_ms,
        created = created,
        fingerprint = %fingerprint,
    );
}

/// Emit event: run aborted by a failed call (warning level).
pub fn emit_run_aborted(story_key: &str, created: usize, error: &dyn std::fmt::Display) {
    warn!(
        event = "run.aborted",
        story_key = %story_key,
        created = created,
        error = %error,
    );
}
