//! Run orchestration.
//!
//! A run is: fetch the story, extract and normalize its criteria,
//! synthesize drafts, then (depending on mode) write them to disk and/or
//! file each one as an issue linked back to the story. Every tracker call is
//! awaited before the next one starts, and the first failure ends the run.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use jira_bridge::{IssueKey, IssueTracker, LinkRequest, NewIssue, TrackerError};
use serde::Serialize;
use tracing::Instrument;

use crate::artifacts;
use crate::config::{RunConfig, RunMode};
use crate::domain::{Criteria, StoryRecord, TestCaseDraft, SUMMARY_FIELD};
use crate::error::{PipelineError, Result};
use crate::fingerprint::fingerprint;
use crate::obs;
use crate::shape::ShapeKind;
use crate::synth::synthesize;

/// User-facing progress callbacks.
///
/// Structured logs are emitted regardless; this is for the run output the
/// caller shows to a person. All methods default to no-ops.
pub trait Progress: Send + Sync {
    /// No criteria were found and the placeholder is used.
    fn placeholder_used(&self, _story: &IssueKey, _field_id: &str) {}

    /// A draft was created as `created` and linked to `story`.
    fn draft_filed(&self, _created: &IssueKey, _story: &IssueKey) {}

    fn artifact_written(&self, _path: &Path) {}
}

/// Progress sink that reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl Progress for SilentProgress {}

static SILENT: SilentProgress = SilentProgress;

/// Everything derived from the story before any side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub story: StoryRecord,
    pub shape: ShapeKind,
    pub criteria: Criteria,
    pub drafts: Vec<TestCaseDraft>,
    pub fingerprint: String,
}

impl RunPlan {
    pub fn placeholder_used(&self) -> bool {
        self.criteria.is_placeholder()
    }
}

/// Final outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub story_key: IssueKey,
    pub summary: String,
    pub mode: RunMode,
    pub shape: ShapeKind,
    pub placeholder_used: bool,
    pub criteria: Vec<String>,
    pub drafts: Vec<TestCaseDraft>,
    /// Created issue keys, in creation order
    pub created: Vec<IssueKey>,
    pub artifacts: Vec<PathBuf>,
    pub fingerprint: String,
    pub commented: bool,
    pub generated_at: DateTime<Utc>,
}

/// Drives one run against an optional tracker.
///
/// A tracker is required to fetch the story, to file drafts and to comment.
/// Repo mode over a story supplied by the caller needs none.
pub struct Orchestrator<'a> {
    config: &'a RunConfig,
    tracker: Option<&'a dyn IssueTracker>,
    progress: &'a dyn Progress,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Orchestrator {
            config,
            tracker: None,
            progress: &SILENT,
        }
    }

    pub fn with_tracker(mut self, tracker: &'a dyn IssueTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn Progress) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &RunConfig {
        self.config
    }

    fn tracker(&self, operation: &str) -> Result<&'a dyn IssueTracker> {
        self.tracker.ok_or_else(|| PipelineError::TrackerUnavailable {
            operation: operation.to_string(),
        })
    }

    /// Fetch the configured story with its summary and criteria field.
    pub async fn fetch_story(&self) -> Result<StoryRecord> {
        let tracker = self.tracker("fetch story")?;
        let key = &self.config.story_key;
        let fields = [SUMMARY_FIELD, self.config.field_id.as_str()];
        let document = tracker.fetch_issue(key, &fields).await?;
        Ok(StoryRecord::from_document(
            key.clone(),
            &document,
            &self.config.field_id,
        ))
    }

    /// Extract, normalize and synthesize. No side effects beyond logging.
    pub fn plan(&self, story: StoryRecord) -> RunPlan {
        let key = story.key.as_str();
        let extraction = story.extract_criteria();
        let criteria = extraction.criteria;

        obs::emit_criteria_extracted(
            key,
            &self.config.field_id,
            extraction.shape.as_str(),
            criteria.count(),
        );
        if criteria.is_placeholder() {
            obs::emit_placeholder_used(key, &self.config.field_id);
            self.progress
                .placeholder_used(&story.key, &self.config.field_id);
        }

        let drafts = synthesize(&story, &criteria);
        let fingerprint = fingerprint(&story.summary, &criteria, &self.config.project_key);

        RunPlan {
            story,
            shape: extraction.shape,
            criteria,
            drafts,
            fingerprint,
        }
    }

    /// Create and link each draft in order.
    ///
    /// The first failing call ends the loop. When issues were already
    /// created the error is [`PipelineError::Interrupted`] carrying them.
    pub async fn file_drafts(&self, plan: &RunPlan) -> Result<Vec<IssueKey>> {
        let tracker = self.tracker("file drafts")?;
        let story_key = &plan.story.key;
        let mut created: Vec<IssueKey> = Vec::with_capacity(plan.drafts.len());

        for draft in &plan.drafts {
            let issue = NewIssue {
                project_key: self.config.project_key.clone(),
                issue_type: self.config.issue_type.clone(),
                summary: draft.title.clone(),
                description: draft.body.clone(),
                format: self.config.description_format,
                labels: self.config.labels.clone(),
            };
            let key = match tracker.create_issue(&issue).await {
                Ok(key) => key,
                Err(source) => return Err(abort(created, None, source)),
            };
            created.push(key.clone());

            let link = LinkRequest::new(
                key.clone(),
                story_key.clone(),
                self.config.link_type.as_str(),
            );
            if let Err(source) = tracker.link_issues(&link).await {
                return Err(abort(created, Some(key), source));
            }

            obs::emit_draft_filed(
                story_key.as_str(),
                key.as_str(),
                draft.source_index,
                plan.drafts.len(),
            );
            self.progress.draft_filed(&key, story_key);
        }
        Ok(created)
    }

    /// Write the plan's drafts under the configured output directory.
    pub fn write_artifacts(&self, plan: &RunPlan) -> Result<Vec<PathBuf>> {
        let written = artifacts::write_artifacts(
            &self.config.out_dir,
            &plan.story,
            &plan.criteria,
            &plan.drafts,
        )?;
        for path in &written {
            obs::emit_artifact_written(plan.story.key.as_str(), &path.display().to_string());
            self.progress.artifact_written(path);
        }
        Ok(written)
    }

    /// Run the pipeline over an already-fetched story.
    pub async fn execute(&self, story: StoryRecord) -> Result<RunReport> {
        let span = obs::run_span(story.key.as_str());
        let key = story.key.clone();
        let start = Instant::now();
        obs::emit_run_started(key.as_str(), self.config.mode.as_str());

        let result = self.execute_inner(story).instrument(span).await;
        match &result {
            Ok(report) => obs::emit_run_finished(
                key.as_str(),
                start.elapsed().as_millis() as u64,
                report.created.len(),
                &report.fingerprint,
            ),
            Err(e) => obs::emit_run_aborted(key.as_str(), e.created().len(), e),
        }
        result
    }

    async fn execute_inner(&self, story: StoryRecord) -> Result<RunReport> {
        let mode = self.config.mode;
        if mode.files_issues() {
            self.tracker("file drafts")?;
        }

        let plan = self.plan(story);

        let artifacts = if mode.writes_artifacts() {
            self.write_artifacts(&plan)?
        } else {
            Vec::new()
        };

        let created = if mode.files_issues() {
            self.file_drafts(&plan).await?
        } else {
            Vec::new()
        };

        let commented = self.config.comment && self.post_comment(&plan, &created).await;

        Ok(RunReport {
            story_key: plan.story.key.clone(),
            summary: plan.story.summary.clone(),
            mode,
            shape: plan.shape,
            placeholder_used: plan.placeholder_used(),
            criteria: plan.criteria.texts().into_iter().map(str::to_string).collect(),
            drafts: plan.drafts,
            created,
            artifacts,
            fingerprint: plan.fingerprint,
            commented,
            generated_at: Utc::now(),
        })
    }

    /// Fetch the story from the tracker, then [`execute`](Self::execute).
    pub async fn run(&self) -> Result<RunReport> {
        let story = self.fetch_story().await.inspect_err(|e| {
            obs::emit_run_aborted(self.config.story_key.as_str(), 0, e);
        })?;
        self.execute(story).await
    }

    /// Post the run summary on the story. Failures are logged, not returned.
    async fn post_comment(&self, plan: &RunPlan, created: &[IssueKey]) -> bool {
        let story_key = plan.story.key.as_str();
        let tracker = match self.tracker("comment on story") {
            Ok(tracker) => tracker,
            Err(e) => {
                obs::emit_comment_failed(story_key, &e);
                return false;
            }
        };

        let body = comment_text(plan.drafts.len(), self.config.mode, &plan.fingerprint, created);
        match tracker.add_comment(&plan.story.key, &body).await {
            Ok(()) => true,
            Err(e) => {
                obs::emit_comment_failed(story_key, &e);
                false
            }
        }
    }
}

/// Story comment summarizing a run.
pub fn comment_text(
    count: usize,
    mode: RunMode,
    fingerprint: &str,
    created: &[IssueKey],
) -> String {
    let mut text =
        format!("storycheck: generated {count} test(s) (mode={mode}, fingerprint={fingerprint}).");
    if !created.is_empty() {
        let keys: Vec<&str> = created.iter().map(IssueKey::as_str).collect();
        text.push_str(&format!(" Created tests: {}", keys.join(", ")));
    }
    text
}

fn abort(
    created: Vec<IssueKey>,
    unlinked: Option<IssueKey>,
    source: TrackerError,
) -> PipelineError {
    if created.is_empty() {
        PipelineError::Tracker(source)
    } else {
        PipelineError::Interrupted {
            created,
            unlinked,
            source,
        }
    }
}
