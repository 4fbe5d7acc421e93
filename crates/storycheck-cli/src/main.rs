//! Storycheck - acceptance criteria to test issues
//!
//! The `storycheck` command reads a story's acceptance-criteria field and
//! turns every criterion line into a test case.
//!
//! ## Commands
//!
//! - `run`: file one test issue per criterion (and/or write them to disk)
//! - `preview`: show the drafts a run would produce, without side effects

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use jira_bridge::{DescriptionFormat, IssueKey, JiraClient, JiraConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use storycheck_core::{
    Orchestrator, PipelineError, Progress, RunConfig, RunConfigBuilder, RunMode, RunPlan,
    RunReport, RunSpan, ShapeKind, SilentProgress, StoryRecord, TestCaseDraft, DEFAULT_FIELD_ID,
    DEFAULT_ISSUE_TYPE, DEFAULT_LINK_TYPE, DEFAULT_OUT_DIR, DEFAULT_PROJECT_KEY,
    DEFAULT_STORY_KEY,
};

#[derive(Parser)]
#[command(name = "storycheck")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Turn story acceptance criteria into test cases", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate test cases for a story and file and/or write them
    Run {
        #[command(flatten)]
        story: StoryArgs,

        #[command(flatten)]
        jira: JiraArgs,

        /// Where drafts go: jira, repo or both
        #[arg(long, default_value = "jira")]
        mode: RunMode,

        /// Label attached to every created issue (repeatable)
        #[arg(long = "label")]
        labels: Vec<String>,

        /// Issue description format: plain or adf
        #[arg(long, default_value = "plain")]
        description_format: DescriptionFormat,

        /// Post a summary comment on the story after the run
        #[arg(long)]
        comment: bool,

        /// Output directory for repo mode
        #[arg(long, default_value = DEFAULT_OUT_DIR)]
        out_dir: PathBuf,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the drafts a run would produce without filing or writing them
    Preview {
        #[command(flatten)]
        story: StoryArgs,

        #[command(flatten)]
        jira: JiraArgs,

        /// Print the preview as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Which story to read and how to file its tests.
#[derive(Args, Debug, Clone)]
struct StoryArgs {
    /// Story to generate tests for
    #[arg(long, env = "STORY_KEY", default_value = DEFAULT_STORY_KEY)]
    story_key: String,

    /// Project the test issues are created in
    #[arg(long, env = "JIRA_PROJECT_KEY", default_value = DEFAULT_PROJECT_KEY)]
    project_key: String,

    /// Issue type name for created tests
    #[arg(long, env = "TEST_ISSUE_TYPE", default_value = DEFAULT_ISSUE_TYPE)]
    issue_type: String,

    /// Link type name between a test and its story
    #[arg(long, env = "ISSUE_LINK_TYPE", default_value = DEFAULT_LINK_TYPE)]
    link_type: String,

    /// Identifier of the acceptance-criteria field
    #[arg(long, env = "AC_FIELD_ID", default_value = DEFAULT_FIELD_ID)]
    field_id: String,

    /// Read the story JSON from a file instead of fetching it
    #[arg(long)]
    story_file: Option<PathBuf>,
}

/// Jira site and credentials.
#[derive(Args, Debug, Clone, Default)]
struct JiraArgs {
    /// Jira site URL, e.g. https://acme.atlassian.net
    #[arg(long, env = "JIRA_BASE_URL")]
    base_url: Option<String>,

    /// Account email for basic auth
    #[arg(long, env = "JIRA_EMAIL")]
    email: Option<String>,

    /// API token for basic auth
    #[arg(long, env = "JIRA_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,
}

impl JiraArgs {
    fn connect(&self) -> Result<JiraClient> {
        let config = JiraConfig::new(
            self.base_url.as_deref(),
            self.email.as_deref(),
            self.api_token.as_deref(),
        )
        .context("Jira settings are incomplete")?;

        info!(
            base_url = %config.base_url,
            email = %config.email,
            token = %config.masked_token(),
            "using Jira site"
        );
        JiraClient::new(config).context("Failed to set up Jira client")
    }
}

/// Prints the per-draft progress lines.
struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn placeholder_used(&self, story: &IssueKey, field_id: &str) {
        println!("⚠️  No AC found in {field_id} for {story}; creating a placeholder test.");
    }

    fn draft_filed(&self, created: &IssueKey, story: &IssueKey) {
        println!("✅ Created {created} and linked to {story}");
    }

    fn artifact_written(&self, path: &Path) {
        println!("📝 Wrote {}", path.display());
    }
}

/// Output of `preview --json`.
#[derive(Serialize)]
struct PreviewOutput<'a> {
    story_key: &'a IssueKey,
    summary: &'a str,
    shape: ShapeKind,
    placeholder_used: bool,
    fingerprint: &'a str,
    drafts: &'a [TestCaseDraft],
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    storycheck_core::init_tracing(cli.json_logs, level);

    match cli.command {
        Commands::Run {
            story,
            jira,
            mode,
            labels,
            description_format,
            comment,
            out_dir,
            json,
        } => {
            let config = run_config(&story)
                .mode(mode)
                .labels(labels)
                .description_format(description_format)
                .comment(comment)
                .out_dir(out_dir)
                .build()
                .context("Invalid run configuration")?;
            // Keep stdout clean for the JSON report.
            let progress: &dyn Progress = if json { &SilentProgress } else { &ConsoleProgress };
            let report = cmd_run(&config, story.story_file.as_deref(), &jira, progress).await?;
            print_report(&report, json)
        }
        Commands::Preview { story, jira, json } => {
            let config = run_config(&story)
                .build()
                .context("Invalid run configuration")?;
            cmd_preview(&config, story.story_file.as_deref(), &jira, json).await
        }
    }
}

fn run_config(story: &StoryArgs) -> RunConfigBuilder {
    RunConfig::builder()
        .story_key(&story.story_key)
        .project_key(&story.project_key)
        .issue_type(&story.issue_type)
        .link_type(&story.link_type)
        .field_id(&story.field_id)
}

/// Read a story document from disk.
fn read_story(path: &Path, config: &RunConfig) -> Result<StoryRecord> {
    let document = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read story file: {}", path.display()))?;
    Ok(StoryRecord::from_document(
        config.story_key.clone(),
        &document,
        &config.field_id,
    ))
}

/// Run the pipeline. Connects to Jira only when the run needs it.
async fn cmd_run(
    config: &RunConfig,
    story_file: Option<&Path>,
    jira: &JiraArgs,
    progress: &dyn Progress,
) -> Result<RunReport> {
    let needs_tracker = story_file.is_none() || config.mode.files_issues() || config.comment;
    let client = if needs_tracker {
        Some(jira.connect()?)
    } else {
        None
    };

    let mut orchestrator = Orchestrator::new(config).with_progress(progress);
    if let Some(client) = &client {
        orchestrator = orchestrator.with_tracker(client);
    }

    let result = match story_file {
        Some(path) => orchestrator.execute(read_story(path, config)?).await,
        None => orchestrator.run().await,
    };

    result.map_err(|err| {
        report_created_before_failure(&err, &config.story_key);
        anyhow::Error::new(err).context(format!("Run for {} failed", config.story_key))
    })
}

fn report_created_before_failure(err: &PipelineError, story: &IssueKey) {
    let created = err.created();
    if created.is_empty() {
        return;
    }
    eprintln!("Created before failure: [{}]", join_keys(created));
    if let PipelineError::Interrupted {
        unlinked: Some(key),
        ..
    } = err
    {
        eprintln!("{key} was created but not linked to {story}");
    }
}

fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
        println!("{out}");
        return Ok(());
    }

    if report.mode.files_issues() {
        println!("Done. Created tests: [{}]", join_keys(&report.created));
    } else {
        println!(
            "Done. Wrote {} file(s) for {}",
            report.artifacts.len(),
            report.story_key
        );
    }
    println!("Fingerprint: {}", report.fingerprint);
    Ok(())
}

/// Show the drafts for a story without creating or writing anything.
async fn cmd_preview(
    config: &RunConfig,
    story_file: Option<&Path>,
    jira: &JiraArgs,
    json: bool,
) -> Result<()> {
    let story = match story_file {
        Some(path) => read_story(path, config)?,
        None => {
            let client = jira.connect()?;
            Orchestrator::new(config)
                .with_tracker(&client)
                .fetch_story()
                .await
                .with_context(|| format!("Failed to fetch {}", config.story_key))?
        }
    };

    let plan = {
        let _span = RunSpan::enter(story.key.as_str());
        Orchestrator::new(config).plan(story)
    };

    if json {
        let out = serde_json::to_string_pretty(&preview_output(&plan))
            .context("Failed to serialize preview")?;
        println!("{out}");
    } else {
        print!("{}", render_preview(&plan));
    }
    Ok(())
}

fn preview_output(plan: &RunPlan) -> PreviewOutput<'_> {
    PreviewOutput {
        story_key: &plan.story.key,
        summary: &plan.story.summary,
        shape: plan.shape,
        placeholder_used: plan.placeholder_used(),
        fingerprint: &plan.fingerprint,
        drafts: &plan.drafts,
    }
}

fn render_preview(plan: &RunPlan) -> String {
    let mut out = format!(
        "{} — {} ({} draft(s), field shape: {})\n",
        plan.story.key,
        plan.story.summary,
        plan.drafts.len(),
        plan.shape
    );
    for draft in &plan.drafts {
        out.push_str(&format!("\n== {} ==\n{}\n", draft.title, draft.body));
    }
    out
}

fn join_keys(keys: &[IssueKey]) -> String {
    keys.iter()
        .map(IssueKey::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
