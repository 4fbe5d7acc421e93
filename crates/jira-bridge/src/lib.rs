//! Jira-Bridge: issue tracker access for storycheck
//!
//! This crate is the only place that knows how the tracker is reached.
//! The pipeline depends on the [`IssueTracker`] port; this crate supplies a
//! Jira Cloud implementation and an in-memory fake.
//!
//! ## Key Components
//!
//! - `IssueTracker`: async port (fetch, create, link, comment)
//! - `JiraClient`: REST v3 implementation over `reqwest`
//! - `JiraConfig`: site URL and basic-auth credentials
//! - `fakes::MemoryTracker`: recording fake with failure injection

pub mod adf;
mod client;
mod config;
mod error;
pub mod fakes;
pub mod tracker;

pub use client::JiraClient;
pub use config::{JiraConfig, ENV_API_TOKEN, ENV_BASE_URL, ENV_EMAIL};
pub use error::{ConfigError, TrackerError};
pub use tracker::{
    DescriptionFormat, IssueKey, IssueTracker, LinkRequest, NewIssue, TrackerResult,
};
