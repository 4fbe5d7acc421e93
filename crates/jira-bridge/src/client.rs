//! Jira Cloud REST client
//!
//! Implements [`IssueTracker`] against the Jira Cloud REST API v3 using
//! basic auth (account email + API token).

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::adf;
use crate::config::JiraConfig;
use crate::error::TrackerError;
use crate::tracker::{IssueKey, IssueTracker, LinkRequest, NewIssue, TrackerResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct CreatedIssue {
    key: String,
}

/// Jira client for issue fetch, creation, linking and comments
#[derive(Debug)]
pub struct JiraClient {
    config: JiraConfig,
    http_client: reqwest::Client,
}

impl JiraClient {
    /// Create a new Jira client
    pub fn new(config: JiraConfig) -> TrackerResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("storycheck-jira-bridge/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TrackerError::ClientSetup(e.to_string()))?;

        Ok(JiraClient {
            config,
            http_client,
        })
    }

    /// Connection settings in use.
    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/rest/api/3/{}", self.config.base_url, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .basic_auth(&self.config.email, Some(&self.config.token))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Send a request and return the body of a 2xx response.
    ///
    /// Non-2xx responses become [`TrackerError::Status`] carrying the body.
    async fn send(
        &self,
        operation: &str,
        target: &str,
        request: RequestBuilder,
    ) -> TrackerResult<String> {
        debug!(operation, url = %target, "sending tracker request");
        let response = request
            .send()
            .await
            .map_err(|e| TrackerError::transport(operation, target, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TrackerError::transport(operation, target, &e))?;

        if !status.is_success() {
            return Err(TrackerError::Status {
                operation: operation.to_string(),
                target: target.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

/// Extract the assigned key from a `POST /issue` response body.
fn parse_created_key(operation: &str, target: &str, body: &str) -> TrackerResult<IssueKey> {
    let unexpected = || TrackerError::UnexpectedResponse {
        operation: operation.to_string(),
        target: target.to_string(),
        expected: "created issue key".to_string(),
        body: body.to_string(),
    };
    let created: CreatedIssue = serde_json::from_str(body).map_err(|_| unexpected())?;
    IssueKey::parse(&created.key).map_err(|_| unexpected())
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn fetch_issue(&self, key: &IssueKey, fields: &[&str]) -> TrackerResult<String> {
        let url = self.url(&format!("issue/{key}"));
        let fields = fields.join(",");
        info!(issue = %key, fields = %fields, "fetching issue");
        let request = self
            .request(Method::GET, &url)
            .query(&[("fields", fields.as_str())]);
        self.send("GET", &url, request).await
    }

    async fn create_issue(&self, issue: &NewIssue) -> TrackerResult<IssueKey> {
        let url = self.url("issue");
        let request = self.request(Method::POST, &url).json(&issue.to_payload());
        let body = self.send("POST", &url, request).await?;
        let key = parse_created_key("POST", &url, &body)?;
        info!(issue = %key, summary = %issue.summary, "created issue");
        Ok(key)
    }

    async fn link_issues(&self, link: &LinkRequest) -> TrackerResult<()> {
        let url = self.url("issueLink");
        let request = self.request(Method::POST, &url).json(&link.to_payload());
        self.send("POST", &url, request).await?;
        info!(from = %link.from, to = %link.to, relation = %link.relation, "linked issues");
        Ok(())
    }

    async fn add_comment(&self, key: &IssueKey, body: &str) -> TrackerResult<()> {
        let url = self.url(&format!("issue/{key}/comment"));
        let payload = serde_json::json!({ "body": adf::document(body) });
        let request = self.request(Method::POST, &url).json(&payload);
        self.send("POST", &url, request).await?;
        Ok(())
    }
}
