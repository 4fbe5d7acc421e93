//! Jira connection settings.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable holding the Jira site URL
pub const ENV_BASE_URL: &str = "JIRA_BASE_URL";
/// Environment variable holding the account email
pub const ENV_EMAIL: &str = "JIRA_EMAIL";
/// Environment variable holding the API token
pub const ENV_API_TOKEN: &str = "JIRA_API_TOKEN";

/// Jira Cloud connection configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct JiraConfig {
    /// Site URL, without trailing slash (e.g. `https://acme.atlassian.net`)
    pub base_url: String,
    /// Account email used for basic auth
    pub email: String,
    /// API token used for basic auth
    pub token: String,
}

impl JiraConfig {
    /// Build a config from possibly-unset values.
    ///
    /// Values are trimmed; unset or blank values are reported together in a
    /// single [`ConfigError::Missing`], named by their environment variable.
    pub fn new(
        base_url: Option<&str>,
        email: Option<&str>,
        token: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut take = |name: &str, value: Option<&str>| -> String {
            match value.map(str::trim).filter(|v| !v.is_empty()) {
                Some(v) => v.to_string(),
                None => {
                    missing.push(name.to_string());
                    String::new()
                }
            }
        };

        let base_url = take(ENV_BASE_URL, base_url);
        let email = take(ENV_EMAIL, email);
        let token = take(ENV_API_TOKEN, token);

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                ENV_BASE_URL,
                format!("expected an http(s) URL, got `{base_url}`"),
            ));
        }

        Ok(JiraConfig {
            base_url,
            email,
            token,
        })
    }

    /// Create a config from `JIRA_BASE_URL`, `JIRA_EMAIL` and `JIRA_API_TOKEN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var(ENV_BASE_URL).ok();
        let email = std::env::var(ENV_EMAIL).ok();
        let token = std::env::var(ENV_API_TOKEN).ok();
        Self::new(base_url.as_deref(), email.as_deref(), token.as_deref())
    }

    /// Token safe for logs: the first four characters, then an ellipsis.
    pub fn masked_token(&self) -> String {
        if self.token.chars().count() > 4 {
            let head: String = self.token.chars().take(4).collect();
            format!("{head}…")
        } else {
            "***".to_string()
        }
    }
}

impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("token", &self.masked_token())
            .finish()
    }
}
