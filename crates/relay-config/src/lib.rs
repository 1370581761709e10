//! Configuration model for the GitHub to Slack relay.
//!
//! Loaded once at startup from a TOML file and passed by reference into every
//! component constructor; nothing here mutates after load.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Configuration {
    pub github: GithubConfiguration,
    pub slack: SlackConfiguration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfiguration {
    pub token: String,
    pub org: String,
    pub team: String,
    pub secret_key: String,
    #[serde(default)]
    pub ignored_pr_users: Vec<String>,
    #[serde(default)]
    pub ignored_repos: Vec<String>,
    #[serde(default)]
    pub ignored_comment_users: Vec<String>,
    #[serde(default)]
    pub ignored_review_users: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackConfiguration {
    pub token: String,
    pub channel_id: String,
    #[serde(default)]
    pub github_login_to_slack_email: Vec<GithubLoginToSlackEmail>,
    #[serde(default)]
    pub emoji: EmojiConfiguration,
}

/// One identity mapping entry: a GitHub login and the Slack account email it
/// should be rendered as.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubLoginToSlackEmail {
    pub github_login: String,
    pub slack_email: String,
}

/// Reaction names applied to a tracked item's notification message. Each
/// falls back to a well-known default when unset.
#[derive(Debug, Clone, Deserialize)]
pub struct EmojiConfiguration {
    #[serde(default = "default_approve_emoji")]
    pub approve: String,
    #[serde(default = "default_merge_emoji")]
    pub merge: String,
    #[serde(default = "default_close_emoji")]
    pub close: String,
}

impl Default for EmojiConfiguration {
    fn default() -> Self {
        Self {
            approve: default_approve_emoji(),
            merge: default_merge_emoji(),
            close: default_close_emoji(),
        }
    }
}

fn default_approve_emoji() -> String {
    "+1".to_string()
}

fn default_merge_emoji() -> String {
    "merged".to_string()
}

fn default_close_emoji() -> String {
    "x".to_string()
}

/// Loads and validates the relay configuration from a TOML file.
pub fn load_configuration(path: &Path) -> Result<Configuration> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let configuration: Configuration = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    validate_configuration(&configuration)?;
    Ok(configuration)
}

fn validate_configuration(configuration: &Configuration) -> Result<()> {
    let required = [
        ("github.token", &configuration.github.token),
        ("github.org", &configuration.github.org),
        ("github.team", &configuration.github.team),
        ("github.secret_key", &configuration.github.secret_key),
        ("slack.token", &configuration.slack.token),
        ("slack.channel_id", &configuration.slack.channel_id),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            bail!("config field {field} must be non-empty");
        }
    }
    Ok(())
}
