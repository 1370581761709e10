//! Identity checks and GitHub-login to Slack-mention resolution.

use std::sync::Arc;

use relay_config::GithubLoginToSlackEmail;
use relay_slack::ChatConnector;

/// Read-only identity service: team membership, per-kind ignore lists, and
/// mention rendering with a plain-text fallback. All lists are fixed for the
/// process lifetime.
pub struct UserResolver {
    chat: Arc<dyn ChatConnector>,
    team_members: Vec<String>,
    mappings: Vec<GithubLoginToSlackEmail>,
    ignored_comment_users: Vec<String>,
    ignored_review_users: Vec<String>,
}

impl UserResolver {
    pub fn new(
        chat: Arc<dyn ChatConnector>,
        team_members: Vec<String>,
        mappings: Vec<GithubLoginToSlackEmail>,
        ignored_comment_users: Vec<String>,
        ignored_review_users: Vec<String>,
    ) -> Self {
        Self {
            chat,
            team_members,
            mappings,
            ignored_comment_users,
            ignored_review_users,
        }
    }

    pub fn is_team_member(&self, login: &str) -> bool {
        self.team_members.iter().any(|member| member == login)
    }

    pub fn is_ignored_comment_user(&self, login: &str) -> bool {
        self.ignored_comment_users.iter().any(|user| user == login)
    }

    pub fn is_ignored_review_user(&self, login: &str) -> bool {
        self.ignored_review_users.iter().any(|user| user == login)
    }

    /// Renders a login as a Slack mention when an identity mapping exists and
    /// the workspace lookup succeeds; otherwise degrades to the login
    /// verbatim. Never fails.
    pub async fn describe(&self, login: &str) -> String {
        let Some(mapping) = self
            .mappings
            .iter()
            .find(|entry| entry.github_login == login)
        else {
            tracing::warn!(login, "no slack email mapping for github login");
            return login.to_string();
        };
        match self.chat.user_id_by_email(&mapping.slack_email).await {
            Ok(user_id) => format!("<@{user_id}>"),
            Err(error) => {
                tracing::error!(login, error = %error, "slack user lookup failed");
                login.to_string()
            }
        }
    }
}
