//! Event router: maps validated webhook bodies onto the per-item lifecycle
//! (post, react, reply) recovered from channel history on every event.

use std::sync::Arc;

use relay_config::EmojiConfiguration;
use relay_github::{
    IssueCommentEvent, PullRequestEvent, PullRequestReviewCommentEvent, PullRequestReviewEvent,
};
use relay_slack::{ChatConnector, SlackMessage};
use serde::de::DeserializeOwned;

use crate::message_builder;
use crate::user_resolver::UserResolver;

const ACTION_OPENED: &str = "opened";
const ACTION_READY_FOR_REVIEW: &str = "ready_for_review";
const ACTION_CLOSED: &str = "closed";
const ACTION_REOPENED: &str = "reopened";
const ACTION_SUBMITTED: &str = "submitted";
const REVIEW_STATE_APPROVED: &str = "approved";

// Reopening clears the literal "x" regardless of the configured close emoji;
// a reopened item may have been closed under an older configuration.
const REOPEN_CLEARED_REACTION: &str = "x";

/// Deterministic search key for a tracked item: its URL wrapped in angle
/// brackets, which is how the channel renders the URL inside the creation
/// message.
pub fn correlation_key(item_url: &str) -> String {
    format!("<{item_url}>")
}

pub struct GitHandler {
    chat: Arc<dyn ChatConnector>,
    users: UserResolver,
    emoji: EmojiConfiguration,
    ignored_repos: Vec<String>,
}

impl GitHandler {
    pub fn new(
        chat: Arc<dyn ChatConnector>,
        users: UserResolver,
        emoji: EmojiConfiguration,
        ignored_repos: Vec<String>,
    ) -> Self {
        Self {
            chat,
            users,
            emoji,
            ignored_repos,
        }
    }

    pub async fn handle_pull_request_event(&self, body: &[u8]) {
        let Some(event) = parse_event::<PullRequestEvent>(body) else {
            return;
        };
        if self.is_ignored_repo(&event.repository.name) {
            return;
        }
        if !self.users.is_team_member(&event.pull_request.user.login) {
            return;
        }

        match event.action.as_str() {
            ACTION_OPENED | ACTION_READY_FOR_REVIEW => {
                if event.pull_request.draft {
                    return;
                }
                let descriptor = self.users.describe(&event.pull_request.user.login).await;
                let text = message_builder::pr_opened_message(&descriptor, &event.pull_request);
                if let Err(error) = self.chat.post(&text).await {
                    tracing::error!(error = %error, "failed to post pull request notification");
                }
            }
            ACTION_CLOSED => {
                let Some(message) = self.locate_message(&event.pull_request.html_url).await else {
                    return;
                };
                let reaction = if event.pull_request.merged_at.is_some() {
                    self.emoji.merge.as_str()
                } else {
                    self.emoji.close.as_str()
                };
                if let Err(error) = self.chat.add_reaction(reaction, &message).await {
                    tracing::error!(reaction, error = %error, "failed to add close reaction");
                }
            }
            ACTION_REOPENED => {
                let Some(message) = self.locate_message(&event.pull_request.html_url).await else {
                    return;
                };
                if let Err(error) = self
                    .chat
                    .remove_reaction(REOPEN_CLEARED_REACTION, &message)
                    .await
                {
                    tracing::error!(error = %error, "failed to remove close reaction");
                }
            }
            _ => {}
        }
    }

    pub async fn handle_pull_request_review_event(&self, body: &[u8]) {
        let Some(event) = parse_event::<PullRequestReviewEvent>(body) else {
            return;
        };
        if self.is_ignored_repo(&event.repository.name) {
            return;
        }
        if !self.users.is_team_member(&event.pull_request.user.login) {
            return;
        }
        if self.users.is_ignored_review_user(&event.review.user.login) {
            return;
        }
        if event.action != ACTION_SUBMITTED || event.review.state != REVIEW_STATE_APPROVED {
            return;
        }

        let Some(message) = self.locate_message(&event.pull_request.html_url).await else {
            return;
        };
        if let Err(error) = self.chat.add_reaction(&self.emoji.approve, &message).await {
            tracing::error!(error = %error, "failed to add approval reaction");
        }
    }

    pub async fn handle_pull_request_review_comment_event(&self, body: &[u8]) {
        let Some(event) = parse_event::<PullRequestReviewCommentEvent>(body) else {
            return;
        };
        if self.is_ignored_repo(&event.repository.name) {
            return;
        }
        if !self.users.is_team_member(&event.pull_request.user.login) {
            return;
        }
        if self.users.is_ignored_comment_user(&event.comment.user.login) {
            return;
        }

        let Some(message) = self.locate_message(&event.pull_request.html_url).await else {
            return;
        };
        let descriptor = self.users.describe(&event.comment.user.login).await;
        let text = message_builder::review_comment_message(&descriptor, &event.comment);
        if let Err(error) = self.chat.reply(&message, &text).await {
            tracing::error!(error = %error, "failed to post review comment reply");
        }
    }

    pub async fn handle_issue_comment_event(&self, body: &[u8]) {
        let Some(event) = parse_event::<IssueCommentEvent>(body) else {
            return;
        };
        if self.is_ignored_repo(&event.repository.name) {
            return;
        }
        if !self.users.is_team_member(&event.issue.user.login) {
            return;
        }
        if self.users.is_ignored_comment_user(&event.comment.user.login) {
            return;
        }

        let Some(message) = self.locate_message(&event.issue.html_url).await else {
            return;
        };
        let descriptor = self.users.describe(&event.comment.user.login).await;
        let text = message_builder::issue_comment_message(&descriptor, &event.comment);
        if let Err(error) = self.chat.reply(&message, &text).await {
            tracing::error!(error = %error, "failed to post issue comment reply");
        }
    }

    fn is_ignored_repo(&self, repo_name: &str) -> bool {
        self.ignored_repos.iter().any(|repo| repo == repo_name)
    }

    /// Recovers the notification message for an item from channel history. A
    /// miss drops the event: either the creation message never existed for
    /// this item or the history window rolled past it, and retrying would
    /// not change the answer.
    async fn locate_message(&self, item_url: &str) -> Option<SlackMessage> {
        let key = correlation_key(item_url);
        match self.chat.find_by_key(&key).await {
            Ok(Some(message)) => Some(message),
            Ok(None) => {
                tracing::warn!(key = %key, "no channel message found for item");
                None
            }
            Err(error) => {
                tracing::error!(key = %key, error = %error, "channel history search failed");
                None
            }
        }
    }
}

fn parse_event<T: DeserializeOwned>(body: &[u8]) -> Option<T> {
    match serde_json::from_slice(body) {
        Ok(event) => Some(event),
        Err(error) => {
            tracing::error!(
                error = %error,
                body = %String::from_utf8_lossy(body),
                "failed to parse webhook body"
            );
            None
        }
    }
}
