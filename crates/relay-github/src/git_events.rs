//! Deserialized webhook payload shapes for the event kinds the relay reacts
//! to. Only the fields the router consumes are modeled; anything else in the
//! payload is ignored by serde.

use serde::Deserialize;

/// Webhook event kinds the relay recognizes, keyed off the
/// `X-GitHub-Event` request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitEventKind {
    PullRequest,
    PullRequestReview,
    PullRequestReviewComment,
    IssueComment,
}

impl GitEventKind {
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "pull_request" => Some(Self::PullRequest),
            "pull_request_review" => Some(Self::PullRequestReview),
            "pull_request_review_comment" => Some(Self::PullRequestReviewComment),
            "issue_comment" => Some(Self::IssueComment),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PullRequest => "pull_request",
            Self::PullRequestReview => "pull_request_review",
            Self::PullRequestReviewComment => "pull_request_review_comment",
            Self::IssueComment => "issue_comment",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitUser {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub html_url: String,
    pub title: String,
    pub user: GitUser,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub merged_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    pub action: String,
    pub pull_request: PullRequest,
    pub repository: Repository,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    pub state: String,
    pub user: GitUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestReviewEvent {
    pub action: String,
    pub review: Review,
    pub pull_request: PullRequest,
    pub repository: Repository,
}

/// Inline review comment anchored to a file position in the diff.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewComment {
    pub html_url: String,
    pub body: String,
    pub path: String,
    #[serde(default)]
    pub line: Option<u64>,
    pub user: GitUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestReviewCommentEvent {
    pub action: String,
    pub comment: ReviewComment,
    pub pull_request: PullRequest,
    pub repository: Repository,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub html_url: String,
    pub user: GitUser,
}

/// Top-level comment on an issue or pull request conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    pub html_url: String,
    pub body: String,
    pub user: GitUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueCommentEvent {
    pub action: String,
    pub issue: Issue,
    pub comment: IssueComment,
    pub repository: Repository,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_round_trips_known_names() {
        for name in [
            "pull_request",
            "pull_request_review",
            "pull_request_review_comment",
            "issue_comment",
        ] {
            let kind = GitEventKind::from_event_name(name).unwrap();
            assert_eq!(kind.as_str(), name);
        }
    }

    #[test]
    fn event_kind_rejects_unknown_names() {
        assert!(GitEventKind::from_event_name("push").is_none());
        assert!(GitEventKind::from_event_name("").is_none());
    }

    #[test]
    fn parses_pull_request_event_payload() {
        let payload = serde_json::json!({
            "action": "opened",
            "pull_request": {
                "html_url": "https://github.com/acme/widgets/pull/7",
                "title": "Add widget cache",
                "user": { "login": "octocat" },
                "draft": false,
                "merged_at": null,
                "extra_field": "ignored",
            },
            "repository": { "name": "widgets" },
        });
        let event: PullRequestEvent = serde_json::from_value(payload).unwrap();
        assert_eq!(event.action, "opened");
        assert_eq!(event.pull_request.title, "Add widget cache");
        assert!(!event.pull_request.draft);
        assert!(event.pull_request.merged_at.is_none());
        assert_eq!(event.repository.name, "widgets");
    }

    #[test]
    fn draft_flag_defaults_to_false_when_absent() {
        let payload = serde_json::json!({
            "action": "opened",
            "pull_request": {
                "html_url": "https://github.com/acme/widgets/pull/8",
                "title": "No draft field",
                "user": { "login": "octocat" },
            },
            "repository": { "name": "widgets" },
        });
        let event: PullRequestEvent = serde_json::from_value(payload).unwrap();
        assert!(!event.pull_request.draft);
    }

    #[test]
    fn review_comment_line_is_optional() {
        let payload = serde_json::json!({
            "action": "created",
            "comment": {
                "html_url": "https://github.com/acme/widgets/pull/7#discussion_r1",
                "body": "nit",
                "path": "src/lib.rs",
                "user": { "login": "reviewer" },
            },
            "pull_request": {
                "html_url": "https://github.com/acme/widgets/pull/7",
                "title": "Add widget cache",
                "user": { "login": "octocat" },
            },
            "repository": { "name": "widgets" },
        });
        let event: PullRequestReviewCommentEvent = serde_json::from_value(payload).unwrap();
        assert!(event.comment.line.is_none());
    }

    #[test]
    fn rejects_payload_missing_required_fields() {
        let payload = serde_json::json!({
            "action": "created",
            "repository": { "name": "widgets" },
        });
        assert!(serde_json::from_value::<IssueCommentEvent>(payload).is_err());
    }
}
