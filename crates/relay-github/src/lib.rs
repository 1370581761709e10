//! GitHub collaborator for the relay: webhook payload types, webhook
//! signature verification, and the startup team-roster client.

mod git_events;
mod github_connector;
mod webhook_signature;

pub use git_events::{
    GitEventKind, GitUser, Issue, IssueComment, IssueCommentEvent, PullRequest, PullRequestEvent,
    PullRequestReviewCommentEvent, PullRequestReviewEvent, Repository, Review, ReviewComment,
};
pub use github_connector::GithubConnector;
pub use webhook_signature::verify_github_signature;
