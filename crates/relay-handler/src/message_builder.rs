//! Notification text templates. These are exact formats: channel consumers
//! and the history-search correlation both depend on the rendered bytes, so
//! nothing here truncates or escapes.

use relay_github::{IssueComment, PullRequest, ReviewComment};

/// Top-level notification posted the first time a pull request is seen. The
/// embedded URL doubles as the correlation key for every later lifecycle
/// event.
pub fn pr_opened_message(descriptor: &str, pull_request: &PullRequest) -> String {
    format!(
        "{descriptor} {}:\n{}",
        pull_request.title, pull_request.html_url
    )
}

/// Threaded reply for an inline review comment, quoting the diff position.
pub fn review_comment_message(descriptor: &str, comment: &ReviewComment) -> String {
    format!(
        "{descriptor} left a <{}|comment>:\n> @L{} {}\n{}",
        comment.html_url,
        comment.line.unwrap_or(0),
        comment.path,
        comment.body
    )
}

/// Threaded reply for a top-level issue or pull request comment.
pub fn issue_comment_message(descriptor: &str, comment: &IssueComment) -> String {
    format!(
        "{descriptor} left a <{}|comment>:\n{}",
        comment.html_url, comment.body
    )
}
