//! Core event-to-message engine: relevance filtering, notification
//! rendering, identity resolution, and the per-item lifecycle router that
//! keeps the channel message in sync with its pull request or issue.

mod git_handler;
mod message_builder;
mod user_resolver;

pub use git_handler::{correlation_key, GitHandler};
pub use message_builder::{issue_comment_message, pr_opened_message, review_comment_message};
pub use user_resolver::UserResolver;
