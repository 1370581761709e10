//! Capability surface the event router consumes to talk to the chat channel.

use anyhow::Result;
use async_trait::async_trait;

/// Opaque handle to a posted channel message. Returned by `post` and by
/// history search; never retained past a single event's processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackMessage {
    pub channel: String,
    pub ts: String,
}

#[async_trait]
pub trait ChatConnector: Send + Sync {
    /// Appends a new top-level message to the configured channel.
    async fn post(&self, text: &str) -> Result<SlackMessage>;

    /// Posts a threaded reply anchored to `parent`'s timestamp.
    async fn reply(&self, parent: &SlackMessage, text: &str) -> Result<()>;

    /// Scans the channel's recent history for the first message containing
    /// `key` as a substring. `Ok(None)` is a normal outcome: the creation
    /// message may not have propagated yet, or the history window rolled
    /// over.
    async fn find_by_key(&self, key: &str) -> Result<Option<SlackMessage>>;

    /// Adds a reaction to `message`. Idempotent from the caller's
    /// perspective: a reaction already present is not a failure.
    async fn add_reaction(&self, name: &str, message: &SlackMessage) -> Result<()>;

    /// Removes a reaction from `message`. Idempotent from the caller's
    /// perspective: a reaction already absent is not a failure.
    async fn remove_reaction(&self, name: &str, message: &SlackMessage) -> Result<()>;

    /// Resolves a workspace user id from an account email.
    async fn user_id_by_email(&self, email: &str) -> Result<String>;
}
