//! Slack collaborator for the relay: the `ChatConnector` capability trait
//! consumed by the event router, and its Slack Web API implementation.

mod chat_connector;
mod slack_connector;

pub use chat_connector::{ChatConnector, SlackMessage};
pub use slack_connector::SlackConnector;
