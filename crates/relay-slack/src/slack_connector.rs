//! Slack Web API implementation of the `ChatConnector` capability.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::chat_connector::{ChatConnector, SlackMessage};

#[derive(Debug, Clone, Deserialize)]
struct SlackChatMessageResponse {
    ok: bool,
    ts: Option<String>,
    channel: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SlackHistoryResponse {
    ok: bool,
    #[serde(default)]
    messages: Vec<SlackHistoryMessage>,
    error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SlackHistoryMessage {
    #[serde(default)]
    text: String,
    ts: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SlackReactionResponse {
    ok: bool,
    error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SlackUserLookupResponse {
    ok: bool,
    user: Option<SlackUserRow>,
    error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SlackUserRow {
    id: String,
}

#[derive(Clone)]
pub struct SlackConnector {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
    channel_id: String,
}

impl SlackConnector {
    pub fn new(
        api_base: String,
        bot_token: String,
        channel_id: String,
        request_timeout_ms: u64,
    ) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("git-slack-relay"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to create slack api client")?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.trim().to_string(),
            channel_id,
        })
    }

    async fn post_chat_message(
        &self,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<SlackMessage> {
        let mut payload = json!({
            "channel": self.channel_id,
            "text": text,
        });
        if let Some(thread_ts) = thread_ts {
            payload["thread_ts"] = Value::String(thread_ts.to_string());
        }

        let response: SlackChatMessageResponse = self
            .request_json(
                "chat.postMessage",
                self.http
                    .post(format!("{}/chat.postMessage", self.api_base))
                    .bearer_auth(&self.bot_token)
                    .json(&payload),
            )
            .await?;
        if !response.ok {
            bail!(
                "slack chat.postMessage failed: {}",
                response
                    .error
                    .unwrap_or_else(|| "unknown error".to_string())
            );
        }
        Ok(SlackMessage {
            channel: response
                .channel
                .unwrap_or_else(|| self.channel_id.clone()),
            ts: response
                .ts
                .ok_or_else(|| anyhow!("slack chat.postMessage response missing ts"))?,
        })
    }

    async fn change_reaction(
        &self,
        method: &str,
        name: &str,
        message: &SlackMessage,
        benign_error: &str,
    ) -> Result<()> {
        let payload = json!({
            "channel": self.channel_id,
            "name": name,
            "timestamp": message.ts,
        });
        let response: SlackReactionResponse = self
            .request_json(
                method,
                self.http
                    .post(format!("{}/{method}", self.api_base))
                    .bearer_auth(&self.bot_token)
                    .json(&payload),
            )
            .await?;
        if !response.ok {
            let error = response
                .error
                .unwrap_or_else(|| "unknown error".to_string());
            if error == benign_error {
                tracing::debug!(reaction = name, error = %error, "slack reaction already settled");
                return Ok(());
            }
            bail!("slack {method} failed: {error}");
        }
        Ok(())
    }

    async fn request_json<T>(&self, operation: &str, request: reqwest::RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .with_context(|| format!("slack api {operation} request failed"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!(
                "slack api {operation} failed with status {}: {}",
                status.as_u16(),
                truncate_for_error(&body, 800)
            );
        }
        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode slack {operation}"))
    }
}

#[async_trait]
impl ChatConnector for SlackConnector {
    async fn post(&self, text: &str) -> Result<SlackMessage> {
        self.post_chat_message(text, None).await
    }

    async fn reply(&self, parent: &SlackMessage, text: &str) -> Result<()> {
        self.post_chat_message(text, Some(parent.ts.as_str()))
            .await
            .map(|_| ())
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<SlackMessage>> {
        let response: SlackHistoryResponse = self
            .request_json(
                "conversations.history",
                self.http
                    .get(format!("{}/conversations.history", self.api_base))
                    .bearer_auth(&self.bot_token)
                    .query(&[("channel", self.channel_id.as_str())]),
            )
            .await?;
        if !response.ok {
            bail!(
                "slack conversations.history failed: {}",
                response
                    .error
                    .unwrap_or_else(|| "unknown error".to_string())
            );
        }
        Ok(response
            .messages
            .into_iter()
            .find(|message| message.text.contains(key))
            .map(|message| SlackMessage {
                channel: self.channel_id.clone(),
                ts: message.ts,
            }))
    }

    async fn add_reaction(&self, name: &str, message: &SlackMessage) -> Result<()> {
        self.change_reaction("reactions.add", name, message, "already_reacted")
            .await
    }

    async fn remove_reaction(&self, name: &str, message: &SlackMessage) -> Result<()> {
        self.change_reaction("reactions.remove", name, message, "no_reaction")
            .await
    }

    async fn user_id_by_email(&self, email: &str) -> Result<String> {
        let response: SlackUserLookupResponse = self
            .request_json(
                "users.lookupByEmail",
                self.http
                    .get(format!("{}/users.lookupByEmail", self.api_base))
                    .bearer_auth(&self.bot_token)
                    .query(&[("email", email)]),
            )
            .await?;
        if !response.ok {
            bail!(
                "slack users.lookupByEmail failed: {}",
                response
                    .error
                    .unwrap_or_else(|| "unknown error".to_string())
            );
        }
        response
            .user
            .map(|user| user.id)
            .ok_or_else(|| anyhow!("slack users.lookupByEmail response missing user"))
    }
}

fn truncate_for_error(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests;
