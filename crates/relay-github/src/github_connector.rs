//! GitHub REST client used once at startup to resolve the notifying team and
//! fetch its member roster.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use relay_config::GithubConfiguration;
use serde::de::DeserializeOwned;
use serde::Deserialize;

const PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Deserialize)]
struct OrganizationResponse {
    id: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct TeamRow {
    id: u64,
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct MemberRow {
    login: String,
}

#[derive(Clone)]
pub struct GithubConnector {
    http: reqwest::Client,
    api_base: String,
    org: String,
    team: String,
    ignored_pr_users: Vec<String>,
}

impl GithubConnector {
    pub fn new(
        api_base: String,
        configuration: &GithubConfiguration,
        request_timeout_ms: u64,
    ) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("git-slack-relay"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let auth_header = format!("Bearer {}", configuration.token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth_header)
                .context("invalid github authorization header")?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to create github api client")?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            org: configuration.org.clone(),
            team: configuration.team.clone(),
            ignored_pr_users: configuration.ignored_pr_users.clone(),
        })
    }

    /// Resolves the configured team inside the configured org and returns its
    /// member logins, minus any roster-ignored users. Errors here are fatal
    /// to startup.
    pub async fn fetch_team_members(&self) -> Result<Vec<String>> {
        let organization: OrganizationResponse = self
            .request_json(
                "get organization",
                self.http
                    .get(format!("{}/orgs/{}", self.api_base, self.org)),
            )
            .await?;

        let team_id = self.resolve_team_id().await?;

        let mut members = Vec::new();
        let mut page = 1_u32;
        loop {
            let page_value = page.to_string();
            let chunk: Vec<MemberRow> = self
                .request_json(
                    "list team members",
                    self.http
                        .get(format!(
                            "{}/organizations/{}/team/{}/members",
                            self.api_base, organization.id, team_id
                        ))
                        .query(&[("per_page", "100"), ("page", page_value.as_str())]),
                )
                .await?;
            let chunk_len = chunk.len();
            members.extend(chunk.into_iter().map(|row| row.login).filter(|login| {
                !self
                    .ignored_pr_users
                    .iter()
                    .any(|ignored| ignored == login)
            }));
            if chunk_len < PAGE_SIZE {
                break;
            }
            page = page.saturating_add(1);
        }
        Ok(members)
    }

    async fn resolve_team_id(&self) -> Result<u64> {
        let mut page = 1_u32;
        loop {
            let page_value = page.to_string();
            let chunk: Vec<TeamRow> = self
                .request_json(
                    "list teams",
                    self.http
                        .get(format!("{}/orgs/{}/teams", self.api_base, self.org))
                        .query(&[("per_page", "100"), ("page", page_value.as_str())]),
                )
                .await?;
            let chunk_len = chunk.len();
            if let Some(team) = chunk.into_iter().find(|team| team.name == self.team) {
                return Ok(team.id);
            }
            if chunk_len < PAGE_SIZE {
                bail!(
                    "did not find team '{}' in organisation '{}'",
                    self.team,
                    self.org
                );
            }
            page = page.saturating_add(1);
        }
    }

    async fn request_json<T>(&self, operation: &str, request: reqwest::RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .with_context(|| format!("github api {operation} request failed"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!(
                "github api {operation} failed with status {}: {}",
                status.as_u16(),
                truncate_for_error(&body, 800)
            );
        }
        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode github {operation}"))
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
