//! git-slack-relay binary: wires configuration, the GitHub roster client,
//! the Slack connector, and the webhook server together.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use relay_config::load_configuration;
use relay_gateway::{run_webhook_server, WebhookServerState};
use relay_github::GithubConnector;
use relay_handler::{GitHandler, UserResolver};
use relay_slack::SlackConnector;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const SLACK_API_BASE: &str = "https://slack.com/api";
const GITHUB_API_BASE: &str = "https://api.github.com";

#[derive(Debug, Parser)]
#[command(
    name = "git-slack-relay",
    about = "Relays GitHub pull request and issue activity into a Slack channel",
    version
)]
struct CliArgs {
    /// Path to the TOML configuration file.
    #[arg(long, env = "CONFIG_PATH")]
    config: PathBuf,

    /// Address the webhook server binds to.
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// Outbound API request timeout in milliseconds.
    #[arg(long, default_value_t = 30_000)]
    request_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();
    let configuration = load_configuration(&args.config)?;

    let slack = Arc::new(SlackConnector::new(
        SLACK_API_BASE.to_string(),
        configuration.slack.token.clone(),
        configuration.slack.channel_id.clone(),
        args.request_timeout_ms,
    )?);
    let github = GithubConnector::new(
        GITHUB_API_BASE.to_string(),
        &configuration.github,
        args.request_timeout_ms,
    )?;

    let team_members = github
        .fetch_team_members()
        .await
        .context("failed to fetch github team roster")?;
    tracing::info!(members = team_members.len(), "loaded team roster");

    let users = UserResolver::new(
        slack.clone(),
        team_members,
        configuration.slack.github_login_to_slack_email.clone(),
        configuration.github.ignored_comment_users.clone(),
        configuration.github.ignored_review_users.clone(),
    );
    let handler = GitHandler::new(
        slack,
        users,
        configuration.slack.emoji.clone(),
        configuration.github.ignored_repos.clone(),
    );

    let state = Arc::new(WebhookServerState {
        handler,
        secret_key: configuration.github.secret_key.clone(),
    });
    run_webhook_server(&args.bind, state).await
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
