use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use relay_github::{verify_github_signature, GitEventKind};
use relay_handler::GitHandler;
use tokio::net::TcpListener;

pub struct WebhookServerState {
    pub handler: GitHandler,
    pub secret_key: String,
}

pub fn build_webhook_router(state: Arc<WebhookServerState>) -> Router {
    Router::new()
        .route("/git-event", post(handle_git_event))
        .route("/", get(handle_health_check))
        .with_state(state)
}

async fn handle_health_check() -> StatusCode {
    StatusCode::OK
}

/// Accepts a webhook delivery. The response reflects only transport-level
/// acceptance: once the signature checks out the delivery is 200 regardless
/// of how routing turns out, since the originator cannot act on a failure.
async fn handle_git_event(
    State(state): State<Arc<WebhookServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let signature = headers
        .get("x-hub-signature-256")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if let Err(error) = verify_github_signature(&body, signature, &state.secret_key) {
        tracing::warn!(error = %error, "rejected webhook delivery");
        return StatusCode::UNAUTHORIZED;
    }

    let event_name = headers
        .get("x-github-event")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    tracing::debug!(event = event_name, "webhook delivery accepted");

    match GitEventKind::from_event_name(event_name) {
        Some(GitEventKind::PullRequest) => state.handler.handle_pull_request_event(&body).await,
        Some(GitEventKind::PullRequestReview) => {
            state.handler.handle_pull_request_review_event(&body).await
        }
        Some(GitEventKind::PullRequestReviewComment) => {
            state
                .handler
                .handle_pull_request_review_comment_event(&body)
                .await
        }
        Some(GitEventKind::IssueComment) => state.handler.handle_issue_comment_event(&body).await,
        None => {}
    }
    StatusCode::OK
}

pub async fn run_webhook_server(bind: &str, state: Arc<WebhookServerState>) -> Result<()> {
    let bind_addr = bind
        .parse::<SocketAddr>()
        .with_context(|| format!("invalid bind address '{bind}'"))?;
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind webhook server on {bind_addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve bound webhook server address")?;
    tracing::info!(addr = %local_addr, "webhook server listening");

    axum::serve(listener, build_webhook_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("webhook server exited unexpectedly")
}
