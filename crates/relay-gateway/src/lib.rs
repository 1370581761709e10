//! Inbound webhook surface: signature-checked `/git-event` endpoint that
//! dispatches deliveries into the event router, plus a health endpoint.

mod webhook_server;

pub use webhook_server::{build_webhook_router, run_webhook_server, WebhookServerState};
