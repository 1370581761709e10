//! Tests for the Slack Web API connector against a mock server.

use httpmock::prelude::*;
use serde_json::json;

use super::*;

fn connector(base_url: &str) -> SlackConnector {
    SlackConnector::new(
        base_url.to_string(),
        "xoxb-test".to_string(),
        "C123".to_string(),
        3_000,
    )
    .unwrap()
}

#[tokio::test]
async fn post_returns_message_handle() {
    let server = MockServer::start();
    let mock = server
        .mock(|when, then| {
            when.method(POST)
                .path("/chat.postMessage")
                .body_includes("\"channel\":\"C123\"")
                .body_includes("\"text\":\"hello channel\"");
            then.status(200).json_body(json!({
                "ok": true,
                "channel": "C123",
                "ts": "1700000000.000100",
            }));
        });

    let message = connector(&server.base_url())
        .post("hello channel")
        .await
        .unwrap();
    assert_eq!(
        message,
        SlackMessage {
            channel: "C123".to_string(),
            ts: "1700000000.000100".to_string(),
        }
    );
    mock.assert();
}

#[tokio::test]
async fn reply_is_threaded_on_parent_timestamp() {
    let server = MockServer::start();
    let mock = server
        .mock(|when, then| {
            when.method(POST)
                .path("/chat.postMessage")
                .body_includes("\"text\":\"nice catch\"")
                .body_includes("\"thread_ts\":\"42.1\"");
            then.status(200)
                .json_body(json!({ "ok": true, "channel": "C123", "ts": "42.2" }));
        });

    let parent = SlackMessage {
        channel: "C123".to_string(),
        ts: "42.1".to_string(),
    };
    connector(&server.base_url())
        .reply(&parent, "nice catch")
        .await
        .unwrap();
    mock.assert();
}

#[tokio::test]
async fn find_by_key_returns_first_substring_match() {
    let server = MockServer::start();
    server
        .mock(|when, then| {
            when.method(GET)
                .path("/conversations.history")
                .query_param("channel", "C123");
            then.status(200).json_body(json!({
                "ok": true,
                "messages": [
                    { "text": "unrelated chatter", "ts": "3.0" },
                    {
                        "text": "<@U1> Add widget cache:\n<https://github.com/acme/widgets/pull/7>",
                        "ts": "2.0",
                    },
                    {
                        "text": "older mention of <https://github.com/acme/widgets/pull/7>",
                        "ts": "1.0",
                    },
                ],
            }));
        });

    let found = connector(&server.base_url())
        .find_by_key("<https://github.com/acme/widgets/pull/7>")
        .await
        .unwrap();
    assert_eq!(
        found,
        Some(SlackMessage {
            channel: "C123".to_string(),
            ts: "2.0".to_string(),
        })
    );
}

#[tokio::test]
async fn find_by_key_miss_is_none_not_error() {
    let server = MockServer::start();
    server
        .mock(|when, then| {
            when.method(GET).path("/conversations.history");
            then.status(200).json_body(json!({
                "ok": true,
                "messages": [{ "text": "unrelated", "ts": "1.0" }],
            }));
        });

    let found = connector(&server.base_url())
        .find_by_key("<https://github.com/acme/widgets/pull/99>")
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn add_reaction_absorbs_already_reacted() {
    let server = MockServer::start();
    server
        .mock(|when, then| {
            when.method(POST)
                .path("/reactions.add")
                .body_includes("\"name\":\"merged\"")
                .body_includes("\"timestamp\":\"2.0\"");
            then.status(200)
                .json_body(json!({ "ok": false, "error": "already_reacted" }));
        });

    let message = SlackMessage {
        channel: "C123".to_string(),
        ts: "2.0".to_string(),
    };
    connector(&server.base_url())
        .add_reaction("merged", &message)
        .await
        .unwrap();
}

#[tokio::test]
async fn remove_reaction_absorbs_no_reaction() {
    let server = MockServer::start();
    server
        .mock(|when, then| {
            when.method(POST).path("/reactions.remove");
            then.status(200)
                .json_body(json!({ "ok": false, "error": "no_reaction" }));
        });

    let message = SlackMessage {
        channel: "C123".to_string(),
        ts: "2.0".to_string(),
    };
    connector(&server.base_url())
        .remove_reaction("x", &message)
        .await
        .unwrap();
}

#[tokio::test]
async fn non_benign_reaction_error_is_surfaced() {
    let server = MockServer::start();
    server
        .mock(|when, then| {
            when.method(POST).path("/reactions.add");
            then.status(200)
                .json_body(json!({ "ok": false, "error": "invalid_name" }));
        });

    let message = SlackMessage {
        channel: "C123".to_string(),
        ts: "2.0".to_string(),
    };
    let error = connector(&server.base_url())
        .add_reaction("not-an-emoji", &message)
        .await
        .unwrap_err();
    assert!(error.to_string().contains("invalid_name"));
}

#[tokio::test]
async fn user_lookup_resolves_workspace_id() {
    let server = MockServer::start();
    server
        .mock(|when, then| {
            when.method(GET)
                .path("/users.lookupByEmail")
                .query_param("email", "octocat@acme.com");
            then.status(200)
                .json_body(json!({ "ok": true, "user": { "id": "U777" } }));
        });

    let id = connector(&server.base_url())
        .user_id_by_email("octocat@acme.com")
        .await
        .unwrap();
    assert_eq!(id, "U777");
}

#[tokio::test]
async fn user_lookup_failure_is_an_error() {
    let server = MockServer::start();
    server
        .mock(|when, then| {
            when.method(GET).path("/users.lookupByEmail");
            then.status(200)
                .json_body(json!({ "ok": false, "error": "users_not_found" }));
        });

    let error = connector(&server.base_url())
        .user_id_by_email("nobody@acme.com")
        .await
        .unwrap_err();
    assert!(error.to_string().contains("users_not_found"));
}

#[tokio::test]
async fn transport_level_failure_is_an_error() {
    let server = MockServer::start();
    server
        .mock(|when, then| {
            when.method(POST).path("/chat.postMessage");
            then.status(503).body("upstream unavailable");
        });

    let error = connector(&server.base_url())
        .post("hello")
        .await
        .unwrap_err();
    assert!(error.to_string().contains("503"));
}
