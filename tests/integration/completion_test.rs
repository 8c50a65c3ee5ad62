use super::common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use common::stub_agent::{StubAgent, StubReply};
use common::test_server::TestServer;
use common::{completion_body, delta_contents, sse_payloads, streamed_text, test_settings};
use docrelay::adapters::completion_handler::{RelayState, SESSION_TOKEN_HEADER};
use docrelay::config::{RelayMode, Settings};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt;

const ANSWER: &str = "Use the Control Panel to create a database.";

fn app(settings: Settings, agent: Arc<StubAgent>) -> axum::Router {
    docrelay::create_app(RelayState::new(settings, agent))
}

fn completion_request(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/completion")
        .header("content-type", "application/json")
        .header(SESSION_TOKEN_HEADER, common::SESSION_TOKEN)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn stream_body(app: axum::Router, request: Request<Body>) -> String {
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/event-stream"
    );
    assert_eq!(response.headers()["cache-control"], "no-cache");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn assert_terminated(payloads: &[String]) {
    assert_eq!(payloads.last().map(String::as_str), Some("[DONE]"));
    assert_eq!(payloads.iter().filter(|p| *p == "[DONE]").count(), 1);

    let stop: Value = serde_json::from_str(&payloads[payloads.len() - 2]).unwrap();
    assert_eq!(stop["choices"][0]["delta"]["finish_reason"], "stop");
    assert!(stop["choices"][0]["delta"]["content"].is_null());
}

#[tokio::test]
async fn test_missing_session_token_is_unauthorized() {
    let agent = StubAgent::answering(ANSWER);
    let request = Request::builder()
        .method("POST")
        .uri("/completion")
        .header("content-type", "application/json")
        .body(Body::from(completion_body("hi").to_string()))
        .unwrap();

    let response = app(test_settings(RelayMode::Agent), agent.clone())
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["detail"], "Missing authentication token");
    assert_eq!(agent.calls(), 0);
}

#[tokio::test]
async fn test_empty_messages_rejected() {
    let agent = StubAgent::answering(ANSWER);
    let response = app(test_settings(RelayMode::Agent), agent.clone())
        .oneshot(completion_request(&json!({ "messages": [] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["detail"], "No messages provided");
    assert_eq!(agent.calls(), 0);
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let agent = StubAgent::answering(ANSWER);

    let missing = app(test_settings(RelayMode::Agent), agent.clone())
        .oneshot(completion_request(&json!({ "prompt": "hi" })))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/completion")
        .header(SESSION_TOKEN_HEADER, common::SESSION_TOKEN)
        .body(Body::from("{not json"))
        .unwrap();
    let invalid = app(test_settings(RelayMode::Agent), agent.clone())
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    assert_eq!(agent.calls(), 0);
}

#[tokio::test]
async fn test_answer_streamed_word_by_word() {
    let agent = StubAgent::answering(ANSWER);
    let body = stream_body(
        app(test_settings(RelayMode::Agent), agent),
        completion_request(&completion_body("How do I create a database?")),
    )
    .await;

    let payloads = sse_payloads(&body);
    let contents = delta_contents(&payloads);

    let mut expected = vec![Some(String::new())];
    expected.extend(ANSWER.split(' ').map(|w| Some(format!("{} ", w))));
    expected.push(Some(String::new()));
    expected.push(None);
    assert_eq!(contents, expected);

    assert_terminated(&payloads);
    assert!(body.ends_with("data: [DONE]\n\n"));
}

#[tokio::test]
async fn test_question_answered_end_to_end() {
    let agent = StubAgent::answering(ANSWER);
    let body = stream_body(
        app(test_settings(RelayMode::Agent), agent.clone()),
        completion_request(&completion_body("How do I resize a Droplet?")),
    )
    .await;

    assert_eq!(streamed_text(&body).trim(), ANSWER);

    let prompts = agent.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("2.2 Query: How do I resize a Droplet?  \n"));
    assert!(prompts[0].contains("2.3 Code Context: NO CODE CONTEXT PROVIDED.  \n"));
}

#[tokio::test]
async fn test_attached_files_reach_the_agent() {
    let agent = StubAgent::answering(ANSWER);
    let request = json!({
        "messages": [
            { "role": "user", "content": "Earlier question" },
            { "role": "assistant", "content": "Earlier answer" },
            {
                "role": "user",
                "content": "Why does this deploy fail?",
                "copilot_references": [
                    { "type": "client.file", "id": "app.yaml", "data": { "content": "name: web" } },
                    { "type": "client.selection", "id": "ignored", "data": { "content": "x" } }
                ]
            }
        ]
    });

    stream_body(
        app(test_settings(RelayMode::Agent), agent.clone()),
        completion_request(&request),
    )
    .await;

    let prompts = agent.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("2.2 Query: Why does this deploy fail?  \n"));
    assert!(prompts[0].contains("FILENAME:\napp.yaml\n\nCODE CONTENT:\nname: web"));
    assert!(!prompts[0].contains("ignored"));
    assert!(!prompts[0].contains("Earlier question"));
}

#[tokio::test]
async fn test_unconfigured_agent_degrades_to_explanation() {
    let agent = StubAgent::new(StubReply::NotConfigured);
    let body = stream_body(
        app(test_settings(RelayMode::Agent), agent),
        completion_request(&completion_body("How do I resize a Droplet?")),
    )
    .await;

    assert!(streamed_text(&body).contains("configuration is incomplete"));
    assert_terminated(&sse_payloads(&body));
}

#[tokio::test]
async fn test_failing_agent_degrades_to_explanation() {
    let agent = StubAgent::new(StubReply::Unavailable);
    let body = stream_body(
        app(test_settings(RelayMode::Agent), agent),
        completion_request(&completion_body("How do I resize a Droplet?")),
    )
    .await;

    assert!(streamed_text(&body).contains("currently unavailable"));
    assert_terminated(&sse_payloads(&body));
}

#[tokio::test]
async fn test_slow_agent_times_out() {
    let agent = StubAgent::new(StubReply::Hang);
    let mut settings = test_settings(RelayMode::Agent);
    settings.relay.agent_timeout_secs = 1;

    let body = stream_body(
        app(settings, agent.clone()),
        completion_request(&completion_body("How do I resize a Droplet?")),
    )
    .await;

    assert!(streamed_text(&body).contains("currently unavailable"));
    assert_terminated(&sse_payloads(&body));
    assert!(agent.abandoned());
}

#[tokio::test]
async fn test_words_are_paced() {
    let agent = StubAgent::answering("one two three four");
    let mut settings = test_settings(RelayMode::Agent);
    settings.relay.chunk_delay_ms = 25;

    let started = Instant::now();
    stream_body(
        app(settings, agent),
        completion_request(&completion_body("count")),
    )
    .await;

    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_client_disconnect_abandons_agent_call() {
    let agent = StubAgent::new(StubReply::Hang);
    let mut settings = test_settings(RelayMode::Agent);
    settings.relay.agent_timeout_secs = 60;
    let server = TestServer::start(settings, agent.clone()).await;

    let mut response = reqwest::Client::new()
        .post(server.url("/completion"))
        .header(SESSION_TOKEN_HEADER, common::SESSION_TOKEN)
        .json(&completion_body("How do I resize a Droplet?"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // The placeholder arrives before the agent has answered
    let first = response.chunk().await.unwrap().unwrap();
    assert!(first.starts_with(b"data: "));
    drop(response);

    let deadline = Instant::now() + Duration::from_secs(5);
    while !agent.abandoned() && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(agent.abandoned());
}
