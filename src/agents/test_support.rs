//! In-process stand-in for the GenAI platform used by unit tests.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU16, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::agents::token::{Clock, ManualClock};

/// Mint an HS256 token expiring at `exp`, signed with a key the client never sees.
pub fn mint_token(exp: u64) -> String {
    mint_token_with_id(exp, 0)
}

fn mint_token_with_id(exp: u64, jti: usize) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &json!({ "sub": "agent-1", "exp": exp, "jti": jti }),
        &jsonwebtoken::EncodingKey::from_secret(b"platform-signing-key"),
    )
    .expect("token encoding")
}

#[derive(Debug, Default)]
struct MockState {
    clock: Arc<ManualClock>,
    refresh_calls: AtomicUsize,
    access_calls: AtomicUsize,
    chat_calls: AtomicUsize,
    refresh_status: AtomicU16,
    access_status: AtomicU16,
    chat_status: AtomicU16,
    latency_ms: AtomicU64,
    answer: Mutex<Option<String>>,
    access_tokens: Mutex<Vec<String>>,
    chat_requests: Mutex<Vec<Value>>,
}

impl MockState {
    async fn delay(&self) {
        let ms = self.latency_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
        }
    }
}

fn forced_status(slot: &AtomicU16) -> Option<StatusCode> {
    match slot.load(Ordering::SeqCst) {
        0 => None,
        code => StatusCode::from_u16(code).ok(),
    }
}

pub struct MockPlatform {
    base_url: String,
    state: Arc<MockState>,
}

impl MockPlatform {
    pub const REFRESH_TTL: u64 = 3_600;
    pub const ACCESS_TTL: u64 = 300;
    pub const AGENT_KEY: &'static str = "agent-key";

    pub async fn start(clock: Arc<ManualClock>) -> Self {
        let state = Arc::new(MockState {
            clock,
            answer: Mutex::new(Some("Use the Control Panel.".to_string())),
            ..Default::default()
        });

        let app = Router::new()
            .route(
                "/auth/agents/:agent_id/token",
                post(issue_refresh).put(refresh_access),
            )
            .route("/api/v1/chat/completions", post(chat_completion))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn agent_endpoint(&self) -> String {
        format!("{}/api/v1/", self.base_url)
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn access_calls(&self) -> usize {
        self.state.access_calls.load(Ordering::SeqCst)
    }

    pub fn chat_calls(&self) -> usize {
        self.state.chat_calls.load(Ordering::SeqCst)
    }

    pub fn fail_refresh(&self, status: u16) {
        self.state.refresh_status.store(status, Ordering::SeqCst);
    }

    pub fn fail_access(&self, status: u16) {
        self.state.access_status.store(status, Ordering::SeqCst);
    }

    pub fn fail_chat(&self, status: u16) {
        self.state.chat_status.store(status, Ordering::SeqCst);
    }

    pub fn set_latency_ms(&self, ms: u64) {
        self.state.latency_ms.store(ms, Ordering::SeqCst);
    }

    pub fn set_answer(&self, answer: Option<&str>) {
        *self.state.answer.lock().unwrap() = answer.map(str::to_string);
    }

    pub fn chat_requests(&self) -> Vec<Value> {
        self.state.chat_requests.lock().unwrap().clone()
    }
}

async fn issue_refresh(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.delay().await;
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some(MockPlatform::AGENT_KEY) {
        return StatusCode::FORBIDDEN.into_response();
    }
    if let Some(status) = forced_status(&state.refresh_status) {
        return status.into_response();
    }

    let n = state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let exp = state.clock.now() + MockPlatform::REFRESH_TTL;
    Json(json!({ "refresh_token": mint_token_with_id(exp, n) })).into_response()
}

#[derive(Debug, Deserialize)]
struct RefreshQuery {
    refresh_token: Option<String>,
}

async fn refresh_access(
    State(state): State<Arc<MockState>>,
    Query(query): Query<RefreshQuery>,
) -> Response {
    state.delay().await;
    if query.refresh_token.is_none() {
        return StatusCode::BAD_REQUEST.into_response();
    }
    if let Some(status) = forced_status(&state.access_status) {
        return status.into_response();
    }

    let n = state.access_calls.fetch_add(1, Ordering::SeqCst);
    let exp = state.clock.now() + MockPlatform::ACCESS_TTL;
    let token = mint_token_with_id(exp, n);
    state.access_tokens.lock().unwrap().push(token.clone());
    Json(json!({ "access_token": token })).into_response()
}

async fn chat_completion(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.delay().await;
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    let known = match &bearer {
        Some(token) => state.access_tokens.lock().unwrap().contains(token),
        None => false,
    };
    if !known {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if let Some(status) = forced_status(&state.chat_status) {
        return (status, "agent unavailable").into_response();
    }

    state.chat_calls.fetch_add(1, Ordering::SeqCst);
    state.chat_requests.lock().unwrap().push(body);

    let answer = state.answer.lock().unwrap().clone();
    Json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": answer },
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}
