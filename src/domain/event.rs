//! Server-sent events emitted on the completion stream

use bytes::Bytes;
use serde_json::json;

/// Literal sentinel closing every completion stream
pub const DONE_SENTINEL: &str = "data: [DONE]\n\n";

/// Unit of the outbound stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionEvent {
    /// Partial completion text
    Delta(String),
    /// Terminal delta with `finish_reason: "stop"` and null content
    Stop,
    /// End-of-stream sentinel
    Done,
}

impl CompletionEvent {
    pub fn delta(content: impl Into<String>) -> Self {
        CompletionEvent::Delta(content.into())
    }

    /// Blank delta used to flush the transport and reset client idle timers
    pub fn keep_alive() -> Self {
        CompletionEvent::Delta(String::new())
    }

    /// Wire form: `data: <json>\n\n`, or the `[DONE]` sentinel.
    pub fn encode(&self) -> Bytes {
        let delta = match self {
            CompletionEvent::Delta(content) => json!({ "content": content }),
            CompletionEvent::Stop => json!({ "content": null, "finish_reason": "stop" }),
            CompletionEvent::Done => return Bytes::from_static(DONE_SENTINEL.as_bytes()),
        };

        let payload = json!({ "choices": [{ "index": 0, "delta": delta }] });
        Bytes::from(format!("data: {}\n\n", payload))
    }
}

/// Split an answer into word deltas, each carrying one trailing space so
/// adjacent words never merge when the client concatenates them.
pub fn word_deltas(text: &str) -> impl Iterator<Item = CompletionEvent> + '_ {
    text.split_whitespace()
        .map(|word| CompletionEvent::Delta(format!("{} ", word)))
}
