//! Inbound chat payload sent by the IDE extension

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reference type the extension uses for the contents of an open file
pub const FILE_REFERENCE_TYPE: &str = "client.file";

/// Body of `POST /completion`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// One conversation turn.
///
/// Fields the relay does not interpret are kept in `extra` so the message can
/// be forwarded unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copilot_references: Option<Vec<CopilotReference>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn with_reference(mut self, reference: CopilotReference) -> Self {
        self.copilot_references
            .get_or_insert_with(Vec::new)
            .push(reference);
        self
    }

    /// The user's query: message text with surrounding whitespace removed
    pub fn query(&self) -> &str {
        self.content.as_deref().unwrap_or_default().trim()
    }

    pub fn references(&self) -> &[CopilotReference] {
        self.copilot_references.as_deref().unwrap_or_default()
    }
}

/// Context item attached to a message by the extension
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopilotReference {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CopilotReference {
    pub fn file(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: FILE_REFERENCE_TYPE.to_string(),
            id: Some(id.into()),
            data: Some(serde_json::json!({ "content": content.into() })),
            extra: Map::new(),
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == FILE_REFERENCE_TYPE
    }

    /// Text content carried in `data.content`, if any
    pub fn content(&self) -> Option<&str> {
        self.data.as_ref()?.get("content")?.as_str()
    }
}

/// The trailing `window` messages of a conversation
pub fn recent_messages(messages: &[ChatMessage], window: usize) -> &[ChatMessage] {
    let start = messages.len().saturating_sub(window);
    &messages[start..]
}
