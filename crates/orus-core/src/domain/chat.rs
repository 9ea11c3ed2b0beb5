//! Chat and generate domain types.
//!
//! Requests are what the gateway sends to the backend; `StreamEvent` and
//! `GenerateChunk` are the NDJSON records it streams back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StreamRecord;

/// A single chat message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role: "system", "user", "assistant" or "tool".
    #[serde(default)]
    pub role: String,
    /// Message content. In stream records this is a delta.
    #[serde(default)]
    pub content: String,
    /// Reasoning text emitted when `think` is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    /// Base64-encoded images attached to this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl Message {
    /// Create a plain text message.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            thinking: None,
            images: None,
        }
    }
}

/// Chat request sent to the backend (`/api/chat`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub think: Option<bool>,
    /// Output format hint: `"json"` or a JSON schema object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<serde_json::Value>,
}

impl ChatRequest {
    /// Create a request with no optional hints.
    pub fn new(model: impl Into<String>, messages: Vec<Message>, stream: bool) -> Self {
        Self {
            model: model.into(),
            messages,
            stream,
            think: None,
            format: None,
        }
    }

    /// Attach images to the last user message, which is where the backend
    /// expects them for multimodal chat.
    pub fn attach_images(&mut self, images: Vec<String>) {
        if images.is_empty() {
            return;
        }
        match self.messages.iter_mut().rev().find(|m| m.role == "user") {
            Some(message) => message.images.get_or_insert_with(Vec::new).extend(images),
            None => self.messages.push(Message {
                role: "user".to_string(),
                content: String::new(),
                thinking: None,
                images: Some(images),
            }),
        }
    }
}

/// One record of a backend chat stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StreamEvent {
    /// Build a content event. Used by fakes and tests.
    pub fn delta(model: impl Into<String>, content: impl Into<String>, done: bool) -> Self {
        Self {
            model: model.into(),
            message: Message::new("assistant", content),
            done,
            ..Self::default()
        }
    }
}

impl StreamRecord for StreamEvent {
    fn is_terminal(&self) -> bool {
        self.done
    }

    fn content_delta(&self) -> Option<&str> {
        Some(self.message.content.as_str())
    }

    fn upstream_error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Prompt completion request sent to the backend (`/api/generate`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub think: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

/// One record of a backend generate stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateChunk {
    #[serde(default)]
    pub model: String,
    /// Generated text delta.
    #[serde(default)]
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StreamRecord for GenerateChunk {
    fn is_terminal(&self) -> bool {
        self.done
    }

    fn content_delta(&self) -> Option<&str> {
        Some(self.response.as_str())
    }

    fn upstream_error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
