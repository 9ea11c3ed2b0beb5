//! Typed client requests, one per operation.
//!
//! Each request is validated once from the raw body; handlers never look at
//! untyped JSON after this point.

use serde::Serialize;
use serde_json::Value;

use super::chat::{ChatRequest, GenerateRequest, Message};
use crate::error::ValidationError;
use crate::utils::JsonObject;

/// `POST /embed-text` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedTextRequest {
    pub model: String,
    pub text: String,
}

impl EmbedTextRequest {
    pub fn from_body(body: &[u8]) -> Result<Self, ValidationError> {
        let object = JsonObject::parse(body)?;
        Ok(Self {
            model: object.required_str("model")?,
            text: object.required_str("text")?,
        })
    }
}

/// `POST /call-llm` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallLlmRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub think: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl CallLlmRequest {
    pub fn from_body(body: &[u8]) -> Result<Self, ValidationError> {
        let object = JsonObject::parse(body)?;
        Ok(Self {
            model: object.required_str("model")?,
            messages: object.required_messages("messages")?,
            stream: object.optional_bool("stream")?.unwrap_or(false),
            think: object.optional_bool("think")?,
            format: object.optional_format("format")?,
            images: object.optional_str_list("images")?,
        })
    }

    /// Build the backend request, attaching images to the last user turn.
    pub fn to_chat_request(&self) -> ChatRequest {
        let mut request = ChatRequest::new(self.model.clone(), self.messages.clone(), self.stream);
        request.think = self.think;
        request.format.clone_from(&self.format);
        request.attach_images(self.images.clone());
        request
    }
}

/// `POST /generate` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateTextRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub think: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl GenerateTextRequest {
    pub fn from_body(body: &[u8]) -> Result<Self, ValidationError> {
        let object = JsonObject::parse(body)?;
        Ok(Self {
            model: object.required_str("model")?,
            prompt: object.required_str("prompt")?,
            stream: object.optional_bool("stream")?.unwrap_or(false),
            think: object.optional_bool("think")?,
            format: object.optional_format("format")?,
            images: object.optional_str_list("images")?,
        })
    }

    pub fn to_generate_request(&self) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            prompt: self.prompt.clone(),
            stream: self.stream,
            think: self.think,
            format: self.format.clone(),
            images: self.images.clone(),
        }
    }
}

/// `POST /pull-model` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullModelRequest {
    pub name: String,
}

impl PullModelRequest {
    pub fn from_body(body: &[u8]) -> Result<Self, ValidationError> {
        let object = JsonObject::parse(body)?;
        Ok(Self {
            name: object.required_str("name")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_text_requires_model_and_text() {
        let request = EmbedTextRequest::from_body(br#"{"model":"bge-m3","text":"hello"}"#).unwrap();
        assert_eq!(request.model, "bge-m3");

        assert_eq!(
            EmbedTextRequest::from_body(br#"{"model":"bge-m3"}"#),
            Err(ValidationError::MissingField("text".into()))
        );
        assert_eq!(
            EmbedTextRequest::from_body(br#"{"model":42,"text":"x"}"#),
            Err(ValidationError::invalid_type("model", "a string"))
        );
    }

    #[test]
    fn test_call_llm_defaults() {
        let request = CallLlmRequest::from_body(
            br#"{"model":"llama3","messages":[{"role":"user","content":"hi"}]}"#,
        )
        .unwrap();

        assert!(!request.stream);
        assert_eq!(request.think, None);
        assert!(request.images.is_empty());
    }

    #[test]
    fn test_call_llm_builds_backend_request() {
        let request = CallLlmRequest::from_body(
            br#"{
                "model":"llava",
                "think":true,
                "stream":true,
                "format":"json",
                "images":["aW1n"],
                "messages":[{"role":"system","content":"be brief"},{"role":"user","content":"what is this?"}]
            }"#,
        )
        .unwrap();

        let chat = request.to_chat_request();
        assert!(chat.stream);
        assert_eq!(chat.think, Some(true));
        assert_eq!(chat.format, Some(Value::from("json")));
        assert!(chat.messages[0].images.is_none());
        assert_eq!(chat.messages[1].images, Some(vec!["aW1n".to_string()]));
    }

    #[test]
    fn test_call_llm_rejects_non_boolean_stream() {
        let error = CallLlmRequest::from_body(
            br#"{"model":"m","stream":"yes","messages":[{"role":"user","content":"hi"}]}"#,
        )
        .unwrap_err();
        assert_eq!(error, ValidationError::invalid_type("stream", "a boolean"));
    }

    #[test]
    fn test_generate_requires_prompt() {
        assert_eq!(
            GenerateTextRequest::from_body(br#"{"model":"m","prompt":"   "}"#),
            Err(ValidationError::EmptyField("prompt".into()))
        );
        let request = GenerateTextRequest::from_body(br#"{"model":"m","prompt":"why?"}"#).unwrap();
        assert_eq!(request.to_generate_request().prompt, "why?");
    }

    #[test]
    fn test_pull_model_requires_name() {
        assert!(matches!(
            PullModelRequest::from_body(b"{}"),
            Err(ValidationError::MissingField(_))
        ));
        assert!(matches!(
            PullModelRequest::from_body(b"name=llama3"),
            Err(ValidationError::MalformedBody(_))
        ));
    }
}
