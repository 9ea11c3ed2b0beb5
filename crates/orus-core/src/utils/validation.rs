//! Field-level validation of JSON request bodies.
//!
//! Client bodies are parsed once into a `JsonObject` and each typed request
//! pulls its fields through these accessors, so every failure carries the
//! exact field path and the distinction between a missing field and a field
//! of the wrong type.

use serde_json::{Map, Value};

use crate::domain::Message;
use crate::error::ValidationError;

/// A parsed JSON object body. `null` fields are treated as absent.
#[derive(Debug, Clone)]
pub struct JsonObject(Map<String, Value>);

impl JsonObject {
    /// Parse raw bytes, requiring a top-level JSON object.
    pub fn parse(body: &[u8]) -> Result<Self, ValidationError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ValidationError::MalformedBody("empty body".to_string()));
        }
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(_) => Err(ValidationError::MalformedBody(
                "expected a JSON object".to_string(),
            )),
            Err(e) => Err(ValidationError::MalformedBody(e.to_string())),
        }
    }

    fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    /// A string field that must be present and non-empty.
    pub fn required_str(&self, field: &str) -> Result<String, ValidationError> {
        let value = self
            .get(field)
            .ok_or_else(|| ValidationError::MissingField(field.to_string()))?;
        non_empty_str(value, field)
    }

    pub fn optional_bool(&self, field: &str) -> Result<Option<bool>, ValidationError> {
        self.get(field)
            .map(|value| {
                value
                    .as_bool()
                    .ok_or_else(|| ValidationError::invalid_type(field, "a boolean"))
            })
            .transpose()
    }

    /// The `format` hint: either a string such as `"json"` or a schema object.
    pub fn optional_format(&self, field: &str) -> Result<Option<Value>, ValidationError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(value @ (Value::String(_) | Value::Object(_))) => Ok(Some(value.clone())),
            Some(_) => Err(ValidationError::invalid_type(
                field,
                "a string or a JSON object",
            )),
        }
    }

    /// A list of strings, e.g. base64 image blobs. Absent means empty.
    pub fn optional_str_list(&self, field: &str) -> Result<Vec<String>, ValidationError> {
        let Some(value) = self.get(field) else {
            return Ok(Vec::new());
        };
        let items = value
            .as_array()
            .ok_or_else(|| ValidationError::invalid_type(field, "an array of strings"))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ValidationError::invalid_type(format!("{field}[{i}]"), "a string"))
            })
            .collect()
    }

    /// A non-empty array of `{role, content}` chat messages.
    pub fn required_messages(&self, field: &str) -> Result<Vec<Message>, ValidationError> {
        let value = self
            .get(field)
            .ok_or_else(|| ValidationError::MissingField(field.to_string()))?;
        let items = value
            .as_array()
            .ok_or_else(|| ValidationError::invalid_type(field, "an array of messages"))?;
        if items.is_empty() {
            return Err(ValidationError::EmptyField(field.to_string()));
        }

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let path = format!("{field}[{i}]");
                let object = item
                    .as_object()
                    .ok_or_else(|| ValidationError::invalid_type(path.clone(), "an object"))?;

                let role_path = format!("{path}.role");
                let role = object
                    .get("role")
                    .filter(|v| !v.is_null())
                    .ok_or_else(|| ValidationError::MissingField(role_path.clone()))?;
                let role = non_empty_str(role, &role_path)?;

                // Content may legitimately be empty (image-only turns).
                let content_path = format!("{path}.content");
                let content = match object.get("content").filter(|v| !v.is_null()) {
                    None => return Err(ValidationError::MissingField(content_path)),
                    Some(Value::String(s)) => s.clone(),
                    Some(_) => return Err(ValidationError::invalid_type(content_path, "a string")),
                };

                Ok(Message::new(role, content))
            })
            .collect()
    }
}

fn non_empty_str(value: &Value, field: &str) -> Result<String, ValidationError> {
    let s = value
        .as_str()
        .ok_or_else(|| ValidationError::invalid_type(field, "a string"))?;
    if s.trim().is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }
    Ok(s.to_string())
}
