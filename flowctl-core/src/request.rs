//! Invocation payload and per-component tweaks.
//!
//! Wire shape:
//!
//! ```text
//! {"input_value": <message>, "output_type": "chat", "input_type": "chat", "tweaks": {...}?}
//! ```
//!
//! `tweaks` is omitted entirely when there is nothing to send.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FlowError, Result};

/// Default value for both `output_type` and `input_type`
pub const DEFAULT_IO_TYPE: &str = "chat";

/// Per-component override parameters, forwarded verbatim.
///
/// Keys are component identifiers from the remote flow definition
/// (e.g. `"ChatInput-ivyVt"`); they are opaque here and never validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tweaks(Map<String, Value>);

impl Tweaks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse tweaks from a JSON string. The top level must be an object;
    /// `null` means no tweaks.
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| FlowError::configuration(format!("Invalid tweaks JSON string: {}", e)))?;
        Self::try_from(value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, component: &str) -> Option<&Value> {
        self.0.get(component)
    }

    /// Set (replacing) the parameters for one component
    pub fn insert(&mut self, component: impl Into<String>, params: Value) -> Option<Value> {
        self.0.insert(component.into(), params)
    }
}

impl FromStr for Tweaks {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json(s)
    }
}

impl TryFrom<Value> for Tweaks {
    type Error = FlowError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(FlowError::configuration(format!(
                "Invalid tweaks: expected a JSON object keyed by component id, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// One flow invocation: the message plus optional customization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationRequest {
    #[serde(rename = "input_value")]
    pub message: String,
    pub output_type: String,
    pub input_type: String,
    #[serde(skip_serializing_if = "Tweaks::is_empty")]
    pub tweaks: Tweaks,
}

impl InvocationRequest {
    /// Chat-in, chat-out request with no tweaks
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            output_type: DEFAULT_IO_TYPE.to_string(),
            input_type: DEFAULT_IO_TYPE.to_string(),
            tweaks: Tweaks::default(),
        }
    }

    pub fn with_output_type(mut self, output_type: impl Into<String>) -> Self {
        self.output_type = output_type.into();
        self
    }

    pub fn with_input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = input_type.into();
        self
    }

    pub fn with_tweaks(mut self, tweaks: Tweaks) -> Self {
        self.tweaks = tweaks;
        self
    }

    /// JSON body as sent on the wire
    pub fn to_body(&self) -> Value {
        // Serializing String/Map fields cannot fail
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_without_tweaks() {
        let body = InvocationRequest::new("hello").to_body();
        let obj = body.as_object().unwrap();

        assert_eq!(obj.len(), 3);
        assert_eq!(obj["input_value"], "hello");
        assert_eq!(obj["output_type"], "chat");
        assert_eq!(obj["input_type"], "chat");
        assert!(!obj.contains_key("tweaks"));
    }

    #[test]
    fn test_body_with_tweaks() {
        let tweaks = Tweaks::from_json(r#"{"ChatInput-ivyVt": {}, "OpenAIModel-SzTnW": {"temperature": 0.2}}"#).unwrap();
        let body = InvocationRequest::new("hi")
            .with_output_type("text")
            .with_input_type("text")
            .with_tweaks(tweaks)
            .to_body();

        assert_eq!(body["output_type"], "text");
        assert_eq!(body["input_type"], "text");
        assert_eq!(
            body["tweaks"],
            json!({"ChatInput-ivyVt": {}, "OpenAIModel-SzTnW": {"temperature": 0.2}})
        );
    }

    #[test]
    fn test_empty_tweaks_are_omitted() {
        let body = InvocationRequest::new("hi")
            .with_tweaks(Tweaks::from_json("{}").unwrap())
            .to_body();
        assert!(body.get("tweaks").is_none());
    }

    #[test]
    fn test_invalid_tweaks_json() {
        let err = Tweaks::from_json("{not json").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("Invalid tweaks JSON string"));
    }

    #[test]
    fn test_tweaks_must_be_object() {
        let err = "[1, 2]".parse::<Tweaks>().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_null_tweaks_are_empty() {
        let tweaks = Tweaks::from_json("null").unwrap();
        assert!(tweaks.is_empty());
        let body = InvocationRequest::new("hi").with_tweaks(tweaks).to_body();
        assert!(body.get("tweaks").is_none());
    }

    #[test]
    fn test_tweak_values_not_validated() {
        let tweaks = Tweaks::from_json(r#"{"File-oYNDr": "anything", "x": [1, null]}"#).unwrap();
        assert_eq!(tweaks.len(), 2);
        assert_eq!(tweaks.get("File-oYNDr"), Some(&json!("anything")));
    }

}
