//! Answer engine API request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A chat message in an answer request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message role ("system" or "user")
    pub role: String,

    /// Message content
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request to the answer engine's chat completions endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerRequest {
    /// Model to use (e.g., "sonar")
    pub model: String,

    /// Conversation messages
    pub messages: Vec<Message>,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Maximum tokens in the completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for AnswerRequest {
    fn default() -> Self {
        Self {
            model: "sonar".to_string(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl AnswerRequest {
    /// Create a new request with the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Create a single-question request, the common case for probes.
    pub fn question(model: impl Into<String>, query: impl Into<String>) -> Self {
        Self::new(model).message(Message::user(query))
    }

    /// Add a message to the conversation.
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Response from the answer engine.
///
/// The payload is kept as raw JSON: citation schemas vary across engine
/// versions, so interpretation is left to the caller.
#[derive(Debug, Clone)]
pub struct AnswerResponse {
    /// Raw response payload
    pub payload: Value,

    /// Wall-clock latency of the request in milliseconds
    pub latency_ms: u64,
}

impl AnswerResponse {
    /// The generated answer text, if present.
    pub fn content(&self) -> Option<&str> {
        self.payload
            .get("choices")?
            .get(0)?
            .get("message")?
            .get("content")?
            .as_str()
    }

    /// Bare citation URLs from the top-level `citations` array, if present.
    pub fn citation_urls(&self) -> Vec<String> {
        self.payload
            .get("citations")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
