//! Model-facing request types and the seams the responders call through

use crate::llm::{ApiError, Credential};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role of a chat message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single chat message
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// One chat-completion call
#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// A request holding a single user prompt
    pub fn prompt(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: 0.7,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Hosted chat completion
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one completion and return the raw text of the first choice
    async fn complete(&self, credential: &Credential, request: &ChatRequest)
        -> Result<String, ApiError>;
}

/// Hosted text embedding
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed every input, preserving order
    async fn embed(&self, credential: &Credential, inputs: &[String])
        -> Result<Vec<Vec<f32>>, ApiError>;
}
