//! Turning a user question into an answer
//!
//! A [`Responder`] is one answer strategy. [`generate_response`] wraps any
//! responder so that a failure comes back as a placeholder and a message
//! instead of an error.

use crate::llm::model::{ChatModel, ChatRequest};
use crate::llm::prompts::direct_prompt;
use crate::llm::{ApiError, Credential};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Where the question came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Voice,
    Text,
}

/// An answer strategy
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(
        &self,
        credential: &Credential,
        question: &str,
        mode: InputMode,
    ) -> Result<String, ApiError>;
}

/// Sampling parameters for the direct variant
#[derive(Clone, Debug, PartialEq)]
pub struct DirectSettings {
    pub model: String,
    pub temperature: f32,
    pub voice_max_tokens: u32,
    pub text_max_tokens: u32,
}

impl Default for DirectSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            voice_max_tokens: 50,
            text_max_tokens: 100,
        }
    }
}

impl DirectSettings {
    pub fn max_tokens(&self, mode: InputMode) -> u32 {
        match mode {
            InputMode::Voice => self.voice_max_tokens,
            InputMode::Text => self.text_max_tokens,
        }
    }
}

/// Sends the question straight to the chat model
pub struct DirectResponder {
    model: Arc<dyn ChatModel>,
    settings: DirectSettings,
}

impl DirectResponder {
    pub fn new(model: Arc<dyn ChatModel>, settings: DirectSettings) -> Self {
        Self { model, settings }
    }
}

#[async_trait]
impl Responder for DirectResponder {
    async fn respond(
        &self,
        credential: &Credential,
        question: &str,
        mode: InputMode,
    ) -> Result<String, ApiError> {
        let request = ChatRequest::prompt(&self.settings.model, direct_prompt(question))
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens(mode));

        let text = self.model.complete(credential, &request).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ApiError::Api {
                status: 200,
                message: "empty completion".to_string(),
            });
        }
        Ok(text.to_string())
    }
}

/// Result of [`generate_response`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResponseOutcome {
    Answer(String),
    Failed {
        placeholder: &'static str,
        message: String,
    },
}

impl ResponseOutcome {
    /// The text to store or speak: the answer, or the failure placeholder
    pub fn text(&self) -> &str {
        match self {
            ResponseOutcome::Answer(text) => text,
            ResponseOutcome::Failed { placeholder, .. } => placeholder,
        }
    }

    pub fn is_answer(&self) -> bool {
        matches!(self, ResponseOutcome::Answer(_))
    }
}

/// Ask `responder` and fold any failure into a placeholder
pub async fn generate_response(
    responder: &dyn Responder,
    credential: &Credential,
    question: &str,
    mode: InputMode,
) -> ResponseOutcome {
    match responder.respond(credential, question, mode).await {
        Ok(answer) => {
            info!("Generated answer ({} chars)", answer.chars().count());
            ResponseOutcome::Answer(answer)
        }
        Err(err) => {
            warn!("Response generation failed: {}", err);
            ResponseOutcome::Failed {
                placeholder: err.placeholder(),
                message: err.user_message(),
            }
        }
    }
}
