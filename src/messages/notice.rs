use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const LISTENING: &str = "Listening... Please ask your question in Urdu.";
pub const AUDIO_CAPTURED: &str = "Your audio is captured.";
pub const NO_INPUT: &str = "No input detected. Please try again.";
pub const NOT_UNDERSTOOD: &str = "Could not understand audio, please try again.";
pub const SERVICE_UNAVAILABLE: &str =
    "API unavailable. Please check your internet connection and try again.";
pub const MISSING_KEY: &str = "Please enter your OpenAI API key to proceed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Short status line shown under the inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: Uuid,
    pub level: NoticeLevel,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, text)
    }

    /// "You said: ..." echo of a recognized utterance
    pub fn you_said(text: &str) -> Self {
        Self::success(format!("You said: {}", text))
    }
}
