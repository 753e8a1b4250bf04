//! Awaaz - an Urdu voice chatbot.
//!
//! Questions arrive by voice or text, answers come back as text and speech.
//! Answers are produced either by retrieval over a fixed document or by a
//! direct call to a hosted language model.

pub mod audio;
pub mod integration;
pub mod llm;
pub mod messages;
pub mod rag;
pub mod speech;
pub mod ui;

pub use llm::ApiError;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum AwaazError {
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    #[error("Transcription error: {0}")]
    TranscriptionError(String),

    #[error("TTS error: {0}")]
    TTSError(String),

    #[error("Document error: {0}")]
    DocumentError(String),

    #[error(transparent)]
    ApiError(#[from] ApiError),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl From<std::io::Error> for AwaazError {
    fn from(e: std::io::Error) -> Self {
        AwaazError::IOError(e.to_string())
    }
}

impl AwaazError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Hardware/device errors may require user intervention
            AwaazError::AudioDeviceError(_) => false,
            AwaazError::AudioProcessingError(_) => true,
            AwaazError::TranscriptionError(_) => true,
            AwaazError::TTSError(_) => true,
            // The document is read once at startup
            AwaazError::DocumentError(_) => false,
            AwaazError::ApiError(_) => true,
            AwaazError::IOError(_) => false,
            AwaazError::ConfigError(_) => false,
            AwaazError::ChannelError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            AwaazError::AudioDeviceError(_) => {
                "Audio device error. Please check your microphone/speakers.".to_string()
            }
            AwaazError::AudioProcessingError(_) => {
                "Audio processing failed. Please try again.".to_string()
            }
            AwaazError::TranscriptionError(_) => {
                "Speech recognition failed. Please try again.".to_string()
            }
            AwaazError::TTSError(_) => {
                "Text-to-speech failed. Response will be shown as text.".to_string()
            }
            AwaazError::DocumentError(_) => {
                "Failed to load the reference document.".to_string()
            }
            AwaazError::ApiError(e) => e.user_message(),
            AwaazError::IOError(_) => "File system error occurred.".to_string(),
            AwaazError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            AwaazError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AwaazError>;
