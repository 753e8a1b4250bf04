//! Cloud speech-to-text

use crate::audio::encode_wav;
use crate::llm::{ApiError, Credential, OpenAiClient};
use crate::speech::{SpeechClip, SpeechRecognizer, Transcript};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Clips shorter than this are never sent
pub const MIN_CLIP: Duration = Duration::from_millis(100);

/// Transcribes clips through `/audio/transcriptions`
pub struct CloudRecognizer {
    client: OpenAiClient,
    model: String,
    language: String,
}

impl CloudRecognizer {
    pub fn new(client: OpenAiClient, model: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            language: language.into(),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for CloudRecognizer {
    async fn transcribe(
        &self,
        credential: &Credential,
        clip: &SpeechClip,
    ) -> Result<Transcript, ApiError> {
        if clip.duration() < MIN_CLIP {
            debug!("Clip too short to transcribe ({:?})", clip.duration());
            return Ok(Transcript::NotUnderstood);
        }

        let wav = encode_wav(&clip.samples, clip.sample_rate)
            .map_err(|e| ApiError::Unexpected(e.to_string()))?;

        let text = self
            .client
            .transcribe(credential, &self.model, &self.language, wav)
            .await?;

        Ok(classify(text))
    }
}

fn classify(text: String) -> Transcript {
    let text = text.trim();
    if text.is_empty() {
        Transcript::NotUnderstood
    } else {
        info!("Recognized {} chars", text.chars().count());
        Transcript::Recognized(text.to_string())
    }
}
