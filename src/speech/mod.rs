//! Speech in and out
//!
//! - capture: endpointing microphone audio into one utterance
//! - stt: cloud transcription of a captured utterance
//! - tts: cloud clips or a local VITS voice

pub mod capture;
pub mod stt;
pub mod tts;

use crate::llm::{ApiError, Credential};
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

#[cfg(feature = "audio-io")]
pub use capture::MicrophoneSource;
pub use capture::{CaptureSettings, EndpointState, Endpointer};
pub use stt::CloudRecognizer;
#[cfg(feature = "audio-io")]
pub use tts::LocalSynthesizer;
pub use tts::{normalize_for_speech, CloudSynthesizer, LocalVoiceConfig};

/// Mono audio captured from the user
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpeechClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl SpeechClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CaptureOutcome {
    Speech(SpeechClip),
    /// Nothing was said before the listen timeout
    NoSpeech,
}

/// Blocking source of one utterance
pub trait AudioSource: Send {
    fn capture(&mut self) -> Result<CaptureOutcome>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transcript {
    Recognized(String),
    NotUnderstood,
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn transcribe(
        &self,
        credential: &Credential,
        clip: &SpeechClip,
    ) -> std::result::Result<Transcript, ApiError>;
}

/// Encoded audio returned by a synthesizer for inline playback
#[derive(Clone, Debug, PartialEq)]
pub struct AudioClip {
    pub wav: Vec<u8>,
    pub duration: Option<Duration>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Synthesis {
    /// Audio to hand to the UI player
    Clip(AudioClip),
    /// Handed to a background voice; nothing to wait for
    Queued,
    /// Nothing left to say after normalisation
    Skipped,
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, credential: &Credential, text: &str) -> Result<Synthesis>;
}
