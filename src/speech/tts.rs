//! Text-to-speech: cloud clips or a local VITS voice
//!
//! The cloud backend returns a WAV clip for the UI to play inline. The local
//! backend owns a sherpa-rs VITS engine on its own thread; replies are queued
//! to it and never awaited.

use crate::audio::wav_duration;
use crate::llm::{Credential, OpenAiClient};
use crate::speech::{AudioClip, SpeechSynthesizer, Synthesis};
use crate::{AwaazError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Strip markdown decoration and collapse whitespace
pub fn normalize_for_speech(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '*' | '#' | '_' | '`' | '~' | '>' | '|' => ' ',
            other => other,
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Synthesizes through `/audio/speech`
pub struct CloudSynthesizer {
    client: OpenAiClient,
    model: String,
    voice: String,
}

impl CloudSynthesizer {
    pub fn new(client: OpenAiClient, model: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            voice: voice.into(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for CloudSynthesizer {
    async fn synthesize(&self, credential: &Credential, text: &str) -> Result<Synthesis> {
        let text = normalize_for_speech(text);
        if text.is_empty() {
            return Ok(Synthesis::Skipped);
        }

        let wav = self
            .client
            .speech(credential, &self.model, &self.voice, &text)
            .await
            .map_err(|e| AwaazError::TTSError(e.to_string()))?;

        let duration = wav_duration(&wav);
        debug!("Cloud speech clip: {} bytes, {:?}", wav.len(), duration);
        Ok(Synthesis::Clip(AudioClip { wav, duration }))
    }
}

/// Paths and voice parameters for the local VITS engine
#[derive(Clone, Debug, PartialEq)]
pub struct LocalVoiceConfig {
    pub model_path: PathBuf,
    pub tokens_path: PathBuf,
    pub lexicon_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub speaker_id: i32,
    /// Speech rate, 1.0 is normal
    pub speed: f32,
    pub queue_size: usize,
}

impl Default for LocalVoiceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            tokens_path: PathBuf::new(),
            lexicon_path: None,
            data_dir: None,
            speaker_id: 0,
            speed: 1.0,
            queue_size: 8,
        }
    }
}

impl LocalVoiceConfig {
    pub fn new(model_path: impl Into<PathBuf>, tokens_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            tokens_path: tokens_path.into(),
            ..Default::default()
        }
    }

    pub fn with_speaker(mut self, speaker_id: i32) -> Self {
        self.speaker_id = speaker_id;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.model_path.exists() {
            return Err(AwaazError::ConfigError(format!(
                "TTS model not found: {}",
                self.model_path.display()
            )));
        }
        if !self.tokens_path.exists() {
            return Err(AwaazError::ConfigError(format!(
                "TTS tokens file not found: {}",
                self.tokens_path.display()
            )));
        }
        if self.speed <= 0.0 {
            return Err(AwaazError::ConfigError("TTS speed must be positive".into()));
        }
        Ok(())
    }

    /// VITS length scale is the inverse of speed
    pub fn length_scale(&self) -> f32 {
        1.0 / self.speed.max(0.1)
    }
}

#[cfg(feature = "audio-io")]
pub use local::LocalSynthesizer;

#[cfg(feature = "audio-io")]
mod local {
    use super::{normalize_for_speech, LocalVoiceConfig};
    use crate::audio::play_samples;
    use crate::llm::Credential;
    use crate::speech::{SpeechSynthesizer, Synthesis};
    use crate::{AwaazError, Result};
    use async_trait::async_trait;
    use crossbeam_channel::{bounded, Sender, TrySendError};
    use sherpa_rs::tts::{VitsTts, VitsTtsConfig};
    use std::thread;
    use tracing::{debug, error, info, warn};

    enum VoiceCommand {
        Speak(String),
        Shutdown,
    }

    /// Fire-and-forget local voice
    pub struct LocalSynthesizer {
        command_tx: Sender<VoiceCommand>,
        handle: Option<thread::JoinHandle<()>>,
    }

    impl LocalSynthesizer {
        /// Validate the model files and start the voice thread
        pub fn start(config: LocalVoiceConfig) -> Result<Self> {
            config.validate()?;
            let (command_tx, command_rx) = bounded::<VoiceCommand>(config.queue_size.max(1));

            let handle = thread::Builder::new()
                .name("local-voice".into())
                .spawn(move || {
                    info!("Loading VITS model from {}", config.model_path.display());
                    let vits_config = VitsTtsConfig {
                        model: config.model_path.to_string_lossy().into_owned(),
                        tokens: config.tokens_path.to_string_lossy().into_owned(),
                        lexicon: config
                            .lexicon_path
                            .as_ref()
                            .map(|p| p.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                        data_dir: config
                            .data_dir
                            .as_ref()
                            .map(|p| p.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                        length_scale: config.length_scale(),
                        ..Default::default()
                    };
                    let mut tts = VitsTts::new(vits_config);
                    info!("Local voice ready");

                    while let Ok(command) = command_rx.recv() {
                        let text = match command {
                            VoiceCommand::Speak(text) => text,
                            VoiceCommand::Shutdown => break,
                        };

                        let audio = match tts.create(&text, config.speaker_id, 1.0) {
                            Ok(audio) => audio,
                            Err(e) => {
                                error!("Local synthesis failed: {}", e);
                                continue;
                            }
                        };
                        debug!(
                            "Synthesized {} samples at {} Hz",
                            audio.samples.len(),
                            audio.sample_rate
                        );
                        if let Err(e) = play_samples(audio.samples, audio.sample_rate as u32, 1) {
                            error!("Local playback failed: {}", e);
                        }
                    }
                    info!("Local voice stopped");
                })
                .map_err(|e| AwaazError::TTSError(format!("Failed to start voice thread: {}", e)))?;

            Ok(Self {
                command_tx,
                handle: Some(handle),
            })
        }

        /// Queue `text` without waiting for it to be spoken
        pub fn speak(&self, text: &str) -> Synthesis {
            let text = normalize_for_speech(text);
            if text.is_empty() {
                return Synthesis::Skipped;
            }
            match self.command_tx.try_send(VoiceCommand::Speak(text)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => warn!("Voice queue full, reply not spoken"),
                Err(TrySendError::Disconnected(_)) => warn!("Voice thread has stopped"),
            }
            Synthesis::Queued
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for LocalSynthesizer {
        async fn synthesize(&self, _credential: &Credential, text: &str) -> Result<Synthesis> {
            Ok(self.speak(text))
        }
    }

    impl Drop for LocalSynthesizer {
        fn drop(&mut self) {
            // a full queue means the thread is busy speaking; leave it detached
            if self.command_tx.try_send(VoiceCommand::Shutdown).is_ok() {
                if let Some(handle) = self.handle.take() {
                    let _ = handle.join();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_is_stripped_and_whitespace_collapsed() {
        assert_eq!(
            normalize_for_speech("**جواب:**\n\n  یہ _اہم_ ہے  `code`"),
            "جواب: یہ اہم ہے code"
        );
        assert_eq!(normalize_for_speech(" ** ## "), "");
    }

    #[test]
    fn local_config_requires_model_files() {
        let config = LocalVoiceConfig::new("/missing/model.onnx", "/missing/tokens.txt");
        assert!(matches!(config.validate(), Err(AwaazError::ConfigError(_))));
    }

    #[test]
    fn speed_inverts_into_length_scale() {
        let config = LocalVoiceConfig::default().with_speed(2.0);
        assert_eq!(config.length_scale(), 0.5);
    }

    #[tokio::test]
    async fn cloud_synthesizer_skips_empty_text() {
        let client =
            OpenAiClient::new("http://127.0.0.1:9/v1", std::time::Duration::from_secs(1)).unwrap();
        let synth = CloudSynthesizer::new(client, "tts-1", "alloy");
        let result = synth.synthesize(&Credential::default(), "  ** ").await.unwrap();
        assert_eq!(result, Synthesis::Skipped);
    }
}
