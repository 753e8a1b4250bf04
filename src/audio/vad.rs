use crate::audio::rms;
use crate::{AwaazError, Result};
use tracing::{info, warn};
use voice_activity_detector::VoiceActivityDetector as VadDetector;

/// Voice Activity Detection using Silero VAD
pub struct VoiceActivityDetector {
    detector: VadDetector,
    sample_rate: u32,
    threshold: f32,
}

impl VoiceActivityDetector {
    /// Create a new VAD instance
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate of the audio (8000 or 16000)
    /// * `threshold` - Probability threshold for speech detection (0.0-1.0)
    pub fn new(sample_rate: u32, threshold: f32) -> Result<Self> {
        if ![8000, 16000].contains(&sample_rate) {
            return Err(AwaazError::ConfigError(format!(
                "Invalid sample rate: {}. Must be 8000 or 16000",
                sample_rate
            )));
        }

        let detector = VadDetector::builder()
            .sample_rate(sample_rate as i32)
            .chunk_size(chunk_size_for(sample_rate))
            .build()
            .map_err(|e| {
                AwaazError::AudioProcessingError(format!("Failed to create VAD: {:?}", e))
            })?;

        info!(
            "Initialized VAD with sample rate: {}, threshold: {}",
            sample_rate, threshold
        );

        Ok(Self {
            detector,
            sample_rate,
            threshold: threshold.clamp(0.0, 1.0),
        })
    }

    /// Silero probability for the frame is at or above the threshold
    pub fn is_speech(&mut self, audio: &[f32]) -> bool {
        self.detector.predict(audio.iter().copied()) >= self.threshold
    }

    /// Samples per frame: 32ms
    pub fn chunk_size(&self) -> usize {
        chunk_size_for(self.sample_rate)
    }
}

fn chunk_size_for(sample_rate: u32) -> usize {
    match sample_rate {
        8000 => 256,
        _ => 512,
    }
}

/// Fallback detector: a frame is speech when its RMS exceeds a fixed level
#[derive(Clone, Copy, Debug)]
pub struct EnergyDetector {
    pub threshold: f32,
}

impl Default for EnergyDetector {
    fn default() -> Self {
        Self { threshold: 0.02 }
    }
}

impl EnergyDetector {
    pub fn is_speech(&self, audio: &[f32]) -> bool {
        rms(audio) >= self.threshold
    }
}

/// Frame classifier used while endpointing a capture
pub enum SpeechDetector {
    Silero(VoiceActivityDetector),
    Energy(EnergyDetector),
}

impl SpeechDetector {
    /// Silero at `sample_rate`, falling back to energy when it cannot load
    pub fn with_fallback(sample_rate: u32, vad_threshold: f32, energy: EnergyDetector) -> Self {
        match VoiceActivityDetector::new(sample_rate, vad_threshold) {
            Ok(vad) => SpeechDetector::Silero(vad),
            Err(e) => {
                warn!("VAD unavailable ({}), using energy threshold", e);
                SpeechDetector::Energy(energy)
            }
        }
    }

    pub fn is_speech(&mut self, frame: &[f32]) -> bool {
        match self {
            SpeechDetector::Silero(vad) => vad.is_speech(frame),
            SpeechDetector::Energy(energy) => energy.is_speech(frame),
        }
    }

    /// Samples per frame the detector expects
    pub fn frame_size(&self) -> usize {
        match self {
            SpeechDetector::Silero(vad) => vad.chunk_size(),
            SpeechDetector::Energy(_) => 512,
        }
    }
}
