#[cfg(feature = "audio-io")]
pub mod input;
#[cfg(feature = "audio-io")]
pub mod playback;
pub mod resampler;
pub mod vad;
pub mod wav;

#[cfg(feature = "audio-io")]
pub use input::Microphone;
#[cfg(feature = "audio-io")]
pub use playback::{play_samples, ClipPlayer};
pub use resampler::StreamResampler;
pub use vad::{EnergyDetector, SpeechDetector, VoiceActivityDetector};
pub use wav::{encode_wav, wav_duration};

/// Sample rate used for capture, detection and transcription
pub const CAPTURE_SAMPLE_RATE: u32 = 16_000;

/// Root-mean-square level of a block of samples
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|&s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Average interleaved frames down to one channel
pub fn downmix(data: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return data.to_vec();
    }
    data.chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}
