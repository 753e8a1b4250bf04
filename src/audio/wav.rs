//! In-memory WAV encoding for upload and playback

use crate::{AwaazError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;
use std::time::Duration;
use tracing::debug;

/// Encode mono f32 samples as a 16-bit PCM WAV buffer
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    let mut writer = WavWriter::new(&mut cursor, spec)
        .map_err(|e| AwaazError::IOError(format!("Failed to create WAV writer: {}", e)))?;

    for &sample in samples {
        let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(sample_i16)
            .map_err(|e| AwaazError::IOError(format!("Failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| AwaazError::IOError(format!("Failed to finalize WAV: {}", e)))?;

    debug!("Encoded {} samples at {} Hz", samples.len(), sample_rate);
    Ok(cursor.into_inner())
}

/// Playing time of a WAV buffer, if its header can be read
pub fn wav_duration(bytes: &[u8]) -> Option<Duration> {
    let reader = WavReader::new(Cursor::new(bytes)).ok()?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }
    Some(Duration::from_secs_f64(
        reader.duration() as f64 / spec.sample_rate as f64,
    ))
}
