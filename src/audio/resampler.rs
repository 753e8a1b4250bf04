use crate::{AwaazError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

const CHUNK_FRAMES: usize = 1024;

/// Mono resampler fed with blocks of any length.
///
/// Input is buffered until a full chunk is available; [`flush`](Self::flush)
/// pads and drains whatever is left.
pub struct StreamResampler {
    resampler: Option<SincFixedIn<f32>>,
    pending: Vec<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl StreamResampler {
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(AwaazError::ConfigError(
                "Sample rates must be greater than 0".into(),
            ));
        }

        // same rate: pass samples through untouched
        let resampler = if input_rate == output_rate {
            None
        } else {
            let params = SincInterpolationParameters {
                sinc_len: 256,
                f_cutoff: 0.95,
                interpolation: SincInterpolationType::Linear,
                oversampling_factor: 256,
                window: WindowFunction::BlackmanHarris2,
            };
            let ratio = output_rate as f64 / input_rate as f64;
            let inner = SincFixedIn::<f32>::new(ratio, 2.0, params, CHUNK_FRAMES, 1).map_err(
                |e| AwaazError::AudioProcessingError(format!("Failed to create resampler: {}", e)),
            )?;
            Some(inner)
        };

        debug!("Created resampler: {} Hz -> {} Hz", input_rate, output_rate);

        Ok(Self {
            resampler,
            pending: Vec::with_capacity(CHUNK_FRAMES * 2),
            input_rate,
            output_rate,
        })
    }

    /// Feed samples and return every output sample that is ready
    pub fn push(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(input.to_vec());
        };

        self.pending.extend_from_slice(input);
        let mut output = Vec::new();
        while self.pending.len() >= CHUNK_FRAMES {
            let chunk: Vec<f32> = self.pending.drain(..CHUNK_FRAMES).collect();
            let planar = resampler
                .process(&[chunk], None)
                .map_err(|e| AwaazError::AudioProcessingError(format!("Resampling failed: {}", e)))?;
            output.extend_from_slice(&planar[0]);
        }
        Ok(output)
    }

    /// Drain the buffered tail, zero-padding the last chunk
    pub fn flush(&mut self) -> Result<Vec<f32>> {
        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(Vec::new());
        };
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }

        let remaining = self.pending.len();
        let mut chunk = std::mem::take(&mut self.pending);
        chunk.resize(CHUNK_FRAMES, 0.0);

        let planar = resampler
            .process(&[chunk], None)
            .map_err(|e| AwaazError::AudioProcessingError(format!("Resampling failed: {}", e)))?;

        // only keep output corresponding to real input
        let ratio = self.output_rate as f64 / self.input_rate as f64;
        let keep = ((remaining as f64) * ratio).ceil() as usize;
        let out = &planar[0];
        Ok(out[..keep.min(out.len())].to_vec())
    }
}
