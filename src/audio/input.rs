use crate::audio::downmix;
use crate::{AwaazError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Default input device, delivering mono blocks at the device rate
pub struct Microphone {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    is_recording: Arc<Mutex<bool>>,
}

impl Microphone {
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| AwaazError::AudioDeviceError("No input device available".into()))?;

        info!(
            "Using input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_input_config()
            .map_err(|e| {
                AwaazError::AudioDeviceError(format!("Failed to get input config: {}", e))
            })?
            .into();

        Ok(Self {
            device,
            config,
            stream: None,
            is_recording: Arc::new(Mutex::new(false)),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Start streaming mono blocks into `audio_tx`
    pub fn start(&mut self, audio_tx: Sender<Vec<f32>>) -> Result<()> {
        if *self.is_recording.lock() {
            warn!("Already recording");
            return Ok(());
        }

        let channels = self.config.channels as usize;
        let is_recording = Arc::clone(&self.is_recording);

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if !*is_recording.lock() {
                        return;
                    }
                    if let Err(e) = audio_tx.try_send(downmix(data, channels)) {
                        debug!("Dropped audio block: {}", e);
                    }
                },
                |err| error!("Audio input stream error: {}", err),
                None,
            )
            .map_err(|e| {
                AwaazError::AudioDeviceError(format!("Failed to build input stream: {}", e))
            })?;

        stream.play().map_err(|e| {
            AwaazError::AudioDeviceError(format!("Failed to start input stream: {}", e))
        })?;

        *self.is_recording.lock() = true;
        self.stream = Some(stream);

        info!("Microphone open at {} Hz", self.sample_rate());
        Ok(())
    }

    pub fn stop(&mut self) {
        *self.is_recording.lock() = false;
        if self.stream.take().is_some() {
            info!("Microphone closed");
        }
    }

    pub fn is_recording(&self) -> bool {
        *self.is_recording.lock()
    }
}

impl Drop for Microphone {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn start_and_stop_toggle_recording() {
        // no input device on most CI machines
        if let Ok(mut mic) = Microphone::new() {
            assert!(mic.sample_rate() > 0);
            assert!(!mic.is_recording());

            let (tx, _rx) = bounded(10);
            if mic.start(tx).is_ok() {
                assert!(mic.is_recording());
                mic.stop();
                assert!(!mic.is_recording());
            }
        }
    }
}
