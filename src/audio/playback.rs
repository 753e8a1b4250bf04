//! Speaker output through rodio
//!
//! The output stream is not `Send`, so each playback opens its own stream
//! on the thread that plays.

use crate::{AwaazError, Result};
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, Sink};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn open_sink() -> Result<(OutputStream, Sink)> {
    let (stream, handle) = OutputStream::try_default()
        .map_err(|e| AwaazError::AudioDeviceError(format!("No output device: {}", e)))?;
    let sink = Sink::try_new(&handle)
        .map_err(|e| AwaazError::AudioDeviceError(format!("Failed to open sink: {}", e)))?;
    Ok((stream, sink))
}

/// Play raw samples on the calling thread, blocking until done
pub fn play_samples(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Result<()> {
    let (_stream, sink) = open_sink()?;
    debug!("Playing {} samples at {} Hz", samples.len(), sample_rate);
    sink.append(SamplesBuffer::new(channels, sample_rate, samples));
    sink.sleep_until_end();
    Ok(())
}

/// Plays one encoded clip at a time on a background thread
#[derive(Default)]
pub struct ClipPlayer {
    stop: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ClipPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start playing `bytes`, stopping any clip already playing
    pub fn play(&mut self, bytes: Vec<u8>) {
        self.stop();

        let stop = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        self.stop = Arc::clone(&stop);
        self.finished = Arc::clone(&finished);

        self.handle = Some(std::thread::spawn(move || {
            if let Err(e) = play_until_stopped(bytes, &stop) {
                error!("Clip playback failed: {}", e);
            }
            finished.store(true, Ordering::SeqCst);
        }));
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.handle.is_some() && !self.finished.load(Ordering::SeqCst)
    }
}

impl Drop for ClipPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn play_until_stopped(bytes: Vec<u8>, stop: &AtomicBool) -> Result<()> {
    let (_stream, sink) = open_sink()?;
    let source = Decoder::new(Cursor::new(bytes))
        .map_err(|e| AwaazError::AudioProcessingError(format!("Failed to decode clip: {}", e)))?;

    sink.append(source);
    info!("Playing speech clip");

    while !sink.empty() {
        if stop.load(Ordering::SeqCst) {
            sink.stop();
            debug!("Clip playback stopped");
            break;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    Ok(())
}
