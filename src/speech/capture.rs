//! Endpointing microphone audio into a single utterance
//!
//! Listening starts in a waiting state. The first speech frame opens the
//! phrase (with a short pre-roll of what came just before); trailing
//! silence of `pause` or a phrase of `max_phrase` closes it. If no speech
//! starts within `listen_timeout` the capture yields nothing.

use crate::speech::{CaptureOutcome, SpeechClip};
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct CaptureSettings {
    pub listen_timeout: Duration,
    pub pause: Duration,
    pub max_phrase: Duration,
    pub pre_roll: Duration,
    /// Silero speech probability threshold
    pub vad_threshold: f32,
    /// RMS level used when Silero is unavailable
    pub energy_threshold: f32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            listen_timeout: Duration::from_secs(10),
            pause: Duration::from_millis(800),
            max_phrase: Duration::from_secs(30),
            pre_roll: Duration::from_millis(300),
            vad_threshold: 0.5,
            energy_threshold: 0.02,
        }
    }
}

impl CaptureSettings {
    pub fn with_listen_timeout(mut self, timeout: Duration) -> Self {
        self.listen_timeout = timeout;
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_max_phrase(mut self, max_phrase: Duration) -> Self {
        self.max_phrase = max_phrase;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointState {
    Waiting,
    Speaking,
    /// Trailing silence closed the phrase
    Complete,
    /// Phrase hit `max_phrase`
    PhraseLimit,
    /// No speech before `listen_timeout`
    TimedOut,
}

impl EndpointState {
    pub fn is_done(self) -> bool {
        matches!(
            self,
            EndpointState::Complete | EndpointState::PhraseLimit | EndpointState::TimedOut
        )
    }
}

/// Sample-clocked endpoint detector fed with classified frames
pub struct Endpointer {
    sample_rate: u32,
    listen_limit: usize,
    pause_limit: usize,
    phrase_limit: usize,
    pre_roll_limit: usize,
    pre_roll: VecDeque<f32>,
    phrase: Vec<f32>,
    waited: usize,
    silence: usize,
    state: EndpointState,
}

fn samples_in(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_secs_f64() * sample_rate as f64).round() as usize
}

impl Endpointer {
    pub fn new(settings: &CaptureSettings, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            listen_limit: samples_in(settings.listen_timeout, sample_rate),
            pause_limit: samples_in(settings.pause, sample_rate),
            phrase_limit: samples_in(settings.max_phrase, sample_rate),
            pre_roll_limit: samples_in(settings.pre_roll, sample_rate),
            pre_roll: VecDeque::new(),
            phrase: Vec::new(),
            waited: 0,
            silence: 0,
            state: EndpointState::Waiting,
        }
    }

    pub fn state(&self) -> EndpointState {
        self.state
    }

    /// Feed one frame and its speech classification
    pub fn push(&mut self, frame: &[f32], is_speech: bool) -> EndpointState {
        match self.state {
            EndpointState::Waiting => {
                if is_speech {
                    self.phrase.extend(self.pre_roll.drain(..));
                    self.phrase.extend_from_slice(frame);
                    self.state = EndpointState::Speaking;
                } else {
                    self.pre_roll.extend(frame.iter().copied());
                    let excess = self.pre_roll.len().saturating_sub(self.pre_roll_limit);
                    self.pre_roll.drain(..excess);
                    self.waited += frame.len();
                    if self.waited >= self.listen_limit {
                        self.state = EndpointState::TimedOut;
                    }
                }
            }
            EndpointState::Speaking => {
                self.phrase.extend_from_slice(frame);
                if is_speech {
                    self.silence = 0;
                } else {
                    self.silence += frame.len();
                }

                if self.silence >= self.pause_limit {
                    self.state = EndpointState::Complete;
                } else if self.phrase.len() >= self.phrase_limit {
                    self.state = EndpointState::PhraseLimit;
                }
            }
            _ => {}
        }
        self.state
    }

    /// The captured phrase, or nothing if speech never started
    pub fn finish(self) -> CaptureOutcome {
        match self.state {
            EndpointState::Waiting | EndpointState::TimedOut => CaptureOutcome::NoSpeech,
            _ => CaptureOutcome::Speech(SpeechClip::new(self.phrase, self.sample_rate)),
        }
    }
}

#[cfg(feature = "audio-io")]
pub use microphone::MicrophoneSource;

#[cfg(feature = "audio-io")]
mod microphone {
    use super::{CaptureSettings, Endpointer};
    use crate::audio::{EnergyDetector, Microphone, SpeechDetector, StreamResampler, CAPTURE_SAMPLE_RATE};
    use crate::speech::{AudioSource, CaptureOutcome};
    use crate::{AwaazError, Result};
    use crossbeam_channel::{bounded, RecvTimeoutError};
    use std::time::{Duration, Instant};
    use tracing::{debug, info, warn};

    /// Captures one utterance from the default input device
    pub struct MicrophoneSource {
        settings: CaptureSettings,
    }

    impl MicrophoneSource {
        pub fn new(settings: CaptureSettings) -> Self {
            Self { settings }
        }
    }

    impl AudioSource for MicrophoneSource {
        fn capture(&mut self) -> Result<CaptureOutcome> {
            let mut mic = Microphone::new()?;
            let mut resampler = StreamResampler::new(mic.sample_rate(), CAPTURE_SAMPLE_RATE)?;
            let mut detector = SpeechDetector::with_fallback(
                CAPTURE_SAMPLE_RATE,
                self.settings.vad_threshold,
                EnergyDetector {
                    threshold: self.settings.energy_threshold,
                },
            );
            let frame_size = detector.frame_size();
            let mut endpointer = Endpointer::new(&self.settings, CAPTURE_SAMPLE_RATE);

            let (tx, rx) = bounded(64);
            mic.start(tx)?;
            info!("Listening for up to {:?}", self.settings.listen_timeout);

            // wall-clock guard in case the device stalls
            let deadline = Instant::now()
                + self.settings.listen_timeout
                + self.settings.max_phrase
                + Duration::from_secs(1);
            let mut pending: Vec<f32> = Vec::new();

            'listen: while Instant::now() < deadline {
                let block = match rx.recv_timeout(Duration::from_millis(100)) {
                    Ok(block) => block,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => {
                        return Err(AwaazError::AudioDeviceError(
                            "Input stream closed".into(),
                        ))
                    }
                };

                pending.extend(resampler.push(&block)?);
                while pending.len() >= frame_size {
                    let frame: Vec<f32> = pending.drain(..frame_size).collect();
                    let speech = detector.is_speech(&frame);
                    if endpointer.push(&frame, speech).is_done() {
                        break 'listen;
                    }
                }
            }

            mic.stop();
            if !endpointer.state().is_done() {
                warn!("Capture ended by wall-clock guard");
                // the resampler still holds the newest audio
                pending.extend(resampler.flush()?);
                for frame in pending.chunks_exact(frame_size) {
                    let speech = detector.is_speech(frame);
                    if endpointer.push(frame, speech).is_done() {
                        break;
                    }
                }
            }
            debug!("Capture finished in state {:?}", endpointer.state());
            Ok(endpointer.finish())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 1000;

    fn settings() -> CaptureSettings {
        CaptureSettings::default()
            .with_listen_timeout(Duration::from_secs(1))
            .with_pause(Duration::from_millis(200))
            .with_max_phrase(Duration::from_secs(2))
    }

    fn run(endpointer: &mut Endpointer, frames: &[(bool, usize)]) -> EndpointState {
        for &(speech, count) in frames {
            for _ in 0..count {
                let level = if speech { 0.5 } else { 0.0 };
                if endpointer.push(&[level; 100], speech).is_done() {
                    return endpointer.state();
                }
            }
        }
        endpointer.state()
    }

    #[test]
    fn silence_until_timeout_is_no_speech() {
        let mut endpointer = Endpointer::new(&settings(), RATE);
        assert_eq!(run(&mut endpointer, &[(false, 20)]), EndpointState::TimedOut);
        assert_eq!(endpointer.finish(), CaptureOutcome::NoSpeech);
    }

    #[test]
    fn trailing_pause_closes_phrase_with_pre_roll() {
        let mut endpointer = Endpointer::new(&settings(), RATE);
        let state = run(&mut endpointer, &[(false, 5), (true, 4), (false, 5)]);
        assert_eq!(state, EndpointState::Complete);

        let CaptureOutcome::Speech(clip) = endpointer.finish() else {
            panic!("expected speech");
        };
        // 300ms pre-roll + 400ms speech + 200ms pause
        assert_eq!(clip.samples.len(), 900);
        assert_eq!(clip.sample_rate, RATE);
    }

    #[test]
    fn short_gaps_do_not_end_the_phrase() {
        let mut endpointer = Endpointer::new(&settings(), RATE);
        let state = run(&mut endpointer, &[(true, 3), (false, 1), (true, 3)]);
        assert_eq!(state, EndpointState::Speaking);
    }

    #[test]
    fn long_phrase_is_cut_at_limit() {
        let mut endpointer = Endpointer::new(&settings(), RATE);
        assert_eq!(run(&mut endpointer, &[(true, 50)]), EndpointState::PhraseLimit);
        let CaptureOutcome::Speech(clip) = endpointer.finish() else {
            panic!("expected speech");
        };
        assert_eq!(clip.duration(), Duration::from_secs(2));
    }
}
