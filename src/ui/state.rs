//! Application state management
//!
//! The UI thread owns all of this. Work for a submission happens on the
//! assistant worker and comes back as events applied by `poll_events`.

use crate::integration::{AppConfig, AssistantCommand, AssistantEvent, TtsBackend, Variant};
use crate::llm::Credential;
use crate::messages::{ConversationHistory, Notice};
use crate::speech::AudioClip;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::{debug, error, info, warn};

/// What the sidebar's About block reports
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AboutInfo {
    /// Only set for the retrieval variant
    pub document: Option<String>,
    pub chat_model: String,
    pub speech_model: String,
    pub voice: String,
}

impl AboutInfo {
    pub fn from_config(config: &AppConfig) -> Self {
        let document = (config.variant == Variant::Retrieval).then(|| {
            config.retrieval.document_path.display().to_string()
        });
        let voice = match config.tts.backend {
            TtsBackend::Cloud => format!("{} ({})", config.tts.model, config.tts.voice),
            TtsBackend::Local => config
                .tts
                .local_model
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "local voice".to_string()),
        };
        Self {
            document,
            chat_model: config.llm.model.clone(),
            speech_model: config.speech.model.clone(),
            voice,
        }
    }
}

/// Central state for the chat window
pub struct AppState {
    pub variant: Variant,
    pub history: ConversationHistory,
    /// Typed into the sidebar, never persisted
    pub credential: Credential,
    /// Text field contents
    pub input_text: String,
    /// Status lines for the current submission
    pub notices: Vec<Notice>,
    /// A submission is in flight
    pub busy: bool,
    /// A microphone is wired up
    pub voice_available: bool,
    /// Speech for the latest reply
    pub last_clip: Option<AudioClip>,
    pub autoplay: bool,
    pub about: AboutInfo,

    #[cfg(feature = "audio-io")]
    player: crate::audio::ClipPlayer,

    command_tx: Option<Sender<AssistantCommand>>,
    event_rx: Option<Receiver<AssistantEvent>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Variant::default())
    }
}

impl AppState {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            history: ConversationHistory::new(),
            credential: Credential::default(),
            input_text: String::new(),
            notices: Vec::new(),
            busy: false,
            voice_available: false,
            last_clip: None,
            autoplay: false,
            about: AboutInfo::default(),
            #[cfg(feature = "audio-io")]
            player: crate::audio::ClipPlayer::new(),
            command_tx: None,
            event_rx: None,
        }
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }

    /// Connect to a running assistant worker
    pub fn with_channels(
        mut self,
        command_tx: Sender<AssistantCommand>,
        event_rx: Receiver<AssistantEvent>,
    ) -> Self {
        self.command_tx = Some(command_tx);
        self.event_rx = Some(event_rx);
        self
    }

    pub fn with_voice_input(mut self, available: bool) -> Self {
        self.voice_available = available;
        self
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn with_about(mut self, about: AboutInfo) -> Self {
        self.about = about;
        self
    }

    pub fn missing_credential(&self) -> bool {
        self.credential.is_empty()
    }

    pub fn can_submit_text(&self) -> bool {
        !self.busy && !self.input_text.trim().is_empty()
    }

    pub fn can_submit_voice(&self) -> bool {
        !self.busy && self.voice_available
    }

    /// Send the text field to the assistant. Returns false when nothing was sent.
    pub fn submit_text(&mut self) -> bool {
        if !self.can_submit_text() {
            return false;
        }
        let text = self.input_text.trim().to_string();
        let command = AssistantCommand::SubmitText {
            text,
            credential: self.credential.clone(),
            session: self.history.session_id(),
        };
        if self.dispatch(command) {
            self.input_text.clear();
            true
        } else {
            false
        }
    }

    /// Ask the assistant to listen on the microphone
    pub fn submit_voice(&mut self) -> bool {
        if !self.can_submit_voice() {
            return false;
        }
        self.dispatch(AssistantCommand::SubmitVoice {
            credential: self.credential.clone(),
            session: self.history.session_id(),
        })
    }

    fn dispatch(&mut self, command: AssistantCommand) -> bool {
        self.notices.clear();
        self.stop_clip();
        self.last_clip = None;

        let Some(tx) = &self.command_tx else {
            self.notices
                .push(Notice::error("The assistant is not running."));
            return false;
        };
        match tx.try_send(command) {
            Ok(()) => {
                self.busy = true;
                true
            }
            Err(e) => {
                error!("Failed to reach assistant: {}", e);
                self.notices
                    .push(Notice::error("The assistant is not running."));
                false
            }
        }
    }

    /// Drop the conversation and anything shown for it.
    /// A reply still in flight belongs to the old session and is discarded.
    pub fn clear(&mut self) {
        self.history.clear();
        self.notices.clear();
        self.stop_clip();
        self.last_clip = None;
    }

    /// Apply every event the worker has sent since the last frame
    pub fn poll_events(&mut self) {
        let Some(rx) = &self.event_rx else {
            return;
        };

        let mut events = Vec::new();
        let mut disconnected = false;
        loop {
            match rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        for event in events {
            self.apply_event(event);
        }

        if disconnected {
            warn!("Assistant worker is gone");
            self.event_rx = None;
            self.command_tx = None;
            if self.busy {
                self.busy = false;
                self.notices
                    .push(Notice::error("The assistant stopped unexpectedly."));
            }
        }
    }

    pub fn apply_event(&mut self, event: AssistantEvent) {
        match event {
            AssistantEvent::Notice(notice) => self.notices.push(notice),
            AssistantEvent::Transcribed(text) => {
                debug!("Transcribed {} chars", text.chars().count());
            }
            AssistantEvent::Reply {
                session,
                question,
                answer,
            } => {
                if session == self.history.session_id() {
                    self.history.push(question, answer);
                } else {
                    info!("Dropping reply for cleared session {}", session);
                }
            }
            AssistantEvent::Failed { message, .. } => {
                self.notices.push(Notice::error(message));
            }
            AssistantEvent::Speech(clip) => {
                self.last_clip = Some(clip);
                if self.autoplay {
                    self.play_clip();
                }
            }
            AssistantEvent::Finished => {
                self.busy = false;
                info!("Submission finished, {} turns in history", self.history.len());
            }
        }
    }

    /// Play the latest reply clip from the start
    #[cfg(feature = "audio-io")]
    pub fn play_clip(&mut self) {
        if let Some(clip) = &self.last_clip {
            self.player.play(clip.wav.clone());
        }
    }

    #[cfg(not(feature = "audio-io"))]
    pub fn play_clip(&mut self) {
        debug!("No audio output in this build");
    }

    #[cfg(feature = "audio-io")]
    pub fn stop_clip(&mut self) {
        self.player.stop();
    }

    #[cfg(not(feature = "audio-io"))]
    pub fn stop_clip(&mut self) {}

    #[cfg(feature = "audio-io")]
    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    #[cfg(not(feature = "audio-io"))]
    pub fn is_playing(&self) -> bool {
        false
    }

    /// Ask the worker to stop after its current job
    pub fn shutdown(&mut self) {
        self.stop_clip();
        if let Some(tx) = self.command_tx.take() {
            if tx.send(AssistantCommand::Shutdown).is_err() {
                debug!("Assistant already stopped");
            }
        }
    }
}
