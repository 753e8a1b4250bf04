//! Assistant worker
//!
//! Runs one submission at a time off the UI thread:
//! capture -> transcribe -> generate -> synthesize.
//! Progress is reported as events; the UI thread owns the history and
//! applies them between frames.

use crate::integration::config::{AppConfig, TtsBackend, Variant};
use crate::llm::{
    generate_response, ApiError, Credential, DirectResponder, InputMode, OpenAiClient,
    OpenAiEmbedder, Responder, ResponseOutcome,
};
use crate::messages::notice::{
    AUDIO_CAPTURED, LISTENING, NOT_UNDERSTOOD, NO_INPUT, SERVICE_UNAVAILABLE,
};
use crate::messages::Notice;
use crate::rag::{Document, RetrievalResponder};
use crate::speech::{
    AudioClip, AudioSource, CaptureOutcome, CloudRecognizer, CloudSynthesizer, SpeechRecognizer,
    SpeechSynthesizer, Synthesis, Transcript,
};
use crate::{AwaazError, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Commands sent from the UI
///
/// `session` is the history session the submission belongs to. It comes
/// back on the reply so the UI can drop answers for a cleared conversation.
#[derive(Debug, Clone)]
pub enum AssistantCommand {
    SubmitText {
        text: String,
        credential: Credential,
        session: Uuid,
    },
    SubmitVoice {
        credential: Credential,
        session: Uuid,
    },
    Shutdown,
}

/// Progress reported back to the UI
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantEvent {
    Notice(Notice),
    /// Speech was recognized as this text
    Transcribed(String),
    /// A completed exchange to append to the history
    Reply {
        session: Uuid,
        question: String,
        answer: String,
    },
    /// Generation failed; history is left alone
    Failed {
        placeholder: &'static str,
        message: String,
    },
    /// Cloud speech for the last reply
    Speech(AudioClip),
    /// The submission is over, successful or not
    Finished,
}

/// The services one submission flows through
pub struct Assistant {
    responder: Arc<dyn Responder>,
    recognizer: Arc<dyn SpeechRecognizer>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    source: Option<Box<dyn AudioSource>>,
}

impl Assistant {
    pub fn new(
        responder: Arc<dyn Responder>,
        recognizer: Arc<dyn SpeechRecognizer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            responder,
            recognizer,
            synthesizer,
            source: None,
        }
    }

    pub fn with_source(mut self, source: Box<dyn AudioSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn has_voice_input(&self) -> bool {
        self.source.is_some()
    }

    /// Wire up the configured variant against the hosted API
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = OpenAiClient::new(&config.api.base_url, config.request_timeout())?;

        let responder: Arc<dyn Responder> = match config.variant {
            Variant::Direct => Arc::new(DirectResponder::new(
                Arc::new(client.clone()),
                config.direct_settings(),
            )),
            Variant::Retrieval => {
                let document = Document::load(&config.retrieval.document_path)?;
                let chunks = config.splitter().split_document(&document);
                info!("Prepared {} chunks for retrieval", chunks.len());
                let embedder = OpenAiEmbedder::new(
                    client.clone(),
                    &config.retrieval.embedding_model,
                    config.retrieval.batch_size,
                );
                Arc::new(RetrievalResponder::new(
                    chunks,
                    Arc::new(embedder),
                    Arc::new(client.clone()),
                    config.retrieval_settings(),
                ))
            }
        };

        let recognizer = Arc::new(CloudRecognizer::new(
            client.clone(),
            &config.speech.model,
            &config.speech.language,
        ));

        let synthesizer = build_synthesizer(config, client)?;
        let assistant = Self::new(responder, recognizer, synthesizer);

        #[cfg(feature = "audio-io")]
        let assistant = assistant.with_source(Box::new(crate::speech::MicrophoneSource::new(
            config.capture_settings(),
        )));

        Ok(assistant)
    }

    /// Run one command to completion, emitting events as it goes
    pub async fn handle(&mut self, command: AssistantCommand, events: &Sender<AssistantEvent>) {
        let start = Instant::now();
        match command {
            AssistantCommand::SubmitText {
                text,
                credential,
                session,
            } => {
                self.submit_text(session, &credential, &text, events).await;
            }
            AssistantCommand::SubmitVoice {
                credential,
                session,
            } => {
                self.submit_voice(session, &credential, events).await;
            }
            AssistantCommand::Shutdown => return,
        }
        debug!("Submission handled in {}ms", start.elapsed().as_millis());
        emit(events, AssistantEvent::Finished);
    }

    async fn submit_text(
        &self,
        session: Uuid,
        credential: &Credential,
        text: &str,
        events: &Sender<AssistantEvent>,
    ) {
        let question = text.trim();
        if question.is_empty() {
            return;
        }
        self.answer(session, credential, question, InputMode::Text, events)
            .await;
    }

    async fn submit_voice(
        &mut self,
        session: Uuid,
        credential: &Credential,
        events: &Sender<AssistantEvent>,
    ) {
        // no point listening if nothing can be sent
        if credential.is_empty() {
            emit_failure(events, &ApiError::Authentication("No API key provided".into()));
            return;
        }

        let Some(source) = self.source.as_mut() else {
            emit(
                events,
                AssistantEvent::Notice(Notice::error("Voice input is not available in this build.")),
            );
            return;
        };

        emit(events, AssistantEvent::Notice(Notice::info(LISTENING)));
        let clip = match source.capture() {
            Ok(CaptureOutcome::Speech(clip)) => clip,
            Ok(CaptureOutcome::NoSpeech) => {
                info!("No speech before listen timeout");
                emit(events, AssistantEvent::Notice(Notice::error(NO_INPUT)));
                return;
            }
            Err(e) => {
                error!("Capture failed: {}", e);
                emit(events, AssistantEvent::Notice(Notice::error(e.user_message())));
                return;
            }
        };
        emit(events, AssistantEvent::Notice(Notice::success(AUDIO_CAPTURED)));

        let question = match self.recognizer.transcribe(credential, &clip).await {
            Ok(Transcript::Recognized(text)) => text,
            Ok(Transcript::NotUnderstood) => {
                emit(events, AssistantEvent::Notice(Notice::warning(NOT_UNDERSTOOD)));
                return;
            }
            Err(e) => {
                warn!("Transcription failed: {}", e);
                let notice = match &e {
                    ApiError::Authentication(_) => Notice::error(e.user_message()),
                    e if e.is_service_failure() => Notice::error(SERVICE_UNAVAILABLE),
                    e => Notice::error(e.user_message()),
                };
                emit(events, AssistantEvent::Notice(notice));
                return;
            }
        };

        emit(events, AssistantEvent::Transcribed(question.clone()));
        emit(events, AssistantEvent::Notice(Notice::you_said(&question)));
        self.answer(session, credential, &question, InputMode::Voice, events)
            .await;
    }

    async fn answer(
        &self,
        session: Uuid,
        credential: &Credential,
        question: &str,
        mode: InputMode,
        events: &Sender<AssistantEvent>,
    ) {
        let answer = match generate_response(self.responder.as_ref(), credential, question, mode).await
        {
            ResponseOutcome::Answer(answer) => answer,
            ResponseOutcome::Failed {
                placeholder,
                message,
            } => {
                emit(
                    events,
                    AssistantEvent::Failed {
                        placeholder,
                        message,
                    },
                );
                return;
            }
        };

        emit(
            events,
            AssistantEvent::Reply {
                session,
                question: question.to_string(),
                answer: answer.clone(),
            },
        );

        match self.synthesizer.synthesize(credential, &answer).await {
            Ok(Synthesis::Clip(clip)) => emit(events, AssistantEvent::Speech(clip)),
            Ok(Synthesis::Queued) | Ok(Synthesis::Skipped) => {}
            Err(e) => {
                warn!("Speech synthesis failed: {}", e);
                emit(events, AssistantEvent::Notice(Notice::warning(e.user_message())));
            }
        }
    }
}

fn build_synthesizer(config: &AppConfig, client: OpenAiClient) -> Result<Arc<dyn SpeechSynthesizer>> {
    match config.tts.backend {
        TtsBackend::Cloud => Ok(Arc::new(CloudSynthesizer::new(
            client,
            &config.tts.model,
            &config.tts.voice,
        ))),
        #[cfg(feature = "audio-io")]
        TtsBackend::Local => {
            let voice = config.local_voice().ok_or_else(|| {
                AwaazError::ConfigError("Local TTS model paths are not configured".into())
            })?;
            Ok(Arc::new(crate::speech::LocalSynthesizer::start(voice)?))
        }
        #[cfg(not(feature = "audio-io"))]
        TtsBackend::Local => Err(AwaazError::ConfigError(
            "Local TTS requires the audio-io feature".into(),
        )),
    }
}

fn emit(events: &Sender<AssistantEvent>, event: AssistantEvent) {
    if let Err(e) = events.send(event) {
        debug!("UI no longer listening: {}", e);
    }
}

fn emit_failure(events: &Sender<AssistantEvent>, err: &ApiError) {
    emit(
        events,
        AssistantEvent::Failed {
            placeholder: err.placeholder(),
            message: err.user_message(),
        },
    );
}

/// Channel pair and worker thread around an [`Assistant`]
pub struct AssistantPipeline {
    assistant: Assistant,
    command_tx: Sender<AssistantCommand>,
    command_rx: Receiver<AssistantCommand>,
    event_tx: Sender<AssistantEvent>,
    event_rx: Receiver<AssistantEvent>,
}

impl AssistantPipeline {
    pub fn new(assistant: Assistant) -> Self {
        let (command_tx, command_rx) = bounded(8);
        let (event_tx, event_rx) = unbounded();
        Self {
            assistant,
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        }
    }

    pub fn command_sender(&self) -> Sender<AssistantCommand> {
        self.command_tx.clone()
    }

    pub fn event_receiver(&self) -> Receiver<AssistantEvent> {
        self.event_rx.clone()
    }

    /// Start the worker thread with its own runtime
    pub fn start_worker(self) -> Result<JoinHandle<()>> {
        let Self {
            mut assistant,
            command_rx,
            event_tx,
            ..
        } = self;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| AwaazError::ConfigError(format!("Failed to build runtime: {}", e)))?;

        thread::Builder::new()
            .name("assistant".into())
            .spawn(move || {
                info!("Assistant worker ready");
                while let Ok(command) = command_rx.recv() {
                    if matches!(command, AssistantCommand::Shutdown) {
                        break;
                    }
                    runtime.block_on(assistant.handle(command, &event_tx));
                }
                info!("Assistant worker shutting down");
            })
            .map_err(|e| AwaazError::ChannelError(format!("Failed to spawn worker: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::SpeechClip;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl Responder for Echo {
        async fn respond(
            &self,
            credential: &Credential,
            question: &str,
            _mode: InputMode,
        ) -> std::result::Result<String, ApiError> {
            credential.bearer()?;
            Ok(format!("جواب: {}", question))
        }
    }

    struct Fixed(std::result::Result<Transcript, ApiError>);

    #[async_trait]
    impl SpeechRecognizer for Fixed {
        async fn transcribe(
            &self,
            _credential: &Credential,
            _clip: &SpeechClip,
        ) -> std::result::Result<Transcript, ApiError> {
            self.0.clone()
        }
    }

    struct Silent;

    #[async_trait]
    impl SpeechSynthesizer for Silent {
        async fn synthesize(&self, _credential: &Credential, _text: &str) -> Result<Synthesis> {
            Ok(Synthesis::Queued)
        }
    }

    struct Canned(Option<CaptureOutcome>);

    impl AudioSource for Canned {
        fn capture(&mut self) -> Result<CaptureOutcome> {
            self.0
                .take()
                .ok_or_else(|| AwaazError::AudioDeviceError("no more audio".into()))
        }
    }

    fn assistant(transcript: std::result::Result<Transcript, ApiError>) -> Assistant {
        Assistant::new(Arc::new(Echo), Arc::new(Fixed(transcript)), Arc::new(Silent)).with_source(
            Box::new(Canned(Some(CaptureOutcome::Speech(SpeechClip::new(
                vec![0.1; 16000],
                16000,
            ))))),
        )
    }

    async fn run(assistant: &mut Assistant, command: AssistantCommand) -> Vec<AssistantEvent> {
        let (tx, rx) = unbounded();
        assistant.handle(command, &tx).await;
        rx.try_iter().collect()
    }

    fn voice(key: &str) -> AssistantCommand {
        AssistantCommand::SubmitVoice {
            credential: Credential::new(key),
            session: Uuid::nil(),
        }
    }

    fn notices(events: &[AssistantEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| match e {
                AssistantEvent::Notice(n) => Some(n.text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn recognized_voice_produces_a_reply() {
        let mut assistant = assistant(Ok(Transcript::Recognized("سلام".into())));
        let events = run(&mut assistant, voice("k")).await;

        assert_eq!(
            notices(&events),
            vec![LISTENING, AUDIO_CAPTURED, "You said: سلام"]
        );
        assert!(events.contains(&AssistantEvent::Reply {
            session: Uuid::nil(),
            question: "سلام".into(),
            answer: "جواب: سلام".into()
        }));
        assert_eq!(events.last(), Some(&AssistantEvent::Finished));
    }

    #[tokio::test]
    async fn unintelligible_audio_warns_without_reply() {
        let mut assistant = assistant(Ok(Transcript::NotUnderstood));
        let events = run(&mut assistant, voice("k")).await;

        assert!(notices(&events).contains(&NOT_UNDERSTOOD));
        assert!(!events
            .iter()
            .any(|e| matches!(e, AssistantEvent::Reply { .. } | AssistantEvent::Failed { .. })));
    }

    #[tokio::test]
    async fn unreachable_recognizer_reports_service_unavailable() {
        let mut assistant = assistant(Err(ApiError::Transport("dns".into())));
        let events = run(&mut assistant, voice("k")).await;
        assert!(notices(&events).contains(&SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn voice_without_key_fails_before_listening() {
        let mut assistant = assistant(Ok(Transcript::Recognized("unused".into())));
        let events = run(&mut assistant, voice("")).await;

        assert!(notices(&events).is_empty());
        assert_eq!(
            events[0],
            AssistantEvent::Failed {
                placeholder: "Invalid API Key",
                message: "Invalid API Key. Please check your API key and try again.".into()
            }
        );
    }

    #[tokio::test]
    async fn blank_text_only_finishes() {
        let mut assistant = assistant(Ok(Transcript::NotUnderstood));
        let events = run(
            &mut assistant,
            AssistantCommand::SubmitText {
                text: "   ".into(),
                credential: Credential::new("k"),
                session: Uuid::nil(),
            },
        )
        .await;
        assert_eq!(events, vec![AssistantEvent::Finished]);
    }

    #[test]
    fn worker_processes_commands_on_its_own_thread() {
        let pipeline = AssistantPipeline::new(assistant(Ok(Transcript::NotUnderstood)));
        let commands = pipeline.command_sender();
        let events = pipeline.event_receiver();
        let handle = pipeline.start_worker().unwrap();

        commands
            .send(AssistantCommand::SubmitText {
                text: "صبح بخیر".into(),
                credential: Credential::new("k"),
                session: Uuid::new_v4(),
            })
            .unwrap();

        let mut received = Vec::new();
        while let Ok(event) = events.recv_timeout(std::time::Duration::from_secs(5)) {
            let done = event == AssistantEvent::Finished;
            received.push(event);
            if done {
                break;
            }
        }

        commands.send(AssistantCommand::Shutdown).unwrap();
        handle.join().unwrap();
        assert!(matches!(received[0], AssistantEvent::Reply { .. }));
    }
}
