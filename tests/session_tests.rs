//! End-to-end session scenarios
//!
//! Drives `AppState` and `Assistant` together the way the window does,
//! with test doubles standing in for the hosted services and microphone.

use async_trait::async_trait;
use awaaz::integration::{Assistant, AssistantCommand, AssistantEvent, AssistantPipeline, Variant};
use awaaz::llm::{
    generate_response, ApiError, ChatModel, ChatRequest, Credential, DirectResponder,
    DirectSettings, Embedder, InputMode, ResponseOutcome,
};
use awaaz::messages::notice::{
    AUDIO_CAPTURED, LISTENING, NOT_UNDERSTOOD, NO_INPUT, SERVICE_UNAVAILABLE,
};
use awaaz::messages::NoticeLevel;
use awaaz::rag::{CharacterSplitter, Document, RetrievalResponder, RetrievalSettings};
use awaaz::speech::{
    AudioClip, AudioSource, CaptureOutcome, SpeechClip, SpeechRecognizer, SpeechSynthesizer,
    Synthesis, Transcript,
};
use awaaz::ui::AppState;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

const GREETING_REPLY: &str = "صبح بخیر! میں آپ کی کیا مدد کر سکتا ہوں؟";
const INVALID_KEY: &str = "Invalid API Key. Please check your API key and try again.";

/// Chat model that answers every prompt with a fixed reply
struct ScriptedModel {
    reply: Result<String, ApiError>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn answering(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(err: ApiError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(err),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(
        &self,
        credential: &Credential,
        request: &ChatRequest,
    ) -> Result<String, ApiError> {
        credential.bearer()?;
        if let Some(message) = request.messages.last() {
            self.prompts.lock().push(message.content.clone());
        }
        self.reply.clone()
    }
}

struct FixedTranscript(Result<Transcript, ApiError>);

#[async_trait]
impl SpeechRecognizer for FixedTranscript {
    async fn transcribe(
        &self,
        _credential: &Credential,
        _clip: &SpeechClip,
    ) -> Result<Transcript, ApiError> {
        self.0.clone()
    }
}

/// Returns a short WAV for every reply
struct ClipVoice;

#[async_trait]
impl SpeechSynthesizer for ClipVoice {
    async fn synthesize(&self, _credential: &Credential, text: &str) -> awaaz::Result<Synthesis> {
        if text.trim().is_empty() {
            return Ok(Synthesis::Skipped);
        }
        let wav = awaaz::audio::encode_wav(&vec![0.0; 1600], 16000)?;
        Ok(Synthesis::Clip(AudioClip {
            duration: awaaz::audio::wav_duration(&wav),
            wav,
        }))
    }
}

struct Microphone(Vec<CaptureOutcome>);

impl AudioSource for Microphone {
    fn capture(&mut self) -> awaaz::Result<CaptureOutcome> {
        Ok(self.0.pop().unwrap_or(CaptureOutcome::NoSpeech))
    }
}

fn speech() -> CaptureOutcome {
    CaptureOutcome::Speech(SpeechClip::new(vec![0.2; 8000], 16000))
}

struct Session {
    state: AppState,
    assistant: Assistant,
    commands: Receiver<AssistantCommand>,
    events: Sender<AssistantEvent>,
}

impl Session {
    fn new(assistant: Assistant, key: &str) -> Self {
        let (command_tx, commands) = unbounded();
        let (events, event_rx) = unbounded();
        let state = AppState::new(Variant::Direct)
            .with_credential(Credential::new(key))
            .with_channels(command_tx, event_rx)
            .with_voice_input(assistant.has_voice_input());
        Self {
            state,
            assistant,
            commands,
            events,
        }
    }

    /// Let the assistant process whatever the UI dispatched, then apply the events
    async fn settle(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            self.assistant.handle(command, &self.events).await;
        }
        self.state.poll_events();
    }

    async fn ask(&mut self, text: &str) {
        self.state.input_text = text.to_string();
        assert!(self.state.submit_text(), "submission was not dispatched");
        self.settle().await;
    }

    async fn speak(&mut self) {
        assert!(self.state.submit_voice(), "voice submission was not dispatched");
        self.settle().await;
    }

    fn notice_texts(&self) -> Vec<&str> {
        self.state.notices.iter().map(|n| n.text.as_str()).collect()
    }
}

fn direct_assistant(model: Arc<ScriptedModel>, transcript: Result<Transcript, ApiError>) -> Assistant {
    Assistant::new(
        Arc::new(DirectResponder::new(model, DirectSettings::default())),
        Arc::new(FixedTranscript(transcript)),
        Arc::new(ClipVoice),
    )
}

#[tokio::test]
async fn greeting_by_text_is_answered_and_recorded() {
    let model = ScriptedModel::answering(GREETING_REPLY);
    let mut session = Session::new(
        direct_assistant(model.clone(), Ok(Transcript::NotUnderstood)),
        "sk-test",
    );

    session.ask("صبح بخیر").await;

    assert!(!session.state.busy);
    let last = session.state.history.last().expect("a turn was recorded");
    assert_eq!(last.user, Some("صبح بخیر"));
    assert_eq!(last.bot, Some(GREETING_REPLY));
    assert!(session.state.last_clip.is_some());
    assert_eq!(model.prompts.lock().as_slice(), &["Respond in Urdu: صبح بخیر"]);
}

#[tokio::test]
async fn no_captured_audio_leaves_history_alone() {
    let assistant = direct_assistant(
        ScriptedModel::answering("unused"),
        Ok(Transcript::Recognized("unused".into())),
    )
    .with_source(Box::new(Microphone(vec![CaptureOutcome::NoSpeech])));
    let mut session = Session::new(assistant, "sk-test");

    session.speak().await;

    assert!(session.state.history.is_empty());
    assert_eq!(session.notice_texts(), vec![LISTENING, NO_INPUT]);
    assert_eq!(session.state.notices[1].level, NoticeLevel::Error);
    assert!(!session.state.busy);
}

#[tokio::test]
async fn missing_key_fails_every_generation_attempt() {
    let assistant = direct_assistant(
        ScriptedModel::answering("unused"),
        Ok(Transcript::Recognized("سلام".into())),
    )
    .with_source(Box::new(Microphone(vec![speech()])));
    let mut session = Session::new(assistant, "");

    session.ask("سلام").await;
    assert_eq!(session.notice_texts(), vec![INVALID_KEY]);

    session.speak().await;
    assert_eq!(session.notice_texts(), vec![INVALID_KEY]);

    assert!(session.state.history.is_empty());
    assert!(session.state.last_clip.is_none());
}

#[tokio::test]
async fn clear_after_two_turns_empties_both_lists() {
    let mut session = Session::new(
        direct_assistant(
            ScriptedModel::answering("ٹھیک ہے"),
            Ok(Transcript::NotUnderstood),
        ),
        "sk-test",
    );

    session.ask("پہلا سوال").await;
    session.ask("دوسرا سوال").await;
    assert_eq!(session.state.history.len(), 2);

    session.state.clear();
    assert!(session.state.history.past().is_empty());
    assert!(session.state.history.generated().is_empty());
    assert!(session.state.notices.is_empty());
}

#[tokio::test]
async fn spoken_question_flows_through_to_history() {
    let assistant = direct_assistant(
        ScriptedModel::answering("موسم اچھا ہے"),
        Ok(Transcript::Recognized("آج موسم کیسا ہے؟".into())),
    )
    .with_source(Box::new(Microphone(vec![speech()])));
    let mut session = Session::new(assistant, "sk-test");

    session.speak().await;

    assert_eq!(
        session.notice_texts(),
        vec![LISTENING, AUDIO_CAPTURED, "You said: آج موسم کیسا ہے؟"]
    );
    assert_eq!(session.state.history.past(), &["آج موسم کیسا ہے؟"]);
    assert_eq!(session.state.history.generated(), &["موسم اچھا ہے"]);
}

#[tokio::test]
async fn unrecognizable_audio_is_a_warning_not_an_error() {
    let assistant = direct_assistant(
        ScriptedModel::answering("unused"),
        Ok(Transcript::NotUnderstood),
    )
    .with_source(Box::new(Microphone(vec![speech()])));
    let mut session = Session::new(assistant, "sk-test");

    session.speak().await;

    let last = session.state.notices.last().expect("a notice");
    assert_eq!(last.text, NOT_UNDERSTOOD);
    assert_eq!(last.level, NoticeLevel::Warning);
    assert!(session
        .state
        .notices
        .iter()
        .all(|n| n.level != NoticeLevel::Error));
    assert!(session.state.history.is_empty());
}

#[tokio::test]
async fn offline_recognizer_reports_service_unavailable() {
    let assistant = direct_assistant(
        ScriptedModel::answering("unused"),
        Err(ApiError::Transport("connection refused".into())),
    )
    .with_source(Box::new(Microphone(vec![speech()])));
    let mut session = Session::new(assistant, "sk-test");

    session.speak().await;

    assert!(session.notice_texts().contains(&SERVICE_UNAVAILABLE));
    assert!(session.state.history.is_empty());
}

#[tokio::test]
async fn failed_generation_shows_message_and_keeps_history() {
    let mut session = Session::new(
        direct_assistant(
            ScriptedModel::answering("پہلا جواب"),
            Ok(Transcript::NotUnderstood),
        ),
        "sk-test",
    );
    session.ask("پہلا").await;

    session.assistant = direct_assistant(
        ScriptedModel::failing(ApiError::RateLimited("slow down".into())),
        Ok(Transcript::NotUnderstood),
    );
    session.ask("دوسرا").await;

    assert_eq!(session.state.history.len(), 1);
    assert_eq!(session.state.notices.len(), 1);
    assert_eq!(session.state.notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn generate_response_never_errors_for_any_input() {
    let failures = vec![
        ApiError::Authentication("bad key".into()),
        ApiError::RateLimited("quota".into()),
        ApiError::Api {
            status: 500,
            message: "boom".into(),
        },
        ApiError::Transport("offline".into()),
        ApiError::Unexpected("weird".into()),
    ];
    let questions = ["سلام", "a", "؟", "   spaced   ", "ایک بہت لمبا سوال ".repeat(50).as_str()]
        .map(str::to_string);
    let placeholders = [
        "Invalid API Key",
        "Rate limit exceeded",
        "OpenAI API Error",
        "Unexpected error",
    ];

    for question in &questions {
        let responder = DirectResponder::new(
            ScriptedModel::answering("جواب"),
            DirectSettings::default(),
        );
        let outcome = generate_response(
            &responder,
            &Credential::new("sk-test"),
            question,
            InputMode::Text,
        )
        .await;
        assert_eq!(outcome, ResponseOutcome::Answer("جواب".into()));

        for failure in &failures {
            let responder = DirectResponder::new(
                ScriptedModel::failing(failure.clone()),
                DirectSettings::default(),
            );
            let outcome = generate_response(
                &responder,
                &Credential::new("sk-test"),
                question,
                InputMode::Voice,
            )
            .await;
            assert!(
                placeholders.contains(&outcome.text()),
                "unexpected outcome {:?}",
                outcome
            );
        }
    }
}

/// Scores text by how many times it mentions "لاہور"
struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(
        &self,
        credential: &Credential,
        inputs: &[String],
    ) -> Result<Vec<Vec<f32>>, ApiError> {
        credential.bearer()?;
        Ok(inputs
            .iter()
            .map(|text| {
                let hits = text.matches("لاہور").count() as f32;
                vec![hits, 1.0]
            })
            .collect())
    }
}

#[tokio::test]
async fn retrieval_variant_answers_from_the_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(
        &path,
        "کراچی ایک ساحلی شہر ہے۔\n\nلاہور باغوں کا شہر ہے۔ لاہور میں شاہی قلعہ ہے۔",
    )
    .unwrap();

    let document = Document::load(&path).unwrap();
    let chunks = CharacterSplitter::new(40, 0).split_document(&document);
    assert_eq!(chunks.len(), 2);

    let model = ScriptedModel::answering("لاہور باغوں کا شہر ہے");
    let responder = RetrievalResponder::new(
        chunks,
        Arc::new(KeywordEmbedder),
        model.clone(),
        RetrievalSettings {
            top_k: 1,
            ..RetrievalSettings::default()
        },
    );
    let assistant = Assistant::new(
        Arc::new(responder),
        Arc::new(FixedTranscript(Ok(Transcript::NotUnderstood))),
        Arc::new(ClipVoice),
    );
    let mut session = Session::new(assistant, "sk-test");

    session.ask("لاہور کے بارے میں بتائیں").await;

    assert_eq!(session.state.history.generated(), &["لاہور باغوں کا شہر ہے"]);
    let prompts = model.prompts.lock();
    assert!(prompts[0].contains("شاہی قلعہ"));
    assert!(!prompts[0].contains("کراچی"));
}

#[test]
fn worker_thread_round_trip_through_app_state() {
    let pipeline = AssistantPipeline::new(direct_assistant(
        ScriptedModel::answering(GREETING_REPLY),
        Ok(Transcript::NotUnderstood),
    ));
    let mut state = AppState::new(Variant::Direct)
        .with_credential(Credential::new("sk-test"))
        .with_channels(pipeline.command_sender(), pipeline.event_receiver());
    let worker = pipeline.start_worker().unwrap();

    state.input_text = "صبح بخیر".into();
    assert!(state.submit_text());

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while state.busy && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
        state.poll_events();
    }

    assert!(!state.busy);
    assert_eq!(state.history.generated(), &[GREETING_REPLY]);

    state.shutdown();
    worker.join().unwrap();
}
