//! Application configuration
//!
//! Read from a TOML file, then overridden from the environment. Every field
//! has a default, so an absent file is the same as an empty one.

use crate::llm::{DirectSettings, DEFAULT_BASE_URL};
use crate::rag::{CharacterSplitter, RetrievalSettings};
use crate::speech::{CaptureSettings, LocalVoiceConfig};
use crate::{AwaazError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const CONFIG_ENV: &str = "AWAAZ_CONFIG";

/// Which answer strategy the app runs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Answers from the configured document
    #[default]
    Retrieval,
    /// Answers straight from the chat model
    Direct,
}

impl Variant {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "retrieval" | "rag" => Some(Variant::Retrieval),
            "direct" => Some(Variant::Direct),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Variant::Retrieval => "Urdu Voice Chatbot using RAG",
            Variant::Direct => "Urdu Voice Bot",
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            Variant::Retrieval => {
                "Ask your question in Urdu and get a response in both text and audio!"
            }
            Variant::Direct => "Welcome to Urdu Bot.How may I assist you?",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsBackend {
    #[default]
    Cloud,
    Local,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
    pub voice_max_tokens: u32,
    pub text_max_tokens: u32,
    pub retrieval_max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            voice_max_tokens: 50,
            text_max_tokens: 100,
            retrieval_max_tokens: 256,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub document_path: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub embedding_model: String,
    pub batch_size: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            document_path: PathBuf::from("document.pdf"),
            chunk_size: 500,
            chunk_overlap: 100,
            top_k: 4,
            embedding_model: "text-embedding-3-small".to_string(),
            batch_size: 64,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub model: String,
    pub language: String,
    pub listen_timeout_secs: f32,
    pub pause_secs: f32,
    pub max_phrase_secs: f32,
    pub vad_threshold: f32,
    pub energy_threshold: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            language: "ur".to_string(),
            listen_timeout_secs: 10.0,
            pause_secs: 0.8,
            max_phrase_secs: 30.0,
            vad_threshold: 0.5,
            energy_threshold: 0.02,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub backend: TtsBackend,
    pub model: String,
    pub voice: String,
    pub autoplay: bool,
    pub local_model: Option<PathBuf>,
    pub local_tokens: Option<PathBuf>,
    pub local_lexicon: Option<PathBuf>,
    pub local_data_dir: Option<PathBuf>,
    pub speaker_id: i32,
    pub speed: f32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            backend: TtsBackend::Cloud,
            model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            autoplay: true,
            local_model: None,
            local_tokens: None,
            local_lexicon: None,
            local_data_dir: None,
            speaker_id: 0,
            speed: 1.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Font with Urdu glyphs, added ahead of the built-in fonts
    pub font_path: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub variant: Variant,
    pub api: ApiConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub speech: SpeechConfig,
    pub tts: TtsConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    /// File (if any) plus environment overrides, validated
    pub fn load() -> Result<Self> {
        let mut config = match Self::discover_path() {
            Some(path) => Self::from_file(&path)?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        info!("Configuration loaded ({:?} variant)", config.variant);
        Ok(config)
    }

    /// `AWAAZ_CONFIG`, else `<config_dir>/awaaz/config.toml` when it exists
    pub fn discover_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        let default = dirs::config_dir()?.join("awaaz").join("config.toml");
        default.exists().then_some(default)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AwaazError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&content)
            .map_err(|e| AwaazError::ConfigError(format!("{}: {}", path.display(), e)))?;
        info!("Read configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply `OPENAI_BASE_URL`, `AWAAZ_VARIANT` and `AWAAZ_DOCUMENT`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("OPENAI_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(variant) = lookup("AWAAZ_VARIANT").as_deref().and_then(Variant::parse) {
            self.variant = variant;
        }
        if let Some(document) = lookup("AWAAZ_DOCUMENT").filter(|v| !v.trim().is_empty()) {
            self.retrieval.document_path = PathBuf::from(document);
        }
    }

    pub fn validate(&self) -> Result<()> {
        let err = |msg: String| Err(AwaazError::ConfigError(msg));

        if self.api.base_url.trim().is_empty() {
            return err("api.base_url must not be empty".into());
        }
        if self.api.timeout_secs == 0 {
            return err("api.timeout_secs must be greater than 0".into());
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return err(format!(
                "llm.temperature must be within 0..=2, got {}",
                self.llm.temperature
            ));
        }
        if self.variant == Variant::Retrieval {
            let r = &self.retrieval;
            if r.chunk_size == 0 {
                return err("retrieval.chunk_size must be greater than 0".into());
            }
            if r.chunk_overlap >= r.chunk_size {
                return err(format!(
                    "retrieval.chunk_overlap ({}) must be smaller than chunk_size ({})",
                    r.chunk_overlap, r.chunk_size
                ));
            }
            if r.top_k == 0 {
                return err("retrieval.top_k must be greater than 0".into());
            }
        }
        let s = &self.speech;
        for (name, value) in [
            ("speech.listen_timeout_secs", s.listen_timeout_secs),
            ("speech.pause_secs", s.pause_secs),
            ("speech.max_phrase_secs", s.max_phrase_secs),
            ("tts.speed", self.tts.speed),
        ] {
            if !positive(value) {
                return err(format!("{} must be a positive number, got {}", name, value));
            }
        }
        if self.tts.backend == TtsBackend::Local
            && (self.tts.local_model.is_none() || self.tts.local_tokens.is_none())
        {
            return err("tts.local_model and tts.local_tokens are required for the local backend".into());
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn direct_settings(&self) -> DirectSettings {
        DirectSettings {
            model: self.llm.model.clone(),
            temperature: self.llm.temperature,
            voice_max_tokens: self.llm.voice_max_tokens,
            text_max_tokens: self.llm.text_max_tokens,
        }
    }

    pub fn retrieval_settings(&self) -> RetrievalSettings {
        RetrievalSettings {
            model: self.llm.model.clone(),
            temperature: self.llm.temperature,
            max_tokens: self.llm.retrieval_max_tokens,
            top_k: self.retrieval.top_k,
        }
    }

    pub fn splitter(&self) -> CharacterSplitter {
        CharacterSplitter::new(self.retrieval.chunk_size, self.retrieval.chunk_overlap)
    }

    pub fn capture_settings(&self) -> CaptureSettings {
        let s = &self.speech;
        CaptureSettings {
            listen_timeout: Duration::from_secs_f32(s.listen_timeout_secs),
            pause: Duration::from_secs_f32(s.pause_secs),
            max_phrase: Duration::from_secs_f32(s.max_phrase_secs),
            vad_threshold: s.vad_threshold,
            energy_threshold: s.energy_threshold,
            ..Default::default()
        }
    }

    /// Local voice paths, when both model and tokens are configured
    pub fn local_voice(&self) -> Option<LocalVoiceConfig> {
        let t = &self.tts;
        let mut voice = LocalVoiceConfig::new(t.local_model.clone()?, t.local_tokens.clone()?)
            .with_speaker(t.speaker_id)
            .with_speed(t.speed);
        voice.lexicon_path = t.local_lexicon.clone();
        voice.data_dir = t.local_data_dir.clone();
        Some(voice)
    }
}

/// Finite and above zero; rejects the `nan` and `inf` TOML accepts
fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.variant, Variant::Retrieval);
        assert_eq!(config.retrieval.chunk_size, 500);
        assert_eq!(config.retrieval.chunk_overlap, 100);
        assert_eq!(config.speech.language, "ur");
        assert_eq!(config.capture_settings().listen_timeout, Duration::from_secs(10));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            variant = "direct"

            [llm]
            model = "gpt-4o"

            [tts]
            backend = "local"
            local_model = "/voices/ur.onnx"
            local_tokens = "/voices/tokens.txt"
            "#,
        )
        .unwrap();

        assert_eq!(config.variant, Variant::Direct);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.text_max_tokens, 100);
        assert_eq!(config.tts.backend, TtsBackend::Local);
        assert_eq!(
            config.local_voice().unwrap().model_path,
            PathBuf::from("/voices/ur.onnx")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
            ("AWAAZ_VARIANT", "Direct"),
            ("AWAAZ_DOCUMENT", "/docs/urdu.pdf"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://localhost:8080/v1");
        assert_eq!(config.variant, Variant::Direct);
        assert_eq!(config.retrieval.document_path, PathBuf::from("/docs/urdu.pdf"));
    }

    #[test]
    fn unknown_variant_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|k| (k == "AWAAZ_VARIANT").then(|| "chatty".to_string()));
        assert_eq!(config.variant, Variant::Retrieval);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let mut config = AppConfig::default();
        config.retrieval.chunk_overlap = 600;
        assert!(matches!(config.validate(), Err(AwaazError::ConfigError(_))));

        let mut config = AppConfig::default();
        config.tts.backend = TtsBackend::Local;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.variant = Variant::Direct;
        config.retrieval.top_k = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn non_finite_timings_are_rejected_before_use() {
        for toml in [
            "[speech]\nlisten_timeout_secs = nan",
            "[speech]\npause_secs = inf",
            "[speech]\nmax_phrase_secs = -inf",
            "[speech]\nlisten_timeout_secs = 0.0",
            "[tts]\nspeed = nan",
        ] {
            let config = AppConfig::from_toml(toml).unwrap();
            assert!(
                matches!(config.validate(), Err(AwaazError::ConfigError(_))),
                "accepted {}",
                toml
            );
        }
    }

    #[test]
    fn file_is_read_and_bad_toml_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[retrieval]\ntop_k = 2").unwrap();
        assert_eq!(AppConfig::from_file(file.path()).unwrap().retrieval.top_k, 2);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "variant = 3").unwrap();
        assert!(matches!(
            AppConfig::from_file(bad.path()),
            Err(AwaazError::ConfigError(_))
        ));
    }
}
