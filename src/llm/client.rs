//! HTTP client for an OpenAI-compatible API
//!
//! Covers the four endpoints the assistant talks to: chat completions,
//! embeddings, audio transcriptions and audio speech.

use crate::llm::error::map_http_error;
use crate::llm::model::{ChatMessage, ChatModel, ChatRequest, Embedder};
use crate::llm::{ApiError, Credential};
use crate::{AwaazError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Thin client shared by every hosted call.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone, Debug)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
}

impl OpenAiClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AwaazError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Model API client ready for {}", base_url);

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_json<B, R>(&self, credential: &Credential, path: &str, body: &B) -> std::result::Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let auth = credential.bearer()?;
        let response = self
            .http
            .post(self.url(path))
            .header("Authorization", auth)
            .json(body)
            .send()
            .await?;

        let response = check_status(response).await?;
        response
            .json::<R>()
            .await
            .map_err(|e| ApiError::Unexpected(format!("Failed to parse response: {}", e)))
    }

    /// `POST /chat/completions`, returning the first choice's text
    pub async fn chat(&self, credential: &Credential, request: &ChatRequest) -> std::result::Result<String, ApiError> {
        let start = Instant::now();
        let body = ChatCompletionRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let parsed: ChatCompletionResponse =
            self.post_json(credential, "chat/completions", &body).await?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        debug!(
            "Chat completion with {} returned {} chars in {}ms",
            request.model,
            text.chars().count(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }

    /// `POST /embeddings`, returning vectors in input order
    pub async fn embeddings(
        &self,
        credential: &Credential,
        model: &str,
        inputs: &[String],
    ) -> std::result::Result<Vec<Vec<f32>>, ApiError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingRequest { model, input: inputs };
        let parsed: EmbeddingResponse = self.post_json(credential, "embeddings", &body).await?;

        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);
        if data.len() != inputs.len() {
            return Err(ApiError::Unexpected(format!(
                "Expected {} embeddings, got {}",
                inputs.len(),
                data.len()
            )));
        }

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    /// `POST /audio/transcriptions` with a WAV clip
    pub async fn transcribe(
        &self,
        credential: &Credential,
        model: &str,
        language: &str,
        wav: Vec<u8>,
    ) -> std::result::Result<String, ApiError> {
        let auth = credential.bearer()?;
        let start = Instant::now();
        let size = wav.len();

        let file = Part::bytes(wav)
            .file_name("speech.wav")
            .mime_str("audio/wav")
            .map_err(|e| ApiError::Unexpected(format!("Invalid audio part: {}", e)))?;

        let form = Form::new()
            .text("model", model.to_string())
            .text("language", language.to_string())
            .text("response_format", "json")
            .part("file", file);

        let response = self
            .http
            .post(self.url("audio/transcriptions"))
            .header("Authorization", auth)
            .multipart(form)
            .send()
            .await?;

        let response = check_status(response).await?;
        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Unexpected(format!("Failed to parse transcription: {}", e)))?;

        debug!(
            "Transcribed {} bytes of audio in {}ms",
            size,
            start.elapsed().as_millis()
        );
        Ok(parsed.text)
    }

    /// `POST /audio/speech`, returning the encoded audio bytes
    pub async fn speech(
        &self,
        credential: &Credential,
        model: &str,
        voice: &str,
        input: &str,
    ) -> std::result::Result<Vec<u8>, ApiError> {
        let auth = credential.bearer()?;
        let body = SpeechRequest {
            model,
            voice,
            input,
            response_format: "wav",
        };

        let response = self
            .http
            .post(self.url("audio/speech"))
            .header("Authorization", auth)
            .json(&body)
            .send()
            .await?;

        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        debug!("Received {} bytes of synthesized speech", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(
        &self,
        credential: &Credential,
        request: &ChatRequest,
    ) -> std::result::Result<String, ApiError> {
        self.chat(credential, request).await
    }
}

/// Embeds text with a fixed model, splitting large inputs into batches
#[derive(Clone, Debug)]
pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
    batch_size: usize,
}

impl OpenAiEmbedder {
    pub fn new(client: OpenAiClient, model: impl Into<String>, batch_size: usize) -> Self {
        Self {
            client,
            model: model.into(),
            batch_size: batch_size.max(1),
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(
        &self,
        credential: &Credential,
        inputs: &[String],
    ) -> std::result::Result<Vec<Vec<f32>>, ApiError> {
        let mut vectors = Vec::with_capacity(inputs.len());
        for batch in inputs.chunks(self.batch_size) {
            let embedded = self.client.embeddings(credential, &self.model, batch).await?;
            vectors.extend(embedded);
        }
        Ok(vectors)
    }
}

async fn check_status(response: Response) -> std::result::Result<Response, ApiError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());
    Err(map_http_error(status, body))
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}
