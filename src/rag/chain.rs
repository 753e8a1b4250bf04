//! Retrieval responder
//!
//! Embeds every chunk on first use, then answers each question by stuffing
//! the closest chunks into a single chat completion.

use crate::llm::prompts::stuff_prompt;
use crate::llm::{ApiError, ChatModel, ChatRequest, Credential, Embedder, InputMode, Responder};
use crate::rag::index::VectorIndex;
use crate::rag::splitter::DocumentChunk;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq)]
pub struct RetrievalSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 256,
            top_k: 4,
        }
    }
}

pub struct RetrievalResponder {
    chunks: Arc<Vec<DocumentChunk>>,
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn ChatModel>,
    settings: RetrievalSettings,
    index: OnceCell<VectorIndex>,
}

impl RetrievalResponder {
    pub fn new(
        chunks: Vec<DocumentChunk>,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn ChatModel>,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            chunks: Arc::new(chunks),
            embedder,
            model,
            settings,
            index: OnceCell::new(),
        }
    }

    pub fn is_indexed(&self) -> bool {
        self.index.initialized()
    }

    /// Build the index once; a failed build is retried on the next question
    async fn index(&self, credential: &Credential) -> Result<&VectorIndex, ApiError> {
        if !self.is_indexed() {
            debug!("Building vector index over {} chunks", self.chunks.len());
        }
        self.index
            .get_or_try_init(|| async {
                let start = Instant::now();
                let texts: Vec<String> = self.chunks.iter().map(|c| c.text.clone()).collect();
                let vectors = self.embedder.embed(credential, &texts).await?;
                if vectors.len() != texts.len() {
                    return Err(ApiError::Unexpected(format!(
                        "Embedded {} of {} chunks",
                        vectors.len(),
                        texts.len()
                    )));
                }

                let mut index = VectorIndex::new();
                for (chunk, vector) in self.chunks.iter().cloned().zip(vectors) {
                    if !index.insert(chunk, vector) {
                        return Err(ApiError::Unexpected(
                            "Embedding dimensions are inconsistent".to_string(),
                        ));
                    }
                }

                info!(
                    "Indexed {} chunks in {}ms",
                    index.len(),
                    start.elapsed().as_millis()
                );
                Ok::<_, ApiError>(index)
            })
            .await
    }
}

#[async_trait]
impl Responder for RetrievalResponder {
    async fn respond(
        &self,
        credential: &Credential,
        question: &str,
        _mode: InputMode,
    ) -> Result<String, ApiError> {
        credential.bearer()?;
        let index = self.index(credential).await?;

        let query = self
            .embedder
            .embed(credential, &[question.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Unexpected("No embedding returned for question".into()))?;

        let hits = index.search(&query, self.settings.top_k);
        debug!(
            "Retrieved chunks {:?}",
            hits.iter()
                .map(|h| (h.chunk.position.ordinal, h.score))
                .collect::<Vec<_>>()
        );

        let context: Vec<&str> = hits.iter().map(|h| h.chunk.text.as_str()).collect();
        let request = ChatRequest::prompt(&self.settings.model, stuff_prompt(&context, question))
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens);

        let answer = self.model.complete(credential, &request).await?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(ApiError::Api {
                status: 200,
                message: "empty completion".to_string(),
            });
        }
        Ok(answer.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::generate_response;
    use crate::rag::splitter::ChunkPosition;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds by counting a few marker words
    struct KeywordEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(
            &self,
            credential: &Credential,
            inputs: &[String],
        ) -> Result<Vec<Vec<f32>>, ApiError> {
            credential.bearer()?;
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(inputs
                .iter()
                .map(|t| {
                    ["لاہور", "کراچی", "اسلام آباد"]
                        .iter()
                        .map(|w| t.matches(w).count() as f32)
                        .collect()
                })
                .collect())
        }
    }

    struct EchoModel {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn complete(
            &self,
            _credential: &Credential,
            request: &ChatRequest,
        ) -> Result<String, ApiError> {
            self.prompts.lock().push(request.messages[0].content.clone());
            Ok(" جواب ".to_string())
        }
    }

    fn chunk(ordinal: usize, text: &str) -> DocumentChunk {
        DocumentChunk {
            text: text.to_string(),
            position: ChunkPosition {
                ordinal,
                page: 1,
                offset: 0,
            },
        }
    }

    fn fixture() -> (Arc<KeywordEmbedder>, Arc<EchoModel>, RetrievalResponder) {
        let embedder = Arc::new(KeywordEmbedder {
            calls: AtomicUsize::new(0),
        });
        let model = Arc::new(EchoModel {
            prompts: Mutex::new(Vec::new()),
        });
        let responder = RetrievalResponder::new(
            vec![
                chunk(0, "لاہور پنجاب میں ہے"),
                chunk(1, "کراچی سندھ میں ہے"),
                chunk(2, "اسلام آباد دارالحکومت ہے"),
            ],
            embedder.clone(),
            model.clone(),
            RetrievalSettings {
                top_k: 1,
                ..Default::default()
            },
        );
        (embedder, model, responder)
    }

    #[tokio::test]
    async fn closest_chunk_is_stuffed_into_the_prompt() {
        let (_, model, responder) = fixture();
        let answer = responder
            .respond(&Credential::new("k"), "کراچی کہاں ہے؟", InputMode::Text)
            .await
            .unwrap();

        assert_eq!(answer, "جواب");
        let prompts = model.prompts.lock();
        assert!(prompts[0].contains("کراچی سندھ میں ہے"));
        assert!(!prompts[0].contains("لاہور پنجاب"));
        assert!(prompts[0].contains("Question: کراچی کہاں ہے؟"));
    }

    #[tokio::test]
    async fn index_is_built_once_and_reused() {
        let (embedder, _, responder) = fixture();
        let key = Credential::new("k");
        assert!(!responder.is_indexed());

        responder.respond(&key, "لاہور", InputMode::Voice).await.unwrap();
        responder.respond(&key, "کراچی", InputMode::Voice).await.unwrap();

        assert!(responder.is_indexed());
        // one call for the chunks, one per question
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn missing_key_leaves_index_unbuilt() {
        let (embedder, _, responder) = fixture();
        let outcome =
            generate_response(&responder, &Credential::default(), "لاہور", InputMode::Text).await;

        assert_eq!(outcome.text(), "Invalid API Key");
        assert!(!responder.is_indexed());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }
}
