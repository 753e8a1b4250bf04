pub mod client;
pub mod credential;
pub mod error;
pub mod model;
pub mod prompts;
pub mod responder;

pub use client::{OpenAiClient, OpenAiEmbedder, DEFAULT_BASE_URL};
pub use credential::Credential;
pub use error::ApiError;
pub use model::{ChatMessage, ChatModel, ChatRequest, Embedder, MessageRole};
pub use responder::{
    generate_response, DirectResponder, DirectSettings, InputMode, Responder, ResponseOutcome,
};
