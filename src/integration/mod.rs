//! Wiring between configuration, services and the UI
//!
//! `config` decides which services are built, `orchestrator` runs one
//! submission at a time on a worker thread.

pub mod config;
pub mod orchestrator;

pub use config::{AppConfig, TtsBackend, Variant};
pub use orchestrator::{Assistant, AssistantCommand, AssistantEvent, AssistantPipeline};
