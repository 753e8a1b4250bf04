use anyhow::{Context, Result};
use awaaz::integration::{AppConfig, Assistant, AssistantPipeline};
use awaaz::llm::Credential;
use awaaz::ui::{self, AboutInfo, AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "awaaz=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Awaaz");

    let config = AppConfig::load().context("Failed to load configuration")?;
    let assistant = Assistant::from_config(&config).context("Failed to start assistant")?;
    let voice_available = assistant.has_voice_input();

    let pipeline = AssistantPipeline::new(assistant);
    let state = AppState::new(config.variant)
        .with_credential(Credential::from_env())
        .with_channels(pipeline.command_sender(), pipeline.event_receiver())
        .with_voice_input(voice_available)
        .with_autoplay(config.tts.autoplay)
        .with_about(AboutInfo::from_config(&config));
    let worker = pipeline.start_worker()?;

    ui::run(state, config.ui.font_path.clone())
        .map_err(|e| anyhow::anyhow!("UI error: {}", e))?;

    // the window closing sends Shutdown
    if worker.join().is_err() {
        tracing::error!("Assistant worker panicked");
    }
    Ok(())
}
