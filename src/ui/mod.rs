//! Desktop interface with egui/eframe

mod app;
pub mod components;
mod state;
pub mod theme;

pub use app::AwaazApp;
pub use state::{AboutInfo, AppState};
pub use theme::Theme;

use std::path::PathBuf;

/// Open the chat window and block until it is closed
pub fn run(state: AppState, font: Option<PathBuf>) -> eframe::Result<()> {
    let title = state.variant.title();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title(title),
        ..Default::default()
    };

    eframe::run_native(
        title,
        options,
        Box::new(move |cc| Ok(Box::new(AwaazApp::new(cc, state, font)))),
    )
}
