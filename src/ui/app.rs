//! Main application struct and eframe integration

use crate::ui::components::{AudioPlayer, Conversation, InputBar, Notices, Sidebar};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, RichText, SidePanel, TopBottomPanel};
use std::path::PathBuf;
use tracing::{info, warn};

pub struct AwaazApp {
    state: AppState,
    theme: Theme,
}

impl AwaazApp {
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState, font: Option<PathBuf>) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        if let Some(path) = font {
            if let Err(e) = crate::ui::theme::install_font(&cc.egui_ctx, &path) {
                warn!("Urdu font not loaded: {}", e);
            }
        }

        Self { state, theme }
    }

    fn show_sidebar(&mut self, ctx: &egui::Context) {
        SidePanel::left("sidebar")
            .resizable(true)
            .default_width(260.0)
            .min_width(200.0)
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                Sidebar::new(&mut self.state, &self.theme).show(ui);
            });
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                ui.label(
                    RichText::new(self.state.variant.title())
                        .size(26.0)
                        .strong()
                        .color(self.theme.text_primary),
                );
                ui.label(
                    RichText::new(self.state.variant.header())
                        .size(15.0)
                        .color(self.theme.text_muted),
                );
            });
    }

    fn show_input_area(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("input_area")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                Notices::new(&self.state.notices, &self.theme).show(ui);
                ui.add_space(self.theme.spacing_sm);
                AudioPlayer::new(&mut self.state, &self.theme).show(ui);
                ui.add_space(self.theme.spacing_sm);
                InputBar::new(&mut self.state, &self.theme).show(ui);
            });
    }

    fn show_content(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                Conversation::new(&self.state.history, &self.theme).show(ui);
            });
    }
}

impl eframe::App for AwaazApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_events();

        self.show_sidebar(ctx);
        self.show_header(ctx);
        self.show_input_area(ctx);
        self.show_content(ctx);

        // events only arrive between frames
        if self.state.busy {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Awaaz shutting down");
        self.state.shutdown();
    }
}
