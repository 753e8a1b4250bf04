//! Inline player for the latest spoken reply

use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, RichText, Vec2};

pub struct AudioPlayer<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> AudioPlayer<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    /// Renders nothing until a clip has arrived
    pub fn show(self, ui: &mut egui::Ui) {
        let Some(clip) = &self.state.last_clip else {
            return;
        };
        let duration = clip
            .duration
            .map(|d| format!("{:.1}s", d.as_secs_f32()))
            .unwrap_or_else(|| "--".to_string());
        let playing = self.state.is_playing();

        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(egui::Margin::symmetric(12.0, 8.0))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let (icon, label) = if playing {
                        ("⏹", "Stop reply audio")
                    } else {
                        ("▶", "Play reply audio")
                    };
                    let response = ui.add(
                        egui::Button::new(RichText::new(icon).size(16.0))
                            .min_size(Vec2::splat(32.0))
                            .rounding(self.theme.button_rounding),
                    );
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Button, true, label)
                    });

                    ui.label(RichText::new("Reply audio").color(self.theme.text_secondary));
                    ui.label(RichText::new(duration).size(12.0).color(self.theme.text_muted));

                    if response.clicked() {
                        if playing {
                            self.state.stop_clip();
                        } else {
                            self.state.play_clip();
                        }
                    }
                });
            });

        if playing {
            ui.ctx().request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
