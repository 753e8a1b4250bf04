//! Input bar component
//!
//! Voice button, question field and the send / clear controls.

use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, Key, RichText, Vec2};

pub const VOICE_BUTTON: &str = "Ask Question? 🔊";
pub const TEXT_PROMPT: &str = "Or type your question in Urdu:";
pub const SEND_BUTTON: &str = "Send";
pub const CLEAR_BUTTON: &str = "Clear 🗑️";

pub struct InputBar<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> InputBar<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    self.show_voice_button(ui);
                    if self.state.busy {
                        ui.add_space(self.theme.spacing_sm);
                        ui.spinner();
                    }
                });

                ui.add_space(self.theme.spacing_sm);
                ui.label(RichText::new(TEXT_PROMPT).color(self.theme.text_secondary));

                ui.horizontal(|ui| {
                    self.show_text_input(ui);
                    self.show_send_button(ui);
                    self.show_clear_button(ui);
                });
            });
    }

    fn show_voice_button(&mut self, ui: &mut egui::Ui) {
        let enabled = self.state.can_submit_voice();
        let button = egui::Button::new(RichText::new(VOICE_BUTTON).size(16.0))
            .min_size(Vec2::new(180.0, 40.0))
            .rounding(self.theme.button_rounding);

        let response = ui.add_enabled(enabled, button);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, enabled, VOICE_BUTTON)
        });

        let response = if self.state.voice_available {
            response
        } else {
            response.on_disabled_hover_text("No microphone in this build")
        };

        if response.clicked() {
            self.state.submit_voice();
        }
    }

    fn show_text_input(&mut self, ui: &mut egui::Ui) {
        let enabled = !self.state.busy;
        // room for the two buttons
        let width = (ui.available_width() - 200.0).max(120.0);

        let text_edit = egui::TextEdit::singleline(&mut self.state.input_text)
            .hint_text("سوال یہاں لکھیں")
            .desired_width(width)
            .font(egui::TextStyle::Body)
            .margin(egui::Margin::symmetric(12.0, 8.0))
            .id(egui::Id::new("question_input"));

        let response = ui.add_enabled(enabled, text_edit);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, enabled, TEXT_PROMPT)
        });

        if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
            self.state.submit_text();
        }
    }

    fn show_send_button(&mut self, ui: &mut egui::Ui) {
        let enabled = self.state.can_submit_text();
        let button = egui::Button::new(RichText::new(SEND_BUTTON))
            .min_size(Vec2::new(64.0, 36.0))
            .rounding(self.theme.button_rounding);

        let response = ui.add_enabled(enabled, button);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, enabled, SEND_BUTTON)
        });

        if response.clicked() {
            self.state.submit_text();
        }
    }

    fn show_clear_button(&mut self, ui: &mut egui::Ui) {
        let button = egui::Button::new(RichText::new(CLEAR_BUTTON))
            .min_size(Vec2::new(80.0, 36.0))
            .rounding(self.theme.button_rounding);

        let response = ui.add(button);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, true, CLEAR_BUTTON)
        });

        if response.clicked() {
            self.state.clear();
        }
    }
}
