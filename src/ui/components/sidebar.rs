//! Sidebar with the API key field and a short About block

use crate::integration::Variant;
use crate::messages::notice::MISSING_KEY;
use crate::ui::state::{AboutInfo, AppState};
use crate::ui::theme::Theme;
use egui::{self, RichText};

pub const KEY_FIELD: &str = "Enter your OpenAI API Key:";

pub struct Sidebar<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> Sidebar<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.label(
            RichText::new("API Configuration")
                .size(18.0)
                .strong()
                .color(self.theme.text_primary),
        );
        ui.add_space(self.theme.spacing_sm);
        ui.label(RichText::new(KEY_FIELD).color(self.theme.text_secondary));

        let response = ui.add(
            egui::TextEdit::singleline(self.state.credential.as_mut_string())
                .password(true)
                .desired_width(f32::INFINITY)
                .id(egui::Id::new("api_key_input")),
        );
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, KEY_FIELD)
        });

        if self.state.missing_credential() {
            ui.add_space(self.theme.spacing_sm);
            let warning = ui.label(RichText::new(MISSING_KEY).color(self.theme.warning));
            warning.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Label, true, MISSING_KEY)
            });
        }

        ui.add_space(self.theme.spacing_lg);
        ui.separator();
        ui.label(RichText::new("About").strong().color(self.theme.text_primary));
        ui.label(RichText::new(about(self.state.variant)).color(self.theme.text_muted));
        ui.add_space(self.theme.spacing_sm);
        for line in about_lines(&self.state.about) {
            let label = ui.label(RichText::new(&line).small().color(self.theme.text_secondary));
            label.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &line));
        }
    }
}

fn about_lines(info: &AboutInfo) -> Vec<String> {
    let mut lines = Vec::with_capacity(4);
    if let Some(document) = &info.document {
        lines.push(format!("Document: {}", document));
    }
    if !info.chat_model.is_empty() {
        lines.push(format!("Chat model: {}", info.chat_model));
    }
    if !info.speech_model.is_empty() {
        lines.push(format!("Speech model: {}", info.speech_model));
    }
    if !info.voice.is_empty() {
        lines.push(format!("Voice: {}", info.voice));
    }
    lines
}

fn about(variant: Variant) -> &'static str {
    match variant {
        Variant::Retrieval => {
            "Answers are drawn from the loaded document. Ask by voice or text; \
             replies come back as Urdu text and speech."
        }
        Variant::Direct => {
            "Answers come straight from the chat model. Ask by voice or text; \
             replies come back as Urdu text and speech."
        }
    }
}
