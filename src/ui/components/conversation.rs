//! Conversation list
//!
//! Renders the history as `You:` / `Bot:` pairs, oldest first.

use crate::messages::ConversationHistory;
use crate::ui::theme::Theme;
use egui::{self, Color32, RichText};

pub struct Conversation<'a> {
    history: &'a ConversationHistory,
    theme: &'a Theme,
}

impl<'a> Conversation<'a> {
    pub fn new(history: &'a ConversationHistory, theme: &'a Theme) -> Self {
        Self { history, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .id_salt("conversation")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.add_space(self.theme.spacing_sm);
                for turn in self.history.turns() {
                    if let Some(user) = turn.user {
                        self.show_line(ui, "You", user, self.theme.user_bubble);
                    }
                    if let Some(bot) = turn.bot {
                        self.show_line(ui, "Bot", bot, self.theme.bot_bubble);
                    }
                    ui.add_space(self.theme.spacing_sm);
                }
            });
    }

    fn show_line(&self, ui: &mut egui::Ui, speaker: &str, text: &str, fill: Color32) {
        egui::Frame::none()
            .fill(fill)
            .rounding(self.theme.card_rounding)
            .inner_margin(egui::Margin::symmetric(12.0, 8.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                let response = ui.label(
                    RichText::new(format!("{}: {}", speaker, text)).color(self.theme.text_primary),
                );
                let label = format!("{} message: {}", speaker, text);
                response.widget_info(|| {
                    egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label)
                });
            });
    }
}
