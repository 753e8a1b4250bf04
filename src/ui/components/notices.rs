use crate::messages::Notice;
use crate::ui::theme::Theme;
use egui::{self, RichText};

/// Status lines for the current submission, color-coded by level
pub struct Notices<'a> {
    notices: &'a [Notice],
    theme: &'a Theme,
}

impl<'a> Notices<'a> {
    pub fn new(notices: &'a [Notice], theme: &'a Theme) -> Self {
        Self { notices, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        for notice in self.notices {
            let color = self.theme.notice_color(notice.level);
            egui::Frame::none()
                .fill(color.gamma_multiply(0.15))
                .rounding(self.theme.button_rounding)
                .inner_margin(egui::Margin::symmetric(10.0, 6.0))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    let response = ui.label(RichText::new(&notice.text).color(color));
                    let label = format!("Notice: {}", notice.text);
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label)
                    });
                });
        }
    }
}
