//! Colors, spacing and fonts for the chat window

use crate::{AwaazError, Result};
use egui::{Color32, FontData, FontDefinitions, FontFamily, FontId, Rounding, Stroke, Vec2, Visuals};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const URDU_FONT: &str = "urdu";

/// Application theme configuration
#[derive(Clone, Debug)]
pub struct Theme {
    /// Accent for the primary actions
    pub primary: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub error: Color32,
    /// Informational notices
    pub info: Color32,

    /// Background colors
    pub bg_primary: Color32,
    pub bg_secondary: Color32,
    pub bg_tertiary: Color32,

    /// Text colors
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_muted: Color32,

    /// Bubble fills for the two speakers
    pub user_bubble: Color32,
    pub bot_bubble: Color32,

    pub button_rounding: Rounding,
    pub card_rounding: Rounding,

    pub spacing: f32,
    pub spacing_lg: f32,
    pub spacing_sm: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            primary: Color32::from_rgb(16, 163, 127),  // Teal
            success: Color32::from_rgb(34, 197, 94),   // Green
            warning: Color32::from_rgb(234, 179, 8),   // Yellow
            error: Color32::from_rgb(239, 68, 68),     // Red
            info: Color32::from_rgb(96, 165, 250),     // Blue

            bg_primary: Color32::from_rgb(17, 24, 39),
            bg_secondary: Color32::from_rgb(31, 41, 55),
            bg_tertiary: Color32::from_rgb(55, 65, 81),

            text_primary: Color32::from_rgb(249, 250, 251),
            text_secondary: Color32::from_rgb(209, 213, 219),
            text_muted: Color32::from_rgb(156, 163, 175),

            user_bubble: Color32::from_rgb(30, 64, 95),
            bot_bubble: Color32::from_rgb(45, 55, 72),

            button_rounding: Rounding::same(8.0),
            card_rounding: Rounding::same(12.0),

            spacing: 16.0,
            spacing_lg: 24.0,
            spacing_sm: 8.0,
        }
    }

    /// Apply colors and text styles to egui
    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = Visuals::dark();

        visuals.panel_fill = self.bg_primary;
        visuals.window_fill = self.bg_secondary;
        visuals.extreme_bg_color = self.bg_tertiary;

        visuals.widgets.noninteractive.bg_fill = self.bg_secondary;
        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text_muted);

        visuals.widgets.inactive.bg_fill = self.bg_tertiary;
        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.text_secondary);

        visuals.widgets.hovered.bg_fill = self.primary.gamma_multiply(0.8);
        visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, self.text_primary);

        visuals.widgets.active.bg_fill = self.primary;
        visuals.widgets.active.fg_stroke = Stroke::new(1.0, self.text_primary);

        visuals.selection.bg_fill = self.primary.gamma_multiply(0.3);
        visuals.selection.stroke = Stroke::new(1.0, self.primary);
        visuals.hyperlink_color = self.primary;

        visuals.window_rounding = self.card_rounding;
        visuals.window_stroke = Stroke::new(1.0, self.bg_tertiary);

        ctx.set_visuals(visuals);

        let mut style = (*ctx.style()).clone();
        style.spacing.item_spacing = Vec2::splat(self.spacing_sm);
        style.spacing.window_margin = egui::Margin::same(self.spacing);
        style.spacing.button_padding = Vec2::new(self.spacing, self.spacing_sm);

        style.text_styles.insert(
            egui::TextStyle::Heading,
            FontId::new(24.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Body,
            FontId::new(16.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Button,
            FontId::new(15.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Small,
            FontId::new(12.0, FontFamily::Proportional),
        );

        ctx.set_style(style);
    }

    pub fn notice_color(&self, level: crate::messages::NoticeLevel) -> Color32 {
        use crate::messages::NoticeLevel;
        match level {
            NoticeLevel::Info => self.info,
            NoticeLevel::Success => self.success,
            NoticeLevel::Warning => self.warning,
            NoticeLevel::Error => self.error,
        }
    }
}

/// Built-in fonts with `bytes` tried first for proportional text
pub fn fonts_with_urdu(bytes: Vec<u8>) -> FontDefinitions {
    let mut fonts = FontDefinitions::default();
    fonts
        .font_data
        .insert(URDU_FONT.to_owned(), Arc::new(FontData::from_owned(bytes)));
    fonts
        .families
        .entry(FontFamily::Proportional)
        .or_default()
        .insert(0, URDU_FONT.to_owned());
    fonts
        .families
        .entry(FontFamily::Monospace)
        .or_default()
        .push(URDU_FONT.to_owned());
    fonts
}

/// The built-in fonts carry no Arabic-script glyphs, so Urdu needs a
/// font file from the system or the config.
pub fn install_font(ctx: &egui::Context, path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).map_err(|e| {
        AwaazError::ConfigError(format!("Failed to read font {}: {}", path.display(), e))
    })?;
    info!("Loaded UI font {} ({} bytes)", path.display(), bytes.len());
    ctx.set_fonts(fonts_with_urdu(bytes));
    Ok(())
}
