//! Mapping settings onto egui visuals and text styles

use eframe::egui::{self, Color32, FontId, TextStyle};

use crate::core::config::{Settings, Theme};

const SEPIA_PANEL: Color32 = Color32::from_rgb(244, 236, 216);
const SEPIA_EDITOR: Color32 = Color32::from_rgb(250, 244, 228);
const SEPIA_TEXT: Color32 = Color32::from_rgb(91, 70, 54);

/// Visuals for a theme
pub fn visuals(theme: Theme) -> egui::Visuals {
    match theme {
        Theme::Light => egui::Visuals::light(),
        Theme::Dark => egui::Visuals::dark(),
        Theme::Sepia => {
            let mut visuals = egui::Visuals::light();
            visuals.panel_fill = SEPIA_PANEL;
            visuals.window_fill = SEPIA_PANEL;
            visuals.extreme_bg_color = SEPIA_EDITOR;
            visuals.faint_bg_color = SEPIA_EDITOR;
            visuals.override_text_color = Some(SEPIA_TEXT);
            visuals
        }
    }
}

/// Apply theme, font size and line spacing to the context
pub fn apply(ctx: &egui::Context, settings: &Settings) {
    ctx.set_visuals(visuals(settings.theme));

    let size = settings.font_size as f32;
    let spacing = size * (settings.line_height - 1.0);
    ctx.style_mut(|style| {
        style
            .text_styles
            .insert(TextStyle::Monospace, FontId::monospace(size));
        style
            .text_styles
            .insert(TextStyle::Body, FontId::proportional(size));
        style.spacing.item_spacing.y = spacing.max(2.0);
    });
}
