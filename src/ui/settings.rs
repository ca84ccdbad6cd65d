//! Settings window

use eframe::egui;

use crate::app::AppSession;
use crate::core::config::{Theme, FONT_SIZE_RANGE, LINE_HEIGHT_RANGE};

/// Settings window state
#[derive(Debug, Default)]
pub struct SettingsDialog {
    pub visible: bool,
}

impl SettingsDialog {
    pub fn open(&mut self) {
        self.visible = true;
    }

    /// Show the window, writing every change through the session
    pub fn show(&mut self, ctx: &egui::Context, session: &mut AppSession) {
        if !self.visible {
            return;
        }

        let mut settings = session.settings().clone();

        egui::Window::new("Settings")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Theme:");
                    ui.label(theme_label(settings.theme));
                    if ui.button("Next theme").clicked() {
                        settings.theme = session.cycle_theme();
                    }
                });

                let font_size = egui::Slider::new(
                    &mut settings.font_size,
                    FONT_SIZE_RANGE.0..=FONT_SIZE_RANGE.1,
                )
                .text("Font size")
                .suffix("px");
                if ui.add(font_size).changed() {
                    session.set_font_size(settings.font_size);
                }

                let line_height = egui::Slider::new(
                    &mut settings.line_height,
                    LINE_HEIGHT_RANGE.0..=LINE_HEIGHT_RANGE.1,
                )
                .text("Line height")
                .step_by(0.1);
                if ui.add(line_height).changed() {
                    session.set_line_height(settings.line_height);
                }

                if ui.checkbox(&mut settings.auto_save, "Auto-save").changed() {
                    session.set_auto_save(settings.auto_save);
                }
                if ui
                    .checkbox(&mut settings.typewriter_sounds, "Typewriter sounds")
                    .changed()
                {
                    session.toggle_typewriter_sounds();
                }
                if ui.checkbox(&mut settings.focus_mode, "Focus mode").changed() {
                    session.toggle_focus_mode();
                }
                if ui
                    .checkbox(&mut settings.typewriter_mode, "Typewriter mode")
                    .changed()
                {
                    session.toggle_typewriter_mode();
                }

                ui.separator();
                if ui.button("Close").clicked() {
                    self.visible = false;
                }
            });
    }
}

/// Names shown for each theme in menus
pub fn theme_label(theme: Theme) -> &'static str {
    match theme {
        Theme::Light => "Light",
        Theme::Dark => "Dark",
        Theme::Sepia => "Sepia",
    }
}
