//! Markdown preview panel using egui_commonmark

use eframe::egui;
use egui_commonmark::CommonMarkViewer;

use crate::app::NotepadApp;

/// Markdown preview panel
pub struct PreviewPanel;

impl PreviewPanel {
    /// Show the preview panel
    pub fn show(ui: &mut egui::Ui, app: &mut NotepadApp) {
        let source = app.session.editor().preview_source();

        egui::ScrollArea::vertical()
            .id_salt("preview_scroll")
            .show(ui, |ui| {
                if source.trim().is_empty() {
                    ui.vertical_centered(|ui| {
                        ui.add_space(50.0);
                        ui.weak("Nothing to preview yet");
                    });
                } else {
                    CommonMarkViewer::new().show(ui, &mut app.commonmark_cache, source);
                }
            });
    }
}
