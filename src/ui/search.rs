//! Search and replace window

use eframe::egui;

use crate::app::AppSession;
use crate::core::search::SearchOptions;

/// Search window state
#[derive(Debug, Default)]
pub struct SearchDialog {
    pub visible: bool,
    query: String,
    replacement: String,
    options: SearchOptions,
}

impl SearchDialog {
    pub fn open(&mut self) {
        self.visible = true;
    }

    /// Show the window and run whatever the user asked for
    pub fn show(&mut self, ctx: &egui::Context, session: &mut AppSession) {
        if !self.visible {
            return;
        }

        egui::Window::new("Search & Replace")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                let mut rerun = false;

                egui::Grid::new("search_grid").num_columns(2).show(ui, |ui| {
                    ui.label("Find:");
                    rerun |= ui.text_edit_singleline(&mut self.query).changed();
                    ui.end_row();

                    ui.label("Replace:");
                    ui.text_edit_singleline(&mut self.replacement);
                    ui.end_row();
                });

                ui.horizontal(|ui| {
                    rerun |= ui.checkbox(&mut self.options.is_regex, "Regex").changed();
                    rerun |= ui
                        .checkbox(&mut self.options.case_sensitive, "Case sensitive")
                        .changed();
                });

                if rerun {
                    // Failures are reported through the status bar
                    let _ = session.search(&self.query, self.options);
                }

                let state = session.search_state();
                let count = state.matches().len();
                match state.cursor() {
                    Some(cursor) if count > 0 => ui.label(format!("{} of {} matches", cursor + 1, count)),
                    _ => ui.label(format!("{} matches", count)),
                };

                ui.separator();

                ui.horizontal(|ui| {
                    if ui.button("Find Next").clicked() {
                        if session.search_state().matches().is_empty() {
                            let _ = session.search(&self.query, self.options);
                        } else {
                            session.find_next();
                        }
                    }
                    if ui.button("Replace").clicked() {
                        session.replace_current(&self.replacement);
                    }
                    if ui.button("Replace All").clicked() {
                        let _ = session.replace_all(&self.query, &self.replacement, self.options);
                    }
                    if ui.button("Close").clicked() {
                        self.visible = false;
                    }
                });
            });
    }
}
