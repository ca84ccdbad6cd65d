//! Document tab strip

use eframe::egui;

use crate::app::NotepadApp;
use crate::core::document::DocumentId;
use crate::core::session::{Tab, TabView};

/// Last tab list rendered by the session
#[derive(Debug, Clone, Default)]
pub struct TabStrip {
    tabs: Vec<Tab>,
}

impl TabStrip {
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }
}

impl TabView for TabStrip {
    fn render(&mut self, tabs: &[Tab]) {
        self.tabs = tabs.to_vec();
    }
}

/// What the user clicked in the strip this frame
enum TabAction {
    Switch(DocumentId),
    Close(DocumentId),
    New,
}

/// Horizontal tab bar with close buttons and a "+" button
pub struct TabBar;

impl TabBar {
    /// Show the tab bar
    pub fn show(ui: &mut egui::Ui, app: &mut NotepadApp) {
        let mut action = None;

        egui::ScrollArea::horizontal()
            .id_salt("tab_scroll")
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    for tab in app.session.tabs().tabs() {
                        if ui.selectable_label(tab.active, tab.title.as_str()).clicked() {
                            action = Some(TabAction::Switch(tab.id));
                        }
                        if ui
                            .small_button("\u{00D7}")
                            .on_hover_text("Close document")
                            .clicked()
                        {
                            action = Some(TabAction::Close(tab.id));
                        }
                        ui.add_space(6.0);
                    }

                    if ui.button("+").on_hover_text("New document").clicked() {
                        action = Some(TabAction::New);
                    }
                });
            });

        match action {
            Some(TabAction::Switch(id)) => {
                app.session.switch_to(id);
            }
            Some(TabAction::Close(id)) => {
                // Rejections are already reported in the status bar
                if let Err(e) = app.session.delete(id) {
                    tracing::debug!("Close tab {}: {}", id, e);
                }
            }
            Some(TabAction::New) => {
                app.session.new_document();
            }
            None => {}
        }
    }
}
