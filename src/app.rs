//! Main application state and UI coordination

use std::time::{Duration, Instant};

use eframe::egui;

use crate::core::config::Settings;
use crate::core::export::{self, ExportFormat};
use crate::core::session::{EditorView, Session, AUTO_SAVE_INTERVAL};
use crate::core::storage::Storage;
use crate::ui::editor::{EditorBuffer, EditorPanel};
use crate::ui::preview::PreviewPanel;
use crate::ui::search::SearchDialog;
use crate::ui::settings::{theme_label, SettingsDialog};
use crate::ui::tabs::{TabBar, TabStrip};
use crate::ui::theme;

/// The session type the desktop app runs
pub type AppSession = Session<Storage, EditorBuffer, TabStrip>;

/// View mode for the editor area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    Editor,
    Preview,
    #[default]
    Split,
}

/// Main application state
pub struct NotepadApp {
    /// Documents, settings, search and persistence
    pub session: AppSession,
    /// Current view mode
    pub view_mode: ViewMode,
    /// Commonmark cache for preview
    pub commonmark_cache: egui_commonmark::CommonMarkCache,
    search_dialog: SearchDialog,
    settings_dialog: SettingsDialog,
    /// Settings last pushed into the egui style
    applied: Option<Settings>,
}

impl NotepadApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let session = Session::open(
            Storage::open_default(),
            EditorBuffer::default(),
            TabStrip::default(),
        );

        Self {
            session,
            view_mode: ViewMode::Split,
            commonmark_cache: egui_commonmark::CommonMarkCache::default(),
            search_dialog: SearchDialog::default(),
            settings_dialog: SettingsDialog::default(),
            applied: None,
        }
    }

    /// Push changed settings into the egui style
    fn sync_style(&mut self, ctx: &egui::Context) {
        let settings = self.session.settings();
        if self.applied.as_ref() != Some(settings) {
            theme::apply(ctx, settings);
            self.applied = Some(settings.clone());
        }
    }

    /// Ask for a destination and export the active document
    fn export_active(&mut self, format: ExportFormat) {
        let title = self
            .session
            .active_document()
            .map(|doc| doc.title.clone())
            .unwrap_or_default();

        let picked = rfd::FileDialog::new()
            .set_file_name(export::file_name(&title, format))
            .add_filter(format.label(), &[format.extension()])
            .save_file();

        if let Some(path) = picked {
            // Failures are logged and shown in the status bar
            let _ = self.session.export(format, &path);
        }
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New Document").clicked() {
                        self.session.new_document();
                        ui.close();
                    }
                    if ui.button("Save").clicked() {
                        self.session.save();
                        ui.close();
                    }
                    ui.menu_button("Export", |ui| {
                        for format in ExportFormat::ALL {
                            if ui.button(format.label()).clicked() {
                                self.export_active(format);
                                ui.close();
                            }
                        }
                    });
                    if ui.button("Copy to Clipboard").clicked() {
                        ctx.copy_text(self.session.editor().text().to_string());
                        self.session.editor_mut().notify("Copied to clipboard!");
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Delete Document").clicked() {
                        let id = self.session.active_id();
                        if let Err(e) = self.session.delete(id) {
                            tracing::debug!("Delete document {}: {}", id, e);
                        }
                        ui.close();
                    }
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    if ui.button("Search & Replace...").clicked() {
                        self.search_dialog.open();
                        ui.close();
                    }
                    if ui.button("Settings...").clicked() {
                        self.settings_dialog.open();
                        ui.close();
                    }
                });

                ui.menu_button("View", |ui| {
                    let settings = self.session.settings().clone();
                    let next = theme_label(settings.theme.next());
                    if ui.button(format!("Theme: {} (next: {})", theme_label(settings.theme), next)).clicked() {
                        self.session.cycle_theme();
                        ui.close();
                    }
                    if ui.selectable_label(settings.focus_mode, "Focus Mode").clicked() {
                        self.session.toggle_focus_mode();
                        ui.close();
                    }
                    if ui.selectable_label(settings.typewriter_mode, "Typewriter Mode").clicked() {
                        self.session.toggle_typewriter_mode();
                        ui.close();
                    }
                    if ui.selectable_label(settings.typewriter_sounds, "Typewriter Sounds").clicked() {
                        self.session.toggle_typewriter_sounds();
                        ui.close();
                    }
                    ui.separator();
                    if ui.selectable_label(self.view_mode == ViewMode::Editor, "Editor Only").clicked() {
                        self.view_mode = ViewMode::Editor;
                        ui.close();
                    }
                    if ui.selectable_label(self.view_mode == ViewMode::Preview, "Preview Only").clicked() {
                        self.view_mode = ViewMode::Preview;
                        ui.close();
                    }
                    if ui.selectable_label(self.view_mode == ViewMode::Split, "Split View").clicked() {
                        self.view_mode = ViewMode::Split;
                        ui.close();
                    }
                });
            });
        });
    }
}

impl eframe::App for NotepadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_style(ctx);

        let now = Instant::now();
        self.session.tick(now);
        ctx.request_repaint_after(AUTO_SAVE_INTERVAL);
        if self.session.editor().notice(now).is_some() {
            ctx.request_repaint_after(Duration::from_millis(500));
        }

        let focus_mode = self.session.settings().focus_mode;

        // Render menu bar
        self.render_menu_bar(ctx);

        // Status bar at the bottom
        if !focus_mode {
            egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
                EditorPanel::show_status_bar(ui, self);
            });

            egui::TopBottomPanel::top("tab_bar").show(ctx, |ui| {
                TabBar::show(ui, self);
            });
        }

        // Render main content area
        egui::CentralPanel::default().show(ctx, |ui| {
            let view_mode = if focus_mode { ViewMode::Editor } else { self.view_mode };
            match view_mode {
                ViewMode::Editor => {
                    EditorPanel::show(ui, self);
                }
                ViewMode::Preview => {
                    PreviewPanel::show(ui, self);
                }
                ViewMode::Split => {
                    // Split view: editor on left, preview on right
                    let available_width = ui.available_width();
                    ui.horizontal(|ui| {
                        ui.set_min_width(available_width);

                        ui.vertical(|ui| {
                            ui.set_width(available_width / 2.0 - 4.0);
                            EditorPanel::show(ui, self);
                        });

                        ui.separator();

                        ui.vertical(|ui| {
                            ui.set_width(available_width / 2.0 - 4.0);
                            PreviewPanel::show(ui, self);
                        });
                    });
                }
            }
        });

        self.search_dialog.show(ctx, &mut self.session);
        self.settings_dialog.show(ctx, &mut self.session);
    }
}
