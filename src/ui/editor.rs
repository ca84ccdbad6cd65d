//! Markdown editor panel and the buffer behind it

use std::ops::Range;
use std::time::{Duration, Instant};

use eframe::egui;
use eframe::egui::text::{CCursor, CCursorRange};

use crate::app::NotepadApp;
use crate::core::session::{EditorView, SaveStatus, Session, TabView, TextStats};
use crate::core::storage::KeyValueStore;

/// How long a notification stays in the status bar
pub const NOTICE_DURATION: Duration = Duration::from_secs(3);

/// Editor state the session drives through [`EditorView`]
#[derive(Debug, Clone)]
pub struct EditorBuffer {
    text: String,
    /// Last selection reported by the widget, as a byte range
    selection: Option<Range<usize>>,
    /// Selection requested by the session, applied on the next frame
    pending_selection: Option<Range<usize>>,
    preview: String,
    stats: TextStats,
    status: SaveStatus,
    notice: Option<(String, Instant)>,
}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self {
            text: String::new(),
            selection: None,
            pending_selection: None,
            preview: String::new(),
            stats: TextStats::default(),
            status: SaveStatus::Saved,
            notice: None,
        }
    }
}

impl EditorBuffer {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn preview_source(&self) -> &str {
        &self.preview
    }

    pub fn stats(&self) -> TextStats {
        self.stats
    }

    pub fn save_status(&self) -> SaveStatus {
        self.status
    }

    /// The current notification, if it has not expired
    pub fn notice(&self, now: Instant) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|(_, shown)| now.saturating_duration_since(*shown) < NOTICE_DURATION)
            .map(|(message, _)| message.as_str())
    }

    fn take_pending_selection(&mut self) -> Option<Range<usize>> {
        self.pending_selection.take()
    }

    /// Take text typed into the widget. The widget selection is kept.
    fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    fn set_widget_selection(&mut self, range: Option<Range<usize>>) {
        self.selection = range;
    }
}

impl EditorView for EditorBuffer {
    fn load(&mut self, content: &str) {
        self.text = content.to_string();
        self.selection = None;
        self.pending_selection = None;
    }

    fn select(&mut self, range: Range<usize>) {
        self.selection = Some(range.clone());
        self.pending_selection = Some(range);
    }

    fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    fn refresh_preview(&mut self, source: &str) {
        self.preview = source.to_string();
    }

    fn show_stats(&mut self, stats: TextStats) {
        self.stats = stats;
    }

    fn show_save_status(&mut self, status: SaveStatus) {
        self.status = status;
    }

    fn notify(&mut self, message: &str) {
        tracing::info!("{}", message);
        self.notice = Some((message.to_string(), Instant::now()));
    }
}

/// Byte offset of the `char_idx`-th character, clamped to the end
pub fn char_to_byte(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map_or(text.len(), |(idx, _)| idx)
}

/// Number of characters before `byte_idx`
pub fn byte_to_char(text: &str, byte_idx: usize) -> usize {
    match text.get(..byte_idx) {
        Some(prefix) => prefix.chars().count(),
        None => text.chars().count(),
    }
}

/// Hand text typed into the widget to the session
fn commit_edit<S: KeyValueStore, T: TabView>(session: &mut Session<S, EditorBuffer, T>, text: String) {
    session.editor_mut().set_text(&text);
    session.edit(text);
}

/// Screen rectangle of `cursor` in a galley painted at `galley_pos`
fn caret_rect(galley: &egui::Galley, galley_pos: egui::Pos2, cursor: CCursor) -> egui::Rect {
    galley.pos_from_cursor(cursor).translate(galley_pos.to_vec2())
}

/// Markdown editor panel
pub struct EditorPanel;

impl EditorPanel {
    /// Show the editor panel
    pub fn show(ui: &mut egui::Ui, app: &mut NotepadApp) {
        let mut text = app.session.editor().text().to_string();
        let typewriter = app.session.settings().typewriter_mode;

        egui::ScrollArea::vertical()
            .id_salt("editor_scroll")
            .show(ui, |ui| {
                let mut output = egui::TextEdit::multiline(&mut text)
                    .id_salt("editor_text")
                    .font(egui::TextStyle::Monospace)
                    .code_editor()
                    .desired_width(f32::INFINITY)
                    .desired_rows(30)
                    .show(ui);

                let editor = app.session.editor_mut();
                if let Some(range) = editor.take_pending_selection() {
                    let start = byte_to_char(&text, range.start);
                    let end = byte_to_char(&text, range.end);
                    output.state.cursor.set_char_range(Some(CCursorRange::two(
                        CCursor::new(start),
                        CCursor::new(end),
                    )));
                    output.response.request_focus();
                    output.state.store(ui.ctx(), output.response.id);
                } else if let Some(range) = output.state.cursor.char_range() {
                    let a = char_to_byte(&text, range.primary.index);
                    let b = char_to_byte(&text, range.secondary.index);
                    editor.set_widget_selection(Some(a.min(b)..a.max(b)));
                }

                if output.response.changed() {
                    // Typewriter mode keeps the caret row in the middle of the view
                    if let Some(range) = output.cursor_range.filter(|_| typewriter) {
                        let caret = caret_rect(&output.galley, output.galley_pos, range.primary);
                        ui.scroll_to_rect(caret, Some(egui::Align::Center));
                    }
                    commit_edit(&mut app.session, text);
                }
            });
    }

    /// Show word and character counts, save status and the latest notification
    pub fn show_status_bar(ui: &mut egui::Ui, app: &NotepadApp) {
        let editor = app.session.editor();
        let stats = editor.stats();

        ui.horizontal(|ui| {
            ui.label(format!("{} words", stats.words));
            ui.separator();
            ui.label(format!("{} characters", stats.characters));
            ui.separator();

            let status = editor.save_status();
            let color = match status {
                SaveStatus::Error => ui.visuals().error_fg_color,
                SaveStatus::Saving => ui.visuals().warn_fg_color,
                SaveStatus::Saved => ui.visuals().weak_text_color(),
            };
            ui.colored_label(color, status.label());

            if let Some(notice) = editor.notice(Instant::now()) {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(notice);
                });
            }
        });
    }
}
