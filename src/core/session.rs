//! Session controller: the active document and everything that hangs off it
//!
//! The session is built once at startup and owned by the app. It talks to the
//! UI only through the [`EditorView`] and [`TabView`] ports, so the same flow
//! runs against egui widgets and against test doubles.

use std::ops::Range;
use std::path::Path;
use std::time::{Duration, Instant};

use super::config::{Settings, Theme};
use super::document::{Document, DocumentId, DocumentStore};
use super::error::{NotepadError, Result};
use super::export::{self, ExportFormat};
use super::search::{self, Match, SearchEngine, SearchOptions};
use super::storage::KeyValueStore;

/// Time between two auto-saves
pub const AUTO_SAVE_INTERVAL: Duration = Duration::from_secs(5);

/// Persistence state shown in the status bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saving,
    Saved,
    Error,
}

impl SaveStatus {
    pub fn label(self) -> &'static str {
        match self {
            SaveStatus::Saving => "Saving...",
            SaveStatus::Saved => "Saved",
            SaveStatus::Error => "Error",
        }
    }
}

/// Word and character counts of a buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStats {
    pub words: usize,
    pub characters: usize,
}

/// Count whitespace-separated words and characters
pub fn text_stats(content: &str) -> TextStats {
    TextStats {
        words: content.split_whitespace().count(),
        characters: content.chars().count(),
    }
}

/// One entry of the tab strip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: DocumentId,
    pub title: String,
    pub active: bool,
}

/// The editable buffer and its surroundings
pub trait EditorView {
    /// Replace the whole buffer
    fn load(&mut self, content: &str);

    /// Select a byte range of the buffer and bring it into view
    fn select(&mut self, range: Range<usize>);

    /// Current selection as a byte range, if any
    fn selection(&self) -> Option<Range<usize>>;

    /// Regenerate the preview from markdown source
    fn refresh_preview(&mut self, source: &str);

    fn show_stats(&mut self, stats: TextStats);

    fn show_save_status(&mut self, status: SaveStatus);

    /// Show a short transient message
    fn notify(&mut self, message: &str);
}

/// The strip of document tabs
pub trait TabView {
    fn render(&mut self, tabs: &[Tab]);
}

/// Fixed-interval timer polled from the UI loop
#[derive(Debug, Clone)]
struct AutoSave {
    interval: Duration,
    last: Instant,
}

impl AutoSave {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Instant::now(),
        }
    }

    fn due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) < self.interval {
            return false;
        }
        self.last = now;
        true
    }

    fn reset(&mut self, now: Instant) {
        self.last = now;
    }
}

/// Editing session over the document collection
pub struct Session<S, E, T> {
    storage: S,
    documents: DocumentStore,
    settings: Settings,
    search: SearchEngine,
    active: DocumentId,
    status: SaveStatus,
    auto_save: AutoSave,
    editor: E,
    tabs: T,
}

impl<S: KeyValueStore, E: EditorView, T: TabView> Session<S, E, T> {
    /// Load settings and documents from `storage` and activate the first document
    pub fn open(storage: S, editor: E, tabs: T) -> Self {
        let settings = Settings::load(&storage);
        let (documents, seeded) = DocumentStore::load(&storage);
        let active = documents.first().map_or(1, |doc| doc.id);

        let mut session = Self {
            storage,
            documents,
            settings,
            search: SearchEngine::new(),
            active,
            status: SaveStatus::Saved,
            auto_save: AutoSave::new(AUTO_SAVE_INTERVAL),
            editor,
            tabs,
        };

        if seeded {
            session.persist_documents();
        }
        session.switch_to(active);
        session
    }

    // --- documents ---

    /// Make `id` the active document. Unknown ids are ignored.
    pub fn switch_to(&mut self, id: DocumentId) -> bool {
        if !self.documents.contains(id) {
            tracing::debug!("Ignoring switch to unknown document {}", id);
            return false;
        }

        self.active = id;
        let content = self.active_content().to_string();
        self.search.invalidate();
        self.editor.load(&content);
        self.refresh_derived(&content);
        self.render_tabs();
        true
    }

    /// Create an empty document and switch to it
    pub fn new_document(&mut self) -> DocumentId {
        self.create(None, None)
    }

    /// Create a document, persist the collection, and switch to it
    pub fn create(&mut self, title: Option<&str>, content: Option<&str>) -> DocumentId {
        let doc = self.documents.create(title, content);
        tracing::info!("Created document {}", doc.id);

        self.persist_documents();
        self.switch_to(doc.id);
        self.editor.notify("New document created!");
        doc.id
    }

    /// Apply an edit of the active buffer
    pub fn edit(&mut self, content: String) {
        self.set_status(SaveStatus::Saving);
        self.search.invalidate();
        self.refresh_derived(&content);

        if self.documents.update(self.active, content) {
            self.persist_documents();
            self.render_tabs();
        }
    }

    /// Delete a document. The last remaining document cannot be deleted.
    pub fn delete(&mut self, id: DocumentId) -> Result<()> {
        let replacement = match self.documents.delete(id) {
            Ok(replacement) => replacement,
            Err(NotepadError::LastDocument) => {
                self.editor.notify("Cannot delete the last document");
                return Err(NotepadError::LastDocument);
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!("Delete ignored: {}", e);
                return Err(e);
            }
            Err(e) => {
                tracing::warn!("Delete failed: {}", e);
                return Err(e);
            }
        };

        if self.active == id {
            self.switch_to(replacement);
        } else {
            self.render_tabs();
        }

        self.persist_documents();
        tracing::info!("Deleted document {}", id);
        self.editor.notify("Document deleted");
        Ok(())
    }

    // --- search ---

    /// Search the active buffer and select the first match
    pub fn search(&mut self, pattern: &str, options: SearchOptions) -> Result<Option<Match>> {
        let buffer = self
            .documents
            .get(self.active)
            .map(|doc| doc.content.as_str())
            .unwrap_or_default();

        if let Err(e) = self.search.search(buffer, pattern, options) {
            tracing::warn!("Search error: {}", e);
            self.editor.notify("Search error: Invalid regex");
            return Err(e);
        }

        if pattern.is_empty() {
            return Ok(None);
        }
        Ok(self.find_next())
    }

    /// Select the next match, wrapping around
    pub fn find_next(&mut self) -> Option<Match> {
        match self.search.find_next() {
            Some(found) => {
                self.editor.select(found.range());
                Some(found)
            }
            None => {
                self.editor.notify("No matches found");
                None
            }
        }
    }

    /// Replace the editor's selection with `replacement`. Without a
    /// selection the current search match is replaced.
    pub fn replace_current(&mut self, replacement: &str) -> bool {
        let selected = self.editor.selection().filter(|r| !r.is_empty());
        let Some(range) = selected.or_else(|| self.search.current().map(|m| m.range())) else {
            return false;
        };
        let content = self.active_content();
        if content.get(range.clone()).is_none() {
            tracing::debug!("Selection {:?} is outside the buffer", range);
            return false;
        }

        let updated = format!("{}{}{}", &content[..range.start], replacement, &content[range.end..]);
        self.editor.load(&updated);
        self.edit(updated);
        self.editor.notify("Text replaced");
        true
    }

    /// Replace every match in the active buffer and return the count
    pub fn replace_all(
        &mut self,
        pattern: &str,
        replacement: &str,
        options: SearchOptions,
    ) -> Result<usize> {
        let result = search::replace_all(self.active_content(), pattern, replacement, options);

        match result {
            Ok((updated, count)) => {
                self.editor.load(&updated);
                self.edit(updated);
                self.editor.notify(&format!("{} replacements made", count));
                Ok(count)
            }
            Err(NotepadError::EmptyPattern) => {
                self.editor.notify("Please enter search term");
                Err(NotepadError::EmptyPattern)
            }
            Err(e) => {
                tracing::warn!("Replace error: {}", e);
                self.editor.notify("Replace error: Invalid regex");
                Err(e)
            }
        }
    }

    // --- persistence ---

    /// Save documents and settings on request
    pub fn save(&mut self) {
        let documents_ok = self.persist_documents();
        let settings_ok = self.persist_settings();

        if documents_ok && settings_ok {
            self.editor.notify("Document saved!");
        } else {
            self.editor.notify("Error saving document");
        }
    }

    /// Run the auto-save when it is enabled and due. Returns whether it ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.settings.auto_save || !self.auto_save.due(now) {
            return false;
        }

        tracing::debug!("Auto-saving");
        self.persist_documents();
        self.persist_settings();
        true
    }

    // --- settings ---

    pub fn cycle_theme(&mut self) -> Theme {
        let theme = self.settings.cycle_theme();
        self.persist_settings();
        self.editor
            .notify(&format!("Theme changed to {}", theme.name()));
        theme
    }

    pub fn toggle_focus_mode(&mut self) -> bool {
        let enabled = self.settings.toggle_focus_mode();
        self.persist_settings();
        self.editor.notify(&toggled("Focus mode", enabled));
        enabled
    }

    pub fn toggle_typewriter_mode(&mut self) -> bool {
        let enabled = self.settings.toggle_typewriter_mode();
        self.persist_settings();
        self.editor.notify(&toggled("Typewriter mode", enabled));
        enabled
    }

    pub fn toggle_typewriter_sounds(&mut self) -> bool {
        let enabled = self.settings.toggle_typewriter_sounds();
        self.persist_settings();
        self.editor.notify(&toggled("Typewriter sounds", enabled));
        enabled
    }

    pub fn set_auto_save(&mut self, enabled: bool) {
        self.settings.set_auto_save(enabled);
        self.auto_save.reset(Instant::now());
        self.persist_settings();
        self.editor.notify(&toggled("Auto-save", enabled));
    }

    pub fn set_font_size(&mut self, size: u32) {
        self.settings.set_font_size(size);
        self.persist_settings();
    }

    pub fn set_line_height(&mut self, height: f32) {
        self.settings.set_line_height(height);
        self.persist_settings();
    }

    // --- export ---

    /// Write the active document to `path` in the given format
    pub fn export(&mut self, format: ExportFormat, path: &Path) -> anyhow::Result<()> {
        let result = match self.active_document() {
            Some(doc) => export::write(doc, format, path),
            None => Err(anyhow::anyhow!("No active document")),
        };

        match &result {
            Ok(()) => self
                .editor
                .notify(&format!("{} exported successfully!", format.label())),
            Err(e) => {
                tracing::error!("Export error: {:#}", e);
                self.editor
                    .notify(&format!("Failed to export {}", format.label()));
            }
        }
        result
    }

    // --- accessors ---

    pub fn active_id(&self) -> DocumentId {
        self.active
    }

    pub fn active_document(&self) -> Option<&Document> {
        self.documents.get(self.active)
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn search_state(&self) -> &SearchEngine {
        &self.search
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    pub fn tabs(&self) -> &T {
        &self.tabs
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // --- internals ---

    fn active_content(&self) -> &str {
        self.active_document()
            .map(|doc| doc.content.as_str())
            .unwrap_or_default()
    }

    fn refresh_derived(&mut self, content: &str) {
        self.editor.refresh_preview(content);
        self.editor.show_stats(text_stats(content));
    }

    fn render_tabs(&mut self) {
        let tabs: Vec<Tab> = self
            .documents
            .list()
            .iter()
            .map(|doc| Tab {
                id: doc.id,
                title: doc.title.clone(),
                active: doc.id == self.active,
            })
            .collect();
        self.tabs.render(&tabs);
    }

    fn set_status(&mut self, status: SaveStatus) {
        self.status = status;
        self.editor.show_save_status(status);
    }

    fn persist_documents(&mut self) -> bool {
        match self.documents.save(&mut self.storage) {
            Ok(()) => {
                self.set_status(SaveStatus::Saved);
                true
            }
            Err(e) => {
                tracing::error!("Error saving documents: {}", e);
                self.set_status(SaveStatus::Error);
                false
            }
        }
    }

    fn persist_settings(&mut self) -> bool {
        match self.settings.save(&mut self.storage) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error saving settings: {}", e);
                false
            }
        }
    }
}

fn toggled(what: &str, enabled: bool) -> String {
    let state = if enabled { "enabled" } else { "disabled" };
    format!("{} {}", what, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::{MemoryStore, DOCUMENTS_KEY, SETTINGS_KEY};
    use tempfile::tempdir;

    #[derive(Default)]
    struct FakeEditor {
        content: String,
        selection: Option<Range<usize>>,
        preview: String,
        stats: TextStats,
        status: Option<SaveStatus>,
        notices: Vec<String>,
    }

    impl EditorView for FakeEditor {
        fn load(&mut self, content: &str) {
            self.content = content.to_string();
        }

        fn select(&mut self, range: Range<usize>) {
            self.selection = Some(range);
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
            self.status = Some(status);
        }

        fn notify(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }
    }

    #[derive(Default)]
    struct FakeTabs {
        tabs: Vec<Tab>,
    }

    impl TabView for FakeTabs {
        fn render(&mut self, tabs: &[Tab]) {
            self.tabs = tabs.to_vec();
        }
    }

    /// Fails every write, like a full or read-only disk
    #[derive(Default)]
    struct FullStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for FullStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(NotepadError::Persistence("quota exceeded".into()))
        }
    }

    type TestSession = Session<MemoryStore, FakeEditor, FakeTabs>;

    fn open() -> TestSession {
        Session::open(MemoryStore::new(), FakeEditor::default(), FakeTabs::default())
    }

    fn last_notice(session: &TestSession) -> &str {
        session.editor().notices.last().map(String::as_str).unwrap_or_default()
    }

    fn stored_documents(session: &TestSession) -> Vec<Document> {
        let json = session.storage().get(DOCUMENTS_KEY).unwrap().unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_open_seeds_and_activates_welcome() {
        let session = open();
        assert_eq!(session.active_id(), 1);
        assert!(session.editor().content.starts_with("# Welcome"));
        assert_eq!(session.editor().preview, session.editor().content);
        assert!(session.editor().stats.words > 0);
        assert_eq!(session.tabs().tabs.len(), 1);
        assert!(session.tabs().tabs[0].active);
        // The seeded document is persisted right away
        assert_eq!(stored_documents(&session).len(), 1);
    }

    #[test]
    fn test_open_restores_previous_session() {
        let mut first = open();
        first.create(Some("Second"), Some("two"));
        first.set_font_size(20);
        let storage = first.storage().clone();

        let second: TestSession =
            Session::open(storage, FakeEditor::default(), FakeTabs::default());
        assert_eq!(second.documents().len(), 2);
        assert_eq!(second.active_id(), 1);
        assert_eq!(second.settings().font_size, 20);
    }

    #[test]
    fn test_create_switches_and_persists() {
        let mut session = open();
        let id = session.new_document();
        assert_eq!(id, 2);
        assert_eq!(session.active_id(), 2);
        assert_eq!(session.editor().content, "");
        assert_eq!(session.tabs().tabs.len(), 2);
        assert!(session.tabs().tabs[1].active);
        assert_eq!(stored_documents(&session).len(), 2);
        assert_eq!(last_notice(&session), "New document created!");
    }

    #[test]
    fn test_switch_to_unknown_is_ignored() {
        let mut session = open();
        let before = session.editor().content.clone();
        assert!(!session.switch_to(99));
        assert_eq!(session.active_id(), 1);
        assert_eq!(session.editor().content, before);
    }

    #[test]
    fn test_edit_updates_title_stats_and_storage() {
        let mut session = open();
        session.edit("## Groceries\neggs and milk".to_string());

        let doc = session.active_document().unwrap();
        assert_eq!(doc.title, "Groceries");
        assert_eq!(session.tabs().tabs[0].title, "Groceries");
        assert_eq!(session.editor().stats, TextStats { words: 5, characters: 26 });
        assert_eq!(session.status(), SaveStatus::Saved);
        assert_eq!(stored_documents(&session)[0].content, "## Groceries\neggs and milk");
    }

    #[test]
    fn test_delete_last_document_rejected() {
        let mut session = open();
        assert!(matches!(session.delete(1), Err(NotepadError::LastDocument)));
        assert_eq!(session.documents().len(), 1);
        assert_eq!(last_notice(&session), "Cannot delete the last document");
    }

    #[test]
    fn test_delete_active_switches_to_previous() {
        let mut session = open();
        session.create(None, Some("two"));
        session.create(None, Some("three"));
        session.switch_to(2);

        session.delete(2).unwrap();
        assert_eq!(session.active_id(), 1);
        assert!(session.editor().content.starts_with("# Welcome"));
        assert_eq!(stored_documents(&session).len(), 2);

        session.switch_to(1);
        session.delete(1).unwrap();
        assert_eq!(session.active_id(), 3);
        assert_eq!(session.editor().content, "three");
    }

    #[test]
    fn test_delete_unknown_document() {
        let mut session = open();
        session.create(None, Some("two"));
        let err = session.delete(42).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(session.documents().len(), 2);
        assert_eq!(session.active_id(), 2);
    }

    #[test]
    fn test_delete_inactive_keeps_active() {
        let mut session = open();
        session.create(None, Some("two"));
        session.delete(1).unwrap();
        assert_eq!(session.active_id(), 2);
        assert_eq!(session.tabs().tabs.len(), 1);
    }

    #[test]
    fn test_search_selects_and_cycles() {
        let mut session = open();
        session.edit("foo bar foo".to_string());

        let found = session.search("FOO", SearchOptions::default()).unwrap();
        assert_eq!(found, Some(Match { offset: 0, length: 3 }));
        assert_eq!(session.editor().selection, Some(0..3));

        assert_eq!(session.find_next().unwrap().offset, 8);
        assert_eq!(session.editor().selection, Some(8..11));
        assert_eq!(session.find_next().unwrap().offset, 0);
    }

    #[test]
    fn test_search_without_matches_notifies() {
        let mut session = open();
        session.edit("abc".to_string());
        assert_eq!(session.search("z", SearchOptions::default()).unwrap(), None);
        assert_eq!(last_notice(&session), "No matches found");
    }

    #[test]
    fn test_invalid_search_keeps_state() {
        let mut session = open();
        session.edit("foo foo".to_string());
        session.search("foo", SearchOptions::default()).unwrap();

        let regex = SearchOptions {
            is_regex: true,
            case_sensitive: false,
        };
        assert!(matches!(
            session.search("(foo", regex),
            Err(NotepadError::InvalidPattern(_))
        ));
        assert_eq!(session.search_state().matches().len(), 2);
        assert_eq!(last_notice(&session), "Search error: Invalid regex");
    }

    #[test]
    fn test_edit_invalidates_search() {
        let mut session = open();
        session.edit("foo".to_string());
        session.search("foo", SearchOptions::default()).unwrap();
        session.edit("foo foo".to_string());
        assert!(session.search_state().matches().is_empty());
    }

    #[test]
    fn test_replace_all() {
        let mut session = open();
        session.edit("foo foo foo".to_string());

        let count = session
            .replace_all("foo", "bar", SearchOptions::default())
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(session.active_document().unwrap().content, "bar bar bar");
        assert_eq!(session.editor().content, "bar bar bar");
        assert_eq!(last_notice(&session), "3 replacements made");
    }

    #[test]
    fn test_replace_all_invalid_leaves_buffer() {
        let mut session = open();
        session.edit("a(b".to_string());
        let regex = SearchOptions {
            is_regex: true,
            case_sensitive: false,
        };
        assert!(session.replace_all("(", "x", regex).is_err());
        assert_eq!(session.active_document().unwrap().content, "a(b");
        assert_eq!(last_notice(&session), "Replace error: Invalid regex");

        assert!(matches!(
            session.replace_all("", "x", SearchOptions::default()),
            Err(NotepadError::EmptyPattern)
        ));
    }

    #[test]
    fn test_replace_current_selection() {
        let mut session = open();
        session.edit("hello world".to_string());
        session.search("world", SearchOptions::default()).unwrap();

        assert!(session.replace_current("there"));
        assert_eq!(session.active_document().unwrap().content, "hello there");
        assert_eq!(session.editor().content, "hello there");
    }

    #[test]
    fn test_replace_current_falls_back_to_match() {
        let mut session = open();
        session.edit("one two one".to_string());
        session.search("one", SearchOptions::default()).unwrap();
        session.find_next();
        session.editor_mut().selection = None;

        assert!(session.replace_current("1"));
        assert_eq!(session.active_document().unwrap().content, "one two 1");
        assert!(session.search_state().matches().is_empty());
    }

    #[test]
    fn test_replace_current_without_selection() {
        let mut session = open();
        session.edit("hello".to_string());
        session.editor_mut().selection = None;
        assert!(!session.replace_current("x"));

        session.editor_mut().selection = Some(2..99);
        assert!(!session.replace_current("x"));
        assert_eq!(session.active_document().unwrap().content, "hello");
    }

    #[test]
    fn test_settings_operations_persist() {
        let mut session = open();
        assert_eq!(session.cycle_theme(), Theme::Dark);
        assert!(session.toggle_focus_mode());
        assert_eq!(last_notice(&session), "Focus mode enabled");
        session.set_line_height(2.0);

        let json = session.storage().get(SETTINGS_KEY).unwrap().unwrap();
        let stored: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(stored.theme, Theme::Dark);
        assert!(stored.focus_mode);
        assert_eq!(stored.line_height, 2.0);
    }

    #[test]
    fn test_auto_save_ticks() {
        let mut session = open();
        let start = Instant::now();
        assert!(!session.tick(start));
        assert!(session.tick(start + AUTO_SAVE_INTERVAL * 2));
        assert!(!session.tick(start + AUTO_SAVE_INTERVAL * 2));
        assert!(session.storage().get(SETTINGS_KEY).unwrap().is_some());

        session.set_auto_save(false);
        assert!(!session.tick(start + AUTO_SAVE_INTERVAL * 10));
    }

    #[test]
    fn test_persistence_failure_is_not_fatal() {
        let mut session = Session::open(FullStore::default(), FakeEditor::default(), FakeTabs::default());
        assert_eq!(session.status(), SaveStatus::Error);

        session.edit("still editable".to_string());
        assert_eq!(session.active_document().unwrap().content, "still editable");
        assert_eq!(session.status(), SaveStatus::Error);

        session.save();
        assert_eq!(session.editor().notices.last().unwrap(), "Error saving document");
    }

    #[test]
    fn test_export_active_document() {
        let dir = tempdir().unwrap();
        let mut session = open();
        session.edit("# Export me".to_string());

        let path = dir.path().join("out.md");
        session.export(ExportFormat::Markdown, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Export me");
        assert_eq!(last_notice(&session), "Markdown exported successfully!");
    }

    #[test]
    fn test_text_stats() {
        assert_eq!(text_stats(""), TextStats::default());
        assert_eq!(text_stats("  one\ttwo\n three  "), TextStats { words: 3, characters: 18 });
        assert_eq!(text_stats("héllo").characters, 5);
    }
}
