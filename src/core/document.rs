//! Documents and the ordered document store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{NotepadError, Result};
use super::storage::{KeyValueStore, DOCUMENTS_KEY};

/// Document identifier, assigned monotonically and never reused
pub type DocumentId = u64;

/// Title given to documents without a usable first line
pub const UNTITLED: &str = "Untitled";

/// Longest title kept before it is cut and given an ellipsis
const MAX_TITLE_CHARS: usize = 30;

const WELCOME_TITLE: &str = "Welcome to Minimalist Notepad";

const WELCOME_CONTENT: &str = r#"# Welcome to Minimalist Notepad

Start typing your markdown here...

## Features

- **Markdown** support with live preview
- **LaTeX** math: $E = mc^2$
- **Code blocks** with syntax highlighting
- **Typewriter sounds** (toggle in toolbar)
- **Export** to HTML or plain text
- **Search & Replace** with regex support
- **Multiple themes** (light, dark, sepia)
- **Focus mode** and **Typewriter mode**

```rust
println!("Hello, World!");
```

$$\int_0^\infty e^{-x^2} dx = \frac{\sqrt{\pi}}{2}$$"#;

/// A markdown document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    /// Display title, derived from the first line on every edit
    pub title: String,
    pub content: String,
    pub last_modified: DateTime<Utc>,
}

impl Document {
    fn new(id: DocumentId, title: &str, content: &str) -> Self {
        let title = if title.is_empty() { UNTITLED } else { title };
        Self {
            id,
            title: title.to_string(),
            content: content.to_string(),
            last_modified: Utc::now(),
        }
    }

    /// Replace the content and re-derive the title
    fn set_content(&mut self, content: String) {
        self.title = derive_title(&content);
        self.content = content;
        self.last_modified = Utc::now();
    }
}

/// Derive a tab title from the first line of `content`.
///
/// Leading `#` heading markers and surrounding whitespace are stripped. An
/// empty result gives [`UNTITLED`]; anything longer than 30 characters is cut
/// and suffixed with `...`.
pub fn derive_title(content: &str) -> String {
    let first_line = content.split('\n').next().unwrap_or_default();
    let heading = first_line.trim_start_matches('#').trim();

    if heading.is_empty() {
        return UNTITLED.to_string();
    }

    match heading.char_indices().nth(MAX_TITLE_CHARS) {
        Some((cut, _)) => format!("{}...", &heading[..cut]),
        None => heading.to_string(),
    }
}

/// Ordered in-memory collection of documents
#[derive(Debug, Clone)]
pub struct DocumentStore {
    documents: Vec<Document>,
    next_id: DocumentId,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self {
            documents: Vec::new(),
            next_id: 1,
        }
    }
}

impl DocumentStore {
    /// Build a store from an existing collection, continuing its id sequence
    pub fn from_documents(documents: Vec<Document>) -> Self {
        let next_id = documents.iter().map(|d| d.id).max().map_or(1, |max| max + 1);
        Self { documents, next_id }
    }

    /// Load the collection from storage.
    ///
    /// Returns the store and whether it had to be seeded with the welcome
    /// document. Unreadable or malformed data is logged and treated as empty.
    pub fn load(storage: &dyn KeyValueStore) -> (Self, bool) {
        let documents = match storage.get(DOCUMENTS_KEY) {
            Ok(Some(json)) => serde_json::from_str::<Vec<Document>>(&json).unwrap_or_else(|e| {
                tracing::error!("Error loading documents: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::error!("Error reading documents: {}", e);
                Vec::new()
            }
        };

        let mut store = Self::from_documents(documents);
        let seeded = store.is_empty();
        if seeded {
            store.create(Some(WELCOME_TITLE), Some(WELCOME_CONTENT));
        }
        tracing::info!("Loaded {} document(s)", store.len());
        (store, seeded)
    }

    /// Write the full collection to storage
    pub fn save(&self, storage: &mut dyn KeyValueStore) -> Result<()> {
        let json = serde_json::to_string(&self.documents)?;
        storage.set(DOCUMENTS_KEY, &json)
    }

    /// Append a new document and return a copy of it
    pub fn create(&mut self, title: Option<&str>, content: Option<&str>) -> Document {
        let id = self.next_id;
        self.next_id += 1;

        let doc = Document::new(id, title.unwrap_or(UNTITLED), content.unwrap_or_default());
        self.documents.push(doc.clone());
        doc
    }

    /// Replace a document's content. Unknown ids are ignored and return `false`.
    pub fn update(&mut self, id: DocumentId, content: impl Into<String>) -> bool {
        match self.documents.iter_mut().find(|d| d.id == id) {
            Some(doc) => {
                doc.set_content(content.into());
                true
            }
            None => false,
        }
    }

    /// Remove a document and return the id that should become active if the
    /// removed one was: the document just before it, or the new first one.
    pub fn delete(&mut self, id: DocumentId) -> Result<DocumentId> {
        if self.documents.len() <= 1 {
            return Err(NotepadError::LastDocument);
        }

        let index = self
            .position(id)
            .ok_or(NotepadError::NotFound(id))?;
        self.documents.remove(index);

        Ok(self.documents[index.saturating_sub(1)].id)
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: DocumentId) -> bool {
        self.position(id).is_some()
    }

    /// Documents in insertion order
    pub fn list(&self) -> &[Document] {
        &self.documents
    }

    pub fn first(&self) -> Option<&Document> {
        self.documents.first()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn position(&self, id: DocumentId) -> Option<usize> {
        self.documents.iter().position(|d| d.id == id)
    }
}
