//! Local key-value persistence for documents and settings

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;

use super::error::{NotepadError, Result};

/// Storage key holding the serialized document collection
pub const DOCUMENTS_KEY: &str = "notepad-documents";
/// Storage key holding the serialized settings record
pub const SETTINGS_KEY: &str = "notepad-settings";

/// A flat string-to-string store
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// File-backed store keeping one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store in the platform data directory
    pub fn in_data_dir() -> anyhow::Result<Self> {
        let dirs = ProjectDirs::from("com", "minipad", "Minipad")
            .context("Could not determine data directory")?;
        Ok(Self::new(dirs.data_dir()))
    }

    /// Directory the store writes into
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)?;

        // Write a sibling file, then rename it over the old value
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path).map_err(|e| {
            NotepadError::Persistence(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        tracing::debug!("Stored {} ({} bytes)", key, value.len());
        Ok(())
    }
}

/// In-memory store, used by tests and as a fallback when no data dir exists
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Either backend, picked at startup
#[derive(Debug, Clone)]
pub enum Storage {
    File(FileStore),
    Memory(MemoryStore),
}

impl Storage {
    /// Use the platform data directory, or memory when it cannot be resolved
    pub fn open_default() -> Self {
        match FileStore::in_data_dir() {
            Ok(store) => {
                tracing::info!("Using storage at: {}", store.root().display());
                Storage::File(store)
            }
            Err(e) => {
                tracing::warn!("{}; documents will not outlive this session", e);
                Storage::Memory(MemoryStore::new())
            }
        }
    }
}

impl KeyValueStore for Storage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            Storage::File(store) => store.get(key),
            Storage::Memory(store) => store.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match self {
            Storage::File(store) => store.set(key, value),
            Storage::Memory(store) => store.set(key, value),
        }
    }
}
