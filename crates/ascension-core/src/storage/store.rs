//! Document stores.
//!
//! A store hands out whole [`Document`]s and takes them back. Reads are total:
//! a missing, unreadable or malformed file is an empty document. Writes go to
//! a temporary sibling, are synced, then renamed over the canonical path, so
//! a crash leaves either the old or the new document on disk.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs2::FileExt;
use uuid::Uuid;

use super::document::Document;
use crate::error::StoreError;

/// Load/save access to the persisted document.
pub trait DocumentStore: Send + Sync {
    /// Read the whole document. Never fails.
    fn load(&self) -> Document;

    /// Replace the whole document.
    fn save(&self, doc: &Document) -> Result<(), StoreError>;

    /// Take the cross-process lock guarding a read-modify-write span.
    ///
    /// Stores without one return `None`.
    fn lock(&self) -> Result<Option<StoreLock>, StoreError> {
        Ok(None)
    }
}

/// Held advisory lock; released on drop.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::debug!(error = %e, "failed to release store lock");
        }
    }
}

/// JSON document on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling lock file, e.g. `database.json.lock`.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "database.json".into());
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("database.json");
        self.parent_dir()
            .join(format!(".{}.tmp.{}", file_name, Uuid::new_v4()))
    }

    fn write_atomic(&self, data: &[u8]) -> io::Result<()> {
        let parent = self.parent_dir();
        fs::create_dir_all(&parent)?;

        let temp = self.temp_path();
        let result = (|| {
            let mut file = File::create(&temp)?;
            file.write_all(data)?;
            file.sync_all()?;
            drop(file);
            fs::rename(&temp, &self.path)
        })();
        if result.is_err() {
            let _ = fs::remove_file(&temp);
        }
        result?;

        fsync_dir(&parent)
    }
}

#[cfg(unix)]
fn fsync_dir(path: &Path) -> io::Result<()> {
    File::open(path)?.sync_all()
}

#[cfg(not(unix))]
fn fsync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

impl DocumentStore for JsonFileStore {
    fn load(&self) -> Document {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no document yet");
                return Document::default();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "unreadable document, starting empty");
                return Document::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "malformed document, starting empty");
                Document::default()
            }
        }
    }

    fn save(&self, doc: &Document) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(doc)?;
        self.write_atomic(&data).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), users = doc.users.len(), "document saved");
        Ok(())
    }

    fn lock(&self) -> Result<Option<StoreLock>, StoreError> {
        let path = self.lock_path();
        let lock_err = |source| StoreError::Lock {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(self.parent_dir()).map_err(lock_err)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(lock_err)?;
        // Blocks until any other process finishes its transaction.
        file.lock_exclusive().map_err(lock_err)?;
        Ok(Some(StoreLock { file }))
    }
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Mutex<Document>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(doc: Document) -> Self {
        Self {
            doc: Mutex::new(doc),
        }
    }

    /// Copy of the current document.
    pub fn snapshot(&self) -> Document {
        self.load()
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self) -> Document {
        match self.doc.lock() {
            Ok(doc) => doc.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn save(&self, doc: &Document) -> Result<(), StoreError> {
        let mut guard = self.doc.lock().map_err(|_| StoreError::Poisoned)?;
        *guard = doc.clone();
        Ok(())
    }
}
