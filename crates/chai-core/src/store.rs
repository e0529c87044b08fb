//! File-backed task store.
//!
//! One JSON record per line, with a header comment identifying the
//! format. Saves go through a temp file followed by an atomic rename, so
//! a crash mid-write leaves the previous file intact. Concurrent writers
//! resolve last-writer-wins; there is no locking.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::model::todo::TodoItem;

/// The store file name inside the space directory.
pub const STORE_FILENAME: &str = "todos.jsonl";

/// The header line written at the start of new store files.
pub const STORE_HEADER: &str = "# chai todo store v1";

/// Errors from the persistence boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record line failed to parse.
    #[error("corrupt store {path} at line {line}: {source}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A record failed to serialize before writing.
    #[error("failed to serialize task {id}: {source}")]
    Serialize {
        id: u64,
        #[source]
        source: serde_json::Error,
    },

    /// The temp-write or rename step failed; the previous file is intact.
    #[error("failed to persist {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Durable mapping from task identity to [`TodoItem`].
///
/// `load` and `save` are the only I/O boundary; everything above works on
/// the in-memory collection.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store rooted at the conventional file inside a space directory.
    #[must_use]
    pub fn in_space(space_dir: &Path) -> Self {
        Self::new(space_dir.join(STORE_FILENAME))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full collection. A missing file is an empty collection.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if the file cannot be read,
    /// [`StoreError::Corrupt`] if a record line fails to parse.
    pub fn load(&self) -> Result<Vec<TodoItem>, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "store file absent; empty collection");
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let reader = BufReader::new(file);

        let mut items = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;
            let record = line.trim();
            if record.is_empty() || record.starts_with('#') {
                continue;
            }
            let item = serde_json::from_str(record).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                line: idx + 1,
                source,
            })?;
            items.push(item);
        }

        debug!(count = items.len(), "store loaded");
        Ok(items)
    }

    /// Atomically persist the full collection.
    ///
    /// Writes everything to `<file>.tmp`, then renames over the live
    /// file. Creates the parent directory on demand.
    ///
    /// # Errors
    ///
    /// [`StoreError::Serialize`] if a record fails to encode,
    /// [`StoreError::WriteFailed`] if the temp write or rename fails.
    pub fn save(&self, items: &[TodoItem]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::WriteFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut body = String::with_capacity(items.len() * 128);
        body.push_str(STORE_HEADER);
        body.push('\n');
        for item in items {
            let line =
                serde_json::to_string(item).map_err(|source| StoreError::Serialize {
                    id: item.id,
                    source,
                })?;
            body.push_str(&line);
            body.push('\n');
        }

        let tmp = self.path.with_extension("jsonl.tmp");
        fs::write(&tmp, body).map_err(|source| StoreError::WriteFailed {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::WriteFailed {
            path: self.path.clone(),
            source,
        })?;

        debug!(count = items.len(), path = %self.path.display(), "store saved");
        Ok(())
    }
}
