use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::warn;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::store::NgramStore;

/// Cloneable handle to one store file.
///
/// Every input surface backed by the same file should hold a clone of the
/// same handle: readers share the lock, and `record_and_save` holds the write
/// lock across both the update and the file write, so two commits can never
/// interleave into a lost update.
#[derive(Clone)]
pub struct SharedNgramStore {
    inner: Arc<RwLock<NgramStore>>,
    path: Option<Arc<PathBuf>>,
}

impl SharedNgramStore {
    /// Loads `config.path` (empty on failure) and remembers it for saves.
    pub fn open(config: &StoreConfig) -> Self {
        let store = NgramStore::load(&config.path).max_word_len(config.max_word_len);
        Self {
            inner: Arc::new(RwLock::new(store)),
            path: Some(Arc::new(config.path.clone())),
        }
    }

    /// A store that is never written to disk.
    pub fn in_memory(store: NgramStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
            path: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(PathBuf::as_path)
    }

    /// Runs `f` under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&NgramStore) -> R) -> R {
        f(&self.inner.read())
    }

    /// Records `text` and, for file-backed stores, saves while still holding
    /// the write lock. The in-memory update is kept even if the save fails.
    pub fn record_and_save(&self, text: &str) -> Result<()> {
        self.record_and_save_at(text, Utc::now())
    }

    pub fn record_and_save_at(&self, text: &str, now: DateTime<Utc>) -> Result<()> {
        let mut store = self.inner.write();
        store.record_at(text, now);
        match &self.path {
            Some(path) => store.save(path.as_path()).inspect_err(|err| {
                warn!(path = %path.display(), error = %err, "ngram store save failed");
            }),
            None => Ok(()),
        }
    }
}
