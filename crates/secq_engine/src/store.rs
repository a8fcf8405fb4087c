use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use secq_logging::{secq_debug, secq_info};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::ResultRecord;

/// Key holding the most recent completed analysis.
pub const RESULTS_KEY: &str = "analysisResults";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store directory missing or not writable: {0}")]
    Dir(String),
    #[error("invalid store key {0:?}")]
    InvalidKey(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed stored value: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ensure the store directory exists; create if missing.
pub fn ensure_store_dir(dir: &Path) -> Result<(), StoreError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| StoreError::Dir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(StoreError::Dir(format!("{} is not a directory", dir.display())));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| StoreError::Dir(e.to_string()))?;
    }
    Ok(())
}

/// String key/value slots kept as `<key>.json` files in one directory.
///
/// Writes go through a temp file and a rename, so readers see either the old
/// or the new value. There is no locking: the last writer wins.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let target = self.slot_path(key)?;
        ensure_store_dir(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| StoreError::Io(e.error))?;
        secq_debug!("Stored {} ({} bytes)", key, value.len());
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

/// The persisted results slot, stored as a JSON array under [`RESULTS_KEY`].
#[derive(Debug, Clone)]
pub struct ResultsStore {
    store: LocalStore,
}

impl ResultsStore {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(LocalStore::new(dir))
    }

    /// Replaces the stored results wholesale.
    pub fn save(&self, results: &[ResultRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string(results)?;
        self.store.set_item(RESULTS_KEY, &json)?;
        secq_info!("Persisted {} analysis results", results.len());
        Ok(())
    }

    /// `Ok(None)` when nothing is stored; an error when the entry is unreadable.
    pub fn load(&self) -> Result<Option<Vec<ResultRecord>>, StoreError> {
        match self.store.get_item(RESULTS_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove_item(RESULTS_KEY)?;
        secq_info!("Cleared stored analysis results");
        Ok(())
    }
}
