use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use super::{generate_id, position, DraftStore, Record};
use crate::error::StoreError;

/// Write-through store persisted as a JSON array in `<data_dir>/<key>.json`.
///
/// Opening never fails: an unreadable or corrupt file yields an empty store
/// and the problem is kept in [`last_error`](Self::last_error) for the UI.
/// Writes are transactional in memory: if the file write fails, the change
/// is rolled back before the error is returned.
pub struct JsonFileStore<R> {
    path: PathBuf,
    records: Vec<R>,
    last_error: Option<String>,
}

impl<R: Record> JsonFileStore<R> {
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(format!("{}.json", R::STORAGE_KEY));
        let (records, error) = Self::load_from_file(&path);
        if let Some(ref e) = error {
            warn!(path = %path.display(), "starting with empty store: {}", e);
        }
        Self {
            path,
            records,
            last_error: error.map(|e| e.to_string()),
        }
    }

    fn load_from_file(path: &Path) -> (Vec<R>, Option<StoreError>) {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(records) => (records, None),
                Err(source) => (
                    Vec::new(),
                    Some(StoreError::Parse {
                        path: path.to_path_buf(),
                        source,
                    }),
                ),
            },
            // File doesn't exist yet - that's fine, not an error
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (Vec::new(), None),
            Err(source) => (
                Vec::new(),
                Some(StoreError::Read {
                    path: path.to_path_buf(),
                    source,
                }),
            ),
        }
    }

    fn save_to_file(&mut self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, json).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        self.last_error = None;
        Ok(())
    }

    fn persist_or<F: FnOnce(&mut Vec<R>)>(&mut self, rollback: F) -> Result<(), StoreError> {
        if let Err(e) = self.save_to_file() {
            rollback(&mut self.records);
            self.last_error = Some(e.to_string());
            return Err(e);
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last load or write problem, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl<R: Record> DraftStore<R> for JsonFileStore<R> {
    fn save(&mut self, mut record: R) -> Result<String, StoreError> {
        let id = generate_id(R::ID_PREFIX, Utc::now(), |id| {
            position(&self.records, id).is_some()
        });
        record.set_id(id.clone());
        self.records.push(record);
        self.persist_or(|records| {
            records.pop();
        })?;
        debug!(%id, key = R::STORAGE_KEY, "saved record");
        Ok(id)
    }

    fn update(&mut self, id: &str, patch: R::Patch) -> Result<Option<R>, StoreError> {
        let Some(idx) = position(&self.records, id) else {
            return Ok(None);
        };
        let original = self.records[idx].clone();
        self.records[idx].apply(patch, Utc::now());
        self.persist_or(|records| records[idx] = original)?;
        Ok(Some(self.records[idx].clone()))
    }

    fn get(&self, id: &str) -> Option<R> {
        position(&self.records, id).map(|idx| self.records[idx].clone())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let Some(idx) = position(&self.records, id) else {
            return Ok(false);
        };
        let removed = self.records.remove(idx);
        self.persist_or(|records| records.insert(idx, removed))?;
        debug!(%id, key = R::STORAGE_KEY, "deleted record");
        Ok(true)
    }

    fn list(&self) -> Vec<R> {
        self.records.clone()
    }
}
