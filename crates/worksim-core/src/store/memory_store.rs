use chrono::Utc;

use super::{generate_id, position, DraftStore, Record};
use crate::error::StoreError;

/// In-memory store for tests and sessions that should leave nothing behind
#[derive(Debug, Clone)]
pub struct MemoryStore<R> {
    records: Vec<R>,
}

impl<R> Default for MemoryStore<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<R: Record> MemoryStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R: Record> DraftStore<R> for MemoryStore<R> {
    fn save(&mut self, mut record: R) -> Result<String, StoreError> {
        let id = generate_id(R::ID_PREFIX, Utc::now(), |id| {
            position(&self.records, id).is_some()
        });
        record.set_id(id.clone());
        self.records.push(record);
        Ok(id)
    }

    fn update(&mut self, id: &str, patch: R::Patch) -> Result<Option<R>, StoreError> {
        Ok(position(&self.records, id).map(|idx| {
            self.records[idx].apply(patch, Utc::now());
            self.records[idx].clone()
        }))
    }

    fn get(&self, id: &str) -> Option<R> {
        position(&self.records, id).map(|idx| self.records[idx].clone())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        Ok(position(&self.records, id)
            .map(|idx| self.records.remove(idx))
            .is_some())
    }

    fn list(&self) -> Vec<R> {
        self.records.clone()
    }
}
