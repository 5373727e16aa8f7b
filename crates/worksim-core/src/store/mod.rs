//! Local persistence for user-authored documents and email drafts.
//!
//! Components receive a [`DraftStore`] rather than touching files directly,
//! so tests and ephemeral sessions can substitute [`MemoryStore`] for the
//! file-backed [`JsonFileStore`]. Stores have no locking: two processes
//! writing the same file race and the last write wins.

pub mod demo_flags;
pub mod json_store;
pub mod memory_store;
pub mod outbox;

pub use demo_flags::{DemoFlagStore, DemoFlags};
pub use json_store::JsonFileStore;
pub use memory_store::MemoryStore;
pub use outbox::send_draft;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// A record kept in a [`DraftStore`]
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Partial update accepted by [`DraftStore::update`]
    type Patch;
    /// Storage key; the file-backed store writes `<key>.json`
    const STORAGE_KEY: &'static str;
    const ID_PREFIX: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn apply(&mut self, patch: Self::Patch, now: DateTime<Utc>);
}

/// Repository interface over one kind of record. Misses are `None`/`false`;
/// errors only report storage failures.
pub trait DraftStore<R: Record> {
    /// Persist a new record under a freshly generated id and return the id.
    /// Every other field is stored exactly as given.
    fn save(&mut self, record: R) -> Result<String, StoreError>;

    fn update(&mut self, id: &str, patch: R::Patch) -> Result<Option<R>, StoreError>;

    fn get(&self, id: &str) -> Option<R>;

    /// Returns true if a record was removed
    fn delete(&mut self, id: &str) -> Result<bool, StoreError>;

    /// All records in insertion order
    fn list(&self) -> Vec<R>;
}

/// Timestamp-based id (`<prefix>-<unix millis>`), bumped until it is free
pub(crate) fn generate_id(prefix: &str, now: DateTime<Utc>, taken: impl Fn(&str) -> bool) -> String {
    let mut millis = now.timestamp_millis();
    loop {
        let id = format!("{}-{}", prefix, millis);
        if !taken(&id) {
            return id;
        }
        millis += 1;
    }
}

pub(crate) fn position<R: Record>(records: &[R], id: &str) -> Option<usize> {
    records.iter().position(|r| r.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_id_skips_taken_ids() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(generate_id("doc", now, |_| false), "doc-1700000000000");

        let taken = ["doc-1700000000000", "doc-1700000000001"];
        assert_eq!(
            generate_id("doc", now, |id| taken.contains(&id)),
            "doc-1700000000002"
        );
    }
}
