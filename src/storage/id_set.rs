//! Persisted set of saved post ids

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::KeyValueStore;
use crate::content::PostId;

/// Current on-disk format version
const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    ids: &'a [PostId],
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    ids: Vec<PostId>,
}

/// Everything we know how to read back
#[derive(Deserialize)]
#[serde(untagged)]
enum Stored {
    Envelope(Envelope),
    /// Bare array written before the envelope existed
    Legacy(Vec<PostId>),
}

/// The saved-id list stored under one key of a [`KeyValueStore`].
///
/// Both operations fail soft: a missing, unreadable or corrupt value loads
/// as an empty list, and a failed write is dropped. Failures are logged and
/// never reach the caller.
pub struct PersistentIdSet {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl PersistentIdSet {
    pub fn new(store: impl KeyValueStore + 'static, key: impl Into<String>) -> Self {
        Self {
            store: Box::new(store),
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the stored ids, in insertion order and without duplicates
    pub fn load(&self) -> Vec<PostId> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Could not read saved posts ({}): {}", self.key, e);
                return Vec::new();
            }
        };

        match decode(&raw) {
            Ok(ids) => ids,
            Err(reason) => {
                tracing::warn!("Ignoring unreadable saved posts ({}): {}", self.key, reason);
                Vec::new()
            }
        }
    }

    /// Replace the stored ids
    pub fn store(&self, ids: &[PostId]) {
        let envelope = EnvelopeRef {
            version: FORMAT_VERSION,
            ids,
        };

        let raw = match serde_json::to_string(&envelope) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Could not encode saved posts: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.set(&self.key, &raw) {
            tracing::warn!("Could not write saved posts ({}): {}", self.key, e);
        }
    }
}

fn decode(raw: &str) -> Result<Vec<PostId>, String> {
    let stored: Stored = serde_json::from_str(raw).map_err(|e| e.to_string())?;

    let ids = match stored {
        Stored::Envelope(envelope) if envelope.version > FORMAT_VERSION => {
            return Err(format!(
                "format version {} is newer than supported version {}",
                envelope.version, FORMAT_VERSION
            ));
        }
        Stored::Envelope(envelope) => envelope.ids,
        Stored::Legacy(ids) => ids,
    };

    let unique: IndexSet<PostId> = ids.into_iter().filter(PostId::is_valid).collect();
    Ok(unique.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use std::sync::Arc;
    use tempfile::TempDir;

    const KEY: &str = "savedPostIds";

    fn ids(raw: &[&str]) -> Vec<PostId> {
        raw.iter().map(|id| PostId::from(*id)).collect()
    }

    #[test]
    fn test_absent_key_loads_empty() {
        let set = PersistentIdSet::new(MemoryStore::new(), KEY);
        assert!(set.load().is_empty());
    }

    #[test]
    fn test_store_then_load_from_fresh_instance() {
        let dir = TempDir::new().unwrap();
        PersistentIdSet::new(FileStore::in_dir(dir.path()), KEY).store(&ids(&["3", "1", "2"]));

        let reloaded = PersistentIdSet::new(FileStore::in_dir(dir.path()), KEY).load();
        let mut sorted = reloaded.clone();
        sorted.sort();
        assert_eq!(sorted, ids(&["1", "2", "3"]));
    }

    #[test]
    fn test_writes_versioned_envelope() {
        let store = Arc::new(MemoryStore::new());
        PersistentIdSet::new(store.clone(), KEY).store(&ids(&["42"]));

        let raw = store.get(KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["ids"], serde_json::json!(["42"]));
    }

    #[test]
    fn test_non_json_value_loads_empty() {
        let set = PersistentIdSet::new(MemoryStore::new().with_entry(KEY, "{oops"), KEY);
        assert!(set.load().is_empty());
    }

    #[test]
    fn test_wrong_shape_loads_empty() {
        let set = PersistentIdSet::new(MemoryStore::new().with_entry(KEY, r#"{"a": 1}"#), KEY);
        assert!(set.load().is_empty());
    }

    #[test]
    fn test_legacy_array_with_numbers_loads() {
        let set = PersistentIdSet::new(MemoryStore::new().with_entry(KEY, r#"[42, "7", 42]"#), KEY);
        assert_eq!(set.load(), ids(&["42", "7"]));
    }

    #[test]
    fn test_newer_version_loads_empty() {
        let raw = r#"{"version": 2, "ids": ["1"]}"#;
        let set = PersistentIdSet::new(MemoryStore::new().with_entry(KEY, raw), KEY);
        assert!(set.load().is_empty());
    }

    #[test]
    fn test_unavailable_storage_fails_soft() {
        let set = PersistentIdSet::new(MemoryStore::unavailable(), KEY);
        set.store(&ids(&["1"]));
        assert!(set.load().is_empty());
    }
}
