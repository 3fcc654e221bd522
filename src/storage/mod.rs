//! Client-local storage
//!
//! A tiny key-value layer in the spirit of browser `localStorage`: string
//! keys map to string values. The saved-posts list lives under a single key
//! of this store (see [`PersistentIdSet`]).

mod file;
mod id_set;
mod memory;

use std::sync::Arc;

pub use file::FileStore;
pub use id_set::PersistentIdSet;
pub use memory::MemoryStore;

/// Errors raised by a [`KeyValueStore`] backend
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed storage file: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// String key-value storage
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}
