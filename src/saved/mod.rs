//! Saved posts registry
//!
//! The single place where "is this post saved" is read and changed. Every
//! page binds its save button to [`SavedRegistry::toggle`]; nothing else
//! writes the persisted id set.

use indexmap::IndexSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::content::PostId;
use crate::storage::PersistentIdSet;

/// Registry of saved post ids, backed by a [`PersistentIdSet`]
pub struct SavedRegistry {
    ids: Mutex<PersistentIdSet>,
}

impl SavedRegistry {
    pub fn new(ids: PersistentIdSet) -> Self {
        Self {
            ids: Mutex::new(ids),
        }
    }

    /// All saved ids, in the order they were saved
    pub fn query_all(&self) -> IndexSet<PostId> {
        self.lock().load().into_iter().collect()
    }

    pub fn is_saved(&self, id: &PostId) -> bool {
        self.lock().load().contains(id)
    }

    /// Save `id`. Returns false, without writing, if it was already saved
    /// or is blank.
    pub fn add(&self, id: &PostId) -> bool {
        if !id.is_valid() {
            return false;
        }
        let set = self.lock();
        let mut ids = set.load();
        if ids.contains(id) {
            return false;
        }

        ids.push(id.clone());
        set.store(&ids);
        tracing::debug!("Saved post {}", id);
        true
    }

    /// Unsave `id`. Returns false, without writing, if it was not saved.
    pub fn remove(&self, id: &PostId) -> bool {
        if !id.is_valid() {
            return false;
        }
        let set = self.lock();
        let mut ids = set.load();
        let before = ids.len();
        ids.retain(|saved| saved != id);
        if ids.len() == before {
            return false;
        }

        set.store(&ids);
        tracing::debug!("Unsaved post {}", id);
        true
    }

    /// Flip the saved state of `id` and return the new state
    /// (true = now saved). A blank id is never saved.
    pub fn toggle(&self, id: &PostId) -> bool {
        if !id.is_valid() {
            return false;
        }
        let set = self.lock();
        let mut ids = set.load();

        let now_saved = if let Some(pos) = ids.iter().position(|saved| saved == id) {
            ids.remove(pos);
            false
        } else {
            ids.push(id.clone());
            true
        };

        set.store(&ids);
        tracing::debug!("Toggled post {} (saved: {})", id, now_saved);
        now_saved
    }

    // Storage calls are synchronous, so the guard is never held across an
    // await point.
    fn lock(&self) -> MutexGuard<'_, PersistentIdSet> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
