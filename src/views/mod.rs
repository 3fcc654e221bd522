//! Page binders.
//!
//! A binder loads one page worth of content, keeps a local copy of which
//! visible posts are saved, and forwards toggles to the [`SavedRegistry`].

mod all_posts;
mod card;
mod home;
mod post;
mod profile;
mod saved;

use async_trait::async_trait;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::content::{ContentError, ContentSource, PostId};
use crate::saved::SavedRegistry;

pub use all_posts::{AllPostsLoader, ArchivePage, ArchiveQuery, ALL_TAGS, ARCHIVE_EXCERPT_FALLBACK};
pub use card::PostCard;
pub use home::{HomeLoader, HOME_EXCERPT_FALLBACK};
pub use post::{PostLoader, PostPage};
pub use profile::{ContactLink, ProfileLoader, ProfilePage};
pub use saved::{SavedPostsLoader, NO_SAVED_POSTS};

/// Why a page could not be shown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewError {
    pub message: String,
    /// The requested item does not exist, as opposed to a backend failure
    pub not_found: bool,
}

impl ViewError {
    fn from_content(error: &ContentError, message: &str) -> Self {
        match error {
            ContentError::NotFound(_) => Self {
                message: "The requested content could not be found.".to_string(),
                not_found: true,
            },
            _ => Self {
                message: message.to_string(),
                not_found: false,
            },
        }
    }
}

/// Lifecycle of one page load
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum ViewState<T> {
    Loading,
    Error(ViewError),
    Empty,
    Ready(T),
}

impl<T> ViewState<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready(_))
    }
}

/// Local cache of "is post X saved" for the posts a view shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SavedFlags(IndexMap<PostId, bool>);

impl SavedFlags {
    /// Derive one flag per visible post from a registry snapshot
    pub fn derive<'a>(
        saved: &IndexSet<PostId>,
        visible: impl IntoIterator<Item = &'a PostId>,
    ) -> Self {
        Self(
            visible
                .into_iter()
                .map(|id| (id.clone(), saved.contains(id)))
                .collect(),
        )
    }

    pub fn get(&self, id: &PostId) -> bool {
        self.0.get(id).copied().unwrap_or(false)
    }

    pub fn set(&mut self, id: &PostId, saved: bool) {
        self.0.insert(id.clone(), saved);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Proof that a load was started; only the latest ticket may apply results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Monotonic load counter used to discard stale responses
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

impl Generation {
    /// Start a new load, invalidating every older ticket
    pub fn next(&self) -> Ticket {
        Ticket(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn invalidate(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.0.load(Ordering::SeqCst) == ticket.0
    }
}

/// Fetches the data behind one page
#[async_trait]
pub trait PageLoader: Send + Sync {
    type Output: Clone + Send + Sync;

    /// Load the page given a snapshot of the saved set.
    /// `Ok(None)` means there is nothing to show.
    async fn load(
        &self,
        source: &dyn ContentSource,
        saved: &IndexSet<PostId>,
    ) -> Result<Option<Self::Output>, ContentError>;

    /// Posts on the page that carry a save toggle
    fn visible_ids(output: &Self::Output) -> Vec<PostId>;

    /// Message shown when the content backend fails
    fn error_message(&self) -> &'static str {
        "Failed to load content. Please try again."
    }
}

/// Binds one page to the content source and the saved-posts registry
pub struct ViewBinder<L: PageLoader> {
    loader: L,
    source: Arc<dyn ContentSource>,
    registry: Arc<SavedRegistry>,
    generation: Generation,
    state: Mutex<ViewState<L::Output>>,
    flags: Mutex<SavedFlags>,
}

impl<L: PageLoader> ViewBinder<L> {
    pub fn new(loader: L, source: Arc<dyn ContentSource>, registry: Arc<SavedRegistry>) -> Self {
        Self {
            loader,
            source,
            registry,
            generation: Generation::default(),
            state: Mutex::new(ViewState::Loading),
            flags: Mutex::new(SavedFlags::default()),
        }
    }

    /// Load the page. Returns false when a newer mount or an unmount made
    /// this result stale, in which case nothing is applied.
    pub async fn mount(&self) -> bool {
        let ticket = self.generation.next();
        *lock(&self.state) = ViewState::Loading;

        let saved = self.registry.query_all();
        let result = self.loader.load(self.source.as_ref(), &saved).await;

        if !self.generation.is_current(ticket) {
            tracing::debug!("Discarding stale page load");
            return false;
        }

        let (state, flags) = match result {
            Ok(Some(output)) => {
                let visible = L::visible_ids(&output);
                (ViewState::Ready(output), SavedFlags::derive(&saved, &visible))
            }
            Ok(None) => (ViewState::Empty, SavedFlags::default()),
            Err(e) => {
                if !matches!(e, ContentError::NotFound(_)) {
                    tracing::error!("Content source failed: {}", e);
                }
                (
                    ViewState::Error(ViewError::from_content(&e, self.loader.error_message())),
                    SavedFlags::default(),
                )
            }
        };

        *lock(&self.flags) = flags;
        *lock(&self.state) = state;
        true
    }

    /// Detach the view; any load still in flight is discarded
    pub fn unmount(&self) {
        self.generation.invalidate();
    }

    /// Flip a post's saved state and update the local flag to match
    pub fn toggle(&self, id: &PostId) -> bool {
        let saved = self.registry.toggle(id);
        lock(&self.flags).set(id, saved);
        saved
    }

    pub fn state(&self) -> ViewState<L::Output> {
        lock(&self.state).clone()
    }

    pub fn flags(&self) -> SavedFlags {
        lock(&self.flags).clone()
    }

    pub fn is_saved(&self, id: &PostId) -> bool {
        lock(&self.flags).get(id)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
