//! In-memory content source for tests

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use super::{
    ContentError, ContentSource, ListFilter, PostBody, PostDetail, PostId, PostSummary, Profile,
};

/// Content source backed by a fixed list of posts.
///
/// Counts calls per operation, can be switched to fail, and can be gated
/// so a call blocks until the test releases it.
#[derive(Default)]
pub struct FakeSource {
    pub posts: Vec<PostDetail>,
    pub profile: Option<Profile>,
    pub list_calls: AtomicUsize,
    pub batch_calls: AtomicUsize,
    pub slug_calls: AtomicUsize,
    pub fail: AtomicBool,
    gate: Option<Arc<Notify>>,
}

impl FakeSource {
    pub fn new(posts: Vec<PostDetail>) -> Self {
        Self {
            posts,
            ..Default::default()
        }
    }

    /// Three dated posts with ids 1, 2 and 3 (3 is newest)
    pub fn sample() -> Self {
        Self::new(vec![
            post("1", "first-post", "First post", 1),
            post("2", "second-post", "Second post", 2),
            post("3", "third-post", "Third post", 3),
        ])
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Make every call wait on the returned notifier
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<(), ContentError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ContentError::Request("connection refused".to_string()));
        }
        Ok(())
    }
}

/// A markdown post published on 2024-01-`day`
pub fn post(id: &str, slug: &str, title: &str, day: u32) -> PostDetail {
    let mut summary = PostSummary::new(id, slug, title);
    summary.full_slug = format!("blog/{}", slug);
    summary.published_at = Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).single();
    summary.excerpt = Some(format!("About {}", title.to_lowercase()));

    PostDetail {
        summary,
        body: PostBody::Markdown(format!("# {}\n\nBody of {}.", title, slug)),
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<PostDetail>, ContentError> {
        self.slug_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;
        Ok(self.posts.iter().find(|p| p.summary.slug == slug).cloned())
    }

    async fn list_posts(&self, filter: &ListFilter) -> Result<Vec<PostSummary>, ContentError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;

        let mut posts: Vec<PostSummary> = self
            .posts
            .iter()
            .filter(|p| p.summary.full_slug.starts_with(&filter.path_prefix))
            .map(|p| p.summary.clone())
            .collect();
        filter.sort.apply(&mut posts);
        posts.truncate(filter.page_size);
        Ok(posts)
    }

    async fn get_posts_by_ids(&self, ids: &[PostId]) -> Result<Vec<PostSummary>, ContentError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;

        Ok(self
            .posts
            .iter()
            .filter(|p| ids.contains(&p.summary.id))
            .map(|p| p.summary.clone())
            .collect())
    }

    async fn get_profile(&self) -> Result<Profile, ContentError> {
        self.enter().await?;
        self.profile
            .clone()
            .ok_or_else(|| ContentError::NotFound("profile".to_string()))
    }
}
