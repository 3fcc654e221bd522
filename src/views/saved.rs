//! Saved posts page

use async_trait::async_trait;
use indexmap::IndexSet;

use super::PageLoader;
use crate::content::{ContentError, ContentSource, PostId, PostSummary};

/// Shown instead of a list when nothing is saved
pub const NO_SAVED_POSTS: &str = "You haven't saved any posts yet.";

/// Loads details for every saved post with a single batch lookup.
///
/// Ids the backend no longer knows are left out of the page but stay in
/// the saved set.
pub struct SavedPostsLoader;

#[async_trait]
impl PageLoader for SavedPostsLoader {
    type Output = Vec<PostSummary>;

    async fn load(
        &self,
        source: &dyn ContentSource,
        saved: &IndexSet<PostId>,
    ) -> Result<Option<Self::Output>, ContentError> {
        if saved.is_empty() {
            return Ok(None);
        }

        let ids: Vec<PostId> = saved.iter().cloned().collect();
        let posts = source.get_posts_by_ids(&ids).await?;
        Ok((!posts.is_empty()).then_some(posts))
    }

    fn visible_ids(output: &Self::Output) -> Vec<PostId> {
        output.iter().map(|p| p.id.clone()).collect()
    }

    fn error_message(&self) -> &'static str {
        "Failed to load saved posts. Please try again."
    }
}
