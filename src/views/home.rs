//! Home page: the most recent posts

use async_trait::async_trait;
use indexmap::IndexSet;

use super::PageLoader;
use crate::content::{ContentError, ContentSource, ListFilter, PostId, PostSummary, SortOrder};

/// Shown on home cards that have no excerpt
pub const HOME_EXCERPT_FALLBACK: &str = "Read more...";

pub struct HomeLoader {
    prefix: String,
    limit: usize,
}

impl HomeLoader {
    pub fn new(prefix: &str, limit: usize) -> Self {
        Self {
            prefix: prefix.to_string(),
            limit,
        }
    }
}

#[async_trait]
impl PageLoader for HomeLoader {
    type Output = Vec<PostSummary>;

    async fn load(
        &self,
        source: &dyn ContentSource,
        _saved: &IndexSet<PostId>,
    ) -> Result<Option<Self::Output>, ContentError> {
        let filter = ListFilter::new(&self.prefix, SortOrder::Newest, self.limit);
        let posts = source.list_posts(&filter).await?;
        Ok((!posts.is_empty()).then_some(posts))
    }

    fn visible_ids(output: &Self::Output) -> Vec<PostId> {
        output.iter().map(|p| p.id.clone()).collect()
    }

    fn error_message(&self) -> &'static str {
        "Failed to load recent posts. Please try again."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::FakeSource;

    #[tokio::test]
    async fn test_home_lists_newest_first_up_to_limit() {
        let source = FakeSource::sample();
        let posts = HomeLoader::new("blog/", 2)
            .load(&source, &IndexSet::new())
            .await
            .unwrap()
            .unwrap();

        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
    }

    #[tokio::test]
    async fn test_home_without_posts_is_empty() {
        let source = FakeSource::new(Vec::new());
        let loaded = HomeLoader::new("blog/", 6).load(&source, &IndexSet::new()).await.unwrap();
        assert!(loaded.is_none());
    }
}
