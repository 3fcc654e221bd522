//! Single post page

use async_trait::async_trait;
use indexmap::IndexSet;
use serde::Serialize;
use std::sync::Arc;

use super::PageLoader;
use crate::content::{ContentError, ContentSource, MarkdownRenderer, PostId, PostSummary};

/// A post ready to display, body already rendered to HTML
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub post: PostSummary,
    pub html: String,
}

pub struct PostLoader {
    slug: String,
    renderer: Arc<MarkdownRenderer>,
}

impl PostLoader {
    pub fn new(slug: &str, renderer: Arc<MarkdownRenderer>) -> Self {
        Self {
            slug: slug.to_string(),
            renderer,
        }
    }
}

#[async_trait]
impl PageLoader for PostLoader {
    type Output = PostPage;

    async fn load(
        &self,
        source: &dyn ContentSource,
        _saved: &IndexSet<PostId>,
    ) -> Result<Option<Self::Output>, ContentError> {
        let detail = source
            .get_post_by_slug(&self.slug)
            .await?
            .ok_or_else(|| ContentError::NotFound(format!("post {}", self.slug)))?;

        let html = self
            .renderer
            .render_body(&detail.body)
            .map_err(|e| ContentError::Decode(format!("post {}: {}", self.slug, e)))?;

        Ok(Some(PostPage {
            post: detail.summary,
            html,
        }))
    }

    fn visible_ids(output: &Self::Output) -> Vec<PostId> {
        vec![output.post.id.clone()]
    }

    fn error_message(&self) -> &'static str {
        "Failed to load this post. Please try again."
    }
}
