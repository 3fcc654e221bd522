//! Content module - post models, content backends and body rendering

mod frontmatter;
pub mod local;
mod markdown;
mod post;
pub mod richtext;
pub mod storyblok;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use frontmatter::FrontMatter;
pub use local::LocalSource;
pub use markdown::MarkdownRenderer;
pub use post::{Contact, Education, Experience, PostBody, PostDetail, PostId, PostSummary, Profile};
pub use storyblok::StoryblokSource;

/// Errors raised by a content backend
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("content API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode content: {0}")]
    Decode(String),

    #[error("content I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("content source misconfigured: {0}")]
    Config(String),
}

/// Listing order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Title,
}

impl SortOrder {
    /// Parse a user-supplied sort key, falling back to newest first
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "oldest" => SortOrder::Oldest,
            "title" => SortOrder::Title,
            _ => SortOrder::Newest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::Title => "title",
        }
    }

    /// Sort a list of posts in place
    pub fn apply(&self, posts: &mut [PostSummary]) {
        match self {
            // Undated posts sink to the end in both date orders
            SortOrder::Newest => posts.sort_by(|a, b| match (a.published_at, b.published_at) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }),
            SortOrder::Oldest => posts.sort_by(|a, b| match (a.published_at, b.published_at) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }),
            SortOrder::Title => {
                posts.sort_by_key(|p| p.title.to_lowercase());
            }
        }
    }
}

/// Listing query
#[derive(Debug, Clone)]
pub struct ListFilter {
    /// Folder prefix, e.g. `blog/`
    pub path_prefix: String,
    pub sort: SortOrder,
    pub page_size: usize,
}

impl ListFilter {
    pub fn new(path_prefix: &str, sort: SortOrder, page_size: usize) -> Self {
        Self {
            path_prefix: path_prefix.to_string(),
            sort,
            page_size,
        }
    }
}

/// A headless content backend
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Look up one post by its slug; `Ok(None)` when it does not exist
    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<PostDetail>, ContentError>;

    async fn list_posts(&self, filter: &ListFilter) -> Result<Vec<PostSummary>, ContentError>;

    /// Batch lookup. Unknown ids are silently left out of the result.
    async fn get_posts_by_ids(&self, ids: &[PostId]) -> Result<Vec<PostSummary>, ContentError>;

    async fn get_profile(&self) -> Result<Profile, ContentError>;
}
