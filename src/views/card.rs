//! Post card view model shared by the list pages

use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::{PostId, PostSummary};
use crate::helpers::{date_xml, display_date, post_url};

use super::SavedFlags;

/// Everything a template needs to draw one post card
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub id: PostId,
    pub slug: String,
    pub url: String,
    pub title: String,
    pub excerpt: String,
    pub date: String,
    pub date_iso: Option<String>,
    pub image_url: Option<String>,
    pub image_alt: String,
    pub tags: Vec<String>,
    pub saved: bool,
}

impl PostCard {
    /// Build a card; `excerpt_fallback` replaces a missing excerpt
    pub fn new(
        post: &PostSummary,
        saved: bool,
        config: &SiteConfig,
        excerpt_fallback: &str,
    ) -> Self {
        Self {
            id: post.id.clone(),
            slug: post.slug.clone(),
            url: post_url(config, &post.slug),
            title: post.title.clone(),
            excerpt: post
                .excerpt
                .clone()
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| excerpt_fallback.to_string()),
            date: display_date(post.published_at.as_ref()),
            date_iso: post.published_at.as_ref().map(date_xml),
            image_url: post.image_url.clone(),
            image_alt: post.image_alt.clone().unwrap_or_else(|| post.title.clone()),
            tags: post.tags.clone(),
            saved,
        }
    }

    /// Cards for a list of posts, flags taken from a binder
    pub fn list(
        posts: &[PostSummary],
        flags: &SavedFlags,
        config: &SiteConfig,
        excerpt_fallback: &str,
    ) -> Vec<Self> {
        posts
            .iter()
            .map(|post| Self::new(post, flags.get(&post.id), config, excerpt_fallback))
            .collect()
    }
}
