//! Local content source - posts and profile read from a markdown tree
//!
//! Layout under the content directory:
//!
//! ```text
//! content/
//!   blog/            <- posts prefix, one markdown file per post
//!     hello-world.md
//!   profile.yml      <- profile slug + ".yml"
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{
    ContentError, ContentSource, FrontMatter, ListFilter, MarkdownRenderer, PostBody, PostDetail,
    PostId, PostSummary, Profile,
};
use crate::config::CmsConfig;
use crate::helpers::{excerpt, parse_date};

/// Reads posts from markdown files with YAML front-matter
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
    posts_prefix: String,
    profile_slug: String,
    excerpt_length: usize,
}

impl LocalSource {
    pub fn new<P: AsRef<Path>>(root: P, config: &CmsConfig, excerpt_length: usize) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            posts_prefix: config.posts_prefix.clone(),
            profile_slug: config.profile_slug.clone(),
            excerpt_length,
        }
    }

    /// Load every published post under `prefix`, newest first
    async fn load(&self, prefix: &str) -> Result<Vec<PostDetail>, ContentError> {
        let root = self.root.clone();
        let prefix = prefix.to_string();
        let excerpt_length = self.excerpt_length;

        tokio::task::spawn_blocking(move || load_posts(&root, &prefix, excerpt_length))
            .await
            .map_err(|e| ContentError::Request(format!("content loader panicked: {}", e)))?
    }
}

#[async_trait]
impl ContentSource for LocalSource {
    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<PostDetail>, ContentError> {
        let posts = self.load(&self.posts_prefix).await?;
        Ok(posts.into_iter().find(|post| post.summary.slug == slug))
    }

    async fn list_posts(&self, filter: &ListFilter) -> Result<Vec<PostSummary>, ContentError> {
        let mut posts: Vec<PostSummary> = self
            .load(&filter.path_prefix)
            .await?
            .into_iter()
            .map(|post| post.summary)
            .collect();

        filter.sort.apply(&mut posts);
        posts.truncate(filter.page_size);
        Ok(posts)
    }

    async fn get_posts_by_ids(&self, ids: &[PostId]) -> Result<Vec<PostSummary>, ContentError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let posts = self.load(&self.posts_prefix).await?;
        Ok(posts
            .into_iter()
            .map(|post| post.summary)
            .filter(|summary| ids.contains(&summary.id))
            .collect())
    }

    async fn get_profile(&self) -> Result<Profile, ContentError> {
        let path = self.root.join(format!("{}.yml", self.profile_slug));
        if !path.exists() {
            return Err(ContentError::NotFound(format!("profile {:?}", path)));
        }

        let content = tokio::fs::read_to_string(&path).await?;
        serde_yaml::from_str(&content)
            .map_err(|e| ContentError::Decode(format!("{:?}: {}", path, e)))
    }
}

fn load_posts(root: &Path, prefix: &str, excerpt_length: usize) -> Result<Vec<PostDetail>, ContentError> {
    let prefix = normalize_prefix(prefix);
    let dir = root.join(&prefix);
    if !dir.is_dir() {
        tracing::debug!("No local posts under {:?}", dir);
        return Ok(Vec::new());
    }

    let mut posts = Vec::new();
    for entry in WalkDir::new(&dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || !is_markdown_file(path) {
            continue;
        }

        match load_post(path, &prefix, excerpt_length) {
            Ok(Some(post)) => posts.push(post),
            Ok(None) => tracing::debug!("Skipping unpublished post {:?}", path),
            Err(e) => tracing::warn!("Failed to load post {:?}: {}", path, e),
        }
    }

    posts.sort_by(|a, b| b.summary.published_at.cmp(&a.summary.published_at));
    Ok(posts)
}

fn load_post(path: &Path, prefix: &str, excerpt_length: usize) -> Result<Option<PostDetail>, ContentError> {
    let content = fs::read_to_string(path)?;
    let (fm, body) = FrontMatter::parse(&content);

    if !fm.published {
        return Ok(None);
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string();

    let slug = fm.slug.clone().unwrap_or_else(|| slug::slugify(&stem));
    let full_slug = format!("{}{}", prefix, slug);

    let published_at = fm
        .date
        .as_deref()
        .and_then(parse_date)
        .or_else(|| modified_time(path));

    let summary_excerpt = fm
        .excerpt
        .clone()
        .filter(|e| !e.trim().is_empty())
        .or_else(|| {
            let text = excerpt(&MarkdownRenderer::plain_text(body), excerpt_length);
            (!text.is_empty()).then_some(text)
        });

    let summary = PostSummary {
        id: fm
            .id
            .clone()
            .filter(PostId::is_valid)
            .unwrap_or_else(|| PostId::new(&full_slug)),
        slug,
        full_slug,
        title: fm.title.clone().unwrap_or(stem),
        excerpt: summary_excerpt,
        published_at,
        image_url: fm.image.clone().filter(|i| !i.is_empty()),
        image_alt: fm.image_alt.clone(),
        tags: fm.tags.clone(),
    };

    let body = if body.trim().is_empty() {
        PostBody::Empty
    } else {
        PostBody::Markdown(body.to_string())
    };

    Ok(Some(PostDetail { summary, body }))
}

/// `blog` and `/blog/` both become `blog/`; empty stays empty
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}

fn modified_time(path: &Path) -> Option<DateTime<Utc>> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
