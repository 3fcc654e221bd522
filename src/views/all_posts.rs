//! Archive page: search, tag filter, sort and pagination over all posts

use async_trait::async_trait;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::PageLoader;
use crate::content::{ContentError, ContentSource, ListFilter, PostId, PostSummary, SortOrder};
use crate::helpers::Pagination;

/// Shown on archive cards that have no excerpt
pub const ARCHIVE_EXCERPT_FALLBACK: &str = "Click to read more...";

/// Tag filter value meaning "every tag"
pub const ALL_TAGS: &str = "all";

/// Query string of the archive page, as typed by the visitor
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ArchiveQuery {
    pub page: Option<String>,
    pub q: Option<String>,
    pub tag: Option<String>,
    pub sort: Option<String>,
}

impl ArchiveQuery {
    /// Requested page; anything unparsable is page 1
    pub fn page(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
    }

    pub fn search(&self) -> &str {
        self.q.as_deref().map(str::trim).unwrap_or("")
    }

    /// Selected tag, `None` for all
    pub fn tag(&self) -> Option<&str> {
        self.tag
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case(ALL_TAGS))
    }

    pub fn sort(&self) -> SortOrder {
        self.sort.as_deref().map(SortOrder::parse).unwrap_or_default()
    }
}

/// One page of the archive
#[derive(Debug, Clone, Serialize)]
pub struct ArchivePage {
    pub posts: Vec<PostSummary>,
    pub pagination: Pagination,
    /// `all` followed by every tag in use
    pub categories: Vec<String>,
    /// Posts matching search and tag, across all pages
    pub results_count: usize,
    pub search: String,
    pub tag: String,
    pub sort: SortOrder,
}

pub struct AllPostsLoader {
    prefix: String,
    fetch_limit: usize,
    per_page: usize,
    query: ArchiveQuery,
}

impl AllPostsLoader {
    pub fn new(prefix: &str, fetch_limit: usize, per_page: usize, query: ArchiveQuery) -> Self {
        Self {
            prefix: prefix.to_string(),
            fetch_limit,
            per_page,
            query,
        }
    }

    fn matches(&self, post: &PostSummary) -> bool {
        let search = self.query.search().to_lowercase();
        let in_text = search.is_empty()
            || post.title.to_lowercase().contains(&search)
            || post
                .excerpt
                .as_deref()
                .is_some_and(|e| e.to_lowercase().contains(&search));

        let in_tag = match self.query.tag() {
            Some(tag) => post.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)),
            None => true,
        };

        in_text && in_tag
    }
}

/// `all` plus the distinct tags of `posts`, sorted case-insensitively
fn categories(posts: &[PostSummary]) -> Vec<String> {
    let mut tags: Vec<String> = posts
        .iter()
        .flat_map(|p| p.tags.iter())
        .map(|t| t.to_lowercase())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect();
    tags.sort();

    std::iter::once(ALL_TAGS.to_string()).chain(tags).collect()
}

#[async_trait]
impl PageLoader for AllPostsLoader {
    type Output = ArchivePage;

    async fn load(
        &self,
        source: &dyn ContentSource,
        _saved: &IndexSet<PostId>,
    ) -> Result<Option<Self::Output>, ContentError> {
        let filter = ListFilter::new(&self.prefix, SortOrder::Newest, self.fetch_limit);
        let all = source.list_posts(&filter).await?;
        if all.is_empty() {
            return Ok(None);
        }

        let mut matching: Vec<PostSummary> =
            all.iter().filter(|p| self.matches(p)).cloned().collect();
        let sort = self.query.sort();
        sort.apply(&mut matching);

        let pagination = Pagination::new(matching.len(), self.per_page, self.query.page());
        let posts = matching[pagination.range(matching.len())].to_vec();

        Ok(Some(ArchivePage {
            posts,
            results_count: matching.len(),
            pagination,
            categories: categories(&all),
            search: self.query.search().to_string(),
            tag: self.query.tag().unwrap_or(ALL_TAGS).to_lowercase(),
            sort,
        }))
    }

    fn visible_ids(output: &Self::Output) -> Vec<PostId> {
        output.posts.iter().map(|p| p.id.clone()).collect()
    }

    fn error_message(&self) -> &'static str {
        "Failed to load posts. Please try again."
    }
}
