//! List posts from the content backend

use anyhow::Result;
use std::io::Write;

use crate::content::{ContentSource, ListFilter, PostSummary, SortOrder};
use crate::saved::SavedRegistry;
use crate::Storyfront;

/// Print posts, marking saved ones with `*`
pub async fn run(site: &Storyfront, sort: SortOrder, limit: Option<usize>) -> Result<()> {
    let source = site.content_source()?;
    let registry = site.registry(false);

    write_posts(
        &mut std::io::stdout(),
        source.as_ref(),
        &registry,
        &site.config.cms.posts_prefix,
        sort,
        limit,
    )
    .await
}

async fn write_posts<W: Write>(
    out: &mut W,
    source: &dyn ContentSource,
    registry: &SavedRegistry,
    prefix: &str,
    sort: SortOrder,
    limit: Option<usize>,
) -> Result<()> {
    let page_size = limit.unwrap_or(100);
    let posts = source
        .list_posts(&ListFilter::new(prefix, sort, page_size))
        .await?;
    let saved = registry.query_all();

    writeln!(out, "Posts ({}):", posts.len())?;
    for post in &posts {
        let mark = if saved.contains(&post.id) { '*' } else { ' ' };
        writeln!(out, "{} {}", mark, format_post(post))?;
    }

    Ok(())
}

/// One line per post: date, title, slug and id
pub fn format_post(post: &PostSummary) -> String {
    let date = post
        .published_at
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".to_string());
    format!("{} - {} [{}] (id {})", date, post.title, post.full_slug, post.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::FakeSource;
    use crate::content::PostId;
    use crate::views::tests::registry;

    #[tokio::test]
    async fn test_lists_posts_with_saved_marker() {
        let source = FakeSource::sample();
        let registry = registry(&["2"]);
        let mut out = Vec::new();

        write_posts(&mut out, &source, &registry, "blog/", SortOrder::Oldest, Some(2))
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Posts (2):");
        assert_eq!(lines[1], "  2024-01-01 - First post [blog/first-post] (id 1)");
        assert_eq!(lines[2], "* 2024-01-02 - Second post [blog/second-post] (id 2)");
        assert!(registry.is_saved(&PostId::from("2")));
    }

    #[test]
    fn test_format_undated_post() {
        let post = PostSummary::new("9", "draft", "Draft");
        assert_eq!(format_post(&post), "---------- - Draft [draft] (id 9)");
    }
}
