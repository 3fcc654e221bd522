//! Storyblok Content Delivery API (v2) client.
//!
//! Thin HTTP wrapper around `/cdn/stories`. Response parsing lives in the
//! pure `parse_*` functions so it can be tested without a network.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::{
    richtext, ContentError, ContentSource, ListFilter, PostBody, PostDetail, PostId, PostSummary,
    Profile, SortOrder,
};
use crate::config::CmsConfig;
use crate::helpers::{encode_segment, excerpt, parse_date};

/// Storyblok caps `per_page` at 100
const MAX_PER_PAGE: usize = 100;
const CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// CLIENT
// =============================================================================

pub struct StoryblokSource {
    http: reqwest::Client,
    api_url: String,
    token: String,
    version: String,
    posts_prefix: String,
    profile_slug: String,
    excerpt_length: usize,
}

impl StoryblokSource {
    pub fn new(config: &CmsConfig, excerpt_length: usize) -> Result<Self, ContentError> {
        let token = config.token.trim().to_string();
        if token.is_empty() {
            return Err(ContentError::Config(
                "a Storyblok access token is required (cms.token, --token or STORYBLOK_TOKEN)"
                    .to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ContentError::Config(e.to_string()))?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token,
            version: config.version.clone(),
            posts_prefix: config.posts_prefix.clone(),
            profile_slug: config.profile_slug.clone(),
            excerpt_length,
        })
    }

    /// GET a CDN path. `Ok(None)` on 404.
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Option<String>, ContentError> {
        let url = format!("{}/cdn/{}", self.api_url, path);
        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .query(&[("token", self.token.as_str()), ("version", self.version.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| ContentError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ContentError::Request(e.to_string()))?;

        if status == 404 {
            return Ok(None);
        }
        if !(200..300).contains(&status) {
            tracing::error!("Storyblok returned {} for {}", status, url);
            return Err(ContentError::Status { status, body: text });
        }

        Ok(Some(text))
    }

    fn story_path(slug: &str) -> String {
        let encoded: Vec<String> = slug.split('/').map(encode_segment).collect();
        format!("stories/{}", encoded.join("/"))
    }
}

#[async_trait]
impl ContentSource for StoryblokSource {
    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<PostDetail>, ContentError> {
        let full_slug = format!("{}{}", self.posts_prefix, slug.trim_matches('/'));
        match self.get(&Self::story_path(&full_slug), &[]).await? {
            Some(text) => parse_story(&text, self.excerpt_length).map(Some),
            None => Ok(None),
        }
    }

    async fn list_posts(&self, filter: &ListFilter) -> Result<Vec<PostSummary>, ContentError> {
        let query = [
            ("starts_with", filter.path_prefix.clone()),
            ("sort_by", sort_param(filter.sort).to_string()),
            ("per_page", filter.page_size.clamp(1, MAX_PER_PAGE).to_string()),
        ];

        let text = self.get("stories", &query).await?.unwrap_or_default();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let mut posts = parse_stories(&text, self.excerpt_length)?;
        posts.truncate(filter.page_size);
        Ok(posts)
    }

    async fn get_posts_by_ids(&self, ids: &[PostId]) -> Result<Vec<PostSummary>, ContentError> {
        let mut posts = Vec::new();

        for chunk in ids.chunks(MAX_PER_PAGE) {
            let by_ids = chunk
                .iter()
                .map(PostId::as_str)
                .collect::<Vec<_>>()
                .join(",");
            let query = [
                ("by_ids", by_ids),
                ("per_page", chunk.len().to_string()),
            ];

            if let Some(text) = self.get("stories", &query).await? {
                posts.extend(parse_stories(&text, self.excerpt_length)?);
            }
        }

        Ok(posts)
    }

    async fn get_profile(&self) -> Result<Profile, ContentError> {
        match self.get(&Self::story_path(&self.profile_slug), &[]).await? {
            Some(text) => parse_profile(&text),
            None => Err(ContentError::NotFound(format!("story {}", self.profile_slug))),
        }
    }
}

fn sort_param(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Newest => "first_published_at:desc",
        SortOrder::Oldest => "first_published_at:asc",
        SortOrder::Title => "name:asc",
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct StoryResponse {
    story: Story,
}

#[derive(Deserialize)]
struct StoriesResponse {
    #[serde(default)]
    stories: Vec<Story>,
}

#[derive(Deserialize)]
struct Story {
    id: PostId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    full_slug: String,
    first_published_at: Option<String>,
    published_at: Option<String>,
    #[serde(default)]
    tag_list: Vec<String>,
    #[serde(default)]
    content: Value,
}

// =============================================================================
// PARSING
// =============================================================================

/// Parse a single-story response into a full post
pub fn parse_story(json: &str, excerpt_length: usize) -> Result<PostDetail, ContentError> {
    let response: StoryResponse =
        serde_json::from_str(json).map_err(|e| ContentError::Decode(e.to_string()))?;
    Ok(story_to_detail(response.story, excerpt_length))
}

/// Parse a story listing into summaries, keeping the API's order
pub fn parse_stories(json: &str, excerpt_length: usize) -> Result<Vec<PostSummary>, ContentError> {
    let response: StoriesResponse =
        serde_json::from_str(json).map_err(|e| ContentError::Decode(e.to_string()))?;
    Ok(response
        .stories
        .into_iter()
        .map(|story| story_to_detail(story, excerpt_length).summary)
        .collect())
}

/// Parse the profile story
pub fn parse_profile(json: &str) -> Result<Profile, ContentError> {
    let response: StoryResponse =
        serde_json::from_str(json).map_err(|e| ContentError::Decode(e.to_string()))?;
    let mut content = response.story.content;

    if let Some(object) = content.as_object_mut() {
        // Comma separated text field or a list
        if let Some(Value::String(skills)) = object.get("skills") {
            let list: Vec<Value> = skills
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect();
            object.insert("skills".to_string(), Value::Array(list));
        }
        // Contact may be a single nested blok
        if let Some(Value::Array(bloks)) = object.get("contact") {
            let first = bloks.first().cloned().unwrap_or(Value::Null);
            object.insert("contact".to_string(), first);
        }
        if object.get("contact").is_some_and(Value::is_null) {
            object.remove("contact");
        }
        if let Some(Value::Object(bio)) = object.get("bio") {
            let text = richtext::plain_text(&Value::Object(bio.clone()));
            object.insert("bio".to_string(), Value::String(text));
        }
    }

    serde_json::from_value(content).map_err(|e| ContentError::Decode(e.to_string()))
}

fn story_to_detail(story: Story, excerpt_length: usize) -> PostDetail {
    let content = &story.content;

    let title = text_field(content, "title").unwrap_or_else(|| story.name.clone());

    let body = match content.get("content") {
        Some(doc) if richtext::is_document(doc) => PostBody::RichText(doc.clone()),
        Some(Value::String(markdown)) if !markdown.trim().is_empty() => {
            PostBody::Markdown(markdown.clone())
        }
        _ => PostBody::Empty,
    };

    let summary_excerpt = text_field(content, "excerpt").or_else(|| {
        let text = match &body {
            PostBody::RichText(doc) => richtext::plain_text(doc),
            PostBody::Markdown(markdown) => super::MarkdownRenderer::plain_text(markdown),
            PostBody::Empty => String::new(),
        };
        let text = excerpt(&text, excerpt_length);
        (!text.is_empty()).then_some(text)
    });

    let (image_url, image_alt) = match content.get("image") {
        Some(Value::Object(asset)) => (
            asset
                .get("filename")
                .and_then(Value::as_str)
                .filter(|f| !f.is_empty())
                .map(str::to_string),
            asset
                .get("alt")
                .and_then(Value::as_str)
                .filter(|a| !a.is_empty())
                .map(str::to_string),
        ),
        Some(Value::String(url)) if !url.is_empty() => (Some(url.clone()), None),
        _ => (None, None),
    };

    let published_at = story
        .first_published_at
        .as_deref()
        .or(story.published_at.as_deref())
        .and_then(parse_date);

    let full_slug = if story.full_slug.is_empty() {
        story.slug.clone()
    } else {
        story.full_slug
    };

    PostDetail {
        summary: PostSummary {
            id: story.id,
            slug: story.slug,
            full_slug,
            title,
            excerpt: summary_excerpt,
            published_at,
            image_url,
            image_alt,
            tags: story.tag_list,
        },
        body,
    }
}

fn text_field(content: &Value, key: &str) -> Option<String> {
    content
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn story(content: Value) -> Value {
        json!({
            "id": 42,
            "name": "Story name",
            "slug": "hello-world",
            "full_slug": "blog/hello-world",
            "first_published_at": "2024-01-05T10:00:00.000Z",
            "published_at": "2024-02-01T10:00:00.000Z",
            "tag_list": ["rust"],
            "content": content
        })
    }

    fn doc(text: &str) -> Value {
        json!({
            "type": "doc",
            "content": [{"type": "paragraph", "content": [{"type": "text", "text": text}]}]
        })
    }

    #[test]
    fn test_parse_story_with_rich_text() {
        let json = json!({
            "story": story(json!({
                "title": "Hello",
                "excerpt": "Short intro",
                "image": {"filename": "https://a.storyblok.com/f/1/cover.png", "alt": "Cover"},
                "content": doc("Body text")
            }))
        });

        let post = parse_story(&json.to_string(), 100).unwrap();
        assert_eq!(post.summary.id, PostId::from(42u64));
        assert_eq!(post.summary.title, "Hello");
        assert_eq!(post.summary.full_slug, "blog/hello-world");
        assert_eq!(post.summary.excerpt.as_deref(), Some("Short intro"));
        assert_eq!(
            post.summary.image_url.as_deref(),
            Some("https://a.storyblok.com/f/1/cover.png")
        );
        assert_eq!(post.summary.image_alt.as_deref(), Some("Cover"));
        assert_eq!(post.summary.tags, vec!["rust"]);
        assert_eq!(
            post.summary.published_at.map(|d| d.to_rfc3339()),
            Some("2024-01-05T10:00:00+00:00".to_string())
        );
        assert!(matches!(post.body, PostBody::RichText(_)));
    }

    #[test]
    fn test_title_and_excerpt_fallbacks() {
        let long = "word ".repeat(40);
        let json = json!({ "story": story(json!({ "content": doc(&long), "image": {"filename": ""} })) });

        let post = parse_story(&json.to_string(), 100).unwrap();
        assert_eq!(post.summary.title, "Story name");
        let excerpt = post.summary.excerpt.unwrap();
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), 103);
        assert!(post.summary.image_url.is_none());
    }

    #[test]
    fn test_markdown_and_missing_body() {
        let json = json!({ "story": story(json!({ "title": "T", "content": "# Heading" })) });
        let post = parse_story(&json.to_string(), 100).unwrap();
        assert!(matches!(post.body, PostBody::Markdown(_)));
        assert_eq!(post.summary.excerpt.as_deref(), Some("Heading"));

        let json = json!({ "story": story(json!({ "title": "T" })) });
        let post = parse_story(&json.to_string(), 100).unwrap();
        assert!(matches!(post.body, PostBody::Empty));
        assert!(post.summary.excerpt.is_none());
    }

    #[test]
    fn test_published_at_fallback() {
        let mut raw = story(json!({}));
        raw["first_published_at"] = Value::Null;
        let post = parse_story(&json!({ "story": raw }).to_string(), 100).unwrap();
        assert_eq!(
            post.summary.published_at.map(|d| d.to_rfc3339()),
            Some("2024-02-01T10:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_parse_stories_keeps_order() {
        let mut second = story(json!({ "title": "Second" }));
        second["id"] = json!(7);
        let json = json!({ "stories": [story(json!({ "title": "First" })), second] });

        let posts = parse_stories(&json.to_string(), 100).unwrap();
        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["42", "7"]);
    }

    #[test]
    fn test_parse_errors_are_decode_errors() {
        assert!(matches!(parse_stories("not json", 100), Err(ContentError::Decode(_))));
        assert!(matches!(parse_story("{}", 100), Err(ContentError::Decode(_))));
    }

    #[test]
    fn test_parse_profile() {
        let json = json!({
            "story": {
                "id": 1,
                "content": {
                    "name": "Ada Lovelace",
                    "role": "Engineer",
                    "bio": "Writes code.",
                    "skills": "Rust, TypeScript",
                    "experience": [{"title": "Dev", "company": "ACME", "period": "2020-2024", "description": "Built things"}],
                    "education": [{"degree": "BSc", "institution": "Uni", "year": "2019"}],
                    "contact": [{"email": "ada@example.com", "github": "https://github.com/ada"}]
                }
            }
        });

        let profile = parse_profile(&json.to_string()).unwrap();
        assert_eq!(profile.name, "Ada Lovelace");
        assert_eq!(profile.skills, vec!["Rust", "TypeScript"]);
        assert_eq!(profile.experience[0].company, "ACME");
        assert_eq!(profile.education[0].year, "2019");
        assert_eq!(profile.contact.email.as_deref(), Some("ada@example.com"));
        assert!(profile.contact.linkedin.is_none());
    }

    #[test]
    fn test_sort_param() {
        assert_eq!(sort_param(SortOrder::Newest), "first_published_at:desc");
        assert_eq!(sort_param(SortOrder::Oldest), "first_published_at:asc");
        assert_eq!(sort_param(SortOrder::Title), "name:asc");
    }

    #[test]
    fn test_story_path_encodes_segments() {
        assert_eq!(StoryblokSource::story_path("blog/hello world"), "stories/blog/hello%20world");
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let config = CmsConfig::default();
        assert!(matches!(
            StoryblokSource::new(&config, 100),
            Err(ContentError::Config(_))
        ));
    }
}
