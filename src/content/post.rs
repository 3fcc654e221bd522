//! Post and profile models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier of a post in the content backend.
///
/// Storyblok hands out integer ids while local content may use strings;
/// both normalise to the same textual form, so `42` and `"42"` name the
/// same post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is usable at all (non-empty after trimming)
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PostId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<u64> for PostId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Accepts both JSON strings and JSON integers
impl<'de> Deserialize<'de> for PostId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct PostIdVisitor;

        impl<'de> Visitor<'de> for PostIdVisitor {
            type Value = PostId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a post id as a string or an integer")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(PostId::new(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(PostId::from(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(PostId(value.to_string()))
            }
        }

        deserializer.deserialize_any(PostIdVisitor)
    }
}

/// A post as it appears in listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: PostId,

    /// Slug relative to the posts folder
    pub slug: String,

    /// Full slug including the folder prefix (e.g. `blog/hello-world`)
    pub full_slug: String,

    pub title: String,

    pub excerpt: Option<String>,

    /// First publication date
    pub published_at: Option<DateTime<Utc>>,

    pub image_url: Option<String>,

    pub image_alt: Option<String>,

    /// Tags attached in the CMS, used for archive filtering
    pub tags: Vec<String>,
}

impl PostSummary {
    /// Create a summary with the required fields only
    pub fn new(id: impl Into<PostId>, slug: &str, title: &str) -> Self {
        Self {
            id: id.into(),
            slug: slug.to_string(),
            full_slug: slug.to_string(),
            title: title.to_string(),
            excerpt: None,
            published_at: None,
            image_url: None,
            image_alt: None,
            tags: Vec::new(),
        }
    }
}

/// Body of a post, in whatever form the backend stored it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PostBody {
    /// Storyblok rich-text document
    RichText(serde_json::Value),
    Markdown(String),
    Empty,
}

/// A full post, as shown on its own page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub summary: PostSummary,
    pub body: PostBody,
}

/// Author profile page content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub role: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub contact: Contact,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub period: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub email: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
}
