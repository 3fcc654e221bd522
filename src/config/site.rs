//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    /// Paragraph shown in the "About" section of the home page
    pub intro: String,
    pub author: String,
    pub language: String,

    // URL
    pub root: String,

    /// Length of generated excerpts, in characters
    pub excerpt_length: usize,

    #[serde(default)]
    pub cms: CmsConfig,
    #[serde(default)]
    pub home: HomeConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Storyfront".to_string(),
            subtitle: "Notes on web and mobile development".to_string(),
            description: String::new(),
            intro: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            root: "/".to_string(),

            excerpt_length: 100,

            cms: CmsConfig::default(),
            home: HomeConfig::default(),
            archive: ArchiveConfig::default(),
            storage: StorageConfig::default(),
            highlight: HighlightConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Which content backend to read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CmsProvider {
    Storyblok,
    Local,
}

/// Headless CMS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    pub provider: CmsProvider,
    pub api_url: String,
    /// Public (preview or published) access token
    pub token: String,
    /// `published` or `draft`
    pub version: String,
    /// Folder holding blog posts, e.g. `blog/`
    pub posts_prefix: String,
    pub profile_slug: String,
    pub timeout_secs: u64,
    /// Root of the markdown tree used by the local provider
    pub content_dir: String,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            provider: CmsProvider::Storyblok,
            api_url: "https://api.storyblok.com/v2".to_string(),
            token: String::new(),
            version: "published".to_string(),
            posts_prefix: "blog/".to_string(),
            profile_slug: "profile".to_string(),
            timeout_secs: 30,
            content_dir: "content".to_string(),
        }
    }
}

/// Home page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeConfig {
    /// Number of recent posts on the landing page
    pub limit: usize,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self { limit: 6 }
    }
}

/// Archive ("all posts") configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub per_page: usize,
    /// Maximum number of posts requested from the CMS
    pub fetch_limit: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            per_page: 5,
            fetch_limit: 100,
        }
    }
}

/// Saved-posts storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: String,
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: ".storyfront".to_string(),
            key: "savedPostIds".to_string(),
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: true,
        }
    }
}

/// Server defaults, overridable from the command line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}
