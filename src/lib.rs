//! storyfront: a server-rendered blog front-end for headless CMS content
//!
//! Posts and the author profile come from a content backend (Storyblok or a
//! local markdown directory). Visitors can save posts; the saved set is kept
//! in a small JSON store next to the site so it survives restarts.

pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod saved;
pub mod server;
pub mod storage;
pub mod templates;
pub mod views;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{CmsProvider, SiteConfig};
use content::{ContentSource, LocalSource, StoryblokSource};
use saved::SavedRegistry;
use storage::{FileStore, MemoryStore, PersistentIdSet};

/// The main application: a site directory and its configuration
#[derive(Clone)]
pub struct Storyfront {
    /// Site configuration
    pub config: SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Local content directory
    pub content_dir: PathBuf,
    /// Directory holding the saved-posts store
    pub storage_dir: PathBuf,
}

impl Storyfront {
    /// Create a new instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config(base_dir: PathBuf, config: SiteConfig) -> Self {
        let content_dir = base_dir.join(&config.cms.content_dir);
        let storage_dir = base_dir.join(&config.storage.dir);

        Self {
            config,
            base_dir,
            content_dir,
            storage_dir,
        }
    }

    /// Override the CMS access token (from `--token` or the environment)
    pub fn set_token(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.config.cms.token = token;
        }
    }

    /// The saved-posts registry. `ephemeral` keeps the set in memory only.
    pub fn registry(&self, ephemeral: bool) -> SavedRegistry {
        let key = self.config.storage.key.clone();
        let ids = if ephemeral {
            PersistentIdSet::new(MemoryStore::new(), key)
        } else {
            PersistentIdSet::new(FileStore::in_dir(&self.storage_dir), key)
        };
        SavedRegistry::new(ids)
    }

    /// The configured content backend
    pub fn content_source(&self) -> Result<Arc<dyn ContentSource>> {
        let excerpt_length = self.config.excerpt_length;
        let source: Arc<dyn ContentSource> = match self.config.cms.provider {
            CmsProvider::Storyblok => {
                Arc::new(StoryblokSource::new(&self.config.cms, excerpt_length)?)
            }
            CmsProvider::Local => Arc::new(LocalSource::new(
                &self.content_dir,
                &self.config.cms,
                excerpt_length,
            )),
        };
        tracing::debug!("Using {:?} content source", self.config.cms.provider);
        Ok(source)
    }

    /// Initialize a new site
    pub fn init(&self) -> Result<()> {
        commands::init::run(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PostId;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = TempDir::new().unwrap();
        let site = Storyfront::new(dir.path()).unwrap();
        assert_eq!(site.content_dir, dir.path().join("content"));
        assert_eq!(site.storage_dir, dir.path().join(".storyfront"));
    }

    #[test]
    fn test_registry_persists_between_instances() {
        let dir = TempDir::new().unwrap();
        let site = Storyfront::new(dir.path()).unwrap();

        site.registry(false).add(&PostId::from("42"));
        assert!(site.registry(false).is_saved(&PostId::from("42")));
        assert!(!site.registry(true).is_saved(&PostId::from("42")));
    }

    #[test]
    fn test_storyblok_requires_token() {
        let dir = TempDir::new().unwrap();
        let mut site = Storyfront::new(dir.path()).unwrap();
        assert!(site.content_source().is_err());

        site.set_token(Some("preview-token".to_string()));
        assert!(site.content_source().is_ok());
    }

    #[test]
    fn test_local_provider() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("_config.yml"), "cms:\n  provider: local\n").unwrap();
        let site = Storyfront::new(dir.path()).unwrap();
        assert!(site.content_source().is_ok());
    }
}
