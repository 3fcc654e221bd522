//! Built-in page templates using the Tera template engine
//!
//! All templates are embedded directly in the binary.

use anyhow::Result;
use chrono::Datelike;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::helpers::{excerpt, html_escape};

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Every template is HTML; values are escaped unless marked `safe`.
        // Slashes stay as-is so paths read naturally in attributes.
        tera.autoescape_on(vec![".html"]);
        tera.set_escape_fn(html_escape);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("macros.html", include_str!("site/macros.html")),
            ("home.html", include_str!("site/home.html")),
            ("posts.html", include_str!("site/posts.html")),
            ("post.html", include_str!("site/post.html")),
            ("saved.html", include_str!("site/saved.html")),
            ("profile.html", include_str!("site/profile.html")),
            ("not_found.html", include_str!("site/not_found.html")),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: truncate by character count, appending `...`
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };

    Ok(tera::Value::String(excerpt(&s, length)))
}

/// Site-wide values every page shows
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub intro: String,
    pub author: String,
    pub language: String,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            intro: config.intro.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
        }
    }
}

/// Context shared by all pages.
///
/// `active` names the highlighted navigation entry and `return_to` is the
/// path toggle forms redirect back to.
pub fn page_context(config: &SiteConfig, title: &str, active: &str, return_to: &str) -> Context {
    let root = format!("{}/", config.root.trim_end_matches('/'));

    let mut context = Context::new();
    context.insert("site", &SiteData::from_config(config));
    context.insert("root", &root);
    context.insert("page_title", title);
    context.insert("active", active);
    context.insert("return_to", return_to);
    context.insert("year", &chrono::Utc::now().year());
    context
}
