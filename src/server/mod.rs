//! HTTP server: server-rendered pages plus the saved-posts API

mod handlers;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::content::{ContentSource, MarkdownRenderer};
use crate::saved::SavedRegistry;
use crate::templates::TemplateRenderer;
use crate::Storyfront;

/// Everything a request handler needs
pub struct AppState {
    pub config: SiteConfig,
    pub source: Arc<dyn ContentSource>,
    pub registry: Arc<SavedRegistry>,
    pub templates: TemplateRenderer,
    pub markdown: Arc<MarkdownRenderer>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        config: SiteConfig,
        source: Arc<dyn ContentSource>,
        registry: Arc<SavedRegistry>,
    ) -> Result<Self> {
        let markdown = Arc::new(MarkdownRenderer::from_config(&config.highlight));
        Ok(Self {
            config,
            source,
            registry,
            templates: TemplateRenderer::new()?,
            markdown,
        })
    }
}

/// Build the application router, mounted under the configured root
pub fn router(state: SharedState) -> Router {
    let root = state.config.root.trim_end_matches('/').to_string();

    let app = Router::new()
        .route("/", get(handlers::home))
        .route("/home", get(handlers::home))
        .route("/posts", get(handlers::all_posts))
        .route("/blog/:slug", get(handlers::post))
        .route("/saved", get(handlers::saved_posts))
        .route("/profile", get(handlers::profile))
        .route("/api/saved", get(handlers::api_list))
        .route(
            "/api/saved/:id",
            post(handlers::api_add).delete(handlers::api_remove),
        )
        .route("/api/saved/:id/toggle", post(handlers::api_toggle))
        .route("/saved/:id/toggle", post(handlers::form_toggle))
        .route("/assets/app.js", get(handlers::app_js))
        .route("/assets/style.css", get(handlers::style_css))
        .fallback(handlers::not_found)
        .with_state(state);

    let app = if root.is_empty() {
        app
    } else {
        Router::new().nest(&root, app)
    };

    app.layer(TraceLayer::new_for_http())
}

/// Start the server
pub async fn start(site: &Storyfront, ip: &str, port: u16, open: bool, ephemeral: bool) -> Result<()> {
    let source = site.content_source()?;
    let registry = Arc::new(site.registry(ephemeral));
    let state = Arc::new(AppState::new(site.config.clone(), source, registry)?);

    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}{}", ip, port, site.config.root);
    println!("Server running at {}", url);
    if ephemeral {
        println!("Saved posts are kept in memory only for this run.");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
