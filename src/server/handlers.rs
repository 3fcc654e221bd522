//! Request handlers

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use tera::Context;

use super::SharedState;
use crate::content::PostId;
use crate::helpers::{is_local_path, url_for};
use crate::templates::page_context;
use crate::views::{
    AllPostsLoader, ArchiveQuery, HomeLoader, PostCard, PostLoader, ProfileLoader,
    SavedPostsLoader, ViewBinder, ViewState, ARCHIVE_EXCERPT_FALLBACK, HOME_EXCERPT_FALLBACK,
    NO_SAVED_POSTS,
};

const APP_JS: &str = include_str!("assets/app.js");
const STYLE_CSS: &str = include_str!("assets/style.css");

// =============================================================================
// PAGES
// =============================================================================

pub async fn home(State(state): State<SharedState>, OriginalUri(uri): OriginalUri) -> Response {
    let cms = &state.config.cms;
    let binder = ViewBinder::new(
        HomeLoader::new(&cms.posts_prefix, state.config.home.limit),
        state.source.clone(),
        state.registry.clone(),
    );
    binder.mount().await;

    let view = binder.state();
    let cards = match &view {
        ViewState::Ready(posts) => {
            PostCard::list(posts, &binder.flags(), &state.config, HOME_EXCERPT_FALLBACK)
        }
        _ => Vec::new(),
    };

    let mut context = page_context(&state.config, "", "home", uri.path());
    context.insert("view", &view);
    context.insert("cards", &cards);
    render(&state, "home.html", &context, status_for(&view))
}

pub async fn all_posts(
    State(state): State<SharedState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ArchiveQuery>,
) -> Response {
    let query_suffix = archive_query_suffix(&query);
    let binder = ViewBinder::new(
        AllPostsLoader::new(
            &state.config.cms.posts_prefix,
            state.config.archive.fetch_limit,
            state.config.archive.per_page,
            query,
        ),
        state.source.clone(),
        state.registry.clone(),
    );
    binder.mount().await;

    let view = binder.state();
    let cards = match &view {
        ViewState::Ready(page) => PostCard::list(
            &page.posts,
            &binder.flags(),
            &state.config,
            ARCHIVE_EXCERPT_FALLBACK,
        ),
        _ => Vec::new(),
    };

    let mut context = page_context(&state.config, "All posts", "posts", &return_path(&uri));
    context.insert("view", &view);
    context.insert("cards", &cards);
    context.insert("query_suffix", &query_suffix);
    render(&state, "posts.html", &context, status_for(&view))
}

pub async fn post(
    State(state): State<SharedState>,
    OriginalUri(uri): OriginalUri,
    Path(slug): Path<String>,
) -> Response {
    let binder = ViewBinder::new(
        PostLoader::new(&slug, state.markdown.clone()),
        state.source.clone(),
        state.registry.clone(),
    );
    binder.mount().await;

    let view = binder.state();
    let mut title = String::new();
    let mut context = Context::new();
    if let ViewState::Ready(page) = &view {
        let card = PostCard::new(
            &page.post,
            binder.is_saved(&page.post.id),
            &state.config,
            "",
        );
        title = card.title.clone();
        context.insert("card", &card);
    }

    context.extend(page_context(&state.config, &title, "posts", uri.path()));
    context.insert("view", &view);
    render(&state, "post.html", &context, status_for(&view))
}

pub async fn saved_posts(State(state): State<SharedState>, OriginalUri(uri): OriginalUri) -> Response {
    let binder = ViewBinder::new(SavedPostsLoader, state.source.clone(), state.registry.clone());
    binder.mount().await;

    let view = binder.state();
    let cards = match &view {
        ViewState::Ready(posts) => {
            PostCard::list(posts, &binder.flags(), &state.config, ARCHIVE_EXCERPT_FALLBACK)
        }
        _ => Vec::new(),
    };

    let mut context = page_context(&state.config, "Saved posts", "saved", uri.path());
    context.insert("view", &view);
    context.insert("cards", &cards);
    context.insert("empty_message", NO_SAVED_POSTS);
    render(&state, "saved.html", &context, status_for(&view))
}

pub async fn profile(State(state): State<SharedState>, OriginalUri(uri): OriginalUri) -> Response {
    let binder = ViewBinder::new(ProfileLoader, state.source.clone(), state.registry.clone());
    binder.mount().await;

    let view = binder.state();
    let title = match &view {
        ViewState::Ready(page) if !page.profile.name.is_empty() => page.profile.name.clone(),
        _ => "Profile".to_string(),
    };

    let mut context = page_context(&state.config, &title, "profile", uri.path());
    context.insert("view", &view);
    render(&state, "profile.html", &context, status_for(&view))
}

pub async fn not_found(State(state): State<SharedState>, OriginalUri(uri): OriginalUri) -> Response {
    tracing::debug!("No route for {}", uri.path());
    let mut context = page_context(&state.config, "Not found", "", &url_for(&state.config, "/"));
    context.insert("message", &format!("Nothing lives at {}.", uri.path()));
    render(&state, "not_found.html", &context, StatusCode::NOT_FOUND)
}

fn render(state: &SharedState, template: &str, context: &Context, status: StatusCode) -> Response {
    match state.templates.render(template, context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render {}: {:?}", template, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

fn status_for<T>(view: &ViewState<T>) -> StatusCode {
    match view {
        ViewState::Error(e) if e.not_found => StatusCode::NOT_FOUND,
        ViewState::Error(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    }
}

/// Path plus query string, so toggles land back on the same page
fn return_path(uri: &axum::http::Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// Search, tag and sort carried over to pagination links
fn archive_query_suffix(query: &ArchiveQuery) -> String {
    let mut suffix = String::new();
    for (key, value) in [("q", &query.q), ("tag", &query.tag), ("sort", &query.sort)] {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            suffix.push_str(&format!(
                "&{}={}",
                key,
                utf8_percent_encode(value, NON_ALPHANUMERIC)
            ));
        }
    }
    suffix
}

// =============================================================================
// SAVED POSTS API
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct SavedList {
    pub ids: Vec<PostId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavedChange {
    pub id: PostId,
    pub saved: bool,
    pub changed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavedToggle {
    pub id: PostId,
    pub saved: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ToggleForm {
    pub return_to: Option<String>,
}

fn parse_id(raw: &str) -> Result<PostId, Response> {
    let id = PostId::new(raw);
    if id.is_valid() {
        Ok(id)
    } else {
        Err((StatusCode::BAD_REQUEST, "Invalid post id").into_response())
    }
}

pub async fn api_list(State(state): State<SharedState>) -> Json<SavedList> {
    Json(SavedList {
        ids: state.registry.query_all().into_iter().collect(),
    })
}

pub async fn api_add(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let changed = state.registry.add(&id);
    Json(SavedChange { id, saved: true, changed }).into_response()
}

pub async fn api_remove(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let changed = state.registry.remove(&id);
    Json(SavedChange { id, saved: false, changed }).into_response()
}

pub async fn api_toggle(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let saved = state.registry.toggle(&id);
    tracing::debug!("Toggled {} -> {}", id, saved);
    Json(SavedToggle { id, saved }).into_response()
}

/// Form fallback for toggles when scripts are off
pub async fn form_toggle(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Form(form): Form<ToggleForm>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    state.registry.toggle(&id);

    let target = form
        .return_to
        .filter(|t| is_local_path(t))
        .unwrap_or_else(|| url_for(&state.config, "/"));
    Redirect::to(&target).into_response()
}

// =============================================================================
// ASSETS
// =============================================================================

pub async fn app_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        APP_JS,
    )
}

pub async fn style_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::testing::FakeSource;
    use crate::content::{ContentSource, Profile};
    use crate::server::AppState;
    use crate::views::tests::registry;
    use axum::http::Uri;
    use std::sync::Arc;

    fn state_with(source: FakeSource, saved: &[&str]) -> SharedState {
        let source: Arc<dyn ContentSource> = Arc::new(source);
        Arc::new(AppState::new(SiteConfig::default(), source, registry(saved)).unwrap())
    }

    fn uri(path: &'static str) -> OriginalUri {
        OriginalUri(Uri::from_static(path))
    }

    async fn body(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_home_marks_saved_posts() {
        let state = state_with(FakeSource::sample(), &["2"]);
        let response = home(State(state), uri("/")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body(response).await;
        assert!(html.contains("Third post"));
        assert_eq!(html.matches("Remove from saved").count(), 1);
        assert_eq!(html.matches(r#"aria-label="Save post""#).count(), 2);
    }

    #[tokio::test]
    async fn test_home_upstream_failure_is_bad_gateway() {
        let source = FakeSource::sample();
        source.set_failing(true);
        let response = home(State(state_with(source, &[])), uri("/")).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body(response).await.contains("Error:"));
    }

    #[tokio::test]
    async fn test_saved_page_empty_state() {
        let response = saved_posts(State(state_with(FakeSource::sample(), &[])), uri("/saved")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.contains("You haven&#39;t saved any posts yet."));
    }

    #[tokio::test]
    async fn test_saved_page_lists_saved_posts() {
        let response =
            saved_posts(State(state_with(FakeSource::sample(), &["1"])), uri("/saved")).await;
        let html = body(response).await;
        assert!(html.contains("First post"));
        assert!(!html.contains("Second post"));
    }

    #[tokio::test]
    async fn test_missing_post_is_404() {
        let response = post(
            State(state_with(FakeSource::sample(), &[])),
            uri("/blog/nope"),
            Path("nope".to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_page_renders_body_and_toggle() {
        let response = post(
            State(state_with(FakeSource::sample(), &["1"])),
            uri("/blog/first-post"),
            Path("first-post".to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body(response).await;
        assert!(html.contains("<title>First post | "));
        assert!(html.contains("Body of first-post."));
        assert!(html.contains("Remove from saved"));
        assert!(html.contains(r#"name="return_to" value="/blog/first-post""#));
    }

    #[tokio::test]
    async fn test_all_posts_pagination_keeps_filters() {
        let query = ArchiveQuery {
            q: Some("post".to_string()),
            sort: Some("title".to_string()),
            ..Default::default()
        };
        let config_per_page = SiteConfig::default().archive.per_page;
        assert_eq!(config_per_page, 5);

        let response = all_posts(
            State(state_with(FakeSource::sample(), &[])),
            uri("/posts?q=post&sort=title"),
            Query(query),
        )
        .await;
        let html = body(response).await;
        assert!(html.contains("Showing 3 posts"));
        let first = html.find("First post").unwrap();
        let second = html.find("Second post").unwrap();
        let third = html.find("Third post").unwrap();
        assert!(first < second && second < third);
    }

    #[tokio::test]
    async fn test_profile_page() {
        let source = FakeSource::sample().with_profile(Profile {
            name: "Ada".to_string(),
            role: "Engineer".to_string(),
            ..Default::default()
        });
        let response = profile(State(state_with(source, &[])), uri("/profile")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body(response).await;
        assert!(html.contains("<h1>Ada</h1>"));
        assert!(html.contains("Engineer"));
    }

    #[tokio::test]
    async fn test_api_add_remove_toggle() {
        let state = state_with(FakeSource::sample(), &[]);

        let response = api_add(State(state.clone()), Path("42".to_string())).await;
        let change: SavedChange = serde_json::from_str(&body(response).await).unwrap();
        assert!(change.saved && change.changed);

        let response = api_add(State(state.clone()), Path("42".to_string())).await;
        let change: SavedChange = serde_json::from_str(&body(response).await).unwrap();
        assert!(change.saved && !change.changed);

        let response = api_toggle(State(state.clone()), Path("7".to_string())).await;
        let toggle: SavedToggle = serde_json::from_str(&body(response).await).unwrap();
        assert!(toggle.saved);

        let Json(list) = api_list(State(state.clone())).await;
        assert_eq!(list.ids, vec![PostId::from("42"), PostId::from("7")]);

        let response = api_remove(State(state.clone()), Path("42".to_string())).await;
        let change: SavedChange = serde_json::from_str(&body(response).await).unwrap();
        assert!(!change.saved && change.changed);

        let response = api_remove(State(state.clone()), Path("42".to_string())).await;
        let change: SavedChange = serde_json::from_str(&body(response).await).unwrap();
        assert!(!change.changed);
    }

    #[tokio::test]
    async fn test_api_rejects_blank_id() {
        let response = api_toggle(State(state_with(FakeSource::sample(), &[])), Path(" ".to_string())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_form_toggle_redirects_to_local_path_only() {
        let state = state_with(FakeSource::sample(), &[]);

        let response = form_toggle(
            State(state.clone()),
            Path("3".to_string()),
            Form(ToggleForm {
                return_to: Some("/posts?page=2".to_string()),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/posts?page=2");
        assert!(state.registry.is_saved(&PostId::from("3")));

        let response = form_toggle(
            State(state.clone()),
            Path("3".to_string()),
            Form(ToggleForm {
                return_to: Some("//evil.example.com".to_string()),
            }),
        )
        .await;
        assert_eq!(response.headers()[header::LOCATION], "/");
        assert!(!state.registry.is_saved(&PostId::from("3")));
    }

    #[tokio::test]
    async fn test_form_toggle_falls_back_to_site_root() {
        let config = SiteConfig {
            root: "/journal/".to_string(),
            ..SiteConfig::default()
        };
        let source: Arc<dyn ContentSource> = Arc::new(FakeSource::sample());
        let state = Arc::new(AppState::new(config, source, registry(&[])).unwrap());

        let response = form_toggle(
            State(state.clone()),
            Path("1".to_string()),
            Form(ToggleForm {
                return_to: Some("https://elsewhere.example.com/".to_string()),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/journal/");

        let response = form_toggle(State(state), Path("1".to_string()), Form(ToggleForm::default())).await;
        assert_eq!(response.headers()[header::LOCATION], "/journal/");
    }

    #[test]
    fn test_archive_query_suffix() {
        let query = ArchiveQuery {
            q: Some("rust & web".to_string()),
            tag: Some(" ".to_string()),
            sort: Some("oldest".to_string()),
            ..Default::default()
        };
        assert_eq!(archive_query_suffix(&query), "&q=rust%20%26%20web&sort=oldest");
    }

    #[tokio::test]
    async fn test_assets_have_content_types() {
        let response = app_js().await.into_response();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/javascript; charset=utf-8"
        );
        assert!(body(response).await.contains("stopPropagation"));
    }
}
