//! Preview server: JSON API over the content index with live reload

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    handler::HandlerWithoutStateExt,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::{
    ContentDetail, ContentIndex, ContentKind, ContentRecord, ContentStats, MarkdownRenderer,
};
use crate::data::DataStore;
use crate::Folio;

/// Default number of records returned by `recent` and `featured`
const DEFAULT_LIMIT: usize = 3;

/// Shared server state
pub struct AppState {
    pub index: RwLock<ContentIndex>,
    pub data: RwLock<DataStore>,
    pub renderer: MarkdownRenderer,
}

impl AppState {
    pub fn new(index: ContentIndex, data: DataStore, renderer: MarkdownRenderer) -> Self {
        Self {
            index: RwLock::new(index),
            data: RwLock::new(data),
            renderer,
        }
    }

    pub fn from_folio(folio: &Folio) -> Result<Self> {
        Ok(Self::new(folio.index(), folio.data()?, folio.renderer()))
    }
}

/// API failure, rendered as a JSON body
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown content kind {0:?}")]
    UnknownKind(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("render failed: {0}")]
    Render(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::UnknownKind(_) | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

fn parse_kind(name: &str) -> std::result::Result<ContentKind, ApiError> {
    ContentKind::from_name(name).ok_or_else(|| ApiError::UnknownKind(name.to_string()))
}

fn owned(records: Vec<&ContentRecord>) -> Vec<ContentRecord> {
    records.into_iter().cloned().collect()
}

/// Build the application router
pub fn router(state: Arc<AppState>, public_dir: PathBuf) -> Router {
    let assets = ServeDir::new(public_dir)
        .append_index_html_on_directories(true)
        .not_found_service(not_found.into_service());

    Router::new()
        .route("/api/data/:name", get(data_document))
        .route("/api/locales/:lang", get(locale_strings))
        .route("/api/:kind", get(list_records))
        .route("/api/:kind/search", get(search_records))
        .route("/api/:kind/recent", get(recent_records))
        .route("/api/:kind/featured", get(featured_records))
        .route("/api/:kind/stats", get(kind_stats))
        .route("/api/:kind/tags", get(all_tags))
        .route("/api/:kind/tags/:tag", get(records_by_tag))
        .route("/api/:kind/technologies", get(all_technologies))
        .route("/api/:kind/technologies/:tech", get(records_by_technology))
        .route("/api/:kind/:slug", get(record_detail))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the preview server
pub async fn start(folio: &Folio, ip: &str, port: u16, watch: bool) -> Result<()> {
    let state = Arc::new(AppState::from_folio(folio)?);
    let app = router(state.clone(), folio.public_dir.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{} ({} mode)", ip, port, folio.config.mode);
    if watch {
        println!("Watching content for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if watch {
        let folio = folio.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(folio, state) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Rebuild the index whenever content or data files change.
///
/// The new index is built without holding the lock and swapped in afterwards.
fn watch_and_reload(folio: Folio, state: Arc<AppState>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for dir in [&folio.content_dir, &folio.data_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| is_relevant(&e.path))
                    .collect();
                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                let index = folio.index();
                *state.index.blocking_write() = index;

                match folio.data() {
                    Ok(data) => *state.data.blocking_write() = data,
                    Err(e) => tracing::warn!("Failed to reload data: {}", e),
                }

                tracing::info!("Content reloaded");
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Ignore editor backups and VCS noise
fn is_relevant(path: &std::path::Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}

async fn not_found() -> ApiError {
    ApiError::NotFound("resource".to_string())
}

async fn list_records(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> ApiResult<Vec<ContentRecord>> {
    let kind = parse_kind(&kind)?;
    let index = state.index.read().await;
    Ok(Json(index.list(kind).to_vec()))
}

async fn record_detail(
    State(state): State<Arc<AppState>>,
    Path((kind, slug)): Path<(String, String)>,
) -> ApiResult<ContentDetail> {
    let kind = parse_kind(&kind)?;
    let index = state.index.read().await;
    index
        .detail(kind, &slug, &state.renderer)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("{} {:?}", kind, slug)))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn search_records(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<ContentRecord>> {
    let kind = parse_kind(&kind)?;
    let index = state.index.read().await;
    Ok(Json(owned(index.search(kind, &params.q))))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    limit: Option<usize>,
    locale: Option<String>,
}

async fn recent_records(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<ContentRecord>> {
    let kind = parse_kind(&kind)?;
    let index = state.index.read().await;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    Ok(Json(owned(index.recent(kind, limit, params.locale.as_deref()))))
}

async fn featured_records(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<ContentRecord>> {
    let kind = parse_kind(&kind)?;
    let index = state.index.read().await;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    Ok(Json(owned(index.featured(kind, limit))))
}

async fn kind_stats(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> ApiResult<ContentStats> {
    let kind = parse_kind(&kind)?;
    let index = state.index.read().await;
    Ok(Json(index.stats(kind)))
}

async fn all_tags(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> ApiResult<Vec<String>> {
    let kind = parse_kind(&kind)?;
    let index = state.index.read().await;
    Ok(Json(index.all_tags(kind)))
}

async fn all_technologies(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> ApiResult<Vec<String>> {
    let kind = parse_kind(&kind)?;
    let index = state.index.read().await;
    Ok(Json(index.all_technologies(kind)))
}

async fn records_by_tag(
    State(state): State<Arc<AppState>>,
    Path((kind, tag)): Path<(String, String)>,
) -> ApiResult<Vec<ContentRecord>> {
    let kind = parse_kind(&kind)?;
    let index = state.index.read().await;
    Ok(Json(owned(index.by_tag(kind, &tag))))
}

async fn records_by_technology(
    State(state): State<Arc<AppState>>,
    Path((kind, tech)): Path<(String, String)>,
) -> ApiResult<Vec<ContentRecord>> {
    let kind = parse_kind(&kind)?;
    let index = state.index.read().await;
    Ok(Json(owned(index.by_technology(kind, &tech))))
}

async fn data_document(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<serde_json::Value> {
    let data = state.data.read().await;
    data.lookup(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("data {:?}", name)))
}

async fn locale_strings(
    State(state): State<Arc<AppState>>,
    Path(lang): Path<String>,
) -> ApiResult<BTreeMap<String, String>> {
    let data = state.data.read().await;
    Ok(Json(data.translations(&lang)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn setup() -> (TempDir, Folio) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for sub in ["content/projects", "content/blog", "data/locales", "public"] {
            fs::create_dir_all(root.join(sub)).unwrap();
        }
        fs::write(
            root.join("content/blog/a.mdx"),
            "---\ntitle: A\ndate: 2024-01-01\ntags: [Rust]\n---\nFirst post about axum.",
        )
        .unwrap();
        fs::write(
            root.join("content/blog/b.mdx"),
            "---\ntitle: B\ndate: 2024-02-01\nlang: en\n---\n## Intro\n\nSecond post.",
        )
        .unwrap();
        fs::write(
            root.join("content/projects/site.md"),
            "---\ntitle: Site\ndate: 2024-01-01\nfeatured: true\ntechnologies: [Next.js]\n---\nPortfolio.",
        )
        .unwrap();
        fs::write(root.join("data/profile.json"), r#"{"name": "Ada", "city": "Paris"}"#).unwrap();
        fs::write(root.join("data/locales/fr.json"), r#"{"nav": {"home": "Accueil"}}"#).unwrap();
        fs::write(root.join("public/robots.txt"), "User-agent: *").unwrap();
        let folio = Folio::new(root).unwrap();
        (dir, folio)
    }

    fn app(folio: &Folio) -> Router {
        let state = Arc::new(AppState::from_folio(folio).unwrap());
        router(state, folio.public_dir.clone())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn slugs(value: &Value) -> Vec<&str> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["slug"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_list_and_detail() {
        let (_dir, folio) = setup();

        let (status, body) = get_json(app(&folio), "/api/posts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(slugs(&body), vec!["b", "a"]);

        let (status, body) = get_json(app(&folio), "/api/posts/b").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["record"]["title"], "B");
        assert_eq!(body["toc"][0]["slug"], "intro");
        assert_eq!(body["siblings"]["previous"]["slug"], "a");
        assert!(body["siblings"]["next"].is_null());
        assert!(body["html"].as_str().unwrap().contains(r#"id="intro""#));
    }

    #[tokio::test]
    async fn test_not_found_is_json() {
        let (_dir, folio) = setup();

        let (status, body) = get_json(app(&folio), "/api/posts/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("missing"));

        let (status, body) = get_json(app(&folio), "/api/pages").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());

        let (status, body) = get_json(app(&folio), "/nothing/here").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_queries() {
        let (_dir, folio) = setup();

        let (_, body) = get_json(app(&folio), "/api/posts/tags/rust").await;
        assert_eq!(slugs(&body), vec!["a"]);

        let (_, body) = get_json(app(&folio), "/api/projects/technologies/next.js").await;
        assert_eq!(slugs(&body), vec!["site"]);

        let (_, body) = get_json(app(&folio), "/api/posts/search?q=AXUM").await;
        assert_eq!(slugs(&body), vec!["a"]);

        let (_, body) = get_json(app(&folio), "/api/posts/search?q=a").await;
        assert!(body.as_array().unwrap().is_empty());

        let (_, body) = get_json(app(&folio), "/api/posts/recent?limit=5&locale=fr").await;
        assert_eq!(slugs(&body), vec!["a"]);

        let (_, body) = get_json(app(&folio), "/api/projects/featured").await;
        assert_eq!(slugs(&body), vec!["site"]);

        let (_, body) = get_json(app(&folio), "/api/posts/tags").await;
        assert_eq!(body, serde_json::json!(["Rust"]));

        let (_, body) = get_json(app(&folio), "/api/projects/stats").await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["featured"], 1);
    }

    #[tokio::test]
    async fn test_data_and_locales() {
        let (_dir, folio) = setup();

        let (status, body) = get_json(app(&folio), "/api/data/profile").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Ada");

        let (_, body) = get_json(app(&folio), "/api/data/profile.city").await;
        assert_eq!(body, "Paris");

        let (status, _) = get_json(app(&folio), "/api/data/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = get_json(app(&folio), "/api/locales/en").await;
        assert_eq!(body["nav.home"], "Accueil");
    }

    #[tokio::test]
    async fn test_static_assets() {
        let (_dir, folio) = setup();
        let response = app(&folio)
            .oneshot(
                Request::builder()
                    .uri("/robots.txt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reload_swaps_index() {
        let (dir, folio) = setup();
        let state = Arc::new(AppState::from_folio(&folio).unwrap());
        let app = router(state.clone(), folio.public_dir.clone());

        fs::write(
            dir.path().join("content/blog/c.mdx"),
            "---\ntitle: C\ndate: 2024-03-01\n---\nThird.",
        )
        .unwrap();
        state.index.write().await.reload();

        let (_, body) = get_json(app, "/api/posts").await;
        assert_eq!(slugs(&body), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_is_relevant() {
        assert!(is_relevant(std::path::Path::new("content/blog/a.mdx")));
        assert!(!is_relevant(std::path::Path::new("content/.git/index")));
        assert!(!is_relevant(std::path::Path::new("content/blog/a.mdx~")));
    }
}
