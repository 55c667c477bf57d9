use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use shuttle_axum::axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::corrections::CorrectionRecord;
use crate::desk::NewsDesk;
use crate::export::{self, ExportFormat};
use crate::filters::{split_keywords, Filter, FilterLogic, UnknownLogic};
use crate::import;
use crate::menu::MenuEntry;
use crate::metrics;
use crate::scorer::{Classification, Jitter};
use crate::stats::{StatsSnapshot, TopicDistribution};
use crate::store::Article;
use crate::topic::{Topic, TopicChoice};
use crate::weights::TopicWeights;

/// Default number of entries for `/corrections`.
pub const RECENT_CORRECTIONS: usize = 5;

pub type SharedJitter = Arc<Mutex<Box<dyn Jitter + Send>>>;

#[derive(Clone)]
pub struct AppState {
    desk: Arc<RwLock<NewsDesk>>,
    jitter: SharedJitter,
    export_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(desk: NewsDesk, jitter: Box<dyn Jitter + Send>, export_dir: PathBuf) -> Self {
        metrics::set_article_count(desk.articles().len());
        Self {
            desk: Arc::new(RwLock::new(desk)),
            jitter: Arc::new(Mutex::new(jitter)),
            export_dir: Arc::new(export_dir),
        }
    }

    /// Shared handle to the desk (tests inspect state through it).
    pub fn desk(&self) -> Arc<RwLock<NewsDesk>> {
        self.desk.clone()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/topics", get(topics))
        .route("/classify", post(classify))
        .route("/articles", get(list_articles))
        .route("/articles/{id}", get(get_article))
        .route("/articles/{id}/correct", post(correct_article))
        .route("/search", post(search))
        .route("/filters", get(list_filters).post(create_filter))
        .route("/filters/{id}", delete(delete_filter))
        .route("/filters/{id}/toggle", post(toggle_filter))
        .route("/filters/{id}/articles", get(filter_articles))
        .route("/menu", get(menu))
        .route("/stats", get(stats))
        .route("/stats/topics", get(stats_topics))
        .route("/corrections", get(corrections))
        .route("/weights", get(weights))
        .route("/export", post(export_all))
        .route("/export/articles", get(export_articles))
        .route("/export/filters", get(export_filters))
        .route("/export/stats", get(export_stats))
        .route("/import", post(import_articles))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/* ----------------------------
Errors
---------------------------- */

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Internal(e) => {
                error!(error = ?e, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": msg }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn parse_topic(raw: Option<&str>) -> ApiResult<Option<Topic>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|e: crate::topic::UnknownTopic| ApiError::BadRequest(e.to_string())),
    }
}

fn parse_logic(raw: Option<&str>) -> ApiResult<FilterLogic> {
    match raw {
        None => Ok(FilterLogic::default()),
        Some(s) => s
            .parse()
            .map_err(|e: UnknownLogic| ApiError::BadRequest(e.to_string())),
    }
}

fn article_not_found(id: u64) -> ApiError {
    ApiError::NotFound(format!("article {id} not found"))
}

fn filter_not_found(id: u64) -> ApiError {
    ApiError::NotFound(format!("filter {id} not found"))
}

fn owned(v: Vec<&Article>) -> Vec<Article> {
    v.into_iter().cloned().collect()
}

impl AppState {
    fn read(&self) -> std::sync::RwLockReadGuard<'_, NewsDesk> {
        self.desk.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, NewsDesk> {
        self.desk.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/* ----------------------------
Handlers
---------------------------- */

#[derive(Serialize)]
struct TopicOut {
    label: &'static str,
    name: &'static str,
    difficulty: f32,
}

async fn topics() -> Json<Vec<TopicOut>> {
    Json(
        Topic::ALL
            .into_iter()
            .map(|t| TopicOut {
                label: t.label(),
                name: t.english(),
                difficulty: t.difficulty(),
            })
            .collect(),
    )
}

#[derive(Deserialize)]
struct ClassifyReq {
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
}

async fn classify(State(state): State<AppState>, Json(req): Json<ClassifyReq>) -> Json<Classification> {
    let desk = state.read();
    let mut jitter = state.jitter.lock().unwrap_or_else(PoisonError::into_inner);
    Json(desk.classify(&req.title, &req.body, &mut **jitter))
}

#[derive(Deserialize)]
struct ArticlesQuery {
    #[serde(default)]
    topic: Option<String>,
}

async fn list_articles(
    State(state): State<AppState>,
    Query(q): Query<ArticlesQuery>,
) -> ApiResult<Json<Vec<Article>>> {
    let choice: TopicChoice = q
        .topic
        .as_deref()
        .unwrap_or("")
        .parse()
        .map_err(|e: crate::topic::UnknownTopic| ApiError::BadRequest(e.to_string()))?;
    Ok(Json(owned(state.read().evaluate_by_topic(choice))))
}

async fn get_article(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<Json<Article>> {
    state
        .read()
        .article(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| article_not_found(id))
}

#[derive(Deserialize)]
struct CorrectReq {
    topic: String,
}

#[derive(Serialize)]
struct CorrectOut {
    article: Article,
    weights: TopicWeights,
    corrected_count: u32,
}

async fn correct_article(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<CorrectReq>,
) -> ApiResult<Json<CorrectOut>> {
    let topic = parse_topic(Some(&req.topic))?
        .ok_or_else(|| ApiError::BadRequest("topic is required".into()))?;
    let mut desk = state.write();
    if !desk.apply_correction(id, topic) {
        return Err(article_not_found(id));
    }
    let article = desk.article(id).cloned().ok_or_else(|| article_not_found(id))?;
    Ok(Json(CorrectOut {
        article,
        weights: *desk.weights(),
        corrected_count: desk.quality().corrected_count,
    }))
}

/// Either `"a, b, c"` or `["a", "b", "c"]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum KeywordsInput {
    Text(String),
    List(Vec<String>),
}

impl KeywordsInput {
    fn into_keywords(self) -> Vec<String> {
        match self {
            KeywordsInput::Text(s) => split_keywords(&s),
            KeywordsInput::List(v) => v
                .into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct SearchReq {
    #[serde(default)]
    keywords: Option<KeywordsInput>,
    #[serde(default)]
    logic: Option<String>,
    #[serde(default)]
    topic: Option<String>,
}

async fn search(State(state): State<AppState>, Json(req): Json<SearchReq>) -> ApiResult<Json<Vec<Article>>> {
    let logic = parse_logic(req.logic.as_deref())?;
    let topic = parse_topic(req.topic.as_deref())?;
    let keywords = req.keywords.map(KeywordsInput::into_keywords).unwrap_or_default();
    Ok(Json(owned(state.read().evaluate_by_keywords(&keywords, logic, topic))))
}

async fn list_filters(State(state): State<AppState>) -> Json<Vec<Filter>> {
    Json(state.read().filters().all().to_vec())
}

#[derive(Deserialize)]
struct CreateFilterReq {
    name: String,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    keywords: Option<KeywordsInput>,
    #[serde(default)]
    logic: Option<String>,
}

async fn create_filter(
    State(state): State<AppState>,
    Json(req): Json<CreateFilterReq>,
) -> ApiResult<(StatusCode, Json<Filter>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("filter name must not be empty".into()));
    }
    let topic = parse_topic(req.topic.as_deref())?;
    let logic = parse_logic(req.logic.as_deref())?;
    let keywords = req.keywords.map(KeywordsInput::into_keywords).unwrap_or_default();

    let mut desk = state.write();
    let f = desk.create_filter(name, topic, keywords, logic).clone();
    Ok((StatusCode::CREATED, Json(f)))
}

#[derive(Serialize)]
struct ToggleOut {
    id: u64,
    active: bool,
}

async fn toggle_filter(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<Json<ToggleOut>> {
    let active = state.write().toggle_filter(id).ok_or_else(|| filter_not_found(id))?;
    Ok(Json(ToggleOut { id, active }))
}

async fn delete_filter(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<StatusCode> {
    if state.write().delete_filter(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(filter_not_found(id))
    }
}

async fn filter_articles(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Vec<Article>>> {
    let desk = state.read();
    let hits = desk.filter_articles(id).ok_or_else(|| filter_not_found(id))?;
    Ok(Json(owned(hits)))
}

async fn menu(State(state): State<AppState>) -> Json<Vec<MenuEntry>> {
    Json(state.read().menu())
}

async fn stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.read().stats())
}

async fn stats_topics(State(state): State<AppState>) -> Json<Vec<TopicDistribution>> {
    Json(state.read().topic_distribution())
}

#[derive(Deserialize)]
struct CorrectionsQuery {
    #[serde(default)]
    limit: Option<usize>,
}

async fn corrections(
    State(state): State<AppState>,
    Query(q): Query<CorrectionsQuery>,
) -> Json<Vec<CorrectionRecord>> {
    let n = q.limit.unwrap_or(RECENT_CORRECTIONS);
    Json(state.read().recent_corrections(n).to_vec())
}

async fn weights(State(state): State<AppState>) -> Json<TopicWeights> {
    Json(*state.read().weights())
}

#[derive(Serialize)]
struct ExportOut {
    folder: String,
}

async fn export_all(State(state): State<AppState>) -> ApiResult<Json<ExportOut>> {
    let snapshot = state.read().clone();
    let dir = state.export_dir.clone();
    let folder = tokio::task::spawn_blocking(move || export::export_all(&dir, &snapshot))
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("export task failed: {e}")))?
        .map_err(ApiError::Internal)?;
    Ok(Json(ExportOut {
        folder: folder.display().to_string(),
    }))
}

/// Body as a file download named `news_<kind>_<stamp>.<ext>`.
fn attachment(format: ExportFormat, kind: &str, bytes: Vec<u8>) -> Response {
    let name = export::export_file_name(kind, format.extension());
    (
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{name}\"")),
        ],
        bytes,
    )
        .into_response()
}

#[derive(Deserialize)]
struct ExportArticlesQuery {
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    filter: Option<u64>,
}

/// Current feed selection as JSON, CSV or XLSX. `filter` wins over `topic`.
async fn export_articles(
    State(state): State<AppState>,
    Query(q): Query<ExportArticlesQuery>,
) -> ApiResult<Response> {
    let format: ExportFormat = match q.format.as_deref() {
        None => ExportFormat::default(),
        Some(f) => f.parse().map_err(|e: export::UnknownFormat| ApiError::BadRequest(e.to_string()))?,
    };
    let articles = {
        let desk = state.read();
        let hits = match q.filter {
            Some(id) => desk.filter_articles(id).ok_or_else(|| filter_not_found(id))?,
            None => {
                let choice: TopicChoice = q
                    .topic
                    .as_deref()
                    .unwrap_or("")
                    .parse()
                    .map_err(|e: crate::topic::UnknownTopic| ApiError::BadRequest(e.to_string()))?;
                desk.evaluate_by_topic(choice)
            }
        };
        owned(hits)
    };
    if articles.is_empty() {
        return Err(ApiError::NotFound("no articles to export".into()));
    }

    let mut buf = Vec::new();
    export::write_articles(format, &mut buf, &articles).map_err(ApiError::Internal)?;
    info!(count = articles.len(), format = format.extension(), "articles exported");
    Ok(attachment(format, "articles", buf))
}

async fn export_filters(State(state): State<AppState>) -> ApiResult<Response> {
    let mut buf = Vec::new();
    export::write_filters_json(&mut buf, state.read().filters().all()).map_err(ApiError::Internal)?;
    Ok(attachment(ExportFormat::Json, "filters", buf))
}

async fn export_stats(State(state): State<AppState>) -> ApiResult<Response> {
    let mut buf = Vec::new();
    {
        let desk = state.read();
        export::write_stats_json(&mut buf, &desk.stats(), desk.corrections().history())
            .map_err(ApiError::Internal)?;
    }
    Ok(attachment(ExportFormat::Json, "stats", buf))
}

#[derive(Serialize)]
struct ImportOut {
    previous: usize,
    imported: usize,
}

/// Body is an articles export document; replaces the whole store.
async fn import_articles(State(state): State<AppState>, body: String) -> ApiResult<Json<ImportOut>> {
    let articles =
        import::parse_articles_json(&body).map_err(|e| ApiError::BadRequest(format!("{e:#}")))?;
    let imported = articles.len();
    let previous = state.write().replace_articles(articles);
    metrics::set_article_count(imported);
    info!(previous, imported, "articles imported over http");
    Ok(Json(ImportOut { previous, imported }))
}
