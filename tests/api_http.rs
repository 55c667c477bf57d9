// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health, /topics
// - POST /classify
// - GET /articles (+ topic filter, unknown topic)
// - POST /articles/{id}/correct (+ 404)
// - POST /search, filter CRUD, /menu
// - GET /stats, /corrections, /weights
// - POST /export, POST /import
// - GET /export/articles (json/csv/xlsx, by topic or filter), /export/filters, /export/stats

use serde_json::json;
use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use news_classify::{build_state, create_router, AppConfig, AppState};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Deterministic state: no jitter, demo filters on, exports into `dir`.
fn test_state(dir: &std::path::Path) -> AppState {
    let cfg = AppConfig {
        jitter: false,
        export_dir: dir.to_path_buf(),
        ..AppConfig::default()
    };
    build_state(&cfg).expect("build state")
}

fn test_router() -> Router {
    create_router(test_state(&std::env::temp_dir()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Json>) -> (StatusCode, Json) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    };
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v = if bytes.is_empty() {
        Json::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Json::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, v)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Json::String("ok".into()));
}

#[tokio::test]
async fn api_topics_lists_eight_in_order() {
    let app = test_router();
    let (status, body) = send(&app, "GET", "/topics", None).await;
    assert_eq!(status, StatusCode::OK);
    let arr = body.as_array().expect("array");
    assert_eq!(arr.len(), 8);
    assert_eq!(arr[0]["label"], json!("Политика"));
    assert_eq!(arr[7]["name"], json!("Education"));
}

#[tokio::test]
async fn api_classify_politics_headline() {
    let app = test_router();
    let payload = json!({
        "title": "Президент подписал новый закон о выборах",
        "body": "Документ вносит изменения в избирательное законодательство."
    });
    let (status, body) = send(&app, "POST", "/classify", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topic"], json!("Политика"));
    let c = body["confidence"].as_f64().expect("confidence");
    assert!(c > 0.90 && c <= 0.98, "confidence {c}");
    assert_eq!(body["scores"].as_array().map(|a| a.len()), Some(8));
}

#[tokio::test]
async fn api_articles_filter_by_topic() {
    let app = test_router();
    let (_, all) = send(&app, "GET", "/articles", None).await;
    assert_eq!(all.as_array().map(|a| a.len()), Some(23));

    let (status, sport) = send(&app, "GET", "/articles?topic=Sport", None).await;
    assert_eq!(status, StatusCode::OK);
    let sport = sport.as_array().expect("array");
    assert!(!sport.is_empty());
    assert!(sport.iter().all(|a| a["predicted_topic"] == json!("Спорт")));

    let (status, err) = send(&app, "GET", "/articles?topic=Weather", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].as_str().is_some());
}

#[tokio::test]
async fn api_correct_article_updates_state() {
    let app = test_router();
    let (status, body) = send(&app, "POST", "/articles/5/correct", Some(json!({ "topic": "Экономика" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["article"]["predicted_topic"], json!("Экономика"));
    assert_eq!(body["article"]["true_topic"], json!("Экономика"));
    assert_eq!(body["article"]["confidence"], json!(1.0));
    assert_eq!(body["corrected_count"], json!(1));
    let w = body["weights"]["Экономика"].as_f64().expect("weight");
    assert!((w - 1.07).abs() < 1e-4);

    let (_, hist) = send(&app, "GET", "/corrections", None).await;
    let hist = hist.as_array().expect("array");
    assert_eq!(hist.len(), 1);
    assert_eq!(hist[0]["article_id"], json!(5));
    assert_eq!(hist[0]["old_topic"], json!("Спорт"));

    let (_, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(stats["corrected_count"], json!(1));
    assert_eq!(stats["total_articles"], json!(23));
}

#[tokio::test]
async fn api_correct_unknown_article_is_404_and_bad_topic_400() {
    let app = test_router();
    let (status, _) = send(&app, "POST", "/articles/999/correct", Some(json!({ "topic": "Спорт" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "POST", "/articles/1/correct", Some(json!({ "topic": "Погода" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, hist) = send(&app, "GET", "/corrections", None).await;
    assert_eq!(hist.as_array().map(|a| a.len()), Some(0));
}

#[tokio::test]
async fn api_search_keywords_text_and_list() {
    let app = test_router();
    let (status, body) = send(
        &app,
        "POST",
        "/search",
        Some(json!({ "keywords": "криптовалют, биткоин", "logic": "OR" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<u64> = body
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|a| a["id"].as_u64())
        .collect();
    assert_eq!(ids, vec![22]);

    let (_, empty) = send(&app, "POST", "/search", Some(json!({ "keywords": [] }))).await;
    assert_eq!(empty.as_array().map(|a| a.len()), Some(0));

    let (status, err) = send(&app, "POST", "/search", Some(json!({ "keywords": "x", "logic": "XOR" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], json!("unknown filter logic `XOR` (expected AND or OR)"));
}

#[tokio::test]
async fn api_filter_lifecycle_and_menu() {
    let app = test_router();

    let (_, menu) = send(&app, "GET", "/menu", None).await;
    let menu = menu.as_array().expect("array");
    // all + 8 topics + divider + header + 5 demo filters
    assert_eq!(menu.len(), 16);
    assert_eq!(menu[0]["kind"], json!("all_topics"));
    assert_eq!(menu[9]["kind"], json!("divider"));
    assert_eq!(menu[11]["kind"], json!("user_filter"));
    assert_eq!(menu[11]["keywords_preview"], json!("искусственный интеллект, диагностика..."));

    let (status, created) = send(
        &app,
        "POST",
        "/filters",
        Some(json!({ "name": "  Квант ", "keywords": "квантов", "logic": "and" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], json!(6));
    assert_eq!(created["name"], json!("Квант"));
    assert_eq!(created["logic"], json!("AND"));

    let (_, hits) = send(&app, "GET", "/filters/6/articles", None).await;
    let ids: Vec<u64> = hits.as_array().expect("array").iter().filter_map(|a| a["id"].as_u64()).collect();
    assert_eq!(ids, vec![3, 23]);

    let (status, t) = send(&app, "POST", "/filters/6/toggle", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(t["active"], json!(false));

    let (status, _) = send(&app, "DELETE", "/filters/6", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", "/filters/6", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "POST", "/filters/6/toggle", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, again) = send(&app, "POST", "/filters", Some(json!({ "name": "next" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(again["id"], json!(7), "ids are never reused");
}

#[tokio::test]
async fn api_filter_with_blank_name_is_rejected() {
    let app = test_router();
    let (status, body) = send(&app, "POST", "/filters", Some(json!({ "name": "   ", "keywords": ["a"] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());
    let (_, filters) = send(&app, "GET", "/filters", None).await;
    assert_eq!(filters.as_array().map(|a| a.len()), Some(5));
}

#[tokio::test]
async fn api_weights_and_topic_stats() {
    let app = test_router();
    let (_, w) = send(&app, "GET", "/weights", None).await;
    assert_eq!(w.as_object().map(|o| o.len()), Some(8));
    assert_eq!(w["Спорт"], json!(1.0));

    let (_, dist) = send(&app, "GET", "/stats/topics", None).await;
    let total: u64 = dist
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|d| d["count"].as_u64())
        .sum();
    assert_eq!(total, 23);
}

#[tokio::test]
async fn api_export_then_import_roundtrip() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let app = create_router(test_state(tmp.path()));

    let (status, out) = send(&app, "POST", "/export", None).await;
    assert_eq!(status, StatusCode::OK);
    let folder = std::path::PathBuf::from(out["folder"].as_str().expect("folder"));
    assert!(folder.join("README.txt").is_file());

    let articles = std::fs::read_to_string(folder.join("articles.json")).expect("articles.json");
    let mut doc: Json = serde_json::from_str(&articles).expect("json");
    doc["articles"].as_array_mut().expect("array").truncate(3);

    let req = Request::builder()
        .method("POST")
        .uri("/import")
        .body(Body::from(doc.to_string()))
        .expect("build import");
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    assert_eq!(resp.status(), StatusCode::OK);

    let (_, all) = send(&app, "GET", "/articles", None).await;
    assert_eq!(all.as_array().map(|a| a.len()), Some(3));

    let (status, _) = send(&app, "POST", "/import", Some(json!({ "nope": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

async fn download(app: &Router, uri: &str) -> (StatusCode, String, Vec<u8>) {
    let req = Request::builder().method("GET").uri(uri).body(Body::empty()).expect("build request");
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.expect("read body");
    (status, content_type, bytes.to_vec())
}

#[tokio::test]
async fn api_export_articles_as_csv_for_a_topic() {
    let app = test_router();
    let (_, sport) = send(&app, "GET", "/articles?topic=Sport", None).await;
    let sport_count = sport.as_array().map(|a| a.len()).expect("array");

    let (status, content_type, bytes) = download(&app, "/export/articles?format=csv&topic=Sport").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/csv"), "got {content_type}");
    let text = String::from_utf8(bytes).expect("utf8");
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("id,title,content,source,date,predicted_topic,confidence,true_topic,is_corrected")
    );
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), sport_count);
    assert!(rows.iter().all(|r| r.contains(",Спорт,") && r.ends_with(",Нет")));
}

#[tokio::test]
async fn api_export_articles_by_filter_and_formats() {
    let app = test_router();

    // demo filter 2 (crypto) matches only article 22
    let (status, _, bytes) = download(&app, "/export/articles?filter=2").await;
    assert_eq!(status, StatusCode::OK);
    let doc: Json = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(doc["total_articles"], json!(1));
    assert_eq!(doc["articles"][0]["id"], json!(22));

    let (status, content_type, bytes) = download(&app, "/export/articles?format=xlsx").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.contains("spreadsheetml"));
    assert!(bytes.starts_with(b"PK"));

    let (status, _, _) = download(&app, "/export/articles?format=pdf").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _, _) = download(&app, "/export/articles?filter=99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, created) = send(&app, "POST", "/filters", Some(json!({ "name": "пусто", "keywords": "zzzz" }))).await;
    let uri = format!("/export/articles?filter={}", created["id"]);
    let (status, _, _) = download(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "empty selection is not exported");
}

#[tokio::test]
async fn api_export_filters_and_stats_documents() {
    let app = test_router();
    let (status, _) = send(&app, "POST", "/articles/3/correct", Some(json!({ "topic": "Наука" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, content_type, bytes) = download(&app, "/export/filters").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/json");
    let filters: Json = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(filters["total_filters"], json!(5));

    let (_, _, bytes) = download(&app, "/export/stats").await;
    let stats: Json = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(stats["summary"]["total_corrections"], json!(1));
    assert_eq!(stats["correction_history"][0]["article_id"], json!(3));
}
