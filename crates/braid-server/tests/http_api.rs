//! HTTP API behavior end to end, over an in-memory store.
//!
//! Core guarantees exercised here:
//! - the timeline endpoint returns only nodes and edges
//! - variants are served per node from the same cached build
//! - bad requests answer 400 with an `{ "error" }` body
//! - invalidation answers 204 and forces a rebuild
//! - an unreadable invalidation body answers 400 and drops nothing

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use braid_cache::{CacheKey, TimelineCache};
use braid_core::TimelineService;
use braid_model::{MessageRecord, Subject};
use braid_server::{router, AppState};
use braid_store::MemoryLogStore;
use braid_test_utils::{log_id, text_message, text_messages};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn app() -> (Arc<MemoryLogStore>, Router) {
    let (store, _cache, router) = app_with_cache().await;
    (store, router)
}

async fn app_with_cache() -> (Arc<MemoryLogStore>, TimelineCache, Router) {
    let store = Arc::new(MemoryLogStore::new());
    let subject = Subject::character("Bot").unwrap();
    store.insert_log(&subject, log_id("A"), text_messages(&["hi", "bye"])).await;
    store
        .insert_log(
            &subject,
            log_id("B"),
            vec![
                text_message(0, "hi"),
                MessageRecord::new("Bot", "later").with_swipes(["sooner", "later"]),
            ],
        )
        .await;

    let other = Subject::character("Other").unwrap();
    store.insert_log(&other, log_id("A"), text_messages(&["hello"])).await;

    let cache = TimelineCache::new(100);
    let service = TimelineService::new(store.clone(), cache.clone());
    (store, cache, router(AppState::new(service)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    match body {
        Some(payload) => send_raw(app, method, uri, Some("application/json"), payload.to_string()).await,
        None => send_raw(app, method, uri, None, String::new()).await,
    }
}

async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: String,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        request = request.header("content-type", content_type);
    }
    let body = Body::from(body);
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), 4 * 1024 * 1024).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_is_ok() {
    let (_store, app) = app().await;
    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

/// The graph payload carries nodes and edges, never stored alternates.
#[tokio::test]
async fn timeline_returns_compact_graph() {
    let (_store, app) = app().await;
    let (status, body) = send(&app, "POST", "/timeline", Some(json!({"subject": "Bot", "isGroup": false}))).await;

    assert_eq!(status, StatusCode::OK);
    let nodes = body["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 4);
    assert_eq!(body["edges"].as_array().unwrap().len(), 3);
    assert_eq!(nodes[0]["id"], 0);
    assert_eq!(nodes[0]["kind"], "root");
    assert!(!body.to_string().contains("sooner"));

    let later = nodes.iter().find(|n| n["text"] == "later").unwrap();
    assert_eq!(later["totalSwipes"], 2);
    assert_eq!(later["currentSwipeIndex"], 1);
}

/// Alternates are fetched per parent node after the graph is built.
#[tokio::test]
async fn swipes_come_from_cached_build() {
    let (_store, app) = app().await;
    let request = json!({"nodeId": 1, "subject": "Bot", "isGroup": false});

    let (status, body) = send(&app, "POST", "/timeline/swipes", Some(request.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("has not been built"));

    send(&app, "POST", "/timeline", Some(json!({"subject": "Bot"}))).await;
    let (status, body) = send(&app, "POST", "/timeline/swipes", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalSwipes"], 2);
    assert_eq!(body["currentSwipeIndex"], 1);
    assert_eq!(body["swipes"][0]["node"]["text"], "sooner");
    assert_eq!(body["swipes"][0]["edge"]["isSwipe"], true);
}

/// A missing subject is the client's fault.
#[tokio::test]
async fn missing_subject_is_bad_request() {
    let (_store, app) = app().await;
    let (status, body) = send(&app, "POST", "/timeline", Some(json!({"isGroup": false}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad request: missing subject");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let (_store, app) = app().await;
    let (status, body) = send(&app, "POST", "/timeline/swipes", Some(json!({"nodeId": "one"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unknown_subject_is_not_found() {
    let (_store, app) = app().await;
    let (status, _) = send(&app, "POST", "/timeline", Some(json!({"subject": "Nobody"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Invalidation with an empty body drops everything; the next request rebuilds.
#[tokio::test]
async fn invalidate_forces_rebuild() {
    let (store, app) = app().await;
    let request = json!({"subject": "Bot"});
    let (_, before) = send(&app, "POST", "/timeline", Some(request.clone())).await;
    assert_eq!(before["nodes"].as_array().unwrap().len(), 4);

    let subject = Subject::character("Bot").unwrap();
    store.insert_log(&subject, log_id("C"), text_messages(&["howdy"])).await;

    let (status, _) = send(&app, "POST", "/timeline/invalidate", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, after) = send(&app, "POST", "/timeline", Some(request)).await;
    assert_eq!(after["nodes"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn invalidate_one_subject() {
    let (_store, app) = app().await;
    let (status, _) = send(&app, "POST", "/timeline/invalidate", Some(json!({"subject": "Bot"}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

/// A body that names a subject but cannot be read is rejected; nothing is dropped.
#[tokio::test]
async fn malformed_invalidate_keeps_cache() {
    let (_store, cache, app) = app_with_cache().await;
    send(&app, "POST", "/timeline", Some(json!({"subject": "Bot"}))).await;
    send(&app, "POST", "/timeline", Some(json!({"subject": "Other"}))).await;

    let (status, body) = send_raw(
        &app,
        "POST",
        "/timeline/invalidate",
        Some("text/plain"),
        json!({"subject": "Bot"}).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, "POST", "/timeline/invalidate", Some(json!({"subject": 42}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(cache.contains(&CacheKey::new("Bot", false)).await);
    assert!(cache.contains(&CacheKey::new("Other", false)).await);
}

/// A well-formed targeted invalidation leaves other subjects cached.
#[tokio::test]
async fn targeted_invalidate_spares_other_subjects() {
    let (_store, cache, app) = app_with_cache().await;
    send(&app, "POST", "/timeline", Some(json!({"subject": "Bot"}))).await;
    send(&app, "POST", "/timeline", Some(json!({"subject": "Other"}))).await;

    let (status, _) = send(&app, "POST", "/timeline/invalidate", Some(json!({"subject": "Bot"}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert!(!cache.contains(&CacheKey::new("Bot", false)).await);
    assert!(cache.contains(&CacheKey::new("Other", false)).await);
}
