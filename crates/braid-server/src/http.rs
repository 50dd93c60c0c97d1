//! HTTP routes

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use braid_core::{ServiceError, TimelineRequest, TimelineService, VariantsRequest};
use braid_graph::{Timeline, VariantSet};
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;

/// Health endpoint path.
pub const HEALTH_PATH: &str = "/health";
/// Timeline graph endpoint path.
pub const TIMELINE_PATH: &str = "/timeline";
/// Variant lookup endpoint path.
pub const SWIPES_PATH: &str = "/timeline/swipes";
/// Cache invalidation endpoint path.
pub const INVALIDATE_PATH: &str = "/timeline/invalidate";

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Timeline service
    pub service: Arc<TimelineService>,
}

impl AppState {
    /// Create state around a service
    pub fn new(service: TimelineService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Error returned to HTTP clients as `{ "error": message }`
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed body or unusable subject
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Subject or timeline does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (code, body).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        if e.is_client_error() {
            ApiError::BadRequest(e.to_string())
        } else if e.is_not_found() {
            ApiError::NotFound(e.to_string())
        } else {
            tracing::error!(error = %e, "timeline request failed");
            ApiError::Internal(e.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

/// Graph part of a cached timeline, serialized without copying it
#[derive(Debug)]
struct GraphBody(Arc<Timeline>);

impl Serialize for GraphBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.graph.serialize(serializer)
    }
}

/// Body of an invalidation request
#[derive(Debug, Default, Deserialize)]
pub struct InvalidateRequest {
    /// Subject to drop; absent or blank drops everything
    #[serde(default)]
    pub subject: Option<String>,
}

/// Build health routes.
pub fn health_routes() -> Router<AppState> {
    Router::new().route(HEALTH_PATH, get(health))
}

/// Build timeline routes.
pub fn timeline_routes() -> Router<AppState> {
    Router::new()
        .route(TIMELINE_PATH, post(timeline))
        .route(SWIPES_PATH, post(swipes))
        .route(INVALIDATE_PATH, post(invalidate))
}

/// Full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(timeline_routes())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn timeline(
    State(state): State<AppState>,
    body: Result<Json<TimelineRequest>, JsonRejection>,
) -> Result<Json<GraphBody>, ApiError> {
    let Json(request) = body?;
    let timeline = state.service.timeline(&request).await?;
    Ok(Json(GraphBody(timeline)))
}

async fn swipes(
    State(state): State<AppState>,
    body: Result<Json<VariantsRequest>, JsonRejection>,
) -> Result<Json<VariantSet>, ApiError> {
    let Json(request) = body?;
    Ok(Json(state.service.variants(&request).await?))
}

async fn invalidate(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Result<StatusCode, ApiError> {
    let request = invalidate_request(&headers, &body)?;
    state.service.invalidate(request.subject.as_deref()).await;
    tracing::info!(subject = ?request.subject, "invalidated timeline cache");
    Ok(StatusCode::NO_CONTENT)
}

/// An empty body drops everything; anything else must be a valid JSON request.
fn invalidate_request(headers: &HeaderMap, body: &[u8]) -> Result<InvalidateRequest, ApiError> {
    if body.is_empty() {
        return Ok(InvalidateRequest::default());
    }
    if !has_json_content_type(headers) {
        return Err(ApiError::BadRequest(
            "Expected request with `Content-Type: application/json`".to_string(),
        ));
    }
    let Json(request) = Json::<InvalidateRequest>::from_bytes(body)?;
    Ok(request)
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .is_some_and(|essence| essence == "application/json" || essence.ends_with("+json"))
}
