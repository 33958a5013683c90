//! HTTP API.
//!
//! | Route | Body | Success |
//! |-------|------|---------|
//! | `POST /api/index` | multipart, field `file` | `{ ok, chunks, provider }` |
//! | `POST /api/ask` | JSON `{ question }` | `{ answer, sources, chunks, llmProvider }` |
//! | `GET /api/health` | | `{ ok, indexed, chunks }` |
//!
//! Failures answer `{ error }` with a status derived from [`ErrorKind`].

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use docqa_core::{Error, ErrorKind};
use docqa_index::DocumentIndexer;
use docqa_query::QueryOrchestrator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;

/// Provider label reported after indexing.
pub const INDEX_PROVIDER: &str = "HuggingFace";

/// Provider label reported with answers.
pub const LLM_PROVIDER: &str = "HuggingFace Inference";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    indexer: Arc<DocumentIndexer>,
    orchestrator: Arc<QueryOrchestrator>,
    max_upload_bytes: usize,
}

impl AppState {
    /// Create handler state. Both components must share one document index.
    pub fn new(
        indexer: Arc<DocumentIndexer>,
        orchestrator: Arc<QueryOrchestrator>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            indexer,
            orchestrator,
            max_upload_bytes,
        }
    }

    /// The upload pipeline.
    pub fn indexer(&self) -> &Arc<DocumentIndexer> {
        &self.indexer
    }

    /// The question answering pipeline.
    pub fn orchestrator(&self) -> &Arc<QueryOrchestrator> {
        &self.orchestrator
    }
}

/// Build the application router.
pub fn router(state: AppState, server: &ServerConfig) -> Router {
    let api = Router::new()
        .route("/api/index", post(index_document))
        .route("/api/ask", post(ask))
        .route("/api/health", get(health))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .with_state(state);

    let app = match server.static_dir.as_ref().filter(|dir| dir.is_dir()) {
        Some(dir) => {
            info!("Serving static files from {}", dir.display());
            api.fallback_service(ServeDir::new(dir))
        }
        None => api,
    };

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Serialize)]
struct IndexResponse {
    ok: bool,
    chunks: usize,
    provider: &'static str,
}

#[derive(Deserialize)]
struct AskRequest {
    #[serde(default)]
    question: Option<String>,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    sources: Vec<SourceRef>,
    chunks: usize,
    #[serde(rename = "llmProvider")]
    llm_provider: &'static str,
}

#[derive(Serialize)]
struct SourceRef {
    chunk: u32,
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    indexed: bool,
    chunks: usize,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// An [`Error`] rendered as `{ error }` with a matching status.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

/// HTTP status for an error class.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput | ErrorKind::InvalidQuestion | ErrorKind::NotIndexed => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::LimitExceeded => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Provider | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind());
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn index_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<IndexResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        debug!("Multipart rejected: {}", e);
        Error::NoFile
    })?;

    let mut data = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(&e, state.max_upload_bytes))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| upload_error(&e, state.max_upload_bytes))?;
            data = Some(bytes);
            break;
        }
    }

    let data = data.filter(|d| !d.is_empty()).ok_or(Error::NoFile)?;
    info!("Indexing upload of {} bytes", data.len());

    let chunks = state.indexer.index_document(&data).await?;
    Ok(Json(IndexResponse {
        ok: true,
        chunks,
        provider: INDEX_PROVIDER,
    }))
}

fn upload_error(err: &MultipartError, max_upload_bytes: usize) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::LimitExceeded(format!(
            "Upload exceeds the {max_upload_bytes} byte limit."
        ))
    } else {
        debug!("Multipart read failed: {}", err);
        Error::NoFile
    }
}

async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let question = payload
        .ok()
        .and_then(|Json(req)| req.question)
        .ok_or(Error::InvalidQuestion)?;

    let answer = state.orchestrator.ask(&question).await?;
    Ok(Json(AskResponse {
        answer: answer.answer,
        sources: answer
            .sources
            .iter()
            .map(|s| SourceRef { chunk: s.position })
            .collect(),
        chunks: answer.total_chunks,
        llm_provider: LLM_PROVIDER,
    }))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.indexer.index().stats().await;
    Json(HealthResponse {
        ok: true,
        indexed: stats.indexed,
        chunks: stats.total_chunks,
    })
}
