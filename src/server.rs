//! JSON HTTP API over the document question-answering pipeline.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/ingest` | Upload a base64-encoded PDF into a scope |
//! | `POST` | `/query` | Ask a question against a scope's content |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! All error responses share one schema:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "missing scope" } }
//! ```
//!
//! Error codes: `bad_request` (400), `embedding_failed` (502),
//! `generation_failed` (502), `ingestion_failed` (500), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! clients.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::ask::AskPipeline;
use crate::config::Config;
use crate::db;
use crate::embedding::create_provider as create_embedder;
use crate::error::Error;
use crate::generation::create_provider as create_generator;
use crate::ingest::{IngestPipeline, IngestReport};
use crate::migrate;
use crate::models::Sender;
use crate::store::ContentStore;

/// Shared application state passed to all route handlers via Axum's `State`
/// extractor.
#[derive(Clone)]
struct AppState {
    store: ContentStore,
    ingest: Arc<IngestPipeline>,
    ask: Arc<AskPipeline>,
}

/// Starts the HTTP server.
///
/// Applies migrations, wires the embedding and generation providers from
/// config, binds to `[server].bind`, and serves until the process is
/// terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    migrate::run_migrations(config).await?;

    let pool = db::connect(config).await?;
    let store = ContentStore::new(pool);
    let embedder = create_embedder(&config.embedding)?;
    let generator = create_generator(&config.generation)?;

    let ingest = Arc::new(IngestPipeline::new(
        store.clone(),
        embedder.clone(),
        config.chunking.clone(),
    ));
    let ask = Arc::new(AskPipeline::new(
        store.clone(),
        embedder,
        generator,
        config.retrieval.top_k,
    ));

    let state = AppState { store, ingest, ask };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state).layer(cors);

    let bind_addr = config.server.bind.clone();
    println!("docqa server listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/ingest", post(handle_ingest))
        .route("/query", post(handle_query))
        .route("/health", get(handle_health))
        .with_state(state)
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        let (status, code) = match err {
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Error::Embedding(_) => (StatusCode::BAD_GATEWAY, "embedding_failed"),
            Error::Generation(_) => (StatusCode::BAD_GATEWAY, "generation_failed"),
            Error::Ingestion(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ingestion_failed"),
            Error::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        AppError {
            status,
            code: code.to_string(),
            message,
        }
    }
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    /// The crate version from `Cargo.toml`.
    version: String,
}

/// Handler for `GET /health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /ingest ============

/// JSON request body for `POST /ingest`.
#[derive(Deserialize)]
struct IngestRequest {
    /// Scope (collection) the document belongs to.
    scope: String,
    /// Identity of the uploader, recorded on every stored chunk.
    sender_id: String,
    /// Role of the uploader (e.g. `"user"`).
    sender_role: String,
    /// Base64-encoded PDF bytes.
    data: String,
    /// When true, skip ingestion if the scope already has content.
    #[serde(default)]
    if_empty: bool,
}

/// JSON response body for `POST /ingest`.
#[derive(Serialize)]
struct IngestResponse {
    /// False when `if_empty` was set and the scope already had content.
    ingested: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<IngestReport>,
}

/// Handler for `POST /ingest`.
///
/// Decodes the payload, spools it, and runs the full partition → chunk →
/// embed → store pipeline. With `if_empty: true` a non-empty scope is left
/// untouched and `ingested: false` is returned.
async fn handle_ingest(
    State(state): State<AppState>,
    Json(req): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, AppError> {
    let data = base64::engine::general_purpose::STANDARD
        .decode(&req.data)
        .map_err(|e| bad_request(format!("invalid base64 payload: {}", e)))?;

    if req.if_empty && state.store.scope_has_content(&req.scope).await? {
        return Ok(Json(IngestResponse {
            ingested: false,
            report: None,
        }));
    }

    let producer = Sender::new(&req.sender_id, &req.sender_role);
    let report = state
        .ingest
        .ingest_document(&data, &req.scope, &producer)
        .await?;

    Ok(Json(IngestResponse {
        ingested: true,
        report: Some(report),
    }))
}

// ============ POST /query ============

/// JSON request body for `POST /query`.
#[derive(Deserialize)]
struct QueryRequest {
    /// The question, used verbatim as the answer-cache key.
    query: String,
    /// Scope whose content provides the context.
    scope: String,
    /// Identity of the asker.
    user_id: String,
}

/// JSON response body for `POST /query`.
#[derive(Serialize)]
struct QueryResponse {
    answer: String,
    /// True when the answer came from the cache without a model call.
    cache_hit: bool,
}

/// Handler for `POST /query`.
async fn handle_query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    let outcome = state.ask.ask(&req.query, &req.scope, &req.user_id).await?;

    Ok(Json(QueryResponse {
        answer: outcome.answer,
        cache_hit: outcome.cache_hit,
    }))
}
