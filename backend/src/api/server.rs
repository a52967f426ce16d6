//! HTTP server for the romanization API.
//!
//! # API Endpoints
//!
//! | Method | Path                  | Description                              |
//! |--------|-----------------------|------------------------------------------|
//! | GET    | `/`, `/health`        | Health check                             |
//! | POST   | `/upload`             | Multipart `file` + `column`, runs a job  |
//! | GET    | `/download`           | Latest processed CSV                     |
//! | GET    | `/download/{run_id}`  | Processed CSV of a specific run          |
//! | GET    | `/api/logs`           | SSE stream for real-time logs            |

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, Stage, LOG_BROADCASTER};
use super::types::{error_response, UploadResponse};
use crate::artifact::LATEST_FILE_NAME;
use crate::error::{ArtifactError, PipelineError, ServerError};
use crate::pipeline::NamePipeline;

/// Largest accepted upload.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<NamePipeline>,
}

impl AppState {
    pub fn new(pipeline: NamePipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Build the router with CORS.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/upload", post(upload_csv))
        .route("/download", get(download_latest))
        .route("/download/{run_id}", get(download_run))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

/// Serve on an already-bound listener.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), ServerError> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Start the HTTP server
pub async fn start_server(port: u16, pipeline: NamePipeline) -> Result<(), ServerError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Romanize server running on http://localhost:{}", port);
    println!("   Strategy: {}", pipeline.strategy_name());
    println!("   Artifacts: {}", pipeline.store().dir().display());
    println!("   POST /upload            - Upload CSV (file + column)");
    println!("   GET  /download          - Latest processed CSV");
    println!("   GET  /download/{{run_id}} - Processed CSV of one run");
    println!("   GET  /api/logs          - SSE log stream");
    println!("   GET  /health            - Health check");
    println!();

    let listener = TcpListener::bind(addr).await?;
    serve(listener, AppState::new(pipeline)).await
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "romanize",
        "version": env!("CARGO_PKG_VERSION"),
        "strategy": state.pipeline.strategy_name(),
        "endpoints": {
            "upload": "POST /upload",
            "download": "GET /download",
            "run": "GET /download/{run_id}",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload CSV endpoint
async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ServerError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut column: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        match field.name().unwrap_or("") {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                file_data = Some(bytes.to_vec());
            }
            "column" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                column = Some(text);
            }
            _ => {}
        }
    }

    let bytes = file_data.ok_or_else(|| ServerError::BadRequest("No file provided".into()))?;
    let column = column
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ServerError::BadRequest("No column provided".into()))?;

    log_info(
        Stage::Upload,
        format!(
            "New upload: {} ({} bytes), column '{}'",
            file_name.as_deref().unwrap_or("unknown"),
            bytes.len(),
            column
        ),
    );

    let pipeline = &state.pipeline;
    let outcome = pipeline.run_bytes(&bytes, &column).await?;

    Ok(Json(UploadResponse::from_outcome(
        &outcome,
        &column,
        pipeline.output_column(),
    )))
}

/// Latest artifact download
async fn download_latest(State(state): State<AppState>) -> Result<Response, ServerError> {
    let bytes = state.pipeline.store().read_latest_async().await?;
    Ok(csv_attachment(bytes, LATEST_FILE_NAME))
}

/// Per-run artifact download
async fn download_run(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Response, ServerError> {
    let bytes = state.pipeline.store().read_run_async(&run_id).await?;
    Ok(csv_attachment(bytes, &format!("{run_id}.csv")))
}

fn csv_attachment(bytes: Vec<u8>, file_name: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

fn artifact_status(error: &ArtifactError) -> (StatusCode, &'static str) {
    match error {
        ArtifactError::NotFound(_) => (StatusCode::NOT_FOUND, "artifact_not_found"),
        ArtifactError::InvalidRunId(_) => (StatusCode::BAD_REQUEST, "invalid_run_id"),
        ArtifactError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "artifact_error"),
    }
}

impl ServerError {
    /// HTTP status, error kind and extra body fields.
    fn parts(&self) -> (StatusCode, &'static str, Option<Value>) {
        match self {
            ServerError::Pipeline(e) => {
                let status = match e {
                    PipelineError::Csv(_) | PipelineError::InvalidColumn(_) => StatusCode::BAD_REQUEST,
                    PipelineError::Upstream(_) | PipelineError::Alignment(_) => StatusCode::BAD_GATEWAY,
                    PipelineError::Artifact(a) => artifact_status(a).0,
                };
                let details = match e {
                    PipelineError::InvalidColumn(c) => {
                        Some(json!({ "requested": c.requested, "available": c.available }))
                    }
                    PipelineError::Alignment(a) => {
                        Some(json!({ "expected": a.expected, "actual": a.actual }))
                    }
                    _ => None,
                };
                (status, e.kind(), details)
            }
            ServerError::Artifact(e) => {
                let (status, kind) = artifact_status(e);
                (status, kind, None)
            }
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", None),
            ServerError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, kind, details) = self.parts();
        let message = match &self {
            ServerError::Pipeline(e) => e.to_string(),
            other => other.to_string(),
        };
        (status, Json(error_response(kind, &message, details))).into_response()
    }
}
