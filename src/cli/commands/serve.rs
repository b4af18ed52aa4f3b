//! HTTP API server for the browser frontend.
//!
//! Upload a video, generate subtitles for it, then render a copy with the
//! subtitles burned in. Long requests run to completion inside the handler;
//! clients that pass their own `taskId` can poll `/api/status/{taskId}`
//! meanwhile.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::SubburnError;
use crate::jobs::{JobRegistry, JobState};
use crate::layout::{DisplayCue, RecognizedSpan};
use crate::markup::{CueDocument, StyleSpec};
use crate::orchestrator::{LayoutOverrides, Orchestrator};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
    settings: Settings,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    std::fs::create_dir_all(settings.upload_dir())?;
    std::fs::create_dir_all(settings.output_dir())?;

    let orchestrator = Orchestrator::new(settings.clone())?;
    let state = Arc::new(AppState {
        orchestrator,
        settings,
    });
    let app = router(state.clone());

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Subburn API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Upload", "POST /api/upload");
    Output::kv("Generate subtitles", "POST /api/generate-subtitles");
    Output::kv("Create video", "POST /api/create-video");
    Output::kv("Task status", "GET  /api/status/{task_id}");
    Output::kv("Download", "GET  /api/download/{filename}");
    println!();
    Output::kv("Uploads", &state.settings.upload_dir().display().to_string());
    Output::kv("Rendered videos", &state.settings.output_dir().display().to_string());
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = state.settings.server.max_upload_mb.saturating_mul(1024 * 1024);

    Router::new()
        .route("/health", get(health))
        .route("/api/test", get(api_test))
        .route("/api/upload", post(upload))
        .route("/api/generate-subtitles", post(generate_subtitles))
        .route("/api/create-video", post(create_video))
        .route("/api/status/{task_id}", get(status))
        .route("/api/download/{filename}", get(download))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

// === Errors ===

/// An error with its HTTP status, rendered as `{"error": "..."}`.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<SubburnError> for ApiError {
    fn from(e: SubburnError) -> Self {
        let status = match &e {
            SubburnError::NotFound(_) => StatusCode::NOT_FOUND,
            SubburnError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        SubburnError::from(e).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!("Request failed: {}", self.message);
        }
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

// === Request/Response Types ===

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    filename: String,
    task_id: Uuid,
    size: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    filename: String,
    #[serde(default, alias = "task_id")]
    task_id: Option<Uuid>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(flatten)]
    layout: LayoutOverrides,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    task_id: Uuid,
    #[serde(flatten)]
    document: CueDocument,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateVideoRequest {
    filename: String,
    subtitles: Subtitles,
    #[serde(default)]
    style: VideoStyle,
    #[serde(default, alias = "task_id")]
    task_id: Option<Uuid>,
}

/// Subtitles to burn in: cues as returned by `generate-subtitles` (and
/// possibly edited by the client), or raw recognizer spans to lay out.
#[derive(Deserialize)]
#[serde(untagged)]
enum Subtitles {
    Cues(Vec<DisplayCue>),
    Spans(Vec<RecognizedSpan>),
}

/// Style plus the layout limits the frontend sends alongside it.
#[derive(Deserialize, Default)]
struct VideoStyle {
    #[serde(default, alias = "maxLines")]
    max_lines: Option<usize>,
    #[serde(default, alias = "maxWidth", alias = "maxWidthPercent")]
    max_width: Option<f64>,
    #[serde(flatten)]
    spec: StyleSpec,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateVideoResponse {
    task_id: Uuid,
    output_filename: String,
    cue_count: usize,
    font_size: u32,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn api_test() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "message": "API is working" }))
}

async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let jobs = state.orchestrator.jobs();
    let task_id = Uuid::new_v4();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original = field.file_name().unwrap_or_default().to_string();
        let safe = secure_filename(&original);
        if safe.is_empty() {
            return Err(ApiError::bad_request("No selected file"));
        }
        if !state.settings.media.is_allowed(&safe) {
            return Err(ApiError::bad_request(format!("File type not allowed: {}", original)));
        }

        let stored = unique_name(&safe);
        let upload_dir = state.settings.upload_dir();
        tokio::fs::create_dir_all(&upload_dir).await?;
        let path = upload_dir.join(&stored);

        jobs.update(task_id, JobState::Uploading, 0, format!("Receiving {}", original));
        let written = receive_upload(field, &path, &jobs, task_id).await?;

        info!("Stored upload {} ({} bytes)", stored, written);
        jobs.update(task_id, JobState::Completed, 100, "Upload complete");
        return Ok(Json(UploadResponse {
            filename: stored,
            task_id,
            size: written,
        }));
    }

    Err(ApiError::bad_request("No file part"))
}

/// Stream upload chunks into `path`. On any failure the partial file is
/// removed and the job is marked failed.
async fn receive_upload<S, E>(
    chunks: S,
    path: &std::path::Path,
    jobs: &JobRegistry,
    task_id: Uuid,
) -> ApiResult<u64>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    let result = write_chunks(chunks, path, jobs, task_id).await;
    if let Err(e) = &result {
        jobs.fail(task_id, e.message.clone());
        if let Err(rm) = tokio::fs::remove_file(path).await {
            if rm.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not remove partial upload {:?}: {}", path, rm);
            }
        }
    }
    result
}

async fn write_chunks<S, E>(
    chunks: S,
    path: &std::path::Path,
    jobs: &JobRegistry,
    task_id: Uuid,
) -> ApiResult<u64>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    let mut chunks = std::pin::pin!(chunks);
    let mut file = tokio::fs::File::create(path).await?;
    let mut written: u64 = 0;

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(|e| ApiError::bad_request(e.to_string()))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
        jobs.update(
            task_id,
            JobState::Uploading,
            50,
            format!("Received {:.1} MB", written as f64 / (1024.0 * 1024.0)),
        );
    }
    file.flush().await?;
    Ok(written)
}

async fn generate_subtitles(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    let media = upload_path(&state.settings, &req.filename)?;
    let task_id = req.task_id.unwrap_or_else(Uuid::new_v4);
    state
        .orchestrator
        .jobs()
        .update(task_id, JobState::Started, 0, "Starting transcription");

    let document = state
        .orchestrator
        .transcribe_media(
            &media,
            &req.layout,
            req.language.as_deref(),
            req.model.as_deref(),
            Some(task_id),
        )
        .await?;

    Ok(Json(GenerateResponse { task_id, document }))
}

async fn create_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateVideoRequest>,
) -> ApiResult<Json<CreateVideoResponse>> {
    let media = upload_path(&state.settings, &req.filename)?;
    let task_id = req.task_id.unwrap_or_else(Uuid::new_v4);
    state
        .orchestrator
        .jobs()
        .update(task_id, JobState::Started, 0, "Starting video creation");

    let output_filename = rendered_name(&req.filename);
    let output = state.settings.output_dir().join(&output_filename);
    let overrides = LayoutOverrides {
        max_lines: req.style.max_lines,
        max_width_percent: req.style.max_width,
        font_size: None,
    };

    let orchestrator = &state.orchestrator;
    let style = &req.style.spec;
    let job = Some(task_id);
    let outcome = match &req.subtitles {
        Subtitles::Cues(cues) => {
            orchestrator
                .render_cues(&media, cues, style, &overrides, &output, job)
                .await?
        }
        Subtitles::Spans(spans) => {
            orchestrator
                .render_video(&media, spans, style, &overrides, &output, job)
                .await?
        }
    };

    Ok(Json(CreateVideoResponse {
        task_id,
        output_filename,
        cue_count: outcome.cue_count,
        font_size: outcome.layout.font_size,
    }))
}

async fn status(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = Uuid::parse_str(&task_id)
        .map_err(|_| ApiError::bad_request(format!("Invalid task id: {}", task_id)))?;
    let status = state
        .orchestrator
        .jobs()
        .get(&id)
        .ok_or_else(|| ApiError::not_found("Task not found"))?;
    Ok(Json(status))
}

async fn download(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    if !is_plain_filename(&filename) {
        return Err(ApiError::bad_request("Invalid filename"));
    }

    let path = state.settings.output_dir().join(&filename);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::not_found("File not found"));
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type(&filename).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

// === Filenames ===

/// Reduce a client filename to a safe single path component.
///
/// Path separators become underscores, anything outside `[A-Za-z0-9._-]`
/// is dropped, and leading or trailing dots and underscores are trimmed.
fn secure_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// A name that is already safe, so it cannot leave its directory.
fn is_plain_filename(name: &str) -> bool {
    !name.is_empty() && secure_filename(name) == name
}

fn split_name(name: &str) -> (String, String) {
    let path = std::path::Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string());
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "mp4".to_string());
    (stem, ext)
}

/// `talk.mp4` -> `talk_<uuid>.mp4`
fn unique_name(safe: &str) -> String {
    let (stem, ext) = split_name(safe);
    format!("{}_{}.{}", stem, Uuid::new_v4().simple(), ext)
}

/// `talk_<uuid>.mp4` -> `talk_<uuid>_subtitled_<8 hex>.mp4`
fn rendered_name(upload: &str) -> String {
    let (stem, _) = split_name(&secure_filename(upload));
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_subtitled_{}.mp4", stem, &suffix[..8])
}

fn upload_path(settings: &Settings, filename: &str) -> ApiResult<PathBuf> {
    if !is_plain_filename(filename) {
        return Err(ApiError::bad_request("Invalid filename"));
    }
    let path = settings.upload_dir().join(filename);
    if !path.is_file() {
        return Err(ApiError::not_found(format!("File not found: {}", filename)));
    }
    Ok(path)
}

fn content_type(filename: &str) -> &'static str {
    match split_name(filename).1.as_str() {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "ass" => "text/x-ssa; charset=utf-8",
        "srt" => "application/x-subrip; charset=utf-8",
        "vtt" => "text/vtt; charset=utf-8",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}
