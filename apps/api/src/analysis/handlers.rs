use std::convert::Infallible;

use axum::{
    extract::{Multipart, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use chrono::Utc;
use futures_util::{stream, Stream};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::longitudinal::{aggregate, AnalysisSnapshot, LongitudinalProfile};
use crate::analysis::models::{AnalysisRequest, AnalysisResult, StudyLevel};
use crate::analysis::pipeline::{analyze, ProgressObserver};
use crate::analysis::report::render_report;
use crate::errors::AppError;
use crate::extract::extract_text;
use crate::state::AppState;

pub const SHORT_INPUT_NOTICE: &str =
    "Input is very short. Results may be limited; longer work produces richer analysis.";

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(default)]
    pub study_level: StudyLevel,
    #[serde(default)]
    pub wellbeing_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct SourceDocument {
    pub filename: String,
    pub characters: usize,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis_id: Uuid,
    pub result: AnalysisResult,
    pub notices: Vec<String>,
    pub report_markdown: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceDocument>,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub filename: String,
    pub characters: usize,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct AggregateRequest {
    pub analyses: Vec<AnalysisSnapshot>,
}

#[derive(Debug, Serialize)]
struct ProgressEvent<'a> {
    percent: u8,
    message: &'a str,
}

/// POST /api/v1/analysis
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let request = AnalysisRequest::new(req.text, req.study_level, req.wellbeing_enabled)?;
    Ok(Json(run_analysis(&state, &request, None).await))
}

/// POST /api/v1/analysis/upload
/// Multipart fields: `file` (required), `study_level`, `wellbeing_enabled`.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let form = read_upload_form(multipart).await?;
    let UploadedFile { filename, bytes } = form.file;
    let text = extract_in_background(bytes, filename.clone()).await?;
    let characters = text.chars().count();

    let request = AnalysisRequest::new(text, form.study_level, form.wellbeing_enabled)?;
    let mut response = run_analysis(&state, &request, None).await;
    response.source = Some(SourceDocument {
        filename,
        characters,
    });
    Ok(Json(response))
}

/// POST /api/v1/analysis/extract
/// Returns the plain text of an uploaded document without analysing it.
pub async fn handle_extract(multipart: Multipart) -> Result<Json<ExtractResponse>, AppError> {
    let form = read_upload_form(multipart).await?;
    let UploadedFile { filename, bytes } = form.file;
    let text = extract_in_background(bytes, filename.clone()).await?;
    Ok(Json(ExtractResponse {
        filename,
        characters: text.chars().count(),
        text,
    }))
}

/// POST /api/v1/analysis/stream
/// Emits `progress` events while the pipeline runs, then one `complete` event.
/// The analysis keeps running if the client disconnects.
pub async fn handle_analyze_stream(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let request = AnalysisRequest::new(req.text, req.study_level, req.wellbeing_enabled)?;
    let (tx, rx) = mpsc::unbounded_channel::<Event>();

    tokio::spawn(async move {
        let progress_tx = tx.clone();
        let observer = move |percent: u8, message: &str| {
            if let Some(event) = sse_event("progress", &ProgressEvent { percent, message }) {
                let _ = progress_tx.send(event);
            }
        };
        let response = run_analysis(&state, &request, Some(&observer)).await;
        if let Some(event) = sse_event("complete", &response) {
            let _ = tx.send(event);
        }
    });

    let events = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (Ok::<_, Infallible>(event), rx))
    });
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// POST /api/v1/profiles/aggregate
/// Responds with `null` when no analyses are supplied.
pub async fn handle_aggregate(
    Json(req): Json<AggregateRequest>,
) -> Json<Option<LongitudinalProfile>> {
    info!(analyses = req.analyses.len(), "Aggregating longitudinal profile");
    Json(aggregate(&req.analyses))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn run_analysis(
    state: &AppState,
    request: &AnalysisRequest,
    observer: Option<&dyn ProgressObserver>,
) -> AnalysisResponse {
    let analysis_id = Uuid::new_v4();
    info!(
        %analysis_id,
        study_level = ?request.study_level(),
        wellbeing = request.wellbeing_enabled(),
        "Analysis started"
    );

    let result = analyze(state.llm.as_ref(), request, observer).await;

    let mut notices = Vec::new();
    if request.is_short() {
        notices.push(SHORT_INPUT_NOTICE.to_string());
    }
    let report_markdown = render_report(&result, Utc::now());

    info!(%analysis_id, "Analysis complete");
    AnalysisResponse {
        analysis_id,
        result,
        notices,
        report_markdown,
        source: None,
    }
}

fn sse_event<T: Serialize>(name: &str, payload: &T) -> Option<Event> {
    match Event::default().event(name).json_data(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("Failed to encode {name} event: {e}");
            None
        }
    }
}

struct UploadedFile {
    filename: String,
    bytes: Vec<u8>,
}

struct UploadForm {
    file: UploadedFile,
    study_level: StudyLevel,
    wellbeing_enabled: bool,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut file = None;
    let mut study_level = StudyLevel::default();
    let mut wellbeing_enabled = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::Validation("File field has no filename".into()))?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                file = Some(UploadedFile {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            "study_level" => study_level = parse_study_level(&field_text(field).await?)?,
            "wellbeing_enabled" => wellbeing_enabled = parse_flag(&field_text(field).await?)?,
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;
    Ok(UploadForm {
        file,
        study_level,
        wellbeing_enabled,
    })
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed form field: {e}")))
}

/// Document parsing is CPU-bound, so it runs on the blocking pool.
async fn extract_in_background(bytes: Vec<u8>, filename: String) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || extract_text(&bytes, &filename))
        .await
        .map_err(anyhow::Error::from)??;
    Ok(text)
}

fn parse_study_level(value: &str) -> Result<StudyLevel, AppError> {
    match value.trim().to_lowercase().as_str() {
        "" | "default" => Ok(StudyLevel::Default),
        "elementary" => Ok(StudyLevel::Elementary),
        other => Err(AppError::Validation(format!(
            "Unknown study_level '{other}'. Expected 'default' or 'elementary'."
        ))),
    }
}

fn parse_flag(value: &str) -> Result<bool, AppError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "" | "false" | "0" | "off" | "no" => Ok(false),
        other => Err(AppError::Validation(format!(
            "Invalid boolean '{other}' for wellbeing_enabled"
        ))),
    }
}
