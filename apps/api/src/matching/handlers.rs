//! Axum route handlers for the matching API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::extract_upload;
use crate::matching::aggregate::{analyze_resume, MatchRequest, MatchResult};
use crate::matching::sections::char_window;
use crate::state::AppState;

/// Characters of extracted text returned by `/upload`.
pub const PREVIEW_CHARS: usize = 3000;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UploadPreview {
    /// `pdf`, `docx`, `txt`, or empty when the format is unsupported.
    pub file_type: String,
    pub extracted_text: String,
}

struct UploadedFile {
    filename: String,
    bytes: Bytes,
}

#[derive(Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    job_description: Option<String>,
}

impl UploadForm {
    fn require_file(&mut self) -> Result<UploadedFile, AppError> {
        self.file
            .take()
            .ok_or_else(|| AppError::Validation("multipart field 'file' is required".to_string()))
    }

    fn require_job_description(&mut self) -> Result<String, AppError> {
        self.job_description.take().ok_or_else(|| {
            AppError::Validation("form field 'job_description' is required".to_string())
        })
    }
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                form.file = Some(UploadedFile { filename, bytes });
            }
            Some("job_description") => {
                form.job_description = Some(field.text().await?);
            }
            _ => {}
        }
    }

    Ok(form)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /analyze
///
/// Scores raw resume text against a job description.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResult>, AppError> {
    let result = analyze_resume(
        &req.resume_text,
        &req.job_description,
        state.splitter.as_ref(),
        state.scorer.as_ref(),
    )
    .await?;

    info!("Analyzed resume text: overall_score={}", result.overall_score);
    Ok(Json(result))
}

/// POST /upload
///
/// Extracts a document and returns a preview of its text. Extraction failures
/// are reported in-band as `[ERROR ...]` text; `file_type` keeps the detected
/// type and is empty only for unsupported formats.
pub async fn handle_upload(multipart: Multipart) -> Result<Json<UploadPreview>, AppError> {
    let upload = read_upload_form(multipart).await?.require_file()?;

    let preview = match extract_upload(upload.bytes, upload.filename.clone()).await {
        Ok(doc) => UploadPreview {
            file_type: doc.file_type.as_str().to_string(),
            extracted_text: char_window(&doc.text, 0, PREVIEW_CHARS).to_string(),
        },
        Err(e) => {
            warn!("Extraction failed for '{}': {e}", upload.filename);
            UploadPreview {
                file_type: e
                    .file_type()
                    .map(|t| t.as_str().to_string())
                    .unwrap_or_default(),
                extracted_text: e.marker_text(),
            }
        }
    };

    Ok(Json(preview))
}

/// POST /upload-and-analyze
///
/// Extracts a document and scores it against the `job_description` form field.
/// An unreadable or unsupported document yields an all-zero result, keeping the
/// response shape uniform for clients.
pub async fn handle_upload_and_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<MatchResult>, AppError> {
    let mut form = read_upload_form(multipart).await?;
    let upload = form.require_file()?;
    let job_description = form.require_job_description()?;

    let doc = match extract_upload(upload.bytes, upload.filename.clone()).await {
        Ok(doc) => doc,
        Err(e) => {
            warn!(
                "Extraction failed for '{}', returning zeroed result: {e}",
                upload.filename
            );
            return Ok(Json(MatchResult::zeroed()));
        }
    };

    let result = analyze_resume(
        &doc.text,
        &job_description,
        state.splitter.as_ref(),
        state.scorer.as_ref(),
    )
    .await?;

    info!(
        "Analyzed {} upload '{}': overall_score={}",
        doc.file_type.as_str(),
        upload.filename,
        result.overall_score
    );
    Ok(Json(result))
}
