use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::analysis::document::DocumentKind;
use crate::analysis::service::analyze_resume;
use crate::errors::AppError;
use crate::models::analysis::ResumeAnalysis;
use crate::state::AppState;

const RECENT_ANALYSES: usize = 20;

struct UploadedResume {
    file_name: String,
    data: Bytes,
}

/// POST /analyze
/// Multipart form: `resume` (PDF, DOCX or TXT) and an optional `resume_id`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResumeAnalysis>, AppError> {
    let mut upload: Option<UploadedResume> = None;
    let mut resume_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume") => {
                // a part without a filename is form data, not an uploaded file
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid file: {e}")))?;
                upload = Some(UploadedResume { file_name, data });
            }
            Some("resume_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid resume_id: {e}")))?;
                let text = text.trim();
                if !text.is_empty() {
                    resume_id = Some(text.to_string());
                }
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| AppError::Validation("No resume file provided".to_string()))?;
    if upload.file_name.is_empty() {
        return Err(AppError::Validation("Empty filename".to_string()));
    }
    let kind = DocumentKind::from_filename(&upload.file_name).ok_or_else(|| {
        AppError::Validation("Unsupported file format. Please upload PDF, DOCX, or TXT".to_string())
    })?;

    let resume_id = resume_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    info!(resume_id = %resume_id, file = %upload.file_name, "Analyzing uploaded resume");

    // PDF and DOCX parsing is CPU-bound
    let text_extractor = state.text_extractor.clone();
    let text = tokio::task::spawn_blocking(move || text_extractor.extract(kind, &upload.data))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| AppError::Upstream(format!("Could not extract text from resume: {e:#}")))?;

    let analysis = analyze_resume(
        resume_id,
        &text,
        &state.extractor,
        state.store.as_ref(),
        &state.analysis,
    )
    .await?;
    Ok(Json(analysis))
}

/// GET /api/v1/analyses
pub async fn handle_list_analyses(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeAnalysis>>, AppError> {
    Ok(Json(state.store.recent_analyses(RECENT_ANALYSES).await?))
}

/// GET /api/v1/analyses/:resume_id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(resume_id): Path<String>,
) -> Result<Json<ResumeAnalysis>, AppError> {
    state
        .store
        .find_analysis(&resume_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No analysis for resume '{resume_id}'")))
}
