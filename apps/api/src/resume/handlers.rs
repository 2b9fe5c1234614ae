//! Axum route handlers for the Resume API.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::models::resume::{ResumeData, ResumeStyle};
use crate::resume::generator::generate_resume_content;
use crate::resume::repository;
use crate::routes::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub resume_data: Option<ResumeData>,
    pub target_job: Option<String>,
    #[serde(default)]
    pub style: ResumeStyle,
    /// Stores the content and target job on the saved resume.
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub cleared: bool,
}

/// POST /api/resume/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GenerateRequest>,
) -> Result<Json<ApiResponse<GenerateResponse>>, AppError> {
    let resume = request
        .resume_data
        .ok_or_else(|| AppError::validation("Resume data is required"))?;
    let target_job = request
        .target_job
        .map(|j| j.trim().to_string())
        .filter(|j| !j.is_empty())
        .ok_or_else(|| AppError::validation("Target job is required"))?;

    let (content, source) =
        generate_resume_content(state.llm.as_ref(), &resume, &target_job, request.style).await;
    info!("Resume content for '{}' produced by {:?}", target_job, source);

    if request.save {
        let resume = ResumeData {
            target_job: Some(target_job),
            generated_content: Some(content.clone()),
            ..resume
        };
        repository::save_resume(&state.storage, with_id(resume)).await?;
    }

    Ok(ApiResponse::ok(GenerateResponse { content }))
}

/// GET /api/resume
pub async fn handle_get_resume(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ResumeData>>, AppError> {
    let resume = repository::get_resume(&state.storage)
        .await?
        .ok_or_else(|| AppError::NotFound("No resume saved".to_string()))?;
    Ok(ApiResponse::ok(resume))
}

/// PUT /api/resume
pub async fn handle_save_resume(
    State(state): State<AppState>,
    ApiJson(resume): ApiJson<ResumeData>,
) -> Result<Json<ApiResponse<ResumeData>>, AppError> {
    Ok(ApiResponse::ok(
        repository::save_resume(&state.storage, with_id(resume)).await?,
    ))
}

/// DELETE /api/resume
pub async fn handle_clear_resume(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ClearedResponse>>, AppError> {
    repository::clear_resume(&state.storage).await?;
    Ok(ApiResponse::ok(ClearedResponse { cleared: true }))
}

/// Resumes posted without an id get a fresh one.
fn with_id(mut resume: ResumeData) -> ResumeData {
    if resume.id.trim().is_empty() {
        resume.id = Uuid::new_v4().to_string();
        resume.created_at = Utc::now();
    }
    resume
}
