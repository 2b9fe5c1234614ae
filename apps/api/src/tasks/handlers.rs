//! Axum route handlers for the Tasks API.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::models::task::{Priority, SubTask, Task, TaskStatus};
use crate::routes::ApiJson;
use crate::state::AppState;
use crate::tasks::decomposer::Decomposition;
use crate::tasks::repository::{self, SubtaskUpdate};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DecomposeRequest {
    pub task: Option<String>,
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecomposeResponse {
    pub original_task: String,
    #[serde(flatten)]
    pub decomposition: Decomposition,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<SubTask>,
    #[serde(default)]
    pub priority: Priority,
    pub estimated_time: Option<u32>,
    pub deadline: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: TaskStatus,
}

#[derive(Debug, Deserialize)]
pub struct SubtaskCompletion {
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: String,
}

fn task_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Task {id} not found"))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/tasks/decompose
///
/// Splits a free-text task into subtasks. Uses the LLM when configured and the
/// keyword table otherwise (or when the LLM call fails).
pub async fn handle_decompose(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DecomposeRequest>,
) -> Result<Json<ApiResponse<DecomposeResponse>>, AppError> {
    let task = request
        .task
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::validation("Task description is required"))?;

    let decomposition = state
        .decomposer
        .decompose(&task, request.context.as_deref())
        .await;

    info!(
        "Decomposed task via {}: {} subtasks, {} min",
        state.decomposer.backend(),
        decomposition.subtasks.len(),
        decomposition.estimated_total_time
    );

    Ok(ApiResponse::ok(DecomposeResponse {
        original_task: task,
        decomposition,
    }))
}

/// GET /api/tasks
pub async fn handle_list_tasks(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Task>>>, AppError> {
    Ok(ApiResponse::ok(repository::list_tasks(&state.storage).await?))
}

/// GET /api/tasks/:id
pub async fn handle_get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Task>>, AppError> {
    let task = repository::get_task(&state.storage, &id)
        .await?
        .ok_or_else(|| task_not_found(&id))?;
    Ok(ApiResponse::ok(task))
}

/// POST /api/tasks
pub async fn handle_create_task(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewTask>,
) -> Result<Json<ApiResponse<Task>>, AppError> {
    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::validation("Task title is required"));
    }

    let now = Utc::now();
    let task = Task {
        id: Uuid::new_v4().to_string(),
        title,
        description: request.description,
        subtasks: request.subtasks,
        priority: request.priority,
        estimated_time: request.estimated_time,
        deadline: request.deadline,
        status: request.status,
        created_at: now,
        updated_at: now,
    };

    let task = repository::save_task(&state.storage, task).await?;
    info!("Created task {} ({} subtasks)", task.id, task.subtasks.len());
    Ok(ApiResponse::ok(task))
}

/// DELETE /api/tasks/:id
pub async fn handle_delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>, AppError> {
    if !repository::delete_task(&state.storage, &id).await? {
        return Err(task_not_found(&id));
    }
    Ok(ApiResponse::ok(DeletedResponse { id }))
}

/// PATCH /api/tasks/:id/status
pub async fn handle_set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<StatusUpdate>,
) -> Result<Json<ApiResponse<Task>>, AppError> {
    let task = repository::set_status(&state.storage, &id, request.status)
        .await?
        .ok_or_else(|| task_not_found(&id))?;
    Ok(ApiResponse::ok(task))
}

/// PATCH /api/tasks/:id/subtasks/:subtask_id
///
/// Completing the last open subtask also completes the task.
pub async fn handle_update_subtask(
    State(state): State<AppState>,
    Path((id, subtask_id)): Path<(String, String)>,
    ApiJson(request): ApiJson<SubtaskCompletion>,
) -> Result<Json<ApiResponse<Task>>, AppError> {
    match repository::update_subtask(&state.storage, &id, &subtask_id, request.completed).await? {
        SubtaskUpdate::Updated(task) => Ok(ApiResponse::ok(task)),
        SubtaskUpdate::TaskNotFound => Err(task_not_found(&id)),
        SubtaskUpdate::SubtaskNotFound => Err(AppError::NotFound(format!(
            "Subtask {subtask_id} not found on task {id}"
        ))),
    }
}
