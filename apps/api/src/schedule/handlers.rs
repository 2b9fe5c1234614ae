//! Axum route handlers for the Schedule API.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{ApiResponse, AppError};
use crate::models::schedule::{BlockType, DailySchedule, ScheduleBlock, ScheduleFeedback};
use crate::models::settings::AppSettings;
use crate::models::task::{Task, TaskStatus};
use crate::routes::ApiJson;
use crate::schedule::optimizer::{optimize_schedule, parse_date, parse_time, WorkWindow};
use crate::schedule::repository::{self, BlockUpdate};
use crate::settings::repository::get_settings;
use crate::state::AppState;
use crate::tasks::repository as task_repository;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    pub tasks: Option<Vec<Task>>,
    pub date: Option<String>,
    pub work_hours_start: Option<String>,
    pub work_hours_end: Option<String>,
    pub break_duration: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleBody {
    #[serde(default)]
    pub blocks: Vec<ScheduleBlock>,
    pub feedback: Option<ScheduleFeedback>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub schedule: DailySchedule,
    /// Ids of open tasks that did not fit into the work window.
    pub unscheduled: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct BlockCompletion {
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub rating: Option<u8>,
    pub notes: Option<String>,
}

fn path_date(raw: &str) -> Result<NaiveDate, AppError> {
    Ok(parse_date(raw)?)
}

fn schedule_not_found(date: NaiveDate) -> AppError {
    AppError::NotFound(format!("No schedule for {date}"))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/schedule/optimize
///
/// Stateless: lays out the given tasks for `date`. Work hours default to
/// 09:00–18:00 and breaks to 15 minutes.
pub async fn handle_optimize(
    ApiJson(request): ApiJson<OptimizeRequest>,
) -> Result<Json<ApiResponse<Vec<ScheduleBlock>>>, AppError> {
    let tasks = match request.tasks {
        Some(tasks) if !tasks.is_empty() => tasks,
        _ => return Err(AppError::validation("Tasks are required")),
    };
    let date = request
        .date
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::validation("Date is required"))?;

    let defaults = AppSettings::default();
    let window = WorkWindow::parse(
        &date,
        request
            .work_hours_start
            .as_deref()
            .unwrap_or(&defaults.work_hours_start),
        request
            .work_hours_end
            .as_deref()
            .unwrap_or(&defaults.work_hours_end),
    )?;
    let break_minutes = request.break_duration.unwrap_or(defaults.break_duration);
    if window.is_empty() {
        warn!("Work window for {} is empty, nothing can be scheduled", date);
    }

    let outcome = optimize_schedule(&tasks, &window, break_minutes);
    if !outcome.unscheduled.is_empty() {
        warn!(
            "{} of {} tasks did not fit into {}",
            outcome.unscheduled.len(),
            tasks.len(),
            date
        );
    }

    Ok(ApiResponse::ok(outcome.blocks))
}

/// GET /api/schedules
pub async fn handle_list_schedules(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DailySchedule>>>, AppError> {
    Ok(ApiResponse::ok(
        repository::list_schedules(&state.storage).await?,
    ))
}

/// GET /api/schedules/:date
pub async fn handle_get_schedule(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<ApiResponse<DailySchedule>>, AppError> {
    let date = path_date(&date)?;
    let schedule = repository::get_schedule(&state.storage, date)
        .await?
        .ok_or_else(|| schedule_not_found(date))?;
    Ok(ApiResponse::ok(schedule))
}

/// PUT /api/schedules/:date
///
/// Replaces the day's schedule with the given blocks.
pub async fn handle_put_schedule(
    State(state): State<AppState>,
    Path(date): Path<String>,
    ApiJson(body): ApiJson<ScheduleBody>,
) -> Result<Json<ApiResponse<DailySchedule>>, AppError> {
    let date = path_date(&date)?;
    let schedule = DailySchedule {
        date,
        blocks: body.blocks,
        feedback: body.feedback,
    };
    Ok(ApiResponse::ok(
        repository::save_schedule(&state.storage, schedule).await?,
    ))
}

/// POST /api/schedules/:date/generate
///
/// Builds the day from the stored open tasks and the stored work hours, then saves it.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<ApiResponse<GenerateResponse>>, AppError> {
    let date = path_date(&date)?;
    let settings = get_settings(&state.storage).await?;
    let tasks = task_repository::list_tasks(&state.storage).await?;

    let window = WorkWindow::new(
        date,
        parse_time(&settings.work_hours_start)?,
        parse_time(&settings.work_hours_end)?,
    );
    let outcome = optimize_schedule(&tasks, &window, settings.break_duration);

    let schedule = repository::save_schedule(
        &state.storage,
        DailySchedule {
            date,
            blocks: outcome.blocks,
            feedback: None,
        },
    )
    .await?;

    info!(
        "Generated schedule for {}: {} blocks, {} unscheduled",
        date,
        schedule.blocks.len(),
        outcome.unscheduled.len()
    );

    Ok(ApiResponse::ok(GenerateResponse {
        schedule,
        unscheduled: outcome.unscheduled,
    }))
}

/// PATCH /api/schedules/:date/blocks/:block_id
///
/// Completing a task block also marks its task completed.
pub async fn handle_update_block(
    State(state): State<AppState>,
    Path((date, block_id)): Path<(String, String)>,
    ApiJson(request): ApiJson<BlockCompletion>,
) -> Result<Json<ApiResponse<DailySchedule>>, AppError> {
    let date = path_date(&date)?;
    let (schedule, block) =
        match repository::update_block_completion(&state.storage, date, &block_id, request.completed)
            .await?
        {
            BlockUpdate::Updated { schedule, block } => (schedule, block),
            BlockUpdate::ScheduleNotFound => return Err(schedule_not_found(date)),
            BlockUpdate::BlockNotFound => {
                return Err(AppError::NotFound(format!(
                    "Block {block_id} not found on {date}"
                )))
            }
        };

    if request.completed && block.block_type == BlockType::Task {
        if let Some(task_id) = block.task_id.as_deref() {
            let task =
                task_repository::set_status(&state.storage, task_id, TaskStatus::Completed).await?;
            if task.is_none() {
                debug!("Block {} points at deleted task {}", block.id, task_id);
            }
        }
    }

    Ok(ApiResponse::ok(schedule))
}

/// PUT /api/schedules/:date/feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    Path(date): Path<String>,
    ApiJson(request): ApiJson<FeedbackRequest>,
) -> Result<Json<ApiResponse<DailySchedule>>, AppError> {
    let date = path_date(&date)?;
    let rating = request
        .rating
        .filter(|r| (1..=5).contains(r))
        .ok_or_else(|| AppError::validation("Rating must be between 1 and 5"))?;

    let schedule = repository::add_feedback(&state.storage, date, rating, request.notes)
        .await?
        .ok_or_else(|| schedule_not_found(date))?;
    Ok(ApiResponse::ok(schedule))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_path_date_is_a_validation_error() {
        assert!(matches!(path_date("2025-13-40"), Err(AppError::Validation(_))));
        assert!(path_date("2025-03-01").is_ok());
    }

    #[test]
    fn test_optimize_request_accepts_camel_case() {
        let request: OptimizeRequest = serde_json::from_str(
            r#"{"tasks": [], "date": "2025-03-01", "workHoursStart": "10:00", "breakDuration": 5}"#,
        )
        .unwrap();
        assert_eq!(request.work_hours_start.as_deref(), Some("10:00"));
        assert_eq!(request.break_duration, Some(5));
        assert!(request.work_hours_end.is_none());
    }
}
