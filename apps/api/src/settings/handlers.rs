//! Axum route handlers for the Settings API.

use axum::{extract::State, Json};
use tracing::info;

use crate::errors::{ApiResponse, AppError};
use crate::models::settings::AppSettings;
use crate::routes::ApiJson;
use crate::schedule::optimizer::parse_time;
use crate::settings::repository;
use crate::state::AppState;

/// Work hours must be "HH:MM" with the start before the end.
fn validate(settings: &AppSettings) -> Result<(), AppError> {
    let start = parse_time(&settings.work_hours_start)
        .map_err(|e| AppError::validation(e.to_string()))?;
    let end = parse_time(&settings.work_hours_end)
        .map_err(|e| AppError::validation(e.to_string()))?;
    if start >= end {
        return Err(AppError::validation(
            "Work hours start must be before work hours end",
        ));
    }
    Ok(())
}

/// GET /api/settings
pub async fn handle_get_settings(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AppSettings>>, AppError> {
    Ok(ApiResponse::ok(repository::get_settings(&state.storage).await?))
}

/// PUT /api/settings
///
/// Fields left out of the body take their default values.
pub async fn handle_save_settings(
    State(state): State<AppState>,
    ApiJson(settings): ApiJson<AppSettings>,
) -> Result<Json<ApiResponse<AppSettings>>, AppError> {
    validate(&settings)?;
    let settings = repository::save_settings(&state.storage, settings).await?;
    info!(
        "Saved settings: work hours {}-{}, {} min breaks",
        settings.work_hours_start, settings.work_hours_end, settings.break_duration
    );
    Ok(ApiResponse::ok(settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&AppSettings::default()).is_ok());
    }

    #[test]
    fn test_rejects_malformed_or_inverted_hours() {
        let bad_format = AppSettings {
            work_hours_start: "9".to_string(),
            ..AppSettings::default()
        };
        assert!(validate(&bad_format).is_err());

        let inverted = AppSettings {
            work_hours_start: "18:00".to_string(),
            work_hours_end: "09:00".to_string(),
            ..AppSettings::default()
        };
        assert!(validate(&inverted).is_err());
    }
}
