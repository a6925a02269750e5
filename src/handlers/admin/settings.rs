use axum::{extract::State, Json};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::AppSettings;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct SettingsUpdate {
    pub free_credits: i32,
    pub max_file_size_mb: i32,
    pub enable_registration: bool,
    pub maintenance_mode: bool,
}

/// GET /admin/api/settings - the single row, or defaults if never written.
pub async fn settings_get(State(state): State<AppState>) -> ApiResult<AppSettings> {
    let settings: Option<AppSettings> = sqlx::query_as(
        r#"
        SELECT id, free_credits, max_file_size_mb, enable_registration, maintenance_mode, updated_at
        FROM settings
        WHERE id = 1
        "#,
    )
    .fetch_optional(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        settings.unwrap_or_else(AppSettings::defaults),
    ))
}

/// PUT /admin/api/settings - upsert keyed on the fixed id.
pub async fn settings_put(
    State(state): State<AppState>,
    Json(payload): Json<SettingsUpdate>,
) -> ApiResult<AppSettings> {
    if payload.free_credits < 0 {
        return Err(ApiError::bad_request("Free credits cannot be negative"));
    }
    if payload.max_file_size_mb <= 0 {
        return Err(ApiError::bad_request("Maximum file size must be positive"));
    }

    let settings: AppSettings = sqlx::query_as(
        r#"
        INSERT INTO settings (id, free_credits, max_file_size_mb, enable_registration, maintenance_mode, updated_at)
        VALUES (1, $1, $2, $3, $4, now())
        ON CONFLICT (id) DO UPDATE SET
            free_credits = EXCLUDED.free_credits,
            max_file_size_mb = EXCLUDED.max_file_size_mb,
            enable_registration = EXCLUDED.enable_registration,
            maintenance_mode = EXCLUDED.maintenance_mode,
            updated_at = EXCLUDED.updated_at
        RETURNING id, free_credits, max_file_size_mb, enable_registration, maintenance_mode, updated_at
        "#,
    )
    .bind(payload.free_credits)
    .bind(payload.max_file_size_mb)
    .bind(payload.enable_registration)
    .bind(payload.maintenance_mode)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!("application settings updated");
    Ok(ApiResponse::success(settings))
}
