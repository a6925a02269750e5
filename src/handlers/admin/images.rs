use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::ImageRecord;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct ImageListQuery {
    pub search: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ImagePath {
    pub id: Uuid,
}

/// GET /admin/api/images - newest first, optional substring match on id.
pub async fn images_list(
    State(state): State<AppState>,
    Query(query): Query<ImageListQuery>,
) -> ApiResult<Vec<ImageRecord>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let images: Vec<ImageRecord> = match query.search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => {
            sqlx::query_as(
                r#"
                SELECT id, user_id, original_url, processed_url, status, created_at
                FROM images
                WHERE id::text ILIKE '%' || $1 || '%'
                ORDER BY created_at DESC
                LIMIT $2
                "#,
            )
            .bind(term)
            .bind(limit)
            .fetch_all(&state.pool)
            .await?
        }
        _ => {
            sqlx::query_as(
                r#"
                SELECT id, user_id, original_url, processed_url, status, created_at
                FROM images
                ORDER BY created_at DESC
                LIMIT $1
                "#,
            )
            .bind(limit)
            .fetch_all(&state.pool)
            .await?
        }
    };

    Ok(ApiResponse::success(images))
}

/// DELETE /admin/api/images/:id
pub async fn image_delete(
    State(state): State<AppState>,
    Path(path): Path<ImagePath>,
) -> ApiResult<Value> {
    let result = sqlx::query("DELETE FROM images WHERE id = $1")
        .bind(path.id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Image not found"));
    }

    tracing::info!("image {} deleted", path.id);
    Ok(ApiResponse::success(json!({ "deleted": path.id })))
}
