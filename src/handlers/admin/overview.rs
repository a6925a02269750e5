use axum::extract::State;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};

/// Headline numbers for the dashboard landing screen.
#[derive(Debug, Serialize)]
pub struct OverviewStats {
    pub total_users: i64,
    pub total_images: i64,
    pub completed_images: i64,
    pub success_rate: f64,
    pub revenue_today: Decimal,
}

/// GET /admin/api/overview
pub async fn overview(State(state): State<AppState>) -> ApiResult<OverviewStats> {
    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&state.pool)
        .await?;

    let total_images: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM images")
        .fetch_one(&state.pool)
        .await?;

    let completed_images: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM images WHERE status = 'COMPLETED'")
            .fetch_one(&state.pool)
            .await?;

    let revenue_today: Decimal = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0) FROM payments WHERE created_at >= date_trunc('day', now())",
    )
    .fetch_one(&state.pool)
    .await?;

    let success_rate = if total_images > 0 {
        completed_images as f64 / total_images as f64 * 100.0
    } else {
        0.0
    };

    Ok(ApiResponse::success(OverviewStats {
        total_users,
        total_images,
        completed_images,
        success_rate,
        revenue_today,
    }))
}
