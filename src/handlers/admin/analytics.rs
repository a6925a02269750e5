use axum::extract::State;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct DailyRevenue {
    pub day: NaiveDate,
    pub amount: Decimal,
}

/// Chart series for the analytics screen, all over a trailing 30-day window.
#[derive(Debug, Serialize)]
pub struct AnalyticsData {
    pub daily_users: Vec<DailyCount>,
    pub processing_stats: Vec<StatusCount>,
    pub revenue: Vec<DailyRevenue>,
}

/// GET /admin/api/analytics
pub async fn analytics(State(state): State<AppState>) -> ApiResult<AnalyticsData> {
    let daily_users: Vec<(NaiveDate, i64)> = sqlx::query_as(
        r#"
        SELECT created_at::date AS day, COUNT(*)
        FROM users
        WHERE created_at >= now() - interval '30 days'
        GROUP BY 1
        ORDER BY 1
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let processing_stats: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT status, COUNT(*)
        FROM images
        WHERE created_at >= now() - interval '30 days'
        GROUP BY status
        ORDER BY status
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let revenue: Vec<(NaiveDate, Decimal)> = sqlx::query_as(
        r#"
        SELECT created_at::date AS day, COALESCE(SUM(amount), 0)
        FROM payments
        WHERE created_at >= now() - interval '30 days'
        GROUP BY 1
        ORDER BY 1
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(AnalyticsData {
        daily_users: daily_users
            .into_iter()
            .map(|(day, count)| DailyCount { day, count })
            .collect(),
        processing_stats: processing_stats
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect(),
        revenue: revenue
            .into_iter()
            .map(|(day, amount)| DailyRevenue { day, amount })
            .collect(),
    }))
}
