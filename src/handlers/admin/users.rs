use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::User;
use crate::error::ApiError;
use crate::gate::Role;
use crate::middleware::{ApiResponse, ApiResult};

// Named struct so the optional :token capture from the route prefix is
// ignored during extraction.
#[derive(Debug, Deserialize)]
pub struct UserPath {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct CreditsUpdate {
    pub credits: i32,
}

/// GET /admin/api/users - newest first, as the management table shows them.
pub async fn users_list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users: Vec<User> = sqlx::query_as(
        "SELECT id, email, role, credits, created_at FROM users ORDER BY created_at DESC",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(users))
}

/// PUT /admin/api/users/:id/role
pub async fn user_role_put(
    State(state): State<AppState>,
    Path(path): Path<UserPath>,
    Json(payload): Json<RoleUpdate>,
) -> ApiResult<User> {
    let role: Role = payload
        .role
        .parse()
        .map_err(|e: String| ApiError::bad_request(e))?;

    let updated: Option<User> = sqlx::query_as(
        r#"
        UPDATE users SET role = $1, updated_at = now()
        WHERE id = $2
        RETURNING id, email, role, credits, created_at
        "#,
    )
    .bind(role.as_str())
    .bind(path.id)
    .fetch_optional(&state.pool)
    .await?;

    let user = updated.ok_or_else(|| ApiError::not_found("User not found"))?;
    tracing::info!("role for user {} set to {}", user.id, role);
    Ok(ApiResponse::success(user))
}

/// PUT /admin/api/users/:id/credits - sets the absolute balance.
pub async fn user_credits_put(
    State(state): State<AppState>,
    Path(path): Path<UserPath>,
    Json(payload): Json<CreditsUpdate>,
) -> ApiResult<User> {
    if payload.credits < 0 {
        return Err(ApiError::bad_request("Credits cannot be negative"));
    }

    let updated: Option<User> = sqlx::query_as(
        r#"
        UPDATE users SET credits = $1, updated_at = now()
        WHERE id = $2
        RETURNING id, email, role, credits, created_at
        "#,
    )
    .bind(payload.credits)
    .bind(path.id)
    .fetch_optional(&state.pool)
    .await?;

    let user = updated.ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::success(user))
}
