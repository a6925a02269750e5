use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::gate::{ProvisionTrigger, RoleRecord, Session};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ProvisionRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminPath {
    pub id: Uuid,
}

/// GET /admin/api/admins - every ADMIN role record, active or not.
pub async fn admins_list(State(state): State<AppState>) -> ApiResult<Vec<RoleRecord>> {
    let admins = state.roles.list_admins().await?;
    Ok(ApiResponse::success(admins))
}

/// POST /admin/api/admins - explicit, audited admin provisioning. The
/// target must be a whitelisted, existing product user; the acting admin is
/// recorded in the audit trail.
pub async fn admin_provision(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<ProvisionRequest>,
) -> ApiResult<Value> {
    let email = payload.email.trim().to_ascii_lowercase();
    if email.is_empty() {
        return Err(ApiError::bad_request("Email is required"));
    }

    if !state.gate.is_whitelisted(&email) {
        return Err(ApiError::bad_request(
            "Email is not in the admin whitelist; update ADMIN_EMAILS first",
        ));
    }

    let user_id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.pool)
        .await?;
    let user_id = user_id.ok_or_else(|| ApiError::not_found("No user with that email"))?;

    state
        .gate
        .provision_admin(
            user_id,
            &email,
            ProvisionTrigger::Operator {
                actor: session.email.clone(),
            },
        )
        .await?;

    Ok(ApiResponse::created(json!({
        "user_id": user_id,
        "email": email,
        "role": "ADMIN",
        "is_active": true,
    })))
}

/// DELETE /admin/api/admins/:id - deactivate a role record. This is the
/// demotion path the original system never had.
pub async fn admin_demote(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(path): Path<AdminPath>,
) -> ApiResult<Value> {
    if path.id == session.user_id {
        return Err(ApiError::conflict("Refusing to demote the current session's admin"));
    }

    let existed = state.gate.demote_admin(path.id, &session.email).await?;
    if !existed {
        return Err(ApiError::not_found("No role record for that user"));
    }

    Ok(ApiResponse::success(json!({
        "user_id": path.id,
        "is_active": false,
    })))
}
