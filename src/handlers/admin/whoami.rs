use axum::extract::Extension;
use serde_json::{json, Value};

use crate::gate::{Grant, Session};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /admin/api/whoami - the session as the gate resolved it, including
/// whether this request self-healed the role record.
pub async fn whoami(
    Extension(session): Extension<Session>,
    Extension(grant): Extension<Grant>,
) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "user_id": session.user_id,
        "email": session.email,
        "provisioned": grant.provisioned,
    })))
}
