use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Processed image row managed from the content screen. `status` is one of
/// PENDING, PROCESSING, COMPLETED, FAILED.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ImageRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_url: String,
    pub processed_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
