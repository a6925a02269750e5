use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The single application settings row (`id = 1`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AppSettings {
    pub id: i32,
    pub free_credits: i32,
    pub max_file_size_mb: i32,
    pub enable_registration: bool,
    pub maintenance_mode: bool,
    pub updated_at: DateTime<Utc>,
}

impl AppSettings {
    /// Defaults served when the row has never been written.
    pub fn defaults() -> Self {
        Self {
            id: 1,
            free_credits: 10,
            max_file_size_mb: 5,
            enable_registration: true,
            maintenance_mode: false,
            updated_at: Utc::now(),
        }
    }
}
