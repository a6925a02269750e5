use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use super::principal::{RoleRecord, RoleUpsert};

/// Errors surfaced by the role store and audit sink. `Unavailable` means the
/// backing service could not be reached at all; the gate fails closed on it
/// without attempting any write.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("query error: {0}")]
    Query(String),
}

/// Keyed role table in the external store: lookup and insert-or-update by
/// principal id, plus the administrative operations layered on top.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> Result<Option<RoleRecord>, StoreError>;

    async fn upsert(&self, record: RoleUpsert) -> Result<(), StoreError>;

    /// Sets `is_active = false`. Returns false when no record existed.
    async fn deactivate(&self, user_id: Uuid) -> Result<bool, StoreError>;

    async fn list_admins(&self) -> Result<Vec<RoleRecord>, StoreError>;
}

/// A single audit trail entry. Every provision and demote writes one.
#[derive(Clone, Debug)]
pub struct AuditEvent {
    pub actor: String,
    pub action: &'static str,
    pub subject_id: Option<Uuid>,
    pub detail: Value,
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<(), StoreError>;
}
