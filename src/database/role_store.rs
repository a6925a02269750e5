use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::gate::{AuditEvent, AuditSink, Role, RoleRecord, RoleStore, RoleUpsert, StoreError};

fn map_store_err(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(e.to_string())
        }
        other => StoreError::Query(other.to_string()),
    }
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> RoleRecord {
    let role: String = row.get("role");
    RoleRecord {
        user_id: row.get("user_id"),
        email: row.get("email"),
        // Unknown role values never grant access
        role: role.parse().unwrap_or(Role::User),
        is_active: row.get("is_active"),
        last_login: row.get("last_login"),
    }
}

/// `user_roles` table in the hosted Postgres database, keyed on `user_id`.
pub struct SqlRoleStore {
    pool: PgPool,
}

impl SqlRoleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for SqlRoleStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<RoleRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, email, role, is_active, last_login
            FROM user_roles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_store_err)?;

        Ok(row.as_ref().map(record_from_row))
    }

    async fn upsert(&self, record: RoleUpsert) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, email, role, is_active, created_at, updated_at, last_login)
            VALUES ($1, $2, $3, $4, $5, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                email = EXCLUDED.email,
                role = EXCLUDED.role,
                is_active = EXCLUDED.is_active,
                updated_at = EXCLUDED.updated_at,
                last_login = EXCLUDED.last_login
            "#,
        )
        .bind(record.user_id)
        .bind(&record.email)
        .bind(record.role.as_str())
        .bind(record.is_active)
        .bind(record.updated_at)
        .bind(record.last_login)
        .execute(&self.pool)
        .await
        .map_err(map_store_err)?;

        Ok(())
    }

    async fn deactivate(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE user_roles
            SET is_active = false, updated_at = now()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(map_store_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_admins(&self) -> Result<Vec<RoleRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, email, role, is_active, last_login
            FROM user_roles
            WHERE role = 'ADMIN'
            ORDER BY email
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_store_err)?;

        Ok(rows.iter().map(record_from_row).collect())
    }
}

/// Audit trail writer backed by the `audit_log` table.
pub struct SqlAuditSink {
    pool: PgPool,
}

impl SqlAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for SqlAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (id, actor_email, action, subject_id, detail, created_at)
            VALUES ($1, $2, $3, $4, $5, now())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&event.actor)
        .bind(event.action)
        .bind(event.subject_id)
        .bind(&event.detail)
        .execute(&self.pool)
        .await
        .map_err(map_store_err)?;

        Ok(())
    }
}
