use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Authenticated identity attached to a request by the session middleware.
#[derive(Clone, Debug)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
}

/// Stored role, wire form upper-case ("ADMIN", "USER", "MODERATOR").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
    Moderator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
            Role::Moderator => "MODERATOR",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            "MODERATOR" => Ok(Role::Moderator),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization record keyed by principal id in the role store.
#[derive(Clone, Debug, Serialize)]
pub struct RoleRecord {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
}

impl RoleRecord {
    pub fn is_active_admin(&self) -> bool {
        self.role == Role::Admin && self.is_active
    }
}

/// Fields written by the insert-or-update on the role store, conflict key
/// is `user_id`.
#[derive(Clone, Debug)]
pub struct RoleUpsert {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl RoleUpsert {
    /// The grant written by admin provisioning: active ADMIN, timestamps now.
    pub fn admin_grant(user_id: Uuid, email: &str) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            email: email.to_string(),
            role: Role::Admin,
            is_active: true,
            updated_at: now,
            last_login: now,
        }
    }
}
