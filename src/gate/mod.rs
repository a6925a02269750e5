//! The admin access gate: one policy-driven authorization check for every
//! request to the admin surface.
//!
//! Evaluation is layered and fail-closed: path token (when configured),
//! session presence, email whitelist, then the stored role record. A
//! whitelisted principal without an active ADMIN record can be provisioned
//! one on the spot (`auto_provision`); that write goes through the same
//! audited [`AccessGate::provision_admin`] operation operators use.

pub mod policy;
pub mod principal;
pub mod stores;

pub use policy::{GatePolicy, HOME_PATH};
pub use principal::{Role, RoleRecord, RoleUpsert, Session};
pub use stores::{AuditEvent, AuditSink, RoleStore, StoreError};

use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Why a request was denied. Observability only: every denial is
/// user-visible as the same redirect, never as a distinct error page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthErrorKind {
    NoSession,
    TokenMismatch,
    NotWhitelisted,
    RoleCheckFailed,
    StoreUnavailable,
}

impl AuthErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorKind::NoSession => "no_session",
            AuthErrorKind::TokenMismatch => "token_mismatch",
            AuthErrorKind::NotWhitelisted => "not_whitelisted",
            AuthErrorKind::RoleCheckFailed => "role_check_failed",
            AuthErrorKind::StoreUnavailable => "store_unavailable",
        }
    }
}

/// Successful gate outcome.
#[derive(Clone, Debug)]
pub struct Grant {
    pub user_id: Uuid,
    pub email: String,
    /// True when this request created or corrected the role record.
    pub provisioned: bool,
}

/// Denied gate outcome: where to send the client, and why (for logs).
#[derive(Clone, Debug)]
pub struct Denied {
    pub kind: AuthErrorKind,
    pub redirect: String,
}

/// What caused a provisioning write, recorded in the audit trail.
#[derive(Clone, Debug)]
pub enum ProvisionTrigger {
    /// The gate healed a missing or inactive record during an access check.
    SelfHeal,
    /// An operator ran the explicit provision operation.
    Operator { actor: String },
}

impl ProvisionTrigger {
    fn actor(&self) -> String {
        match self {
            ProvisionTrigger::SelfHeal => "gate".to_string(),
            ProvisionTrigger::Operator { actor } => actor.clone(),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            ProvisionTrigger::SelfHeal => "self_heal",
            ProvisionTrigger::Operator { .. } => "operator",
        }
    }
}

pub struct AccessGate {
    policy: GatePolicy,
    whitelist: HashSet<String>,
    roles: Arc<dyn RoleStore>,
    audit: Arc<dyn AuditSink>,
}

impl AccessGate {
    pub fn new(
        policy: GatePolicy,
        admin_emails: &[String],
        roles: Arc<dyn RoleStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let whitelist: HashSet<String> = admin_emails
            .iter()
            .map(|e| e.trim().to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        if whitelist.is_empty() {
            tracing::warn!("admin whitelist is empty: every admin request will be denied");
        }

        Self {
            policy,
            whitelist,
            roles,
            audit,
        }
    }

    pub fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    pub fn is_whitelisted(&self, email: &str) -> bool {
        self.whitelist.contains(&email.trim().to_ascii_lowercase())
    }

    fn deny(&self, kind: AuthErrorKind, redirect: &str, email: Option<&str>) -> Denied {
        tracing::warn!(
            reason = kind.as_str(),
            email = email.unwrap_or("-"),
            redirect,
            "admin access denied"
        );
        Denied {
            kind,
            redirect: redirect.to_string(),
        }
    }

    /// Evaluate one request against the full check chain. `request_token` is
    /// the path segment after the admin prefix, when the route carries one.
    ///
    /// The principal is rebuilt from scratch on every call; nothing is
    /// cached across requests.
    pub async fn evaluate(
        &self,
        request_token: Option<&str>,
        session: Option<&Session>,
    ) -> Result<Grant, Denied> {
        // Token check comes first: it gates the route shape, before any
        // identity is even considered.
        if let Some(expected) = &self.policy.path_token {
            if request_token != Some(expected.as_str()) {
                return Err(self.deny(AuthErrorKind::TokenMismatch, HOME_PATH, None));
            }
        }

        let session = match session {
            Some(s) => s,
            None => {
                return Err(self.deny(AuthErrorKind::NoSession, &self.policy.login_path, None))
            }
        };

        // Whitelist is a mandatory gate, not an alternative to the role
        // record. An empty whitelist denies everyone.
        if !self.is_whitelisted(&session.email) {
            return Err(self.deny(
                AuthErrorKind::NotWhitelisted,
                &self.policy.denied_path,
                Some(&session.email),
            ));
        }

        match self.roles.get(session.user_id).await {
            Err(e) => {
                // Transport failure: fail closed, no self-heal attempt.
                tracing::error!("role lookup failed for {}: {}", session.user_id, e);
                Err(self.deny(
                    AuthErrorKind::StoreUnavailable,
                    &self.policy.denied_path,
                    Some(&session.email),
                ))
            }
            Ok(Some(record)) if record.is_active_admin() => Ok(Grant {
                user_id: session.user_id,
                email: session.email.clone(),
                provisioned: false,
            }),
            Ok(_) => {
                // Record missing, wrong role, or inactive.
                if !self.policy.auto_provision {
                    return Err(self.deny(
                        AuthErrorKind::RoleCheckFailed,
                        &self.policy.denied_path,
                        Some(&session.email),
                    ));
                }

                match self
                    .provision_admin(session.user_id, &session.email, ProvisionTrigger::SelfHeal)
                    .await
                {
                    Ok(()) => Ok(Grant {
                        user_id: session.user_id,
                        email: session.email.clone(),
                        provisioned: true,
                    }),
                    Err(e) => {
                        tracing::error!("self-heal upsert failed for {}: {}", session.email, e);
                        Err(self.deny(
                            AuthErrorKind::RoleCheckFailed,
                            &self.policy.denied_path,
                            Some(&session.email),
                        ))
                    }
                }
            }
        }
    }

    /// Write an active ADMIN record for the principal, keyed on user id, and
    /// record who or what asked for it. This is the only code path that
    /// grants admin in storage.
    pub async fn provision_admin(
        &self,
        user_id: Uuid,
        email: &str,
        trigger: ProvisionTrigger,
    ) -> Result<(), StoreError> {
        self.roles
            .upsert(RoleUpsert::admin_grant(user_id, email))
            .await?;

        tracing::info!(
            email,
            trigger = trigger.as_str(),
            "provisioned admin role for {}",
            user_id
        );

        let event = AuditEvent {
            actor: trigger.actor(),
            action: "admin.provision",
            subject_id: Some(user_id),
            detail: json!({ "email": email, "trigger": trigger.as_str() }),
        };
        if let Err(e) = self.audit.record(event).await {
            // The grant is already written; retracting it here would leave
            // the store and the decision disagreeing. Logs carry the gap.
            tracing::error!("audit write failed for admin.provision {}: {}", user_id, e);
        }

        Ok(())
    }

    /// Deactivate a role record. Returns false when none existed. The gate
    /// never calls this; it is operator-only.
    pub async fn demote_admin(&self, user_id: Uuid, actor: &str) -> Result<bool, StoreError> {
        let existed = self.roles.deactivate(user_id).await?;

        if existed {
            let event = AuditEvent {
                actor: actor.to_string(),
                action: "admin.demote",
                subject_id: Some(user_id),
                detail: json!({}),
            };
            if let Err(e) = self.audit.record(event).await {
                tracing::error!("audit write failed for admin.demote {}: {}", user_id, e);
            }
        }

        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryAuditSink, MemoryRoleStore};

    fn session(email: &str) -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
        }
    }

    fn gate_with(
        policy: GatePolicy,
        whitelist: &[&str],
        roles: Arc<MemoryRoleStore>,
        audit: Arc<MemoryAuditSink>,
    ) -> AccessGate {
        let emails: Vec<String> = whitelist.iter().map(|s| s.to_string()).collect();
        AccessGate::new(policy, &emails, roles, audit)
    }

    #[tokio::test]
    async fn no_session_redirects_to_login() {
        let roles = Arc::new(MemoryRoleStore::new());
        let gate = gate_with(
            GatePolicy::default(),
            &["ops@pixelkit.app"],
            roles,
            Arc::new(MemoryAuditSink::new()),
        );

        let denied = gate.evaluate(None, None).await.unwrap_err();
        assert_eq!(denied.kind, AuthErrorKind::NoSession);
        assert_eq!(denied.redirect, "/auth/login");
    }

    #[tokio::test]
    async fn whitelist_blocks_even_active_admin_record() {
        let roles = Arc::new(MemoryRoleStore::new());
        let s = session("x@y.com");
        roles.put_active_admin(s.user_id, &s.email);

        let gate = gate_with(
            GatePolicy::default(),
            &["ops@pixelkit.app"],
            roles.clone(),
            Arc::new(MemoryAuditSink::new()),
        );

        let denied = gate.evaluate(None, Some(&s)).await.unwrap_err();
        assert_eq!(denied.kind, AuthErrorKind::NotWhitelisted);
        // No write happened on the deny path
        assert_eq!(roles.upsert_count(), 0);
    }

    #[tokio::test]
    async fn whitelist_match_is_case_insensitive() {
        let roles = Arc::new(MemoryRoleStore::new());
        let s = session("Ops@PixelKit.app");
        roles.put_active_admin(s.user_id, &s.email);

        let gate = gate_with(
            GatePolicy::default(),
            &["ops@pixelkit.app"],
            roles,
            Arc::new(MemoryAuditSink::new()),
        );

        assert!(gate.evaluate(None, Some(&s)).await.is_ok());
    }

    #[tokio::test]
    async fn empty_whitelist_denies_everyone() {
        let roles = Arc::new(MemoryRoleStore::new());
        let s = session("ops@pixelkit.app");
        roles.put_active_admin(s.user_id, &s.email);

        let gate = gate_with(
            GatePolicy::default(),
            &[],
            roles,
            Arc::new(MemoryAuditSink::new()),
        );

        let denied = gate.evaluate(None, Some(&s)).await.unwrap_err();
        assert_eq!(denied.kind, AuthErrorKind::NotWhitelisted);
    }

    #[tokio::test]
    async fn active_admin_record_allows_without_write() {
        let roles = Arc::new(MemoryRoleStore::new());
        let s = session("ops@pixelkit.app");
        roles.put_active_admin(s.user_id, &s.email);

        let gate = gate_with(
            GatePolicy::default(),
            &["ops@pixelkit.app"],
            roles.clone(),
            Arc::new(MemoryAuditSink::new()),
        );

        let grant = gate.evaluate(None, Some(&s)).await.unwrap();
        assert!(!grant.provisioned);
        assert_eq!(grant.user_id, s.user_id);
        assert_eq!(roles.upsert_count(), 0);
    }

    #[tokio::test]
    async fn missing_record_self_heals_and_allows() {
        let roles = Arc::new(MemoryRoleStore::new());
        let audit = Arc::new(MemoryAuditSink::new());
        let s = session("ops@pixelkit.app");

        let gate = gate_with(
            GatePolicy::default(),
            &["ops@pixelkit.app"],
            roles.clone(),
            audit.clone(),
        );

        let grant = gate.evaluate(None, Some(&s)).await.unwrap();
        assert!(grant.provisioned);

        let record = roles.get(s.user_id).await.unwrap().unwrap();
        assert!(record.is_active_admin());
        assert_eq!(record.email, s.email);

        let events = audit.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, "admin.provision");
        assert_eq!(events[0].actor, "gate");
        assert_eq!(events[0].subject_id, Some(s.user_id));
    }

    #[tokio::test]
    async fn self_heal_is_idempotent_across_evaluations() {
        let roles = Arc::new(MemoryRoleStore::new());
        let s = session("ops@pixelkit.app");

        let gate = gate_with(
            GatePolicy::default(),
            &["ops@pixelkit.app"],
            roles.clone(),
            Arc::new(MemoryAuditSink::new()),
        );

        let first = gate.evaluate(None, Some(&s)).await.unwrap();
        assert!(first.provisioned);
        assert_eq!(roles.upsert_count(), 1);
        assert_eq!(roles.len(), 1);

        // Second run short-circuits on the now-active record
        let second = gate.evaluate(None, Some(&s)).await.unwrap();
        assert!(!second.provisioned);
        assert_eq!(roles.upsert_count(), 1);
        assert_eq!(roles.len(), 1);
    }

    #[tokio::test]
    async fn user_role_record_is_healed_to_admin() {
        let roles = Arc::new(MemoryRoleStore::new());
        let s = session("ops@pixelkit.app");
        roles.put_record(s.user_id, &s.email, Role::User, true);

        let gate = gate_with(
            GatePolicy::default(),
            &["ops@pixelkit.app"],
            roles.clone(),
            Arc::new(MemoryAuditSink::new()),
        );

        let grant = gate.evaluate(None, Some(&s)).await.unwrap();
        assert!(grant.provisioned);
        assert!(roles.get(s.user_id).await.unwrap().unwrap().is_active_admin());
    }

    #[tokio::test]
    async fn inactive_admin_record_is_healed() {
        let roles = Arc::new(MemoryRoleStore::new());
        let s = session("ops@pixelkit.app");
        roles.put_record(s.user_id, &s.email, Role::Admin, false);

        let gate = gate_with(
            GatePolicy::default(),
            &["ops@pixelkit.app"],
            roles.clone(),
            Arc::new(MemoryAuditSink::new()),
        );

        assert!(gate.evaluate(None, Some(&s)).await.unwrap().provisioned);
    }

    #[tokio::test]
    async fn store_lookup_failure_fails_closed() {
        let roles = Arc::new(MemoryRoleStore::new());
        roles.fail_get(true);
        let s = session("ops@pixelkit.app");

        let gate = gate_with(
            GatePolicy::default(),
            &["ops@pixelkit.app"],
            roles.clone(),
            Arc::new(MemoryAuditSink::new()),
        );

        let denied = gate.evaluate(None, Some(&s)).await.unwrap_err();
        assert_eq!(denied.kind, AuthErrorKind::StoreUnavailable);
        assert_eq!(denied.redirect, "/auth/login");
        // Transport failure never triggers a self-heal write
        assert_eq!(roles.upsert_count(), 0);
    }

    #[tokio::test]
    async fn failed_upsert_denies() {
        let roles = Arc::new(MemoryRoleStore::new());
        roles.fail_upsert(true);
        let s = session("ops@pixelkit.app");

        let gate = gate_with(
            GatePolicy::default(),
            &["ops@pixelkit.app"],
            roles,
            Arc::new(MemoryAuditSink::new()),
        );

        let denied = gate.evaluate(None, Some(&s)).await.unwrap_err();
        assert_eq!(denied.kind, AuthErrorKind::RoleCheckFailed);
    }

    #[tokio::test]
    async fn auto_provision_off_denies_unrecorded_principal() {
        let roles = Arc::new(MemoryRoleStore::new());
        let s = session("ops@pixelkit.app");

        let policy = GatePolicy {
            auto_provision: false,
            ..GatePolicy::default()
        };
        let gate = gate_with(
            policy,
            &["ops@pixelkit.app"],
            roles.clone(),
            Arc::new(MemoryAuditSink::new()),
        );

        let denied = gate.evaluate(None, Some(&s)).await.unwrap_err();
        assert_eq!(denied.kind, AuthErrorKind::RoleCheckFailed);
        assert_eq!(roles.upsert_count(), 0);
    }

    #[tokio::test]
    async fn token_mismatch_redirects_home_before_session_checks() {
        let roles = Arc::new(MemoryRoleStore::new());
        let policy = GatePolicy {
            path_token: Some("sekrit".to_string()),
            ..GatePolicy::default()
        };
        let gate = gate_with(policy, &["ops@pixelkit.app"], roles, Arc::new(MemoryAuditSink::new()));

        // Wrong token, no session: token outranks the session check
        let denied = gate.evaluate(Some("nope"), None).await.unwrap_err();
        assert_eq!(denied.kind, AuthErrorKind::TokenMismatch);
        assert_eq!(denied.redirect, HOME_PATH);

        // Missing token entirely
        let denied = gate.evaluate(None, None).await.unwrap_err();
        assert_eq!(denied.kind, AuthErrorKind::TokenMismatch);
    }

    #[tokio::test]
    async fn matching_token_proceeds_to_session_checks() {
        let roles = Arc::new(MemoryRoleStore::new());
        let s = session("ops@pixelkit.app");
        roles.put_active_admin(s.user_id, &s.email);

        let policy = GatePolicy {
            path_token: Some("sekrit".to_string()),
            ..GatePolicy::default()
        };
        let gate = gate_with(
            policy,
            &["ops@pixelkit.app"],
            roles,
            Arc::new(MemoryAuditSink::new()),
        );

        let denied = gate.evaluate(Some("sekrit"), None).await.unwrap_err();
        assert_eq!(denied.kind, AuthErrorKind::NoSession);

        assert!(gate.evaluate(Some("sekrit"), Some(&s)).await.is_ok());
    }

    #[tokio::test]
    async fn configured_denied_path_is_used_for_non_session_denials() {
        let roles = Arc::new(MemoryRoleStore::new());
        let s = session("x@y.com");

        let policy = GatePolicy {
            denied_path: "/".to_string(),
            ..GatePolicy::default()
        };
        let gate = gate_with(
            policy,
            &["ops@pixelkit.app"],
            roles,
            Arc::new(MemoryAuditSink::new()),
        );

        let denied = gate.evaluate(None, Some(&s)).await.unwrap_err();
        assert_eq!(denied.redirect, "/");

        // Missing session still goes to the login path
        let denied = gate.evaluate(None, None).await.unwrap_err();
        assert_eq!(denied.redirect, "/auth/login");
    }

    #[tokio::test]
    async fn demote_deactivates_and_audits() {
        let roles = Arc::new(MemoryRoleStore::new());
        let audit = Arc::new(MemoryAuditSink::new());
        let s = session("ops@pixelkit.app");
        roles.put_active_admin(s.user_id, &s.email);

        let gate = gate_with(
            GatePolicy::default(),
            &["ops@pixelkit.app"],
            roles.clone(),
            audit.clone(),
        );

        assert!(gate.demote_admin(s.user_id, "root@pixelkit.app").await.unwrap());
        assert!(!roles.get(s.user_id).await.unwrap().unwrap().is_active);
        assert_eq!(audit.events()[0].action, "admin.demote");

        // Demoted principal is no longer allowed once self-heal is off
        let policy = GatePolicy {
            auto_provision: false,
            ..GatePolicy::default()
        };
        let gate = gate_with(policy, &["ops@pixelkit.app"], roles, audit);
        assert!(gate.evaluate(None, Some(&s)).await.is_err());
    }

    #[tokio::test]
    async fn demote_missing_record_returns_false_without_audit() {
        let roles = Arc::new(MemoryRoleStore::new());
        let audit = Arc::new(MemoryAuditSink::new());
        let gate = gate_with(
            GatePolicy::default(),
            &["ops@pixelkit.app"],
            roles,
            audit.clone(),
        );

        assert!(!gate.demote_admin(Uuid::new_v4(), "root@pixelkit.app").await.unwrap());
        assert!(audit.events().is_empty());
    }

    #[tokio::test]
    async fn audit_failure_does_not_retract_self_heal() {
        let roles = Arc::new(MemoryRoleStore::new());
        let audit = Arc::new(MemoryAuditSink::new());
        audit.fail(true);
        let s = session("ops@pixelkit.app");

        let gate = gate_with(
            GatePolicy::default(),
            &["ops@pixelkit.app"],
            roles.clone(),
            audit,
        );

        let grant = gate.evaluate(None, Some(&s)).await.unwrap();
        assert!(grant.provisioned);
        assert!(roles.get(s.user_id).await.unwrap().unwrap().is_active_admin());
    }
}
