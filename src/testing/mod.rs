//! In-memory store fakes shared by the unit tests and the integration
//! tests in `tests/`. Not part of the service runtime.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::gate::{AuditEvent, AuditSink, Role, RoleRecord, RoleStore, RoleUpsert, StoreError};

#[derive(Default)]
pub struct MemoryRoleStore {
    records: Mutex<HashMap<Uuid, RoleRecord>>,
    upserts: AtomicUsize,
    fail_get: AtomicBool,
    fail_upsert: AtomicBool,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_record(&self, user_id: Uuid, email: &str, role: Role, is_active: bool) {
        let record = RoleRecord {
            user_id,
            email: email.to_string(),
            role,
            is_active,
            last_login: None,
        };
        self.records.lock().unwrap().insert(user_id, record);
    }

    pub fn put_active_admin(&self, user_id: Uuid, email: &str) {
        self.put_record(user_id, email, Role::Admin, true);
    }

    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_upsert(&self, fail: bool) {
        self.fail_upsert.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<RoleRecord>, StoreError> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected get failure".to_string()));
        }
        Ok(self.records.lock().unwrap().get(&user_id).cloned())
    }

    async fn upsert(&self, record: RoleUpsert) -> Result<(), StoreError> {
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(StoreError::Query("injected upsert failure".to_string()));
        }
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.records.lock().unwrap().insert(
            record.user_id,
            RoleRecord {
                user_id: record.user_id,
                email: record.email,
                role: record.role,
                is_active: record.is_active,
                last_login: Some(record.last_login),
            },
        );
        Ok(())
    }

    async fn deactivate(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let mut records = self.records.lock().unwrap();
        match records.get_mut(&user_id) {
            Some(record) => {
                record.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_admins(&self) -> Result<Vec<RoleRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .values()
            .filter(|r| r.role == Role::Admin)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
    fail: AtomicBool,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected audit failure".to_string()));
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}
