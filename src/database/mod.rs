pub mod manager;
pub mod models;
pub mod role_store;

pub use manager::{DatabaseError, DatabaseManager};
pub use role_store::{SqlAuditSink, SqlRoleStore};
