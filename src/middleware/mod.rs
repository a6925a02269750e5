pub mod admin_gate;
pub mod auth;
pub mod response;

pub use admin_gate::admin_gate_middleware;
pub use auth::{session_middleware, SESSION_COOKIE};
pub use response::{ApiResponse, ApiResult};
