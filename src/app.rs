use axum::{
    extract::State,
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config;
use crate::database::manager::DatabaseManager;
use crate::gate::{AccessGate, RoleStore};
use crate::handlers::{admin, public};
use crate::middleware::{admin_gate_middleware, session_middleware};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub gate: Arc<AccessGate>,
    pub roles: Arc<dyn RoleStore>,
}

pub fn app(state: AppState) -> Router {
    // With a path token configured the admin routes carry the token segment;
    // the gate middleware checks it before anything else.
    let admin_prefix = if state.gate.policy().path_token.is_some() {
        "/admin/:token"
    } else {
        "/admin"
    };

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        // Gated admin surface
        .nest(admin_prefix, admin_routes())
        // Gate runs on /admin* after the session middleware has resolved
        // the principal (layers apply outermost-last)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            admin_gate_middleware,
        ))
        .layer(axum::middleware::from_fn(session_middleware));

    if config::config().security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(public::login))
        .route("/auth/session", delete(public::logout))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/whoami", get(admin::whoami))
        .route("/api/overview", get(admin::overview))
        .route("/api/analytics", get(admin::analytics))
        .route("/api/users", get(admin::users_list))
        .route("/api/users/:id/role", put(admin::user_role_put))
        .route("/api/users/:id/credits", put(admin::user_credits_put))
        .route("/api/images", get(admin::images_list))
        .route("/api/images/:id", delete(admin::image_delete))
        .route(
            "/api/settings",
            get(admin::settings_get).put(admin::settings_put),
        )
        .route(
            "/api/admins",
            get(admin::admins_list).post(admin::admin_provision),
        )
        .route("/api/admins/:id", delete(admin::admin_demote))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "PixelKit Admin API",
            "version": version,
            "description": "Admin backend for the PixelKit image-processing SaaS",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/login, /auth/session (public - session management)",
                "admin": "/admin/api/* (gated - whitelist + ADMIN role required)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
