use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::app::AppState;
use crate::gate::Session;

/// Applies the access gate to every path under the admin prefix and turns
/// denials into temporary redirects, the way the original middleware did.
/// Non-admin paths pass through untouched.
pub async fn admin_gate_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if !is_admin_path(path) {
        return next.run(request).await;
    }

    let token = segment_after_admin(path);
    let session = request.extensions().get::<Session>().cloned();

    match state.gate.evaluate(token.as_deref(), session.as_ref()).await {
        Ok(grant) => {
            request.extensions_mut().insert(grant);
            next.run(request).await
        }
        Err(denied) => Redirect::temporary(&denied.redirect).into_response(),
    }
}

fn is_admin_path(path: &str) -> bool {
    path == "/admin" || path.starts_with("/admin/")
}

/// First path segment after `/admin`, the candidate token when the policy
/// expects one embedded in the path.
fn segment_after_admin(path: &str) -> Option<String> {
    let rest = path.strip_prefix("/admin/")?;
    let segment = rest.split('/').next()?;
    if segment.is_empty() {
        None
    } else {
        Some(segment.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_admin_prefix_only() {
        assert!(is_admin_path("/admin"));
        assert!(is_admin_path("/admin/api/users"));
        assert!(!is_admin_path("/administrator"));
        assert!(!is_admin_path("/auth/login"));
        assert!(!is_admin_path("/"));
    }

    #[test]
    fn extracts_candidate_token_segment() {
        assert_eq!(
            segment_after_admin("/admin/sekrit/api/users").as_deref(),
            Some("sekrit")
        );
        assert_eq!(segment_after_admin("/admin/api").as_deref(), Some("api"));
        assert_eq!(segment_after_admin("/admin"), None);
        assert_eq!(segment_after_admin("/admin/"), None);
    }
}
