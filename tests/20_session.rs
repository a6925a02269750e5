mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use uuid::Uuid;

use pixelkit_admin_api::gate::GatePolicy;

const OPS: &str = "ops@pixelkit.app";

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let app = common::test_app(GatePolicy::default(), &[OPS]);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/auth/session")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("set-cookie header")
        .to_str()
        .expect("cookie value");
    assert!(cookie.starts_with("session=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn session_cookie_is_accepted_by_the_gate() {
    let app = common::test_app(GatePolicy::default(), &[OPS]);
    let user_id = Uuid::new_v4();
    app.roles.put_active_admin(user_id, OPS);

    // bearer_for returns "Bearer <token>"; reuse the raw token as a cookie
    let token = common::bearer_for(user_id, OPS)
        .strip_prefix("Bearer ")
        .expect("bearer prefix")
        .to_string();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/api/whoami")
                .header("cookie", format!("theme=dark; session={}", token))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["email"], OPS);
}
