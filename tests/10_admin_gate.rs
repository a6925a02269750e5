mod common;

use axum::http::StatusCode;
use uuid::Uuid;

use pixelkit_admin_api::gate::GatePolicy;

const OPS: &str = "ops@pixelkit.app";

#[tokio::test]
async fn anonymous_admin_request_redirects_to_login() {
    let app = common::test_app(GatePolicy::default(), &[OPS]);

    let response = common::get(&app.router, "/admin/api/whoami", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(common::location(&response), "/auth/login");
}

#[tokio::test]
async fn non_admin_paths_are_not_gated() {
    let app = common::test_app(GatePolicy::default(), &[OPS]);

    let response = common::get(&app.router, "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn active_admin_with_whitelisted_email_is_allowed() {
    let app = common::test_app(GatePolicy::default(), &[OPS]);
    let user_id = Uuid::new_v4();
    app.roles.put_active_admin(user_id, OPS);

    let bearer = common::bearer_for(user_id, OPS);
    let response = common::get(&app.router, "/admin/api/whoami", Some(bearer.as_str())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["data"]["email"], OPS);
    assert_eq!(body["data"]["provisioned"], false);
}

#[tokio::test]
async fn whitelisted_email_without_record_is_provisioned_once() {
    let app = common::test_app(GatePolicy::default(), &[OPS]);
    let user_id = Uuid::new_v4();
    let bearer = common::bearer_for(user_id, OPS);

    let response = common::get(&app.router, "/admin/api/whoami", Some(bearer.as_str())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["provisioned"], true);

    // Record written, audit entry recorded
    assert_eq!(app.roles.len(), 1);
    assert_eq!(app.roles.upsert_count(), 1);
    let events = app.audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, "admin.provision");
    assert_eq!(events[0].actor, "gate");

    // Second request short-circuits on the existing record
    let response = common::get(&app.router, "/admin/api/whoami", Some(bearer.as_str())).await;
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["provisioned"], false);
    assert_eq!(app.roles.upsert_count(), 1);
}

#[tokio::test]
async fn whitelist_blocks_admin_record_holders() {
    let app = common::test_app(GatePolicy::default(), &[OPS]);
    let user_id = Uuid::new_v4();
    app.roles.put_active_admin(user_id, "intruder@example.com");

    let bearer = common::bearer_for(user_id, "intruder@example.com");
    let response = common::get(&app.router, "/admin/api/whoami", Some(bearer.as_str())).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(common::location(&response), "/auth/login");
}

#[tokio::test]
async fn store_failure_fails_closed() {
    let app = common::test_app(GatePolicy::default(), &[OPS]);
    let user_id = Uuid::new_v4();
    app.roles.put_active_admin(user_id, OPS);
    app.roles.fail_get(true);

    let bearer = common::bearer_for(user_id, OPS);
    let response = common::get(&app.router, "/admin/api/whoami", Some(bearer.as_str())).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn invalid_session_token_is_treated_as_anonymous() {
    let app = common::test_app(GatePolicy::default(), &[OPS]);

    let response =
        common::get(&app.router, "/admin/api/whoami", Some("Bearer not-a-jwt")).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(common::location(&response), "/auth/login");
}

#[tokio::test]
async fn configured_denied_path_overrides_login_redirect() {
    let policy = GatePolicy {
        denied_path: "/".to_string(),
        ..GatePolicy::default()
    };
    let app = common::test_app(policy, &[OPS]);
    let user_id = Uuid::new_v4();

    // Not whitelisted: goes to the configured denied path
    let bearer = common::bearer_for(user_id, "intruder@example.com");
    let response = common::get(&app.router, "/admin/api/whoami", Some(bearer.as_str())).await;
    assert_eq!(common::location(&response), "/");

    // No session at all: still the login path
    let response = common::get(&app.router, "/admin/api/whoami", None).await;
    assert_eq!(common::location(&response), "/auth/login");
}

#[tokio::test]
async fn path_token_variant_gates_the_token_segment() {
    let policy = GatePolicy {
        path_token: Some("sekrit".to_string()),
        ..GatePolicy::default()
    };
    let app = common::test_app(policy, &[OPS]);
    let user_id = Uuid::new_v4();
    app.roles.put_active_admin(user_id, OPS);
    let bearer = common::bearer_for(user_id, OPS);

    // Wrong token bounces home before any session check
    let response = common::get(&app.router, "/admin/nope/api/whoami", Some(bearer.as_str())).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(common::location(&response), "/");

    // Right token with an admin session is allowed
    let response = common::get(&app.router, "/admin/sekrit/api/whoami", Some(bearer.as_str())).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Right token without a session still needs to log in
    let response = common::get(&app.router, "/admin/sekrit/api/whoami", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(common::location(&response), "/auth/login");
}

#[tokio::test]
async fn auto_provision_off_requires_existing_record() {
    let policy = GatePolicy {
        auto_provision: false,
        ..GatePolicy::default()
    };
    let app = common::test_app(policy, &[OPS]);
    let user_id = Uuid::new_v4();
    let bearer = common::bearer_for(user_id, OPS);

    let response = common::get(&app.router, "/admin/api/whoami", Some(bearer.as_str())).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(app.roles.upsert_count(), 0);

    app.roles.put_active_admin(user_id, OPS);
    let response = common::get(&app.router, "/admin/api/whoami", Some(bearer.as_str())).await;
    assert_eq!(response.status(), StatusCode::OK);
}
