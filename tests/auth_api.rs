mod common;

use axum::http::StatusCode;
use common::{admin_token, call, empty_request, json_request, test_app, user_token, ADMIN_EMAIL};
use serde_json::json;

#[tokio::test]
async fn health_reports_store_backend() {
    let app = test_app().await;
    let (status, body) = call(&app, empty_request("GET", "/api/v1/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn login_issues_bearer_tokens() {
    let app = test_app().await;
    let (status, body) = call(
        &app,
        json_request(
            "POST",
            "/api/v1/login/access-token",
            None,
            json!({ "email": "ADMIN@example.com", "password": "changethis" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert!(body["access_token"].as_str().is_some());
    assert!(body["refresh_token"].as_str().is_some());
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_email() {
    let app = test_app().await;
    for (email, password) in [(ADMIN_EMAIL, "wrongpassword"), ("nobody@example.com", "changethis")] {
        let (status, body) = call(
            &app,
            json_request(
                "POST",
                "/api/v1/login/access-token",
                None,
                json!({ "email": email, "password": password }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Incorrect email or password");
    }
}

#[tokio::test]
async fn refresh_returns_new_pair_and_rejects_access_token() {
    let app = test_app().await;
    let (_, tokens) = call(
        &app,
        json_request(
            "POST",
            "/api/v1/login/access-token",
            None,
            json!({ "email": ADMIN_EMAIL, "password": "changethis" }),
        ),
    )
    .await;

    let (status, body) = call(
        &app,
        json_request(
            "POST",
            "/api/v1/login/refresh",
            None,
            json!({ "refresh_token": tokens["refresh_token"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].as_str().is_some());

    let (status, _) = call(
        &app,
        json_request(
            "POST",
            "/api/v1/login/refresh",
            None,
            json!({ "refresh_token": tokens["access_token"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = test_app().await;
    let (status, body) = call(&app, empty_request("GET", "/api/v1/users/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let (status, _) = call(&app, empty_request("GET", "/api/v1/users/me", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn regular_user_cannot_reach_admin_routes() {
    let app = test_app().await;
    let admin = admin_token(&app).await;
    let (_, token) = user_token(&app, &admin, "a@x.com").await;

    for uri in ["/api/v1/users", "/api/v1/posts", "/api/v1/categories"] {
        let (status, body) = call(&app, empty_request("GET", uri, Some(&token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["message"], "The user doesn't have enough privileges");
    }
}

#[tokio::test]
async fn inactive_user_is_rejected() {
    let app = test_app().await;
    let admin = admin_token(&app).await;
    let (id, token) = user_token(&app, &admin, "a@x.com").await;

    let (status, _) = call(
        &app,
        json_request(
            "PATCH",
            &format!("/api/v1/users/{id}"),
            Some(&admin),
            json!({ "is_active": false }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, empty_request("GET", "/api/v1/users/me", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Inactive user");

    let (status, _) = call(
        &app,
        json_request(
            "POST",
            "/api/v1/login/access-token",
            None,
            json!({ "email": "a@x.com", "password": "longenough1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
