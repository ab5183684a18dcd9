#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use blogapi::app::build_app;
use blogapi::config::{EmailConfig, FirstSuperuser};
use blogapi::mail::Mailer;
use blogapi::state::AppState;
use blogapi::users::services::ensure_first_superuser;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "changethis";

/// Fresh in-memory app with the first superuser already seeded.
pub async fn test_app() -> Router {
    let fake = AppState::fake();
    let mailer = fake.mailer.clone();
    build_seeded(fake, None, mailer).await
}

/// Like [`test_app`], with emails enabled and delivered to `mailer`.
pub async fn test_app_with_mailer(mailer: Arc<dyn Mailer>) -> Router {
    let emails = EmailConfig {
        api_url: "http://127.0.0.1:9/send".to_string(),
        api_key: None,
        from: "noreply@example.com".to_string(),
    };
    build_seeded(AppState::fake(), Some(emails), mailer).await
}

async fn build_seeded(
    fake: AppState,
    emails: Option<EmailConfig>,
    mailer: Arc<dyn Mailer>,
) -> Router {
    let mut config = (*fake.config).clone();
    config.first_superuser = Some(FirstSuperuser {
        email: ADMIN_EMAIL.to_string(),
        password: ADMIN_PASSWORD.to_string(),
    });
    config.emails = emails;
    let state = AppState::from_parts(fake.store, Arc::new(config), mailer);
    ensure_first_superuser(state.store.as_ref(), &state.config)
        .await
        .expect("seed superuser");
    build_app(state)
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

/// Sends the request and returns status plus decoded JSON body.
pub async fn call(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(req).await.expect("response");
    let status = response.status();
    (status, read_json(response).await)
}

pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = call(
        app,
        json_request(
            "POST",
            "/api/v1/login/access-token",
            None,
            serde_json::json!({ "email": email, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["access_token"].as_str().expect("access_token").to_string()
}

pub async fn admin_token(app: &Router) -> String {
    login(app, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

/// Creates a regular user through the admin endpoint and logs them in.
pub async fn user_token(app: &Router, admin: &str, email: &str) -> (String, String) {
    let (status, body) = call(
        app,
        json_request(
            "POST",
            "/api/v1/users",
            Some(admin),
            serde_json::json!({ "email": email, "password": "longenough1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create user failed: {body}");
    let id = body["id"].as_str().expect("id").to_string();
    (id, login(app, email, "longenough1").await)
}
