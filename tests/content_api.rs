mod common;

use axum::http::StatusCode;
use common::{admin_token, call, empty_request, json_request, test_app};
use serde_json::json;

async fn create_category(app: &axum::Router, token: &str, slug: &str) -> serde_json::Value {
    let (status, body) = call(
        app,
        json_request(
            "POST",
            "/api/v1/categories",
            Some(token),
            json!({ "name": slug, "slug": slug }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn category_crud() {
    let app = test_app().await;
    let admin = admin_token(&app).await;
    let created = create_category(&app, &admin, "tech").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = call(
        &app,
        empty_request("GET", &format!("/api/v1/categories/{id}"), Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "tech");

    let (status, body) = call(
        &app,
        json_request(
            "PATCH",
            &format!("/api/v1/categories/{id}"),
            Some(&admin),
            json!({ "description": "All things tech" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "All things tech");
    assert_eq!(body["name"], "tech");
    assert_eq!(body["created_at"], created["created_at"]);
    assert_ne!(body["updated_at"], created["updated_at"]);

    let (status, body) = call(
        &app,
        empty_request("DELETE", &format!("/api/v1/categories/{id}"), Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category deleted successfully");

    let (status, body) = call(
        &app,
        empty_request("GET", &format!("/api/v1/categories/{id}"), Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found");
}

#[tokio::test]
async fn duplicate_slugs_conflict() {
    let app = test_app().await;
    let admin = admin_token(&app).await;
    create_category(&app, &admin, "tech").await;

    let (status, body) = call(
        &app,
        json_request(
            "POST",
            "/api/v1/categories",
            Some(&admin),
            json!({ "name": "Again", "slug": "tech" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Category slug already exists");

    let post = json!({ "title": "Hello", "slug": "hello" });
    let (status, _) = call(&app, json_request("POST", "/api/v1/posts", Some(&admin), post.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = call(&app, json_request("POST", "/api/v1/posts", Some(&admin), post)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Post slug already exists");
}

#[tokio::test]
async fn invalid_slug_is_rejected() {
    let app = test_app().await;
    let admin = admin_token(&app).await;
    let (status, body) = call(
        &app,
        json_request(
            "POST",
            "/api/v1/posts",
            Some(&admin),
            json!({ "title": "Hello", "slug": "Not A Slug" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn post_crud_with_partial_update() {
    let app = test_app().await;
    let admin = admin_token(&app).await;
    let category = create_category(&app, &admin, "tech").await;

    let (status, created) = call(
        &app,
        json_request(
            "POST",
            "/api/v1/posts",
            Some(&admin),
            json!({
                "title": "Hello",
                "slug": "hello",
                "content": "First post",
                "image": "img.png",
                "category_id": category["id"],
                "tags": ["rust", "axum"]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["is_published"], false);
    assert_eq!(created["published_at"], serde_json::Value::Null);
    let id = created["id"].as_str().unwrap();

    let (status, body) = call(
        &app,
        json_request(
            "PATCH",
            &format!("/api/v1/posts/{id}"),
            Some(&admin),
            json!({ "is_published": true, "published_at": "2024-03-01T12:00:00Z", "image": null }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_published"], true);
    assert_eq!(body["published_at"], "2024-03-01T12:00:00Z");
    assert_eq!(body["image"], serde_json::Value::Null);
    assert_eq!(body["content"], "First post");
    assert_eq!(body["tags"], json!(["rust", "axum"]));
    assert_eq!(body["category_id"], category["id"]);

    let (status, _) = call(
        &app,
        empty_request("DELETE", &format!("/api/v1/posts/{id}"), Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(
        &app,
        empty_request("DELETE", &format!("/api/v1/posts/{id}"), Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Post not found");
}

#[tokio::test]
async fn post_with_unknown_category_is_not_found() {
    let app = test_app().await;
    let admin = admin_token(&app).await;
    let (status, body) = call(
        &app,
        json_request(
            "POST",
            "/api/v1/posts",
            Some(&admin),
            json!({ "title": "Hello", "slug": "hello", "category_id": uuid::Uuid::new_v4() }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found");
}

#[tokio::test]
async fn deleting_category_nulls_post_reference() {
    let app = test_app().await;
    let admin = admin_token(&app).await;
    let category = create_category(&app, &admin, "tech").await;
    let category_id = category["id"].as_str().unwrap();

    let (_, post) = call(
        &app,
        json_request(
            "POST",
            "/api/v1/posts",
            Some(&admin),
            json!({ "title": "Hello", "slug": "hello", "category_id": category_id }),
        ),
    )
    .await;
    let post_id = post["id"].as_str().unwrap();

    let (status, _) = call(
        &app,
        empty_request("DELETE", &format!("/api/v1/categories/{category_id}"), Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app,
        empty_request("GET", &format!("/api/v1/posts/{post_id}"), Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category_id"], serde_json::Value::Null);
}

#[tokio::test]
async fn list_posts_pages_with_total_count() {
    let app = test_app().await;
    let admin = admin_token(&app).await;
    for i in 0..15 {
        let (status, _) = call(
            &app,
            json_request(
                "POST",
                "/api/v1/posts",
                Some(&admin),
                json!({ "title": format!("Post {i}"), "slug": format!("post-{i}") }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = call(
        &app,
        empty_request("GET", "/api/v1/posts?skip=0&limit=10", Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 10);
    assert_eq!(body["count"], 15);
    assert_eq!(data[0]["slug"], "post-0");

    let (_, body) = call(
        &app,
        empty_request("GET", "/api/v1/posts?skip=10&limit=10", Some(&admin)),
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
}
