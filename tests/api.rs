// tests/api.rs

//! 路由层黑盒测试
//!
//! 直接对 Router 发请求，检查状态码、响应头和 JSON 契约。

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use articled::config::{AuthConfig, Config, DatabaseConfig};
use articled::server::Server;
use articled::storage::Database;

async fn spawn_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let config = Arc::new(Config {
        database: DatabaseConfig {
            path: db_path.to_string_lossy().to_string(),
            max_connections: 1,
        },
        auth: AuthConfig {
            token_secret: "test-secret-key-for-testing".to_string(),
            token_expiry_hours: 24,
        },
        ..Config::default()
    });

    let db = Database::new(&config.database).await.unwrap();
    db.run_migrations().await.unwrap();

    let server = Server::new(config, db).await.unwrap();
    (server.router(), temp_dir)
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("x-auth", token);
    }

    let request = match body {
        Some(value) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    (status, headers, bytes.to_vec())
}

fn parse_json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

/// 注册并返回 (用户 JSON, 令牌)
async fn signup(router: &Router, email: &str, password: &str) -> (Value, String) {
    let (status, headers, body) = send(
        router,
        Method::POST,
        "/users",
        None,
        Some(json!({"email": email, "password": password})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let token = headers
        .get("x-auth")
        .expect("signup response missing x-auth header")
        .to_str()
        .unwrap()
        .to_string();
    (parse_json(&body), token)
}

async fn create_resource(router: &Router, token: &str, title: &str, body_text: &str) -> Value {
    let (status, _, body) = send(
        router,
        Method::POST,
        "/resources",
        Some(token),
        Some(json!({"title": title, "body": body_text})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    parse_json(&body)
}

// ==================== 账号 ====================

#[tokio::test]
async fn test_signup_returns_user_and_token() {
    let (router, _dir) = spawn_app().await;

    let (user, token) = signup(&router, "alice@example.com", "password123").await;

    assert_eq!(user["email"], "alice@example.com");
    assert!(user["id"].is_string());
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_signup_rejects_bad_payloads_with_empty_400() {
    let (router, _dir) = spawn_app().await;

    // 缺字段
    let (status, _, body) = send(
        &router,
        Method::POST,
        "/users",
        None,
        Some(json!({"email": "alice@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());

    // 未知字段
    let (status, _, body) = send(
        &router,
        Method::POST,
        "/users",
        None,
        Some(json!({"email": "alice@example.com", "password": "password123", "admin": true})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());

    // 坏 JSON
    let request = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 邮箱形状不对
    let (status, _, _) = send(
        &router,
        Method::POST,
        "/users",
        None,
        Some(json!({"email": "not-an-email", "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 密码太短
    let (status, _, _) = send(
        &router,
        Method::POST,
        "/users",
        None,
        Some(json!({"email": "alice@example.com", "password": "short"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_duplicate_email_is_400() {
    let (router, _dir) = spawn_app().await;

    signup(&router, "alice@example.com", "password123").await;

    let (status, _, body) = send(
        &router,
        Method::POST,
        "/users",
        None,
        Some(json!({"email": "Alice@Example.com", "password": "password456"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_login_issues_fresh_usable_token() {
    let (router, _dir) = spawn_app().await;

    let (_, signup_token) = signup(&router, "alice@example.com", "password123").await;

    let (status, headers, body) = send(
        &router,
        Method::POST,
        "/users/login",
        None,
        Some(json!({"email": "alice@example.com", "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let login_token = headers.get("x-auth").unwrap().to_str().unwrap().to_string();
    assert_ne!(login_token, signup_token);

    let user = parse_json(&body);
    assert_eq!(user["email"], "alice@example.com");

    // 两个会话都有效
    for token in [&signup_token, &login_token] {
        let (status, _, _) = send(&router, Method::GET, "/users/me", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_login_failure_is_uniform_empty_400() {
    let (router, _dir) = spawn_app().await;

    signup(&router, "alice@example.com", "password123").await;

    let (status, _, body) = send(
        &router,
        Method::POST,
        "/users/login",
        None,
        Some(json!({"email": "alice@example.com", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());

    let (status, _, body) = send(
        &router,
        Method::POST,
        "/users/login",
        None,
        Some(json!({"email": "nobody@example.com", "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_me_requires_valid_token() {
    let (router, _dir) = spawn_app().await;

    let (user, token) = signup(&router, "alice@example.com", "password123").await;

    // 无令牌
    let (status, _, body) = send(&router, Method::GET, "/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.is_empty());

    // 伪造令牌
    let (status, _, body) = send(
        &router,
        Method::GET,
        "/users/me",
        Some("garbage.token.value"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.is_empty());

    // 有效令牌
    let (status, _, body) = send(&router, Method::GET, "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let me = parse_json(&body);
    assert_eq!(me["id"], user["id"]);
    assert_eq!(me["email"], "alice@example.com");
}

#[tokio::test]
async fn test_logout_revokes_only_presented_token() {
    let (router, _dir) = spawn_app().await;

    let (_, first) = signup(&router, "alice@example.com", "password123").await;

    let (_, headers, _) = send(
        &router,
        Method::POST,
        "/users/login",
        None,
        Some(json!({"email": "alice@example.com", "password": "password123"})),
    )
    .await;
    let second = headers.get("x-auth").unwrap().to_str().unwrap().to_string();

    // 注销第一个会话
    let (status, _, body) = send(
        &router,
        Method::DELETE,
        "/users/me/token",
        Some(&first),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    // 第一个会话失效，第二个不受影响
    let (status, _, _) = send(&router, Method::GET, "/users/me", Some(&first), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&router, Method::GET, "/users/me", Some(&second), None).await;
    assert_eq!(status, StatusCode::OK);

    // 注销需要有效令牌
    let (status, _, _) = send(&router, Method::DELETE, "/users/me/token", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ==================== 资源 ====================

#[tokio::test]
async fn test_resource_crud_round_trip() {
    let (router, _dir) = spawn_app().await;

    let (user, token) = signup(&router, "alice@example.com", "password123").await;

    let created = create_resource(&router, &token, "First post", "Hello world").await;
    assert_eq!(created["title"], "First post");
    assert_eq!(created["body"], "Hello world");
    assert_eq!(created["completed"], false);
    assert_eq!(created["completedAt"], Value::Null);
    assert_eq!(created["_creator"], user["id"]);

    let id = created["id"].as_str().unwrap();

    let (status, _, body) = send(
        &router,
        Method::GET,
        &format!("/resources/{}", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let fetched = parse_json(&body);
    assert_eq!(fetched["resource"]["id"], created["id"]);
    assert_eq!(fetched["resource"]["title"], "First post");

    let (status, _, body) = send(&router, Method::GET, "/resources", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = parse_json(&body);
    assert_eq!(listed["resources"].as_array().unwrap().len(), 1);
    assert_eq!(listed["resources"][0]["id"], created["id"]);
}

#[tokio::test]
async fn test_resources_require_token() {
    let (router, _dir) = spawn_app().await;

    let (status, _, body) = send(
        &router,
        Method::POST,
        "/resources",
        None,
        Some(json!({"title": "t", "body": "b"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.is_empty());

    // 列表同样只对持令牌者开放
    let (status, _, body) = send(&router, Method::GET, "/resources", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_resources_are_owner_scoped() {
    let (router, _dir) = spawn_app().await;

    let (_, alice) = signup(&router, "alice@example.com", "password123").await;
    let (_, bob) = signup(&router, "bob@example.com", "password123").await;

    let created = create_resource(&router, &alice, "Alice's post", "body").await;
    let id = created["id"].as_str().unwrap();

    // B 的列表里看不到
    let (_, _, body) = send(&router, Method::GET, "/resources", Some(&bob), None).await;
    assert_eq!(parse_json(&body)["resources"].as_array().unwrap().len(), 0);

    // B 的单条访问一律 404 空响应
    let uri = format!("/resources/{}", id);
    let (status, _, body) = send(&router, Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());

    let (status, _, _) = send(
        &router,
        Method::PATCH,
        &uri,
        Some(&bob),
        Some(json!({"title": "hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&router, Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A 看到的内容原样
    let (status, _, body) = send(&router, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(&body)["resource"]["title"], "Alice's post");
}

#[tokio::test]
async fn test_malformed_resource_id_is_404() {
    let (router, _dir) = spawn_app().await;

    let (_, token) = signup(&router, "alice@example.com", "password123").await;

    for uri in ["/resources/not-a-uuid", "/resources/123"] {
        let (status, _, body) = send(&router, Method::GET, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.is_empty());

        let (status, _, _) = send(&router, Method::DELETE, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_patch_completion_cycle() {
    let (router, _dir) = spawn_app().await;

    let (_, token) = signup(&router, "alice@example.com", "password123").await;
    let created = create_resource(&router, &token, "Post", "body").await;
    let uri = format!("/resources/{}", created["id"].as_str().unwrap());

    let before = chrono::Utc::now().timestamp_millis();

    let (status, _, body) = send(
        &router,
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({"completed": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated = parse_json(&body);
    assert_eq!(updated["resource"]["completed"], true);
    assert!(updated["resource"]["completedAt"].as_i64().unwrap() >= before);

    // 不带 completed 的更新会把完成状态重置
    let (status, _, body) = send(
        &router,
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({"title": "Renamed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated = parse_json(&body);
    assert_eq!(updated["resource"]["title"], "Renamed");
    assert_eq!(updated["resource"]["completed"], false);
    assert_eq!(updated["resource"]["completedAt"], Value::Null);
}

#[tokio::test]
async fn test_patch_rejects_unknown_fields() {
    let (router, _dir) = spawn_app().await;

    let (_, token) = signup(&router, "alice@example.com", "password123").await;
    let created = create_resource(&router, &token, "Post", "body").await;
    let uri = format!("/resources/{}", created["id"].as_str().unwrap());

    // 归属字段不可投喂
    let (status, _, body) = send(
        &router,
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({"_creator": "someone-else"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());

    // 资源未被改动
    let (_, _, body) = send(&router, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(parse_json(&body)["resource"]["title"], "Post");
}

#[tokio::test]
async fn test_delete_returns_resource_then_404() {
    let (router, _dir) = spawn_app().await;

    let (_, token) = signup(&router, "alice@example.com", "password123").await;
    let created = create_resource(&router, &token, "Doomed", "body").await;
    let uri = format!("/resources/{}", created["id"].as_str().unwrap());

    let (status, _, body) = send(&router, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let deleted = parse_json(&body);
    assert_eq!(deleted["resource"]["id"], created["id"]);
    assert_eq!(deleted["resource"]["title"], "Doomed");

    let (status, _, body) = send(&router, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());
}

// ==================== 健康检查 ====================

#[tokio::test]
async fn test_health_and_ready() {
    let (router, _dir) = spawn_app().await;

    let (status, _, body) = send(&router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let health = parse_json(&body);
    assert_eq!(health["status"], "healthy");

    let (status, _, _) = send(&router, Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
