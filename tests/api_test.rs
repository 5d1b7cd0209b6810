use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use sqlx::SqlitePool;
use tower::ServiceExt;

use bulletin::{
    api,
    auth::AuthService,
    config::Settings,
    domain::{CreateUserRequest, User, UserRole},
    repository::{
        ResponseRepository, SqliteAnnouncementRepository, SqliteNotificationRepository,
        SqliteResponseRepository, SqliteSearchRepository, SqliteUserRepository, UserRepository,
    },
    service::{Mailer, ServiceContext},
    storage::LocalStorage,
};

struct TestApp {
    app: axum::Router,
    context: Arc<ServiceContext>,
}

impl TestApp {
    async fn user(&self, username: &str, role: UserRole, active: bool) -> User {
        self.context
            .user_repo
            .create(CreateUserRequest {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password: "secure_password123".to_string(),
                full_name: format!("User {}", username),
                role,
                is_active: active,
            })
            .await
            .unwrap()
    }

    fn token(&self, user: &User) -> String {
        self.context.auth_service.issue_token(user.id).unwrap()
    }
}

async fn spawn_app(storage_root: &Path) -> anyhow::Result<TestApp> {
    let pool = SqlitePool::connect(":memory:").await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    let settings = Settings::default();

    let context = Arc::new(ServiceContext::new(
        Arc::new(SqliteUserRepository::new(pool.clone())),
        Arc::new(SqliteAnnouncementRepository::new(pool.clone())),
        Arc::new(SqliteResponseRepository::new(pool.clone())),
        Arc::new(SqliteNotificationRepository::new(pool.clone())),
        Arc::new(SqliteSearchRepository::new(pool.clone())),
        Arc::new(AuthService::new("test-secret", 60)),
        Arc::new(Mailer::new(Default::default())),
        Arc::new(LocalStorage::new(storage_root)),
        pool,
    ));

    let app = api::create_app(context.clone(), Arc::new(settings));

    Ok(TestApp { app, context })
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(uri: &str, token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn test_register_and_login_flow() -> anyhow::Result<()> {
    let tmp = tempfile::TempDir::new()?;
    let test_app = spawn_app(tmp.path()).await?;

    let register = serde_json::json!({
        "username": "newuser",
        "email": "newuser@example.com",
        "password": "secure_password123",
        "full_name": "New User",
    });

    let response = test_app
        .app
        .clone()
        .oneshot(json_request("POST", "/api/auth/register", None, register.clone()))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same username again
    let response = test_app
        .app
        .clone()
        .oneshot(json_request("POST", "/api/auth/register", None, register))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Same email, new username
    let duplicate_email = serde_json::json!({
        "username": "otheruser",
        "email": "newuser@example.com",
        "password": "secure_password123",
        "full_name": "Other User",
    });
    let response = test_app
        .app
        .clone()
        .oneshot(json_request("POST", "/api/auth/register", None, duplicate_email))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Fresh accounts are inactive: login is a 400, not a 401
    let login = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=newuser&password=secure_password123"))?;
    let response = test_app.app.clone().oneshot(login).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // After activation the same credentials yield a bearer token
    let user = test_app
        .context
        .user_repo
        .find_by_username("newuser")
        .await?
        .unwrap();
    assert!(!user.is_active);
    test_app.context.user_repo.set_active(user.id, true).await?;

    let login = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=newuser&password=secure_password123"))?;
    let response = test_app.app.clone().oneshot(login).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["user"]["username"], "newuser");
    let token = body["access_token"].as_str().unwrap().to_string();

    let response = test_app
        .app
        .clone()
        .oneshot(empty_request("GET", "/api/auth/me", Some(&token)))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    // Wrong password stays a 401
    let login = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=newuser&password=wrong_password"))?;
    let response = test_app.app.clone().oneshot(login).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_admin_cannot_target_self() -> anyhow::Result<()> {
    let tmp = tempfile::TempDir::new()?;
    let test_app = spawn_app(tmp.path()).await?;

    let admin = test_app.user("admin", UserRole::Admin, true).await;
    let other = test_app.user("other", UserRole::User, true).await;
    let token = test_app.token(&admin);

    // Admin endpoints reject plain users
    let user_token = test_app.token(&other);
    let response = test_app
        .app
        .clone()
        .oneshot(empty_request("GET", "/api/auth/users", Some(&user_token)))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let uri = format!("/api/auth/users/{}/role?role=user", admin.id);
    let response = test_app
        .app
        .clone()
        .oneshot(empty_request("PATCH", &uri, Some(&token)))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/api/auth/users/{}/status?is_active=false", admin.id);
    let response = test_app
        .app
        .clone()
        .oneshot(empty_request("PATCH", &uri, Some(&token)))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/api/auth/users/{}", admin.id);
    let response = test_app
        .app
        .clone()
        .oneshot(empty_request("DELETE", &uri, Some(&token)))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The same operations against another user succeed
    let uri = format!("/api/auth/users/{}/role?role=admin", other.id);
    let response = test_app
        .app
        .clone()
        .oneshot(empty_request("PATCH", &uri, Some(&token)))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let uri = format!("/api/auth/users/{}/status?is_active=false", other.id);
    let response = test_app
        .app
        .clone()
        .oneshot(empty_request("PATCH", &uri, Some(&token)))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_announcement_lifecycle_with_fanout() -> anyhow::Result<()> {
    let tmp = tempfile::TempDir::new()?;
    let test_app = spawn_app(tmp.path()).await?;

    let admin = test_app.user("admin", UserRole::Admin, true).await;
    let author = test_app.user("author", UserRole::User, true).await;
    let reader = test_app.user("reader", UserRole::User, true).await;
    let author_token = test_app.token(&author);
    let reader_token = test_app.token(&reader);
    let admin_token = test_app.token(&admin);

    // Unauthenticated creation is rejected
    let body = multipart_body(&[("title", "Q1 Plan"), ("content", "details")], None);
    let response = test_app
        .app
        .clone()
        .oneshot(multipart_request("/api/announcements", None, body))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = multipart_body(
        &[("title", "Q1 Plan"), ("content", "details"), ("type", "announcement")],
        None,
    );
    let response = test_app
        .app
        .clone()
        .oneshot(multipart_request("/api/announcements", Some(&author_token), body))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["type"], "announcement");
    assert!(created["file_key"].is_null());

    // Everyone but the author was notified
    let response = test_app
        .app
        .clone()
        .oneshot(empty_request("GET", "/api/notifications/unread-count", Some(&reader_token)))
        .await?;
    let body = body_json(response).await;
    assert_eq!(body["unread_count"], 1);

    let response = test_app
        .app
        .clone()
        .oneshot(empty_request("GET", "/api/notifications/unread-count", Some(&author_token)))
        .await?;
    let body = body_json(response).await;
    assert_eq!(body["unread_count"], 0);

    // Anyone can respond, no token attached
    let body = multipart_body(
        &[
            ("announcement_id", &id.to_string()),
            ("colleague_name", "Carol"),
            ("content", "sounds good"),
        ],
        None,
    );
    let response = test_app
        .app
        .clone()
        .oneshot(multipart_request("/api/responses", None, body))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Detail view carries the response
    let uri = format!("/api/announcements/{}", id);
    let response = test_app
        .app
        .clone()
        .oneshot(empty_request("GET", &uri, None))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["responses"].as_array().unwrap().len(), 1);

    // Deletion is admin-only and cascades
    let response = test_app
        .app
        .clone()
        .oneshot(empty_request("DELETE", &uri, Some(&author_token)))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test_app
        .app
        .clone()
        .oneshot(empty_request("DELETE", &uri, Some(&admin_token)))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_app
        .app
        .clone()
        .oneshot(empty_request("GET", &uri, None))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(
        test_app.context.response_repo.count_by_announcement(id).await?,
        0
    );

    Ok(())
}

#[tokio::test]
async fn test_upload_failure_does_not_block_creation() -> anyhow::Result<()> {
    let tmp = tempfile::TempDir::new()?;
    // Point the storage root at a regular file so every write fails
    let blocked_root = tmp.path().join("not-a-directory");
    std::fs::write(&blocked_root, b"occupied")?;

    let test_app = spawn_app(&blocked_root).await?;

    let author = test_app.user("author", UserRole::User, true).await;
    let token = test_app.token(&author);

    let body = multipart_body(
        &[("title", "With attachment"), ("content", "see file")],
        Some(("notes.txt", b"attachment bytes")),
    );
    let response = test_app
        .app
        .clone()
        .oneshot(multipart_request("/api/announcements", Some(&token), body))
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert!(created["file_key"].is_null());
    assert!(created["file_name"].is_null());

    Ok(())
}

#[tokio::test]
async fn test_response_creation_validates_parent() -> anyhow::Result<()> {
    let tmp = tempfile::TempDir::new()?;
    let test_app = spawn_app(tmp.path()).await?;

    let body = multipart_body(
        &[
            ("announcement_id", "12345"),
            ("colleague_name", "Carol"),
            ("content", "into the void"),
        ],
        None,
    );
    let response = test_app
        .app
        .clone()
        .oneshot(multipart_request("/api/responses", None, body))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_protected_routes_require_token() -> anyhow::Result<()> {
    let tmp = tempfile::TempDir::new()?;
    let test_app = spawn_app(tmp.path()).await?;

    for uri in [
        "/api/notifications",
        "/api/notifications/unread-count",
        "/api/search/all?q=test",
        "/api/auth/me",
    ] {
        let response = test_app
            .app
            .clone()
            .oneshot(empty_request("GET", uri, None))
            .await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let response = test_app
        .app
        .clone()
        .oneshot(empty_request("GET", "/api/auth/me", Some("not-a-token")))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
