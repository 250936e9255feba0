use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware, Router,
};
use serde_json::Value;
use sqlx::{Pool, Postgres};
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

use server::db::AppState;
use server::events::CaseEventHub;

/// Global mutex ensuring tests run sequentially against the shared
/// database. Each test acquires this lock before truncating and
/// seeding, preventing concurrent tests from interfering with each
/// other's data.
static TEST_MUTEX: std::sync::LazyLock<Mutex<()>> = std::sync::LazyLock::new(|| Mutex::new(()));

/// Build a test router backed by a real Postgres pool.
/// Acquires the global lock, truncates all tables, and re-seeds the
/// legal services catalog. The returned `MutexGuard` must be held for
/// the duration of the test.
pub async fn test_app() -> (Router, Pool<Postgres>, tokio::sync::MutexGuard<'static, ()>) {
    let guard = TEST_MUTEX.lock().await;

    let _ = dotenvy::dotenv();
    if std::env::var("JWT_SECRET").is_err() {
        std::env::set_var("JWT_SECRET", "test-secret-do-not-use-in-prod");
    }

    let database_url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("TEST_DATABASE_URL or DATABASE_URL must be set for tests");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    sqlx::query(
        "TRUNCATE users, legal_services, lawyer_specializations, cases, lawyer_requests, \
         chats, documents, transactions, invoices, notifications, activity_logs \
         RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await
    .expect("Failed to truncate");

    let state = AppState {
        pool: pool.clone(),
        events: CaseEventHub::new(),
    };
    let router = server::rest::api_router()
        .layer(middleware::from_fn(
            server::auth::middleware::auth_middleware,
        ))
        .with_state(state);

    (router, pool, guard)
}

/// A seeded account plus a valid bearer token for it.
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// Insert an account directly and mint a token for it.
/// `approval_status` is "approved" unless overridden for lawyers.
pub async fn create_user(
    pool: &Pool<Postgres>,
    username: &str,
    role: &str,
    approval_status: &str,
) -> TestUser {
    let email = format!("{}@test.com", username);
    let password_hash =
        server::auth::password::hash_password("password123").expect("Failed to hash password");

    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO users
            (username, email, password_hash, first_name, last_name, role, approval_status)
        VALUES ($1, $2, $3, 'Test', $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(username)
    .bind(&email)
    .bind(&password_hash)
    .bind(username)
    .bind(role)
    .bind(approval_status)
    .fetch_one(pool)
    .await
    .expect("Failed to create test user");

    let token = server::auth::jwt::create_access_token(id, &email, role)
        .expect("Failed to create test token");

    TestUser { id, email, token }
}

pub async fn create_client(pool: &Pool<Postgres>, username: &str) -> TestUser {
    create_user(pool, username, "client", "approved").await
}

pub async fn create_admin(pool: &Pool<Postgres>, username: &str) -> TestUser {
    create_user(pool, username, "admin", "approved").await
}

/// Approved lawyer specialized in the given services.
pub async fn create_lawyer(
    pool: &Pool<Postgres>,
    username: &str,
    service_ids: &[i32],
) -> TestUser {
    let user = create_user(pool, username, "lawyer", "approved").await;
    for service_id in service_ids {
        sqlx::query(
            "INSERT INTO lawyer_specializations (user_id, legal_service_id) VALUES ($1, $2)",
        )
        .bind(user.id)
        .bind(service_id)
        .execute(pool)
        .await
        .expect("Failed to add specialization");
    }
    user
}

/// Seed one active legal service and return its id.
pub async fn create_service(pool: &Pool<Postgres>, name: &str) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO legal_services (name, description) VALUES ($1, 'Test service') RETURNING id",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .expect("Failed to create legal service")
}

/// Create a case via the API as the given client; returns the response.
pub async fn create_case_via_api(
    app: &Router,
    client: &TestUser,
    service_id: i32,
    title: &str,
) -> Value {
    let body = serde_json::json!({
        "legal_service_id": service_id,
        "title": title,
        "description": "A test dispute needing counsel",
    });

    let (status, response) = post_json_authed(app, "/case/", &body.to_string(), &client.token).await;
    assert_eq!(
        status,
        StatusCode::CREATED,
        "Failed to create test case: {} {:?}",
        status,
        response
    );
    response
}

/// Unread notification rows of the given type for a recipient.
pub async fn notification_count(
    pool: &Pool<Postgres>,
    recipient_id: Uuid,
    notification_type: &str,
) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND notification_type = $2",
    )
    .bind(recipient_id)
    .bind(notification_type)
    .fetch_one(pool)
    .await
    .expect("Failed to count notifications")
}

// ── Request helpers ─────────────────────────────────────────────────

pub async fn post_json(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

pub async fn post_json_authed(
    app: &Router,
    uri: &str,
    body: &str,
    token: &str,
) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

/// POST with a bearer token and no body.
pub async fn post_authed(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

pub async fn patch_json_authed(
    app: &Router,
    uri: &str,
    body: &str,
    token: &str,
) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("PATCH")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

/// PATCH with a bearer token and no body.
pub async fn patch_authed(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("PATCH")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

pub async fn get_authed(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

pub async fn get_unauthed(app: &Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

pub async fn delete_authed(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(req)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");

    let body: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&body_bytes).to_string(),
        ))
    };

    (status, body)
}
