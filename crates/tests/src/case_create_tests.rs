use axum::http::StatusCode;
use uuid::Uuid;

use crate::common::{
    create_admin, create_client, create_lawyer, create_service, notification_count,
    post_json_authed, test_app,
};

#[tokio::test]
async fn client_creates_case_with_generated_number() {
    let (app, pool, _guard) = test_app().await;

    let _admin = create_admin(&pool, "admin1").await;
    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;

    let body = serde_json::json!({
        "legal_service_id": service_id,
        "title": "Dispute",
        "description": "Contract dispute with a vendor",
    });
    let (status, resp) = post_json_authed(&app, "/case/", &body.to_string(), &client.token).await;

    assert_eq!(status, StatusCode::CREATED, "{resp:?}");
    let case_number = resp["case_number"].as_str().unwrap();

    // CASE-YYYYMMDD-####
    let parts: Vec<&str> = case_number.split('-').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "CASE");
    assert_eq!(parts[1].len(), 8);
    assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(parts[2].len(), 4);
    assert!(parts[2].chars().all(|c| c.is_ascii_digit()));

    let case_id = Uuid::parse_str(resp["case_id"].as_str().unwrap()).unwrap();
    let (db_status, db_priority): (String, String) =
        sqlx::query_as("SELECT status, priority FROM cases WHERE id = $1")
            .bind(case_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(db_status, "open");
    assert_eq!(db_priority, "medium");
}

#[tokio::test]
async fn case_creation_notifies_first_admin() {
    let (app, pool, _guard) = test_app().await;

    let admin = create_admin(&pool, "admin1").await;
    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;

    let body = serde_json::json!({
        "legal_service_id": service_id,
        "title": "Custody",
        "description": "Custody arrangement review",
    });
    let (status, _) = post_json_authed(&app, "/case/", &body.to_string(), &client.token).await;
    assert_eq!(status, StatusCode::CREATED);

    assert_eq!(
        notification_count(&pool, admin.id, "case_status_update").await,
        1
    );
}

#[tokio::test]
async fn unknown_service_rejected() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;

    let body = serde_json::json!({
        "legal_service_id": 9999,
        "title": "Dispute",
        "description": "No such service",
    });
    let (status, resp) = post_json_authed(&app, "/case/", &body.to_string(), &client.token).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["message"], "Invalid legal service");
}

#[tokio::test]
async fn inactive_service_rejected() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Old Practice").await;
    sqlx::query("UPDATE legal_services SET is_active = FALSE WHERE id = $1")
        .bind(service_id)
        .execute(&pool)
        .await
        .unwrap();

    let body = serde_json::json!({
        "legal_service_id": service_id,
        "title": "Dispute",
        "description": "Service no longer offered",
    });
    let (status, _) = post_json_authed(&app, "/case/", &body.to_string(), &client.token).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lawyer_cannot_create_case() {
    let (app, pool, _guard) = test_app().await;

    let service_id = create_service(&pool, "Family Law").await;
    let lawyer = create_lawyer(&pool, "lawyer1", &[service_id]).await;

    let body = serde_json::json!({
        "legal_service_id": service_id,
        "title": "Dispute",
        "description": "Lawyers do not open cases",
    });
    let (status, _) = post_json_authed(&app, "/case/", &body.to_string(), &lawyer.token).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_fields_rejected() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;

    let body = serde_json::json!({
        "legal_service_id": service_id,
        "title": "",
        "description": "",
    });
    let (status, _) = post_json_authed(&app, "/case/", &body.to_string(), &client.token).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn invalid_priority_rejected() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;

    let body = serde_json::json!({
        "legal_service_id": service_id,
        "title": "Dispute",
        "description": "Priority outside the vocabulary",
        "priority": "critical",
    });
    let (status, resp) = post_json_authed(&app, "/case/", &body.to_string(), &client.token).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["message"].as_str().unwrap().contains("Invalid priority"));
}

#[tokio::test]
async fn unauthenticated_create_rejected() {
    let (app, pool, _guard) = test_app().await;
    let service_id = create_service(&pool, "Family Law").await;

    let body = serde_json::json!({
        "legal_service_id": service_id,
        "title": "Dispute",
        "description": "No token attached",
    });
    let (status, _) = crate::common::post_json(&app, "/case/", &body.to_string()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
