use axum::http::StatusCode;
use chrono::{DateTime, Utc};

use crate::common::{
    create_admin, create_case_via_api, create_client, create_lawyer, create_service,
    notification_count, patch_json_authed, test_app, TestUser,
};

/// Create a case and staff it with the given lawyer directly.
async fn assigned_case(
    app: &axum::Router,
    pool: &sqlx::Pool<sqlx::Postgres>,
    client: &TestUser,
    lawyer: &TestUser,
    service_id: i32,
) -> String {
    let case = create_case_via_api(app, client, service_id, "Staffed Case").await;
    let case_id = case["case_id"].as_str().unwrap().to_string();
    sqlx::query(
        "UPDATE cases SET lawyer_id = $2, status = 'assigned', assigned_at = NOW() WHERE id = $1::uuid",
    )
    .bind(&case_id)
    .bind(lawyer.id)
    .execute(pool)
    .await
    .unwrap();
    case_id
}

#[tokio::test]
async fn assigned_lawyer_updates_status_and_client_is_notified() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;
    let lawyer = create_lawyer(&pool, "lawyer1", &[service_id]).await;
    let case_id = assigned_case(&app, &pool, &client, &lawyer, service_id).await;

    let body = serde_json::json!({ "status": "in_progress" });
    let (status, _) = patch_json_authed(
        &app,
        &format!("/case/{}/status", case_id),
        &body.to_string(),
        &lawyer.token,
    )
    .await;

    assert_eq!(status, StatusCode::OK);

    let db_status: String = sqlx::query_scalar("SELECT status FROM cases WHERE id = $1::uuid")
        .bind(&case_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(db_status, "in_progress");

    assert_eq!(
        notification_count(&pool, client.id, "case_status_update").await,
        1
    );
}

#[tokio::test]
async fn resolved_at_is_stamped_exactly_once() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;
    let lawyer = create_lawyer(&pool, "lawyer1", &[service_id]).await;
    let case_id = assigned_case(&app, &pool, &client, &lawyer, service_id).await;

    let uri = format!("/case/{}/status", case_id);

    let (status, _) = patch_json_authed(
        &app,
        &uri,
        &serde_json::json!({ "status": "resolved" }).to_string(),
        &lawyer.token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let first: Option<DateTime<Utc>> =
        sqlx::query_scalar("SELECT resolved_at FROM cases WHERE id = $1::uuid")
            .bind(&case_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    let first = first.expect("resolved_at set on first entry");

    // Leave and re-enter resolved; the original timestamp must survive.
    patch_json_authed(
        &app,
        &uri,
        &serde_json::json!({ "status": "in_progress" }).to_string(),
        &lawyer.token,
    )
    .await;
    patch_json_authed(
        &app,
        &uri,
        &serde_json::json!({ "status": "resolved" }).to_string(),
        &lawyer.token,
    )
    .await;

    let second: Option<DateTime<Utc>> =
        sqlx::query_scalar("SELECT resolved_at FROM cases WHERE id = $1::uuid")
            .bind(&case_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(second, Some(first));
}

#[tokio::test]
async fn unassigned_lawyer_cannot_update_status() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;
    let lawyer = create_lawyer(&pool, "lawyer1", &[service_id]).await;
    let outsider = create_lawyer(&pool, "lawyer2", &[service_id]).await;
    let case_id = assigned_case(&app, &pool, &client, &lawyer, service_id).await;

    let (status, _) = patch_json_authed(
        &app,
        &format!("/case/{}/status", case_id),
        &serde_json::json!({ "status": "resolved" }).to_string(),
        &outsider.token,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn client_cannot_update_status() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;
    let lawyer = create_lawyer(&pool, "lawyer1", &[service_id]).await;
    let case_id = assigned_case(&app, &pool, &client, &lawyer, service_id).await;

    let (status, _) = patch_json_authed(
        &app,
        &format!("/case/{}/status", case_id),
        &serde_json::json!({ "status": "closed" }).to_string(),
        &client.token,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_may_move_any_case_and_invalid_status_is_rejected() {
    let (app, pool, _guard) = test_app().await;

    let admin = create_admin(&pool, "admin1").await;
    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;
    let case = create_case_via_api(&app, &client, service_id, "Admin Move").await;
    let uri = format!("/case/{}/status", case["case_id"].as_str().unwrap());

    let (status, _) = patch_json_authed(
        &app,
        &uri,
        &serde_json::json!({ "status": "cancelled" }).to_string(),
        &admin.token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, resp) = patch_json_authed(
        &app,
        &uri,
        &serde_json::json!({ "status": "archived" }).to_string(),
        &admin.token,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["message"].as_str().unwrap().contains("Invalid status"));
}
