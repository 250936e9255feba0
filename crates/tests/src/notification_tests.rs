use axum::http::StatusCode;
use uuid::Uuid;

use crate::common::{
    create_admin, create_client, delete_authed, get_authed, patch_authed, post_json_authed,
    test_app, TestUser,
};

/// Insert an unread notification directly and return its id.
async fn seed_notification(pool: &sqlx::Pool<sqlx::Postgres>, recipient: &TestUser) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO notifications (recipient_id, notification_type, title, message)
        VALUES ($1, 'case_status_update', 'Update', 'Something happened')
        RETURNING id
        "#,
    )
    .bind(recipient.id)
    .fetch_one(pool)
    .await
    .expect("Failed to seed notification")
}

#[tokio::test]
async fn unread_count_tracks_unread_rows() {
    let (app, pool, _guard) = test_app().await;
    let client = create_client(&pool, "client1").await;

    seed_notification(&pool, &client).await;
    seed_notification(&pool, &client).await;

    let (status, resp) = get_authed(&app, "/notification/unread-count", &client.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["count"], 2);
}

#[tokio::test]
async fn mark_all_read_is_idempotent_and_drives_count_to_zero() {
    let (app, pool, _guard) = test_app().await;
    let client = create_client(&pool, "client1").await;

    seed_notification(&pool, &client).await;
    seed_notification(&pool, &client).await;
    seed_notification(&pool, &client).await;

    let (status, resp) = patch_authed(&app, "/notification/mark-all-read", &client.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["count"], 3);

    let (_, resp) = get_authed(&app, "/notification/unread-count", &client.token).await;
    assert_eq!(resp["count"], 0);

    // Second call affects nothing further.
    let (status, resp) = patch_authed(&app, "/notification/mark-all-read", &client.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["count"], 0);
}

#[tokio::test]
async fn unread_only_listing_filters_read_rows() {
    let (app, pool, _guard) = test_app().await;
    let client = create_client(&pool, "client1").await;

    let read_id = seed_notification(&pool, &client).await;
    seed_notification(&pool, &client).await;
    sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1")
        .bind(read_id)
        .execute(&pool)
        .await
        .unwrap();

    let (status, resp) =
        get_authed(&app, "/notification/?unread_only=true", &client.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp.as_array().unwrap().len(), 1);

    let (_, resp) = get_authed(&app, "/notification/", &client.token).await;
    assert_eq!(resp.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn viewing_a_notification_marks_it_read() {
    let (app, pool, _guard) = test_app().await;
    let client = create_client(&pool, "client1").await;
    let id = seed_notification(&pool, &client).await;

    let (status, resp) =
        get_authed(&app, &format!("/notification/{}", id), &client.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["is_read"], true);

    let is_read: bool = sqlx::query_scalar("SELECT is_read FROM notifications WHERE id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(is_read);
}

#[tokio::test]
async fn notifications_are_visible_only_to_their_recipient() {
    let (app, pool, _guard) = test_app().await;
    let client = create_client(&pool, "client1").await;
    let other = create_client(&pool, "client2").await;
    let id = seed_notification(&pool, &client).await;

    let (status, _) = get_authed(&app, &format!("/notification/{}", id), &other.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
        patch_authed(&app, &format!("/notification/{}/read", id), &other.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete_authed(&app, &format!("/notification/{}", id), &other.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Still present and deletable by the owner.
    let (status, _) = delete_authed(&app, &format!("/notification/{}", id), &client.token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn admin_creates_manual_notification() {
    let (app, pool, _guard) = test_app().await;
    let admin = create_admin(&pool, "admin1").await;
    let client = create_client(&pool, "client1").await;

    let body = serde_json::json!({
        "recipient_id": client.id,
        "notification_type": "system",
        "title": "Maintenance",
        "message": "Scheduled downtime this weekend",
    });
    let (status, resp) =
        post_json_authed(&app, "/notification/", &body.to_string(), &admin.token).await;
    assert_eq!(status, StatusCode::CREATED, "{resp:?}");

    let (_, resp) = get_authed(&app, "/notification/unread-count", &client.token).await;
    assert_eq!(resp["count"], 1);
}

#[tokio::test]
async fn manual_notification_requires_admin_and_existing_recipient() {
    let (app, pool, _guard) = test_app().await;
    let admin = create_admin(&pool, "admin1").await;
    let client = create_client(&pool, "client1").await;

    let body = serde_json::json!({
        "recipient_id": client.id,
        "notification_type": "system",
        "title": "Nope",
        "message": "Clients cannot broadcast",
    });
    let (status, _) =
        post_json_authed(&app, "/notification/", &body.to_string(), &client.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let body = serde_json::json!({
        "recipient_id": Uuid::new_v4(),
        "notification_type": "system",
        "title": "Ghost",
        "message": "Recipient does not exist",
    });
    let (status, _) =
        post_json_authed(&app, "/notification/", &body.to_string(), &admin.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
