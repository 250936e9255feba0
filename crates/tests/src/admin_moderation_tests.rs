use axum::http::StatusCode;

use crate::common::{
    create_admin, create_client, create_user, get_authed, notification_count, patch_json_authed,
    post_authed, post_json_authed, test_app,
};

#[tokio::test]
async fn approving_a_pending_lawyer_notifies_and_logs() {
    let (app, pool, _guard) = test_app().await;

    let admin = create_admin(&pool, "admin1").await;
    let lawyer = create_user(&pool, "lawyer1", "lawyer", "pending").await;

    let (status, resp) = post_authed(
        &app,
        &format!("/admin/lawyers/{}/approve", lawyer.id),
        &admin.token,
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{resp:?}");
    assert_eq!(resp["approval_status"], "approved");

    let db_status: String =
        sqlx::query_scalar("SELECT approval_status FROM users WHERE id = $1")
            .bind(lawyer.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(db_status, "approved");

    assert_eq!(
        notification_count(&pool, lawyer.id, "lawyer_approved").await,
        1
    );

    let audit: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM activity_logs WHERE user_id = $1 AND action = 'update'",
    )
    .bind(admin.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(audit, 1);
}

#[tokio::test]
async fn approving_twice_fails() {
    let (app, pool, _guard) = test_app().await;

    let admin = create_admin(&pool, "admin1").await;
    let lawyer = create_user(&pool, "lawyer1", "lawyer", "pending").await;
    let uri = format!("/admin/lawyers/{}/approve", lawyer.id);

    let (status, _) = post_authed(&app, &uri, &admin.token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, resp) = post_authed(&app, &uri, &admin.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["message"]
        .as_str()
        .unwrap()
        .contains("already been processed"));
}

#[tokio::test]
async fn rejection_carries_a_reason() {
    let (app, pool, _guard) = test_app().await;

    let admin = create_admin(&pool, "admin1").await;
    let lawyer = create_user(&pool, "lawyer1", "lawyer", "pending").await;

    let body = serde_json::json!({ "rejection_reason": "Incomplete bar credentials" });
    let (status, resp) = post_json_authed(
        &app,
        &format!("/admin/lawyers/{}/reject", lawyer.id),
        &body.to_string(),
        &admin.token,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["rejection_reason"], "Incomplete bar credentials");
    assert_eq!(
        notification_count(&pool, lawyer.id, "lawyer_rejected").await,
        1
    );
}

#[tokio::test]
async fn moderation_requires_admin() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let lawyer = create_user(&pool, "lawyer1", "lawyer", "pending").await;

    let (status, _) = post_authed(
        &app,
        &format!("/admin/lawyers/{}/approve", lawyer.id),
        &client.token,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn pending_lawyers_listing_shows_only_pending() {
    let (app, pool, _guard) = test_app().await;

    let admin = create_admin(&pool, "admin1").await;
    create_user(&pool, "pending1", "lawyer", "pending").await;
    create_user(&pool, "approved1", "lawyer", "approved").await;
    create_client(&pool, "client1").await;

    let (status, resp) = get_authed(&app, "/user/pending-lawyers", &admin.token).await;

    assert_eq!(status, StatusCode::OK);
    let pending = resp.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["username"], "pending1");
}

#[tokio::test]
async fn deactivated_accounts_are_locked_out() {
    let (app, pool, _guard) = test_app().await;

    let admin = create_admin(&pool, "admin1").await;
    let client = create_client(&pool, "client1").await;

    let body = serde_json::json!({ "is_active": false });
    let (status, resp) = patch_json_authed(
        &app,
        &format!("/admin/users/{}/active", client.id),
        &body.to_string(),
        &admin.token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["is_active"], false);

    // The suspended account's token no longer opens doors.
    let (status, _) = get_authed(&app, "/case/", &client.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
