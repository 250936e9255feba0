use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::{
    create_client, create_service, get_authed, patch_json_authed, post_json, post_json_authed,
    test_app,
};

#[tokio::test]
async fn client_registration_is_approved_immediately() {
    let (app, _pool, _guard) = test_app().await;

    let body = serde_json::json!({
        "username": "newclient",
        "email": "newclient@test.com",
        "password": "password123",
        "first_name": "New",
        "last_name": "Client",
        "role": "client",
    });
    let (status, resp) = post_json(&app, "/user/", &body.to_string()).await;

    assert_eq!(status, StatusCode::CREATED, "{resp:?}");
    assert_eq!(resp["role"], "client");
    assert_eq!(resp["approval_status"], "approved");
    assert!(resp.get("password_hash").is_none());
}

#[tokio::test]
async fn lawyer_registration_enters_the_moderation_queue() {
    let (app, pool, _guard) = test_app().await;

    let family = create_service(&pool, "Family Law").await;
    let tax = create_service(&pool, "Tax Law").await;

    let body = serde_json::json!({
        "username": "newlawyer",
        "email": "newlawyer@test.com",
        "password": "password123",
        "first_name": "New",
        "last_name": "Lawyer",
        "role": "lawyer",
        "years_of_experience": 8,
        "hourly_rate": 220.0,
        "specializations": [family, tax],
    });
    let (status, resp) = post_json(&app, "/user/", &body.to_string()).await;

    assert_eq!(status, StatusCode::CREATED, "{resp:?}");
    assert_eq!(resp["approval_status"], "pending");
    assert_eq!(resp["specializations"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn admin_role_cannot_be_registered() {
    let (app, _pool, _guard) = test_app().await;

    let body = serde_json::json!({
        "username": "sneaky",
        "email": "sneaky@test.com",
        "password": "password123",
        "first_name": "Sneaky",
        "last_name": "Admin",
        "role": "admin",
    });
    let (status, _) = post_json(&app, "/user/", &body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let (app, pool, _guard) = test_app().await;

    let existing = create_client(&pool, "client1").await;

    let body = serde_json::json!({
        "username": "someoneelse",
        "email": existing.email,
        "password": "password123",
        "first_name": "Someone",
        "last_name": "Else",
        "role": "client",
    });
    let (status, resp) = post_json(&app, "/user/", &body.to_string()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(resp["message"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn login_returns_a_working_token() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;

    let body = serde_json::json!({ "email": client.email, "password": "password123" });
    let (status, resp) = post_json(&app, "/auth/login", &body.to_string()).await;

    assert_eq!(status, StatusCode::OK, "{resp:?}");
    let token = resp["access_token"].as_str().unwrap();
    assert_eq!(resp["user"]["username"], "client1");

    let (status, me) = get_authed(&app, "/auth/current_user", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], client.id.to_string());

    // Login is recorded in the audit trail.
    let logins: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM activity_logs WHERE user_id = $1 AND action = 'login'",
    )
    .bind(client.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(logins, 1);
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;

    let body = serde_json::json!({ "email": client.email, "password": "wrong-password" });
    let (status, _) = post_json(&app, "/auth/login", &body.to_string()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deactivated_account_cannot_login() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(client.id)
        .execute(&pool)
        .await
        .unwrap();

    let body = serde_json::json!({ "email": client.email, "password": "password123" });
    let (status, _) = post_json(&app, "/auth/login", &body.to_string()).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn change_password_requires_the_old_one() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;

    let body = serde_json::json!({
        "old_password": "wrong-password",
        "new_password": "brand-new-password",
    });
    let (status, _) =
        patch_json_authed(&app, "/auth/change_password", &body.to_string(), &client.token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let body = serde_json::json!({
        "old_password": "password123",
        "new_password": "brand-new-password",
    });
    let (status, _) =
        patch_json_authed(&app, "/auth/change_password", &body.to_string(), &client.token).await;
    assert_eq!(status, StatusCode::OK);

    // The new password works for login.
    let body = serde_json::json!({ "email": client.email, "password": "brand-new-password" });
    let (status, _) = post_json(&app, "/auth/login", &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn profile_access_is_self_or_admin() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let other = create_client(&pool, "client2").await;
    let admin = crate::common::create_admin(&pool, "admin1").await;

    let uri = format!("/user/{}", client.id);
    let (status, _) = get_authed(&app, &uri, &other.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get_authed(&app, &uri, &client.token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get_authed(&app, &uri, &admin.token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn profile_update_merges_only_provided_fields() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;

    let body = serde_json::json!({ "phone": "555-0100" });
    let (status, resp) = patch_json_authed(
        &app,
        &format!("/user/{}", client.id),
        &body.to_string(),
        &client.token,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["phone"], "555-0100");
    assert_eq!(resp["first_name"], "Test");
}
