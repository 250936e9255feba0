use axum::http::StatusCode;

use crate::common::{
    create_case_via_api, create_client, create_lawyer, create_service, notification_count,
    get_authed, post_authed, post_json_authed, test_app, TestUser,
};

async fn assigned_case(
    app: &axum::Router,
    pool: &sqlx::Pool<sqlx::Postgres>,
    client: &TestUser,
    lawyer: &TestUser,
    service_id: i32,
) -> String {
    let case = create_case_via_api(app, client, service_id, "Chatty Case").await;
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
async fn sending_a_json_message_persists_and_notifies_the_other_party() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;
    let lawyer = create_lawyer(&pool, "lawyer1", &[service_id]).await;
    let case_id = assigned_case(&app, &pool, &client, &lawyer, service_id).await;

    let body = serde_json::json!({ "message": "Hello counselor" });
    let (status, resp) = post_json_authed(
        &app,
        &format!("/chat/{}/send", case_id),
        &body.to_string(),
        &client.token,
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{resp:?}");
    assert_eq!(resp["success"], true);
    assert_eq!(resp["message"]["message"], "Hello counselor");
    assert!(resp["message"]["id"].as_str().is_some());
    assert!(resp["message"]["created_at"].as_str().is_some());
    assert_eq!(resp["message"]["is_current_user"], true);

    assert_eq!(notification_count(&pool, lawyer.id, "new_message").await, 1);
}

#[tokio::test]
async fn empty_send_is_rejected() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;
    let lawyer = create_lawyer(&pool, "lawyer1", &[service_id]).await;
    let case_id = assigned_case(&app, &pool, &client, &lawyer, service_id).await;

    let (status, resp) = post_json_authed(
        &app,
        &format!("/chat/{}/send", case_id),
        "{}",
        &client.token,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["message"]
        .as_str()
        .unwrap()
        .contains("Message or file required"));
}

#[tokio::test]
async fn history_is_chronological_and_scoped_to_parties() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;
    let lawyer = create_lawyer(&pool, "lawyer1", &[service_id]).await;
    let outsider = create_lawyer(&pool, "lawyer2", &[service_id]).await;
    let case_id = assigned_case(&app, &pool, &client, &lawyer, service_id).await;

    for text in ["first", "second", "third"] {
        let body = serde_json::json!({ "message": text });
        post_json_authed(
            &app,
            &format!("/chat/{}/send", case_id),
            &body.to_string(),
            &client.token,
        )
        .await;
    }

    let (status, resp) =
        get_authed(&app, &format!("/chat/{}/messages", case_id), &lawyer.token).await;
    assert_eq!(status, StatusCode::OK);
    let messages = resp.as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["message"], "first");
    assert_eq!(messages[2]["message"], "third");
    assert_eq!(messages[0]["is_current_user"], false);

    let (status, _) =
        get_authed(&app, &format!("/chat/{}/messages", case_id), &outsider.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unread_count_and_read_marking() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;
    let lawyer = create_lawyer(&pool, "lawyer1", &[service_id]).await;
    let case_id = assigned_case(&app, &pool, &client, &lawyer, service_id).await;

    for text in ["hello", "are you there?"] {
        let body = serde_json::json!({ "message": text });
        post_json_authed(
            &app,
            &format!("/chat/{}/send", case_id),
            &body.to_string(),
            &client.token,
        )
        .await;
    }

    // The recipient sees two unread; the sender sees none.
    let (_, resp) = get_authed(
        &app,
        &format!("/chat/{}/unread-count", case_id),
        &lawyer.token,
    )
    .await;
    assert_eq!(resp["count"], 2);

    let (_, resp) = get_authed(
        &app,
        &format!("/chat/{}/unread-count", case_id),
        &client.token,
    )
    .await;
    assert_eq!(resp["count"], 0);

    // Opening the thread flips them; a second pass is a no-op.
    let (status, resp) =
        post_authed(&app, &format!("/chat/{}/read", case_id), &lawyer.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["count"], 2);

    let (_, resp) = post_authed(&app, &format!("/chat/{}/read", case_id), &lawyer.token).await;
    assert_eq!(resp["count"], 0);

    let (_, resp) = get_authed(
        &app,
        &format!("/chat/{}/unread-count", case_id),
        &lawyer.token,
    )
    .await;
    assert_eq!(resp["count"], 0);
}
