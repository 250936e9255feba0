use axum::http::StatusCode;
use uuid::Uuid;

use crate::common::{
    create_case_via_api, create_client, create_lawyer, create_service, notification_count,
    patch_authed, post_json_authed, test_app, TestUser,
};

async fn assigned_case(
    app: &axum::Router,
    pool: &sqlx::Pool<sqlx::Postgres>,
    client: &TestUser,
    lawyer: &TestUser,
    service_id: i32,
) -> String {
    let case = create_case_via_api(app, client, service_id, "Billable Case").await;
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

/// Create an invoice as the lawyer and return its id.
async fn create_invoice(app: &axum::Router, lawyer: &TestUser, case_id: &str) -> Uuid {
    let body = serde_json::json!({
        "case_id": case_id,
        "amount": 500.0,
        "tax_amount": 50.0,
        "description": "Legal services rendered",
    });
    let (status, resp) = post_json_authed(app, "/invoice/", &body.to_string(), &lawyer.token).await;
    assert_eq!(status, StatusCode::CREATED, "{resp:?}");
    Uuid::parse_str(resp["invoice_id"].as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn invoice_total_is_computed_at_creation() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;
    let lawyer = create_lawyer(&pool, "lawyer1", &[service_id]).await;
    let case_id = assigned_case(&app, &pool, &client, &lawyer, service_id).await;

    let invoice_id = create_invoice(&app, &lawyer, &case_id).await;

    let (total, status, number): (f64, String, String) = sqlx::query_as(
        "SELECT total_amount, status, invoice_number FROM invoices WHERE id = $1",
    )
    .bind(invoice_id)
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(total, 550.0);
    assert_eq!(status, "draft");
    assert!(number.starts_with("INV-"));
}

#[tokio::test]
async fn lawyer_cannot_invoice_someone_elses_case() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;
    let lawyer = create_lawyer(&pool, "lawyer1", &[service_id]).await;
    let outsider = create_lawyer(&pool, "lawyer2", &[service_id]).await;
    let case_id = assigned_case(&app, &pool, &client, &lawyer, service_id).await;

    let body = serde_json::json!({
        "case_id": case_id,
        "amount": 500.0,
        "description": "Not my case",
    });
    let (status, _) = post_json_authed(&app, "/invoice/", &body.to_string(), &outsider.token).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sending_a_draft_notifies_the_client_and_is_one_way() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;
    let lawyer = create_lawyer(&pool, "lawyer1", &[service_id]).await;
    let case_id = assigned_case(&app, &pool, &client, &lawyer, service_id).await;
    let invoice_id = create_invoice(&app, &lawyer, &case_id).await;

    let uri = format!("/invoice/{}/send", invoice_id);
    let (status, _) = patch_authed(&app, &uri, &lawyer.token).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        notification_count(&pool, client.id, "invoice_generated").await,
        1
    );

    // A sent invoice cannot be sent again.
    let (status, resp) = patch_authed(&app, &uri, &lawyer.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["message"].as_str().unwrap().contains("draft"));
}

#[tokio::test]
async fn paying_a_sent_invoice_settles_it() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;
    let lawyer = create_lawyer(&pool, "lawyer1", &[service_id]).await;
    let case_id = assigned_case(&app, &pool, &client, &lawyer, service_id).await;
    let invoice_id = create_invoice(&app, &lawyer, &case_id).await;
    patch_authed(&app, &format!("/invoice/{}/send", invoice_id), &lawyer.token).await;

    let (status, resp) = post_json_authed(
        &app,
        &format!("/invoice/{}/pay", invoice_id),
        "{}",
        &client.token,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{resp:?}");

    let transaction_number = resp["transaction_number"].as_str().unwrap();
    assert!(transaction_number.starts_with("TXN-"));
    let transaction_id = Uuid::parse_str(resp["transaction_id"].as_str().unwrap()).unwrap();

    let (inv_status, paid_date, linked): (String, Option<chrono::NaiveDate>, Option<Uuid>) =
        sqlx::query_as("SELECT status, paid_date, transaction_id FROM invoices WHERE id = $1")
            .bind(invoice_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(inv_status, "paid");
    assert!(paid_date.is_some());
    assert_eq!(linked, Some(transaction_id));

    let (txn_status, amount): (String, f64) =
        sqlx::query_as("SELECT status, amount FROM transactions WHERE id = $1")
            .bind(transaction_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(txn_status, "completed");
    assert_eq!(amount, 550.0);

    assert_eq!(
        notification_count(&pool, lawyer.id, "payment_received").await,
        1
    );
}

#[tokio::test]
async fn paying_twice_fails_and_creates_no_second_transaction() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;
    let lawyer = create_lawyer(&pool, "lawyer1", &[service_id]).await;
    let case_id = assigned_case(&app, &pool, &client, &lawyer, service_id).await;
    let invoice_id = create_invoice(&app, &lawyer, &case_id).await;
    patch_authed(&app, &format!("/invoice/{}/send", invoice_id), &lawyer.token).await;

    let uri = format!("/invoice/{}/pay", invoice_id);
    let (status, _) = post_json_authed(&app, &uri, "{}", &client.token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, resp) = post_json_authed(&app, &uri, "{}", &client.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["message"].as_str().unwrap().contains("cannot be paid"));

    let transactions: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE case_id = $1::uuid")
            .bind(&case_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(transactions, 1);
}

#[tokio::test]
async fn draft_invoice_cannot_be_paid() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let service_id = create_service(&pool, "Family Law").await;
    let lawyer = create_lawyer(&pool, "lawyer1", &[service_id]).await;
    let case_id = assigned_case(&app, &pool, &client, &lawyer, service_id).await;
    let invoice_id = create_invoice(&app, &lawyer, &case_id).await;

    let (status, _) = post_json_authed(
        &app,
        &format!("/invoice/{}/pay", invoice_id),
        "{}",
        &client.token,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_the_invoiced_client_can_pay() {
    let (app, pool, _guard) = test_app().await;

    let client = create_client(&pool, "client1").await;
    let other = create_client(&pool, "client2").await;
    let service_id = create_service(&pool, "Family Law").await;
    let lawyer = create_lawyer(&pool, "lawyer1", &[service_id]).await;
    let case_id = assigned_case(&app, &pool, &client, &lawyer, service_id).await;
    let invoice_id = create_invoice(&app, &lawyer, &case_id).await;
    patch_authed(&app, &format!("/invoice/{}/send", invoice_id), &lawyer.token).await;

    let (status, _) = post_json_authed(
        &app,
        &format!("/invoice/{}/pay", invoice_id),
        "{}",
        &other.token,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
