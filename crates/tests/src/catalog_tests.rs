use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::{
    create_admin, create_lawyer, create_service, create_user, get_unauthed, patch_json_authed,
    post_json_authed, test_app,
};

#[tokio::test]
async fn services_listing_shows_only_active_entries() {
    let (app, pool, _guard) = test_app().await;

    create_service(&pool, "Family Law").await;
    let retired = create_service(&pool, "Maritime Law").await;
    sqlx::query("UPDATE legal_services SET is_active = FALSE WHERE id = $1")
        .bind(retired)
        .execute(&pool)
        .await
        .unwrap();

    let (status, resp) = get_unauthed(&app, "/services").await;

    assert_eq!(status, StatusCode::OK);
    let services = resp.as_array().unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0]["name"], "Family Law");
}

#[tokio::test]
async fn lawyer_directory_lists_approved_lawyers_with_specializations() {
    let (app, pool, _guard) = test_app().await;

    let family = create_service(&pool, "Family Law").await;
    create_lawyer(&pool, "lawyer1", &[family]).await;
    create_user(&pool, "pending1", "lawyer", "pending").await;

    let (status, resp) = get_unauthed(&app, "/lawyers").await;

    assert_eq!(status, StatusCode::OK);
    let lawyers = resp.as_array().unwrap();
    assert_eq!(lawyers.len(), 1);
    assert_eq!(lawyers[0]["username"], "lawyer1");
    assert_eq!(
        lawyers[0]["specializations"].as_array().unwrap()[0]["name"],
        "Family Law"
    );
}

#[tokio::test]
async fn directory_search_filters_by_service() {
    let (app, pool, _guard) = test_app().await;

    let family = create_service(&pool, "Family Law").await;
    let tax = create_service(&pool, "Tax Law").await;
    create_lawyer(&pool, "family_lawyer", &[family]).await;
    create_lawyer(&pool, "tax_lawyer", &[tax]).await;

    let (status, resp) = get_unauthed(&app, &format!("/lawyers/search?service={}", tax)).await;

    assert_eq!(status, StatusCode::OK);
    let lawyers = resp.as_array().unwrap();
    assert_eq!(lawyers.len(), 1);
    assert_eq!(lawyers[0]["username"], "tax_lawyer");
}

#[tokio::test]
async fn admins_manage_the_catalog() {
    let (app, pool, _guard) = test_app().await;

    let admin = create_admin(&pool, "admin1").await;

    let body = serde_json::json!({
        "name": "Immigration Law",
        "description": "Visas, residency, citizenship",
    });
    let (status, resp) =
        post_json_authed(&app, "/admin/services", &body.to_string(), &admin.token).await;
    assert_eq!(status, StatusCode::CREATED, "{resp:?}");
    let id = resp["id"].as_i64().unwrap();

    let body = serde_json::json!({ "is_active": false });
    let (status, resp) = patch_json_authed(
        &app,
        &format!("/admin/services/{}", id),
        &body.to_string(),
        &admin.token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["is_active"], false);

    let (_, resp) = get_unauthed(&app, "/services").await;
    assert!(resp.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn health_endpoint_reports_connected_db() {
    let (app, _pool, _guard) = test_app().await;

    let (status, resp) = get_unauthed(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["status"], "ok");
    assert_eq!(resp["db"], "connected");
}
