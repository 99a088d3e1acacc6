use super::support::{TestApp, APP, MODULE};
use aino::api::extract::ACTOR_HEADER;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_directory_lifecycle() {
    let app = TestApp::new();
    let id = app.directory("Customers", json!({ "type": "table" })).await;

    let fetched = app.get(&format!("/directories/{}", id)).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["success"], true);
    assert_eq!(fetched.body["data"]["name"], "Customers");
    assert_eq!(fetched.body["data"]["applicationId"], APP);
    assert_eq!(fetched.body["data"]["moduleId"], MODULE);

    let renamed = app
        .put(&format!("/directories/{}", id), json!({ "name": "Clients" }))
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["data"]["name"], "Clients");

    let removed = app.delete(&format!("/directories/{}", id)).await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["data"], json!({ "id": id, "deleted": true }));

    let again = app.delete(&format!("/directories/{}", id)).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert_eq!(again.body["success"], false);
    assert_eq!(again.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_listing_paginates_with_limit() {
    let app = TestApp::new();
    app.directory("First", json!({ "order": 1 })).await;
    app.directory("Second", json!({ "order": 2 })).await;

    let response = app
        .get(&format!("/directories?applicationId={}&limit=1", APP))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let items = response.body["data"]["directories"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "First");
    assert_eq!(response.body["pagination"]["total"], 2);
    assert_eq!(response.body["pagination"]["totalPages"], 2);
    assert_eq!(response.body["pagination"]["limit"], 1);
}

#[tokio::test]
async fn test_listing_is_enriched_with_fields_and_categories() {
    let app = TestApp::new();
    let id = app.directory("Products", json!({ "supportsCategory": true })).await;
    app.field(&id, "sku", "text", true).await;
    let category = app
        .post(
            "/record-categories",
            json!({ "directoryId": id, "name": "Hardware" }),
        )
        .await;
    assert_eq!(category.status, StatusCode::CREATED);

    let response = app.get(&format!("/directories?applicationId={}", APP)).await;
    let directory = &response.body["data"]["directories"][0];
    assert_eq!(directory["config"]["fields"][0]["key"], "sku");
    assert_eq!(directory["config"]["fields"][0]["required"], true);
    assert_eq!(directory["config"]["categories"][0]["name"], "Hardware");
}

#[tokio::test]
async fn test_duplicate_directory_name_is_rejected() {
    let app = TestApp::new();
    app.directory("Orders", json!({})).await;
    let response = app
        .post(
            &format!("/directories?applicationId={}&moduleId={}", APP, MODULE),
            json!({ "name": "Orders" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "DUPLICATE_NAME");
}

#[tokio::test]
async fn test_unknown_module_is_not_found() {
    let app = TestApp::new();
    let response = app
        .post(
            &format!("/directories?applicationId={}&moduleId=ghost", APP),
            json!({ "name": "Orders" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_actor_is_unauthorized() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri(format!("/directories?applicationId={}", APP))
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_malformed_body_gets_error_envelope() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri(format!("/directories?applicationId={}&moduleId={}", APP, MODULE))
        .header(ACTOR_HEADER, "alice")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.send(request).await;
    assert!(response.status.is_client_error());
    assert_eq!(response.body["success"], false);
    assert!(response.body["message"].is_string());
}

#[tokio::test]
async fn test_health_and_modules() {
    let app = TestApp::new();
    let health = app.get("/health").await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["data"]["status"], "ok");

    let modules = app.get("/modules").await;
    assert_eq!(modules.body["data"][0]["id"], MODULE);
    let missing = app.get("/modules/ghost").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
