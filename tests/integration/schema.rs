use super::support::{TestApp, APP};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_field_definition_key_is_unique_per_directory() {
    let app = TestApp::new();
    let dir = app.directory("Tickets", json!({})).await;
    app.field(&dir, "title", "text", true).await;

    let duplicate = app
        .post(
            "/field-defs",
            json!({ "directoryId": dir, "key": "title", "type": "text" }),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.body["code"], "DUPLICATE_KEY");

    let invalid = app
        .post(
            "/field-defs",
            json!({ "directoryId": dir, "key": "1-bad", "type": "text" }),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let listed = app.get(&format!("/field-defs?directoryId={}", dir)).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["data"]["fieldDefs"].as_array().unwrap().len(), 1);
    assert_eq!(listed.body["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_field_category_delete_detaches_fields() {
    let app = TestApp::new();
    let dir = app.directory("Assets", json!({})).await;
    let category = app
        .post(
            "/field-categories",
            json!({ "applicationId": APP, "directoryId": dir, "name": "General" }),
        )
        .await;
    assert_eq!(category.status, StatusCode::CREATED, "{}", category.body);
    let category_id = category.body["data"]["id"].as_str().unwrap().to_string();

    let field = app
        .post(
            "/field-defs",
            json!({ "directoryId": dir, "key": "serial", "type": "text", "categoryId": category_id }),
        )
        .await;
    assert_eq!(field.status, StatusCode::CREATED, "{}", field.body);
    let field_id = field.body["data"]["id"].as_str().unwrap().to_string();

    let removed = app.delete(&format!("/field-categories/{}", category_id)).await;
    assert_eq!(removed.status, StatusCode::OK);

    let fetched = app.get(&format!("/field-defs/{}", field_id)).await;
    assert!(fetched.body["data"]["categoryId"].is_null());
}

#[tokio::test]
async fn test_record_category_tree() {
    let app = TestApp::new();
    let dir = app.directory("Catalog", json!({ "supportsCategory": true })).await;
    let root = app
        .post("/record-categories", json!({ "directoryId": dir, "name": "Tools" }))
        .await;
    let root_id = root.body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(root.body["data"]["level"], 1);

    let child = app
        .post(
            "/record-categories",
            json!({ "directoryId": dir, "name": "Saws", "parentId": root_id }),
        )
        .await;
    assert_eq!(child.status, StatusCode::CREATED, "{}", child.body);
    assert_eq!(child.body["data"]["level"], 2);
    assert_eq!(child.body["data"]["path"], "Tools/Saws");

    let tree = app
        .get(&format!("/record-categories/tree?directoryId={}", dir))
        .await;
    assert_eq!(tree.body["data"]["categories"][0]["name"], "Tools");
    assert_eq!(tree.body["data"]["categories"][0]["children"][0]["name"], "Saws");

    let blocked = app.delete(&format!("/record-categories/{}", root_id)).await;
    assert_eq!(blocked.status, StatusCode::BAD_REQUEST);
    assert_eq!(blocked.body["code"], "HAS_CHILDREN");

    let roots = app
        .get(&format!("/record-categories?directoryId={}&parentId=null", dir))
        .await;
    assert_eq!(roots.body["data"]["categories"].as_array().unwrap().len(), 1);
}
