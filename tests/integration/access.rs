use super::support::{TestApp, APP};
use aino::access::{AccessConfig, AccessMode};
use axum::http::{Method, StatusCode};
use serde_json::json;
use std::collections::HashMap;

fn alice_only() -> TestApp {
    let mut grants = HashMap::new();
    grants.insert(APP.to_string(), vec!["alice".to_string()]);
    TestApp::with_access(AccessConfig {
        mode: AccessMode::Grants,
        grants,
    })
}

#[tokio::test]
async fn test_ungranted_actor_cannot_read_anything_in_the_application() {
    let app = alice_only();
    let dir = app.directory("Contacts", json!({ "supportsCategory": true })).await;
    let field = app.field(&dir, "name", "text", true).await;
    let record = app
        .post(&format!("/records/{}", dir), json!({ "data": { "name": "Ann" } }))
        .await;
    assert_eq!(record.status, StatusCode::CREATED, "{}", record.body);
    let record = record.body["data"]["id"].as_str().unwrap().to_string();
    let category = app
        .post("/record-categories", json!({ "directoryId": dir, "name": "Friends" }))
        .await;
    assert_eq!(category.status, StatusCode::CREATED, "{}", category.body);
    let category = category.body["data"]["id"].as_str().unwrap().to_string();

    let reads = [
        format!("/directories/{}", dir),
        format!("/directories?applicationId={}", APP),
        format!("/records/{}", dir),
        format!("/records/{}/{}", dir, record),
        format!("/field-defs?directoryId={}", dir),
        format!("/field-defs/{}", field),
        format!("/field-categories?applicationId={}", APP),
        format!("/record-categories?directoryId={}", dir),
        format!("/record-categories/tree?directoryId={}", dir),
        format!("/record-categories/{}", category),
    ];
    for uri in &reads {
        let denied = app.call_as("bob", Method::GET, uri, None).await;
        assert_eq!(denied.status, StatusCode::FORBIDDEN, "bob {}", uri);
        assert_eq!(denied.body["code"], "FORBIDDEN");

        let allowed = app.get(uri).await;
        assert_eq!(allowed.status, StatusCode::OK, "alice {} {}", uri, allowed.body);
    }
}
