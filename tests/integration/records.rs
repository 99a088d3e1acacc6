use super::support::TestApp;
use axum::http::StatusCode;
use serde_json::json;

async fn contacts(app: &TestApp) -> String {
    let dir = app.directory("Contacts", json!({ "supportsCategory": true })).await;
    app.field(&dir, "name", "text", true).await;
    app.field(&dir, "email", "text", true).await;
    app.field(&dir, "age", "number", false).await;
    dir
}

#[tokio::test]
async fn test_record_crud() {
    let app = TestApp::new();
    let dir = contacts(&app).await;

    let created = app
        .post(
            &format!("/records/{}", dir),
            json!({ "data": { "name": "Ann", "email": "ann@example.com", "age": 31 } }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    let record = &created.body["data"];
    assert_eq!(record["createdAt"], record["updatedAt"]);
    assert_eq!(record["directoryId"], dir);
    let id = record["id"].as_str().unwrap().to_string();

    let updated = app
        .put(&format!("/records/{}/{}", dir, id), json!({ "data": { "age": 32 } }))
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{}", updated.body);
    assert_eq!(updated.body["data"]["data"]["age"], 32);
    assert_eq!(updated.body["data"]["data"]["name"], "Ann");

    let fetched = app.get(&format!("/records/{}/{}", dir, id)).await;
    assert_eq!(fetched.body["data"]["data"]["email"], "ann@example.com");

    let removed = app.delete(&format!("/records/{}/{}", dir, id)).await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["data"]["deleted"], true);

    let again = app.delete(&format!("/records/{}/{}", dir, id)).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_required_field_is_rejected() {
    let app = TestApp::new();
    let dir = contacts(&app).await;

    let response = app
        .post(&format!("/records/{}", dir), json!({ "data": { "name": "Bob" } }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "VALIDATION_ERROR");
    assert_eq!(response.body["detail"]["fields"][0]["key"], "email");
}

#[tokio::test]
async fn test_listing_pages_by_page_size() {
    let app = TestApp::new();
    let dir = contacts(&app).await;
    for i in 1..=12 {
        let response = app
            .post(
                &format!("/records/{}", dir),
                json!({ "data": { "name": format!("person-{}", i), "email": format!("p{}@example.com", i), "age": i } }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let response = app
        .get(&format!("/records/{}?page=2&pageSize=5", dir))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let names: Vec<&str> = response.body["data"]["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["data"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["person-6", "person-7", "person-8", "person-9", "person-10"]);
    assert_eq!(response.body["pagination"]["page"], 2);
    assert_eq!(response.body["pagination"]["pageSize"], 5);
    assert_eq!(response.body["pagination"]["total"], 12);
    assert_eq!(response.body["pagination"]["totalPages"], 3);
}

#[tokio::test]
async fn test_listing_filters_sorts_and_projects() {
    let app = TestApp::new();
    let dir = contacts(&app).await;
    for (name, age) in [("Cy", 40), ("Al", 25), ("Bo", 33)] {
        app.post(
            &format!("/records/{}", dir),
            json!({ "data": { "name": name, "email": format!("{}@example.com", name), "age": age } }),
        )
        .await;
    }

    let response = app
        .get(&format!("/records/{}?filter=age:gte:30&sort=age:desc&fields=name", dir))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let records = response.body["data"]["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["data"], json!({ "name": "Cy" }));
    assert_eq!(records[1]["data"], json!({ "name": "Bo" }));
}

#[tokio::test]
async fn test_unknown_sort_field_is_rejected() {
    let app = TestApp::new();
    let dir = contacts(&app).await;
    let response = app.get(&format!("/records/{}?sort=nope:asc", dir)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "UNKNOWN_SORT_FIELD");
}

#[tokio::test]
async fn test_huge_page_number_returns_empty_page() {
    let app = TestApp::new();
    let dir = contacts(&app).await;
    app.post(
        &format!("/records/{}", dir),
        json!({ "data": { "name": "Ann", "email": "ann@example.com" } }),
    )
    .await;

    let response = app
        .get(&format!("/records/{}?page=9223372036854775807&pageSize=100", dir))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["data"]["records"], json!([]));
    assert_eq!(response.body["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_fields_hidden_by_read_roles_cannot_be_queried() {
    let app = TestApp::new();
    let dir = contacts(&app).await;
    let salary = app
        .post(
            "/field-defs",
            json!({ "directoryId": dir, "key": "salary", "type": "number", "readRoles": ["hr"] }),
        )
        .await;
    assert_eq!(salary.status, StatusCode::CREATED, "{}", salary.body);

    for query in ["filter=salary:gte:100000", "sort=salary:desc"] {
        let response = app.get(&format!("/records/{}?{}", dir, query)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{}", query);
        assert_eq!(response.body["code"], "FORBIDDEN");
    }
}

#[tokio::test]
async fn test_deleting_category_detaches_records() {
    let app = TestApp::new();
    let dir = contacts(&app).await;
    let category = app
        .post("/record-categories", json!({ "directoryId": dir, "name": "VIP" }))
        .await;
    let category_id = category.body["data"]["id"].as_str().unwrap().to_string();

    let record = app
        .post(
            &format!("/records/{}", dir),
            json!({ "data": { "name": "Di", "email": "di@example.com" }, "categoryId": category_id }),
        )
        .await;
    assert_eq!(record.status, StatusCode::CREATED, "{}", record.body);
    let record_id = record.body["data"]["id"].as_str().unwrap().to_string();

    let removed = app.delete(&format!("/record-categories/{}", category_id)).await;
    assert_eq!(removed.status, StatusCode::OK);

    let fetched = app.get(&format!("/records/{}/{}", dir, record_id)).await;
    assert!(fetched.body["data"]["categoryId"].is_null());
}
