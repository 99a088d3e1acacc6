//! In-process test harness around the router.

use aino::api::extract::{ACTOR_HEADER, ROLES_HEADER};
use aino::api::{self, AppState};
use aino::config::AinoConfig;
use aino::access::AccessConfig;
use aino::module::DEFAULT_MODULE_ID;
use aino::store::Database;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const APP: &str = "app-1";
pub const MODULE: &str = DEFAULT_MODULE_ID;

pub struct TestApp {
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    /// Stock config: open access and only the built-in module.
    pub fn new() -> Self {
        Self::with_config(AinoConfig::default())
    }

    pub fn with_access(access: AccessConfig) -> Self {
        Self::with_config(AinoConfig {
            access,
            ..AinoConfig::default()
        })
    }

    fn with_config(config: AinoConfig) -> Self {
        let database = Database::temporary().unwrap();
        let state = AppState::new(config, database).unwrap();
        Self {
            router: api::router(state),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        TestResponse { status, body }
    }

    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        self.call_as("alice", method, uri, body).await
    }

    pub async fn call_as(&self, actor: &str, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(ACTOR_HEADER, actor)
            .header(ROLES_HEADER, "admin");
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.call(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.call(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.call(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.call(Method::DELETE, uri, None).await
    }

    /// Create a directory in [`APP`] and return its id.
    pub async fn directory(&self, name: &str, extra: Value) -> String {
        let mut body = json!({ "name": name });
        if let (Some(target), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
            target.extend(extra.clone());
        }
        let response = self
            .post(
                &format!("/directories?applicationId={}&moduleId={}", APP, MODULE),
                body,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Create a primitive field definition and return its id.
    pub async fn field(&self, directory_id: &str, key: &str, field_type: &str, required: bool) -> String {
        let response = self
            .post(
                "/field-defs",
                json!({
                    "directoryId": directory_id,
                    "key": key,
                    "type": field_type,
                    "required": required,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["data"]["id"].as_str().unwrap().to_string()
    }
}
