//! Shared test helpers for integration tests.
//!
//! Each `TestApp` builds the axum router over a fresh in-memory store, so
//! tests exercise routing, gateway headers, role guards, serialisation,
//! service rules and storage without a database.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use starry_api::{AppState, build_app};
use starry_core::config::{AppConfig, StoreProvider};
use starry_database::StoreManager;
use starry_database::memory::MemoryStore;
use starry_entity::binding::TargetType;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Store behind the router, for direct assertions
    pub store: MemoryStore,
    /// Tenant sent in the gateway headers
    pub tenant_id: Uuid,
    /// Account sent in the gateway headers
    pub account_id: Uuid,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.provider = StoreProvider::Memory;

        let store = MemoryStore::new();
        let state = AppState::new(config, StoreManager::memory(store.clone()));
        Self {
            router: build_app(state),
            store,
            tenant_id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
        }
    }

    /// Make a request in the app's tenant with the given workspace role
    pub async fn request(
        &self,
        role: &str,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> TestResponse {
        self.request_as(self.tenant_id, role, method, path, body)
            .await
    }

    /// Make a request in another tenant
    pub async fn request_as(
        &self,
        tenant_id: Uuid,
        role: &str,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> TestResponse {
        let body_str = body.map(|b| b.to_string()).unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(format!("/console/api{path}"))
            .header("Content-Type", "application/json")
            .header("x-tenant-id", tenant_id.to_string())
            .header("x-account-id", self.account_id.to_string())
            .header("x-account-role", role)
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Send a prebuilt request
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&body_bytes).to_string())
        });

        TestResponse { status, body }
    }

    /// Create an app directory as owner and return its ID
    pub async fn create_dir(&self, name: &str, parent_id: Option<&str>) -> String {
        let response = self
            .request(
                "owner",
                "POST",
                "/directory",
                Some(json!({ "name": name, "type": "app", "parent_id": parent_id })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.body["directory_id"]
            .as_str()
            .expect("No directory_id in create response")
            .to_string()
    }

    /// Root nodes of the app tree
    pub async fn tree(&self) -> Vec<Value> {
        let response = self
            .request("owner", "GET", "/directory?type=app", None)
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.body["dir_tree"]
            .as_array()
            .cloned()
            .unwrap_or_default()
    }

    /// Register an app the tenant owns and return its ID
    pub async fn app_target(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.store
            .insert_target(self.tenant_id, TargetType::App, id)
            .await;
        id
    }

    /// File targets into a directory as editor
    pub async fn bind(&self, directory_id: &str, target_ids: &[Uuid]) -> TestResponse {
        self.request(
            "editor",
            "POST",
            "/directory-bindings/create",
            Some(json!({ "target_ids": target_ids, "directory_id": directory_id, "type": "app" })),
        )
        .await
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
