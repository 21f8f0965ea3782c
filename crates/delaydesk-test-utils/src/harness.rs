// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end API testing.
//!
//! `TestHarness` assembles the full stack (store, service, router) on a temp
//! SQLite database. Requests go through the router with
//! `tower::ServiceExt::oneshot`, so no port is bound.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use delaydesk_config::model::StorageConfig;
use delaydesk_core::{CreateDelayRequest, DelayError, DelayReport, DelayStore};
use delaydesk_service::DelayService;
use delaydesk_storage::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    in_memory: bool,
    wal_mode: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            in_memory: false,
            wal_mode: true,
        }
    }

    /// Use a private in-memory database instead of a temp file.
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    /// Toggle WAL mode on the temp file database.
    pub fn with_wal_mode(mut self, wal_mode: bool) -> Self {
        self.wal_mode = wal_mode;
        self
    }

    /// Build the harness, creating the database and running migrations.
    pub async fn build(self) -> Result<TestHarness, DelayError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| DelayError::Storage { source: e.into() })?;

        let store = if self.in_memory {
            SqliteStore::open_in_memory().await?
        } else {
            let config = StorageConfig {
                database_path: temp_dir.path().join("test.db").to_string_lossy().to_string(),
                wal_mode: self.wal_mode,
            };
            SqliteStore::open(&config).await?
        };
        let store: Arc<dyn DelayStore> = Arc::new(store);
        let service = DelayService::new(store.clone());
        let router = delaydesk_gateway::router(service.clone());

        Ok(TestHarness {
            store,
            service,
            router,
            _temp_dir: temp_dir,
        })
    }
}

/// Status and decoded JSON body of a response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// A complete test environment backed by temp storage.
pub struct TestHarness {
    /// The store, for seeding and direct assertions.
    pub store: Arc<dyn DelayStore>,
    /// The service the router dispatches to.
    pub service: DelayService,
    router: Router,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A fresh copy of the router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Sends one request through the router.
    ///
    /// A `body` is sent as JSON. An empty response body decodes as `Value::Null`.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let body = body.map(|b| b.to_string());
        self.raw_request(method, uri, body.as_deref()).await
    }

    /// Sends `body` verbatim with a JSON content type, for malformed payloads.
    pub async fn raw_request(&self, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let request = builder
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .expect("request should build");

        let response = self
            .router()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body should be JSON")
        };
        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str) -> TestResponse {
        self.request(Method::PATCH, uri, None).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None).await
    }

    /// Creates an active report directly through the service.
    pub async fn report(&self, neighborhood: &str, delay_minutes: u32) -> DelayReport {
        let request: CreateDelayRequest =
            serde_json::from_value(sample_request(neighborhood, delay_minutes))
                .expect("sample request should deserialize");
        self.service
            .create(request)
            .await
            .expect("sample report should be stored")
    }
}

/// A complete, valid create payload.
pub fn sample_request(neighborhood: &str, delay_minutes: u32) -> Value {
    json!({
        "routeNumber": "Route 42",
        "neighborhood": neighborhood,
        "delayMinutes": delay_minutes,
        "reason": "Traffic Congestion",
        "busId": "BUS-0042",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_builds_on_temp_file() {
        let harness = TestHarness::builder().build().await.unwrap();
        harness.store.health_check().await.unwrap();
        let response = harness.get("/api/health").await;
        assert_eq!(response.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn harness_builds_in_memory() {
        let harness = TestHarness::builder().in_memory().build().await.unwrap();
        let created = harness.report("Downtown", 12).await;
        assert_eq!(created.delay_minutes, 12);
    }
}
