//! Common test utilities for orders integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::{json, Value};

use orders_service::{create_router, AppState, ServiceConfig, StoreBackend};
use orders_store::MemoryStore;

/// Customer used by most scenarios.
pub const TEST_CUSTOMER: &str = "11111111-1111-1111-1111-111111111111";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
}

impl TestHarness {
    /// Create a new test harness over a fresh in-memory store.
    pub fn new() -> Self {
        Self::with_page_size(50)
    }

    /// Create a harness whose listing returns `list_page_size` orders per page.
    pub fn with_page_size(list_page_size: usize) -> Self {
        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            store_backend: StoreBackend::Memory,
            list_page_size,
            ..ServiceConfig::default()
        };

        let state = AppState::new(Arc::new(MemoryStore::in_memory()), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server }
    }

    /// Place an order for [`TEST_CUSTOMER`] and return the response body.
    pub async fn create_order(&self, line_items: Value) -> Value {
        let response = self
            .server
            .post("/orders")
            .json(&json!({
                "customer_id": TEST_CUSTOMER,
                "line_items": line_items,
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        response.json()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
