//! Order endpoint integration tests.

mod common;

use std::collections::HashSet;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{TestHarness, TEST_CUSTOMER};

fn two_items() -> Value {
    json!([
        { "item_id": "22222222-2222-2222-2222-222222222222", "quantity": 2, "price": 150 },
        { "item_id": "33333333-3333-3333-3333-333333333333", "quantity": 1, "price": 999 },
    ])
}

fn order_id(order: &Value) -> u64 {
    order["order_id"].as_u64().expect("order_id should be a number")
}

#[tokio::test]
async fn order_lifecycle() {
    let harness = TestHarness::new();

    let created = harness.create_order(two_items()).await;
    let id = order_id(&created);
    assert_eq!(created["customer_id"], TEST_CUSTOMER);
    assert_eq!(created["line_items"], two_items());

    let response = harness.server.get(&format!("/orders/{id}")).await;
    response.assert_status_ok();
    let fetched: Value = response.json();
    assert_eq!(fetched, created);

    let response = harness.server.delete(&format!("/orders/{id}")).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["deleted"], true);

    let response = harness.server.get(&format!("/orders/{id}")).await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn create_rejects_malformed_customer() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/orders")
        .json(&json!({ "customer_id": "not-a-uuid", "line_items": [] }))
        .await;

    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn update_replaces_line_items() {
    let harness = TestHarness::new();

    let created = harness.create_order(two_items()).await;
    let id = order_id(&created);

    let replacement = json!([
        { "item_id": "44444444-4444-4444-4444-444444444444", "quantity": 5, "price": 10 },
    ]);
    let response = harness
        .server
        .put(&format!("/orders/{id}"))
        .json(&json!({ "line_items": replacement }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["line_items"], replacement);
    assert_eq!(updated["customer_id"], TEST_CUSTOMER);
    assert_eq!(updated["created_at"], created["created_at"]);

    let fetched: Value = harness.server.get(&format!("/orders/{id}")).await.json();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_missing_order_is_not_found() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .put("/orders/42")
        .json(&json!({ "line_items": [] }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_missing_order_is_not_found() {
    let harness = TestHarness::new();

    let response = harness.server.delete("/orders/42").await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_order_id_is_bad_request() {
    let harness = TestHarness::new();

    let response = harness.server.get("/orders/abc").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "bad_request");

    let response = harness.server.delete("/orders/-1").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_empty_store() {
    let harness = TestHarness::new();

    let response = harness.server.get("/orders").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["items"], json!([]));
    assert!(body.get("next").is_none());
}

#[tokio::test]
async fn list_walks_every_order_once() {
    let harness = TestHarness::with_page_size(3);

    let mut created = HashSet::new();
    for _ in 0..7 {
        let order = harness.create_order(two_items()).await;
        created.insert(order_id(&order));
    }

    let mut seen = HashSet::new();
    let mut pages = 0;
    let mut cursor: Option<u64> = None;
    loop {
        let path = match cursor {
            Some(c) => format!("/orders?cursor={c}"),
            None => "/orders".to_string(),
        };
        let response = harness.server.get(&path).await;
        response.assert_status_ok();
        let body: Value = response.json();

        let items = body["items"].as_array().expect("items should be an array");
        assert!(items.len() <= 3);
        for item in items {
            assert!(seen.insert(order_id(item)), "order listed twice");
        }

        pages += 1;
        assert!(pages <= 7, "pagination did not terminate");

        match body.get("next").and_then(Value::as_u64) {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    assert_eq!(seen, created);
}

#[tokio::test]
async fn list_rejects_bad_cursor() {
    let harness = TestHarness::new();

    let response = harness.server.get("/orders?cursor=page-two").await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_cursor_zero_starts_over() {
    let harness = TestHarness::new();
    let created = harness.create_order(two_items()).await;

    let body: Value = harness.server.get("/orders?cursor=0").await.json();

    assert_eq!(body["items"], json!([created]));
    assert!(body.get("next").is_none());
}

#[tokio::test]
async fn later_update_wins() {
    let harness = TestHarness::new();

    let created = harness.create_order(two_items()).await;
    let id = order_id(&created);

    let first = json!([
        { "item_id": "55555555-5555-5555-5555-555555555555", "quantity": 1, "price": 1 },
    ]);
    let second = json!([
        { "item_id": "66666666-6666-6666-6666-666666666666", "quantity": 2, "price": 2 },
    ]);
    for line_items in [&first, &second] {
        harness
            .server
            .put(&format!("/orders/{id}"))
            .json(&json!({ "line_items": line_items }))
            .await
            .assert_status_ok();
    }

    let fetched: Value = harness.server.get(&format!("/orders/{id}")).await.json();
    assert_eq!(fetched["line_items"], second);
}

#[tokio::test]
async fn update_after_delete_is_not_found() {
    let harness = TestHarness::new();

    let created = harness.create_order(two_items()).await;
    let id = order_id(&created);
    harness
        .server
        .delete(&format!("/orders/{id}"))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .put(&format!("/orders/{id}"))
        .json(&json!({ "line_items": two_items() }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    harness
        .server
        .get(&format!("/orders/{id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
