//! Order handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use orders_core::{CustomerId, LineItem, Order, OrderId};
use orders_store::FindAllPage;

use crate::error::ApiError;
use crate::state::{AppState, RequestDeadline};

/// Create order request.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// The customer placing the order.
    pub customer_id: CustomerId,
    /// Items being ordered.
    pub line_items: Vec<LineItem>,
}

/// Update order request.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    /// Replacement line items.
    pub line_items: Vec<LineItem>,
}

/// List query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Cursor returned as `next` by the previous page. Absent or `0` starts over.
    pub cursor: Option<String>,
}

/// One page of orders.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    /// Orders on this page.
    pub items: Vec<Order>,
    /// Cursor for the next page; omitted on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<u64>,
}

fn parse_order_id(raw: &str) -> Result<OrderId, ApiError> {
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("{e}: {raw}")))
}

/// Place a new order.
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    RequestDeadline(deadline): RequestDeadline,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = Order::new(body.customer_id, body.line_items);

    let stored = order.clone();
    state
        .with_store(deadline, move |store, deadline| store.insert(&stored, deadline))
        .await?;

    tracing::info!(
        order_id = %order.order_id,
        customer_id = %order.customer_id,
        items = order.line_items.len(),
        "Order created"
    );

    Ok((StatusCode::CREATED, Json(order)))
}

/// List orders one page at a time.
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    RequestDeadline(deadline): RequestDeadline,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let cursor = match query.cursor.as_deref() {
        None | Some("") => 0,
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| ApiError::BadRequest(format!("invalid cursor: {raw}")))?,
    };

    let page = FindAllPage {
        cursor,
        size: state.config.list_page_size,
    };
    let result = state
        .with_store(deadline, move |store, deadline| store.find_all(page, deadline))
        .await?;

    Ok(Json(ListResponse {
        next: (!result.is_last()).then_some(result.cursor),
        items: result.orders,
    }))
}

/// Get an order by ID.
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    RequestDeadline(deadline): RequestDeadline,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(&id)?;

    let order = state
        .with_store(deadline, move |store, deadline| store.find_by_id(order_id, deadline))
        .await?;

    Ok(Json(order))
}

/// Replace an order's line items.
///
/// The customer and creation time are kept from the stored order. The read
/// and the write are separate store calls, so concurrent updates to the same
/// order resolve last-writer-wins without a conflict error; a concurrent
/// delete still wins over the write (404).
pub async fn update_order(
    State(state): State<Arc<AppState>>,
    RequestDeadline(deadline): RequestDeadline,
    Path(id): Path<String>,
    Json(body): Json<UpdateOrderRequest>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(&id)?;

    let order = state
        .with_store(deadline, move |store, deadline| {
            let mut order = store.find_by_id(order_id, deadline)?;
            order.line_items = body.line_items;
            store.update(&order, deadline)?;
            Ok(order)
        })
        .await?;

    tracing::info!(order_id = %order_id, "Order updated");

    Ok(Json(order))
}

/// Delete an order.
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    RequestDeadline(deadline): RequestDeadline,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let order_id = parse_order_id(&id)?;

    state
        .with_store(deadline, move |store, deadline| store.delete_by_id(order_id, deadline))
        .await?;

    tracing::info!(order_id = %order_id, "Order deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}
