//! Order CRUD and revenue endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::OrderId;
use domain::{Money, Order, OrderDraft, OrderPatch, OrderStatus};
use serde::{Deserialize, Serialize};
use store::{OrderFilter, OrderStore};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore> {
    pub store: S,
}

/// Query parameters accepted by order listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Substring to match against table numbers.
    pub q: Option<String>,
    /// Exact status to match.
    pub status: Option<String>,
}

impl ListQuery {
    /// Converts the raw query into a store filter.
    ///
    /// An unknown status value is a client error rather than an empty
    /// result set.
    pub fn to_filter(&self) -> Result<OrderFilter, ApiError> {
        let status = match self.status.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<OrderStatus>()
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?,
            ),
        };
        Ok(OrderFilter {
            table: self.q.clone().filter(|q| !q.is_empty()),
            status,
        })
    }
}

#[derive(Serialize)]
pub struct RevenueResponse {
    pub total_revenue: Money,
}

// -- Handlers --

/// GET /api/orders — list orders, optionally filtered by table and status.
#[tracing::instrument(skip(state))]
pub async fn list<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state.store.list_orders(query.to_filter()?).await?;
    Ok(Json(orders))
}

/// POST /api/orders — create a new order with its items.
#[tracing::instrument(skip(state, draft))]
pub async fn create<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(draft): Json<OrderDraft>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = state.store.create_order(draft).await?;
    metrics::counter!("orders_created_total").increment(1);
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders/:id — load an order with its items.
#[tracing::instrument(skip(state))]
pub async fn get<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<Order>, ApiError> {
    let id = OrderId::new(id);
    let order = state
        .store
        .get_order(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;
    Ok(Json(order))
}

/// PUT /api/orders/:id — replace an order wholesale.
#[tracing::instrument(skip(state, draft))]
pub async fn replace<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
    Json(draft): Json<OrderDraft>,
) -> Result<Json<Order>, ApiError> {
    let order = state.store.replace_order(OrderId::new(id), draft).await?;
    metrics::counter!("orders_updated_total").increment(1);
    Ok(Json(order))
}

/// PATCH /api/orders/:id — merge a partial update into an order.
#[tracing::instrument(skip(state, patch))]
pub async fn patch<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
    Json(patch): Json<OrderPatch>,
) -> Result<Json<Order>, ApiError> {
    let order = state.store.patch_order(OrderId::new(id), patch).await?;
    metrics::counter!("orders_updated_total").increment(1);
    Ok(Json(order))
}

/// DELETE /api/orders/:id — delete an order and its items.
#[tracing::instrument(skip(state))]
pub async fn delete<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_order(OrderId::new(id)).await?;
    metrics::counter!("orders_deleted_total").increment(1);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/revenue — sum of total_price over paid orders.
#[tracing::instrument(skip(state))]
pub async fn revenue<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<RevenueResponse>, ApiError> {
    let total_revenue = state.store.total_revenue().await?;
    Ok(Json(RevenueResponse { total_revenue }))
}
