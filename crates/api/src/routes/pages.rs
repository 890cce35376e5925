//! Server-rendered web pages.
//!
//! Small enough to render with `format!`; the forms post
//! `application/x-www-form-urlencoded` bodies with repeated
//! `item_name`/`item_price`/`item_quantity` fields, one triple per item
//! row, which are paired up positionally.

use std::sync::Arc;

use axum::extract::{Path, Query, RawForm, State};
use axum::response::{Html, Redirect};
use common::OrderId;
use domain::{ItemDraft, Money, Order, OrderDraft, OrderError, OrderStatus};
use store::OrderStore;

use crate::error::ApiError;
use crate::routes::orders::{AppState, ListQuery};

const STYLE: &str = "body{font-family:sans-serif;max-width:60rem;margin:2rem auto}\
table{border-collapse:collapse;width:100%}td,th{border:1px solid #ccc;padding:.4rem}\
form.inline{display:inline}input,select{margin:.2rem}";

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <title>{title} — Cafe Manager</title><style>{STYLE}</style></head>\
         <body><h1>{title}</h1>{body}\
         <p><a href=\"/orders\">Orders</a> | <a href=\"/orders/new\">New order</a> | \
         <a href=\"/revenue\">Revenue</a></p></body></html>"
    ))
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn status_options(selected: Option<OrderStatus>) -> String {
    OrderStatus::ALL
        .iter()
        .map(|status| {
            let marker = if Some(*status) == selected {
                " selected"
            } else {
                ""
            };
            format!(
                "<option value=\"{}\"{marker}>{}</option>",
                status.as_str(),
                status.label()
            )
        })
        .collect()
}

fn item_rows(order: Option<&Order>) -> String {
    let mut rows = String::new();
    if let Some(order) = order {
        for item in &order.items {
            rows.push_str(&format!(
                "<tr><td><input name=\"item_name\" value=\"{}\"></td>\
                 <td><input name=\"item_price\" value=\"{}\"></td>\
                 <td><input name=\"item_quantity\" value=\"{}\"></td></tr>",
                escape(&item.name),
                item.price,
                item.quantity
            ));
        }
    }
    // One blank row for a new dish.
    rows.push_str(
        "<tr><td><input name=\"item_name\"></td>\
         <td><input name=\"item_price\"></td>\
         <td><input name=\"item_quantity\" value=\"1\"></td></tr>",
    );
    rows
}

fn order_form(action: &str, order: Option<&Order>) -> String {
    let table_number = order
        .map(|o| o.table_number.to_string())
        .unwrap_or_default();
    format!(
        "<form method=\"post\" action=\"{action}\">\
         <p>Table <input name=\"table_number\" value=\"{table_number}\" required> \
         Status <select name=\"status\">{}</select></p>\
         <table><tr><th>Dish</th><th>Price</th><th>Qty</th></tr>{}</table>\
         <p><button type=\"submit\">Save</button></p></form>",
        status_options(order.map(|o| o.status)),
        item_rows(order)
    )
}

/// Builds an order draft from the posted form pairs.
///
/// Item rows are matched up by position; rows left entirely blank are
/// skipped, mirroring the optional extra row in the form.
fn draft_from_form(pairs: &[(String, String)]) -> Result<OrderDraft, ApiError> {
    let mut table_number = None;
    let mut status = OrderStatus::default();
    let mut names: Vec<&str> = Vec::new();
    let mut prices: Vec<&str> = Vec::new();
    let mut quantities: Vec<&str> = Vec::new();

    for (key, value) in pairs {
        match key.as_str() {
            "table_number" => {
                table_number = Some(value.parse::<i32>().map_err(|_| {
                    ApiError::BadRequest("table_number must be an integer".to_string())
                })?);
            }
            "status" => {
                status = value
                    .parse::<OrderStatus>()
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            }
            "item_name" => names.push(value.as_str()),
            "item_price" => prices.push(value.as_str()),
            "item_quantity" => quantities.push(value.as_str()),
            _ => {}
        }
    }

    let table_number =
        table_number.ok_or_else(|| ApiError::BadRequest("table_number is required".to_string()))?;

    let mut items = Vec::new();
    for (index, name) in names.iter().enumerate() {
        let price = prices.get(index).copied().unwrap_or("");
        let quantity = quantities.get(index).copied().unwrap_or("");
        if name.is_empty() && price.is_empty() {
            continue;
        }
        if name.is_empty() {
            return Err(OrderError::MissingField { field: "name" }.into());
        }
        let price = price
            .parse::<f64>()
            .map_err(|_| ApiError::BadRequest("price must be a number".to_string()))?;
        let quantity = if quantity.is_empty() {
            1
        } else {
            quantity
                .parse::<u32>()
                .map_err(|_| ApiError::BadRequest("quantity must be a positive integer".to_string()))?
        };
        items.push(ItemDraft {
            name: (*name).to_string(),
            price: Money::from_decimal(price),
            quantity,
        });
    }

    Ok(OrderDraft {
        table_number,
        status,
        items,
    })
}

fn parse_form(bytes: &[u8]) -> Result<Vec<(String, String)>, ApiError> {
    serde_urlencoded::from_bytes(bytes)
        .map_err(|e| ApiError::BadRequest(format!("invalid form body: {e}")))
}

// -- Handlers --

/// GET / — the order list is the landing page.
pub async fn index() -> Redirect {
    Redirect::to("/orders")
}

/// GET /orders — order list with search and status filter.
#[tracing::instrument(skip(state))]
pub async fn order_list<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, ApiError> {
    let filter = query.to_filter()?;
    let status = filter.status;
    let orders = state.store.list_orders(filter).await?;

    let mut body = format!(
        "<form method=\"get\" action=\"/orders\">\
         <input name=\"q\" placeholder=\"Table number\" value=\"{}\"> \
         <select name=\"status\"><option value=\"\">Any status</option>{}</select> \
         <button type=\"submit\">Filter</button></form>",
        escape(query.q.as_deref().unwrap_or("")),
        status_options(status)
    );

    body.push_str(
        "<table><tr><th>#</th><th>Table</th><th>Items</th><th>Total</th>\
         <th>Status</th><th>Created</th><th></th></tr>",
    );
    for order in &orders {
        let items: Vec<String> = order
            .items
            .iter()
            .map(|item| format!("{} x{}", escape(&item.name), item.quantity))
            .collect();
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td><a href=\"/orders/{}/edit\">Edit</a> \
             <form class=\"inline\" method=\"post\" action=\"/orders/{}/delete\">\
             <button type=\"submit\">Delete</button></form></td></tr>",
            order.id,
            order.table_number,
            items.join(", "),
            order.total_price,
            order.status.label(),
            order.created_at.format("%Y-%m-%d %H:%M"),
            order.id,
            order.id,
        ));
    }
    body.push_str("</table>");

    Ok(page("Orders", &body))
}

/// GET /orders/new — empty order form.
pub async fn new_order_form() -> Html<String> {
    page("New order", &order_form("/orders/new", None))
}

/// POST /orders/new — create an order from the form and go back to the list.
#[tracing::instrument(skip(state, form))]
pub async fn create_order<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    RawForm(form): RawForm,
) -> Result<Redirect, ApiError> {
    let draft = draft_from_form(&parse_form(&form)?)?;
    state.store.create_order(draft).await?;
    metrics::counter!("orders_created_total").increment(1);
    Ok(Redirect::to("/orders"))
}

/// GET /orders/:id/edit — form prefilled with the order's current state.
#[tracing::instrument(skip(state))]
pub async fn edit_order_form<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Html<String>, ApiError> {
    let id = OrderId::new(id);
    let order = state
        .store
        .get_order(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;

    Ok(page(
        &format!("Edit order {id}"),
        &order_form(&format!("/orders/{id}/edit"), Some(&order)),
    ))
}

/// POST /orders/:id/edit — full replace from the form.
///
/// The form re-submits every row, so saving applies full-replace
/// semantics: the previous item set is discarded.
#[tracing::instrument(skip(state, form))]
pub async fn update_order<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
    RawForm(form): RawForm,
) -> Result<Redirect, ApiError> {
    let draft = draft_from_form(&parse_form(&form)?)?;
    state.store.replace_order(OrderId::new(id), draft).await?;
    metrics::counter!("orders_updated_total").increment(1);
    Ok(Redirect::to("/orders"))
}

/// POST /orders/:id/delete — delete and go back to the list.
#[tracing::instrument(skip(state))]
pub async fn delete_order<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Redirect, ApiError> {
    state.store.delete_order(OrderId::new(id)).await?;
    metrics::counter!("orders_deleted_total").increment(1);
    Ok(Redirect::to("/orders"))
}

/// GET /revenue — paid-order revenue for the shift.
#[tracing::instrument(skip(state))]
pub async fn revenue<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Html<String>, ApiError> {
    let total = state.store.total_revenue().await?;
    Ok(page(
        "Revenue",
        &format!("<p>Total revenue from paid orders: <strong>{total}</strong></p>"),
    ))
}
