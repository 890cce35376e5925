//! Integration tests for the HTTP server, run against the in-memory store.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use store::InMemoryOrderStore;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    let state = Arc::new(api::routes::orders::AppState {
        store: InMemoryOrderStore::new(),
    });
    api::create_app(state, get_metrics_handle())
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Creates an order and returns its JSON representation.
async fn create_order(app: &axum::Router, body: serde_json::Value) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/orders", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_create_order_computes_total() {
    let app = setup();

    let order = create_order(
        &app,
        serde_json::json!({
            "table_number": 5,
            "items": [
                {"name": "Pizza", "price": 30, "quantity": 2},
                {"name": "Cola", "price": 5, "quantity": 3}
            ]
        }),
    )
    .await;

    assert_eq!(order["table_number"], 5);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total_price"], 75.0);
    assert_eq!(order["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_order_defaults() {
    let app = setup();

    // Quantity defaults to 1: 5 + 12 = 17
    let order = create_order(
        &app,
        serde_json::json!({
            "table_number": 2,
            "items": [
                {"name": "Tea", "price": 5},
                {"name": "Pie", "price": 12}
            ]
        }),
    )
    .await;
    assert_eq!(order["total_price"], 17.0);

    let empty = create_order(&app, serde_json::json!({"table_number": 9})).await;
    assert_eq!(empty["total_price"], 0.0);
    assert_eq!(empty["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_order_rejects_blank_item_name() {
    let app = setup();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/orders",
            serde_json::json!({
                "table_number": 5,
                "items": [{"name": "", "price": 5}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "name");
}

#[tokio::test]
async fn test_get_order() {
    let app = setup();

    let order = create_order(
        &app,
        serde_json::json!({"table_number": 4, "items": [{"name": "Soup", "price": 20}]}),
    )
    .await;
    let id = order["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/orders/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, order);

    let response = app.oneshot(get_request("/api/orders/12345")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_put_replaces_items_wholesale() {
    let app = setup();

    let order = create_order(
        &app,
        serde_json::json!({
            "table_number": 5,
            "items": [{"name": "Pizza", "price": 30, "quantity": 2}]
        }),
    )
    .await;
    let id = order["id"].as_i64().unwrap();
    let old_item_id = order["items"][0]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/orders/{id}"),
            serde_json::json!({
                "table_number": 6,
                "status": "ready",
                "items": [{"name": "Tea", "price": 5, "quantity": 1}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let replaced = body_json(response).await;
    assert_eq!(replaced["table_number"], 6);
    assert_eq!(replaced["status"], "ready");
    assert_eq!(replaced["total_price"], 5.0);
    let items = replaced["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_ne!(items[0]["id"].as_i64().unwrap(), old_item_id);
}

#[tokio::test]
async fn test_patch_updates_only_supplied_fields() {
    let app = setup();

    let order = create_order(
        &app,
        serde_json::json!({
            "table_number": 7,
            "items": [{"name": "Soup", "price": 20, "quantity": 1}]
        }),
    )
    .await;
    let id = order["id"].as_i64().unwrap();
    let item_id = order["items"][0]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/orders/{id}"),
            serde_json::json!({"items": [{"id": item_id, "price": 35.00}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let patched = body_json(response).await;
    assert_eq!(patched["items"][0]["price"], 35.0);
    assert_eq!(patched["items"][0]["quantity"], 1);
    assert_eq!(patched["items"][0]["name"], "Soup");
    assert_eq!(patched["total_price"], 35.0);
    assert_eq!(patched["table_number"], 7);
}

#[tokio::test]
async fn test_patch_with_foreign_item_id_is_rejected() {
    let app = setup();

    let order = create_order(
        &app,
        serde_json::json!({
            "table_number": 7,
            "items": [{"name": "Soup", "price": 20, "quantity": 1}]
        }),
    )
    .await;
    let id = order["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/orders/{id}"),
            serde_json::json!({"items": [{"id": 999, "price": 10}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error = body_json(response).await;
    assert_eq!(error["field"], "items");
    assert!(error["error"].as_str().unwrap().contains("999"));

    // The order is untouched.
    let response = app
        .oneshot(get_request(&format!("/api/orders/{id}")))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, order);
}

#[tokio::test]
async fn test_patch_new_item_requires_name_and_price() {
    let app = setup();

    let order = create_order(&app, serde_json::json!({"table_number": 1})).await;
    let id = order["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/orders/{id}"),
            serde_json::json!({"items": [{"price": 10}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "name");

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/orders/{id}"),
            serde_json::json!({"items": [{"name": "Tea"}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "price");
}

#[tokio::test]
async fn test_patch_treats_zero_id_as_new_item() {
    let app = setup();

    let order = create_order(&app, serde_json::json!({"table_number": 1})).await;
    let id = order["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/orders/{id}"),
            serde_json::json!({"items": [{"id": 0, "name": "Pie", "price": 12}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let patched = body_json(response).await;
    assert_eq!(patched["items"].as_array().unwrap().len(), 1);
    assert_eq!(patched["total_price"], 12.0);
}

#[tokio::test]
async fn test_delete_order() {
    let app = setup();

    let order = create_order(
        &app,
        serde_json::json!({"table_number": 3, "items": [{"name": "Pie", "price": 12}]}),
    )
    .await;
    let id = order["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/orders/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(get_request(&format!("/api/orders/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_revenue_sums_paid_orders() {
    let app = setup();

    let response = app.clone().oneshot(get_request("/api/revenue")).await.unwrap();
    assert_eq!(body_json(response).await["total_revenue"], 0.0);

    // Two paid orders (100 + 50) and one pending (40).
    for (table, price, status) in [(1, 100, "paid"), (2, 50, "paid"), (3, 40, "pending")] {
        create_order(
            &app,
            serde_json::json!({
                "table_number": table,
                "status": status,
                "items": [{"name": "Set menu", "price": price}]
            }),
        )
        .await;
    }

    let response = app.oneshot(get_request("/api/revenue")).await.unwrap();
    assert_eq!(body_json(response).await["total_revenue"], 150.0);
}

#[tokio::test]
async fn test_list_filters() {
    let app = setup();

    create_order(&app, serde_json::json!({"table_number": 1})).await;
    create_order(&app, serde_json::json!({"table_number": 12, "status": "paid"})).await;

    let response = app
        .clone()
        .oneshot(get_request("/api/orders?status=paid"))
        .await
        .unwrap();
    let orders = body_json(response).await;
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["status"], "paid");

    let response = app
        .clone()
        .oneshot(get_request("/api/orders?q=2"))
        .await
        .unwrap();
    let orders = body_json(response).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(get_request("/api/orders"))
        .await
        .unwrap();
    let orders = body_json(response).await;
    assert_eq!(orders.as_array().unwrap().len(), 2);

    let response = app
        .oneshot(get_request("/api/orders?status=bogus"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_list_page() {
    let app = setup();

    create_order(
        &app,
        serde_json::json!({"table_number": 5, "items": [{"name": "Pizza", "price": 30}]}),
    )
    .await;

    let response = app.oneshot(get_request("/orders")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Pizza"));
    assert!(html.contains("30.00"));
}

#[tokio::test]
async fn test_create_order_from_form() {
    let app = setup();

    let body = "table_number=2&status=pending\
                &item_name=Tea&item_price=5.00&item_quantity=1\
                &item_name=Pie&item_price=12&item_quantity=1";
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/orders/new")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app.oneshot(get_request("/api/orders")).await.unwrap();
    let orders = body_json(response).await;
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["table_number"], 2);
    assert_eq!(orders[0]["total_price"], 17.0);
}

#[tokio::test]
async fn test_revenue_page() {
    let app = setup();

    create_order(
        &app,
        serde_json::json!({
            "table_number": 1,
            "status": "paid",
            "items": [{"name": "Set menu", "price": 100}]
        }),
    )
    .await;

    let response = app.oneshot(get_request("/revenue")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("100.00"));
}

#[tokio::test]
async fn test_metrics_endpoint_renders_text() {
    let app = setup();

    create_order(&app, serde_json::json!({"table_number": 1})).await;

    let response = app.oneshot(get_request("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
}

#[tokio::test]
async fn test_malformed_json_body() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/orders")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
