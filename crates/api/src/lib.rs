//! HTTP server for the cafe manager.
//!
//! Serves the JSON API under `/api`, the server-rendered pages at the
//! site root, plus health and Prometheus metrics endpoints, with
//! structured logging (tracing) throughout.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use store::OrderStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: OrderStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        // JSON API
        .route(
            "/api/orders",
            get(routes::orders::list::<S>).post(routes::orders::create::<S>),
        )
        .route(
            "/api/orders/{id}",
            get(routes::orders::get::<S>)
                .put(routes::orders::replace::<S>)
                .patch(routes::orders::patch::<S>)
                .delete(routes::orders::delete::<S>),
        )
        .route("/api/revenue", get(routes::orders::revenue::<S>))
        // Web pages
        .route("/", get(routes::pages::index))
        .route("/orders", get(routes::pages::order_list::<S>))
        .route(
            "/orders/new",
            get(routes::pages::new_order_form).post(routes::pages::create_order::<S>),
        )
        .route(
            "/orders/{id}/edit",
            get(routes::pages::edit_order_form::<S>).post(routes::pages::update_order::<S>),
        )
        .route("/orders/{id}/delete", post(routes::pages::delete_order::<S>))
        .route("/revenue", get(routes::pages::revenue::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
