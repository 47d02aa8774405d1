//! API routes for resto-cloud

pub mod checkout;
mod extract;
pub mod health;
pub mod kitchen;
pub mod kitchen_ws;
pub mod orders;
pub mod stripe_webhook;

use crate::auth::staff_auth_middleware;
use crate::state::AppState;
use axum::Json;
use axum::routing::{get, patch, post};
use axum::{Router, middleware};
use shared::error::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Storefront (guests allowed, optional customer bearer)
    let storefront = Router::new()
        .route("/api/stores/{store_id}/orders", post(orders::place_order))
        .route("/api/checkout", post(checkout::create_checkout));

    // Kitchen (staff JWT)
    let kitchen = Router::new()
        .route("/api/kitchen/orders", get(kitchen::list_orders))
        .route(
            "/api/kitchen/orders/{order_id}/status",
            patch(kitchen::update_status),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            staff_auth_middleware,
        ));

    // Kitchen live feed (JWT in query)
    let live = Router::new().route("/api/kitchen/live/ws", get(kitchen_ws::handle_kitchen_ws));

    // Stripe webhook (signature-verified, raw body)
    let webhook = Router::new().route("/stripe/webhook", post(stripe_webhook::handle_webhook));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(storefront)
        .merge(kitchen)
        .merge(live)
        .merge(webhook)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
