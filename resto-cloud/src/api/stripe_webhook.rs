//! Stripe webhook handler
//!
//! POST /stripe/webhook: marks orders paid (raw body for signature verification)
//!
//! Stripe delivers at least once and in any order. Marking an order paid is a
//! plain assignment, so a re-delivered event leaves the order exactly as the
//! first delivery did.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use shared::kitchen::OrderChangeKind;
use uuid::Uuid;

use crate::orders::OrderError;
use crate::state::AppState;
use crate::stripe;

/// Handle incoming Stripe webhook events
///
/// Must receive raw body (not JSON) for HMAC signature verification.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    // 1. Get Stripe-Signature header
    let Some(sig_header) = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
    else {
        tracing::warn!("Missing Stripe-Signature header");
        return StatusCode::BAD_REQUEST;
    };

    // 2. Verify signature
    if let Err(e) = stripe::verify_webhook_signature(
        &body,
        sig_header,
        &state.stripe_webhook_secret,
        state.webhook_tolerance_secs,
        chrono::Utc::now().timestamp(),
    ) {
        let err = OrderError::SignatureVerification(e.to_string());
        tracing::warn!(error = %err, "Rejected webhook");
        return StatusCode::BAD_REQUEST;
    }

    // 3. Parse JSON event. Verified but unreadable: acknowledge so Stripe stops redelivering
    let event: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(%e, "Verified webhook body is not JSON, ignoring");
            return StatusCode::OK;
        }
    };

    let event_type = event["type"].as_str().unwrap_or("");
    let event_id = event["id"].as_str().unwrap_or("");
    tracing::info!(event_type = event_type, event_id = event_id, "Received Stripe webhook");

    // 4. Handle event types
    match event_type {
        "checkout.session.completed" => handle_checkout_completed(&state, &event).await,
        _ => {
            tracing::debug!(event_type = event_type, "Unhandled webhook event type");
            StatusCode::OK
        }
    }
}

/// checkout.session.completed → payment_status = paid
async fn handle_checkout_completed(state: &AppState, event: &serde_json::Value) -> StatusCode {
    let Some(obj) = event.get("data").and_then(|d| d.get("object")) else {
        return StatusCode::OK;
    };

    let Some(raw_order_id) = obj
        .get("metadata")
        .and_then(|m| m["orderId"].as_str())
        .filter(|s| !s.is_empty())
    else {
        tracing::warn!("checkout.session.completed missing metadata.orderId");
        return StatusCode::OK;
    };

    let Ok(order_id) = Uuid::parse_str(raw_order_id) else {
        tracing::warn!(order_id = raw_order_id, "checkout.session.completed has malformed orderId");
        return StatusCode::OK;
    };

    match state.store.mark_order_paid(order_id).await {
        Ok(Some(order)) => {
            tracing::info!(order_id = %order_id, tenant_id = %order.tenant_id, "Order paid");
            state.kitchen_hub.publish(OrderChangeKind::Updated, &order);
            StatusCode::OK
        }
        Ok(None) => {
            tracing::warn!(order_id = %order_id, "Paid order not found");
            StatusCode::OK
        }
        Err(e) => {
            // 500 makes Stripe retry later
            tracing::error!(order_id = %order_id, error = %e, "DB error marking order paid");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
