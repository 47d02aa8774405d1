//! Ordering domain errors
//!
//! Every operation boundary (placement, status change, payment session,
//! webhook) returns one of these; the API layer converts them to `AppError`.

use shared::error::{AppError, ErrorCode};
use shared::models::OrderStatus;
use thiserror::Error;
use uuid::Uuid;

use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum OrderError {
    /// Malformed ids, non-positive quantity, empty item list. Nothing written.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// None of the requested items exist in the store's menu. Nothing written.
    #[error("No orderable menu items for store {store_id}")]
    MenuFetch { store_id: Uuid },

    /// The store has no owning tenant. Nothing written.
    #[error("Store {store_id} has no tenant configured")]
    StoreConfig { store_id: Uuid },

    /// Header written, lines failed. The header is kept.
    #[error("Order {order_id} created but its items were not saved: {source}")]
    PartialWrite {
        order_id: Uuid,
        #[source]
        source: StoreError,
    },

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),

    #[error("Webhook signature verification failed: {0}")]
    SignatureVerification(String),

    /// Payment provider refused or was unreachable. The order stays payable.
    #[error("Payment session for order {order_id} failed: {reason}")]
    PaymentSession { order_id: Uuid, reason: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Validation(msg) => AppError::validation(msg),
            OrderError::MenuFetch { store_id } => AppError::with_message(
                ErrorCode::OrderEmpty,
                "None of the selected items are available",
            )
            .with_detail("store_id", store_id.to_string()),
            OrderError::StoreConfig { store_id } => {
                tracing::error!(store_id = %store_id, "Store has no tenant configured");
                AppError::with_message(ErrorCode::TenantNotFound, "Store is not configured")
                    .with_detail("store_id", store_id.to_string())
            }
            OrderError::PartialWrite { order_id, source } => {
                tracing::error!(order_id = %order_id, error = %source, "Order items not saved");
                AppError::with_message(
                    ErrorCode::OrderItemsNotSaved,
                    "Your order was received but some details could not be saved. Please tell a member of staff.",
                )
                .with_detail("order_id", order_id.to_string())
            }
            OrderError::InvalidTransition { from, to } => AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                format!("Cannot move order from {from} to {to}"),
            )
            .with_detail("from", from.as_db())
            .with_detail("to", to.as_db()),
            OrderError::OrderNotFound(id) => {
                AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", id.to_string())
            }
            OrderError::SignatureVerification(reason) => {
                AppError::with_message(ErrorCode::WebhookSignatureInvalid, reason)
            }
            OrderError::PaymentSession { order_id, reason } => {
                tracing::warn!(order_id = %order_id, reason = %reason, "Payment session failed");
                AppError::with_message(
                    ErrorCode::PaymentSessionFailed,
                    "Your order was received but payment could not be started. Please try again.",
                )
                .with_detail("order_id", order_id.to_string())
            }
            OrderError::Storage(e) => {
                tracing::error!(error = %e, "Order storage error");
                AppError::database("Database operation failed")
            }
        }
    }
}

impl axum::response::IntoResponse for OrderError {
    fn into_response(self) -> axum::response::Response {
        AppError::from(self).into_response()
    }
}
