//! Request / response types for the ordering API

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{OrderDetail, OrderStatus};

// ============================================================================
// Place Order
// ============================================================================

/// One cart line as submitted for checkout. Only id and quantity are trusted.
///
/// Ids and quantities are kept loose (string / signed) so that malformed input
/// reaches validation and is reported as a validation error instead of a body
/// rejection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceOrderItem {
    /// Menu item id
    pub id: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

/// POST /api/stores/{store_id}/orders
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub items: Vec<PlaceOrderItem>,
    /// None = takeaway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub order_id: Uuid,
}

// ============================================================================
// Checkout (payment session)
// ============================================================================

/// Cart line sent to the payment-session endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutItem {
    pub id: String,
    pub name: String,
    /// Cart price, display only. The server re-prices from the menu.
    pub price: Decimal,
    pub quantity: i64,
}

/// POST /api/checkout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
    pub store_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    pub order_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutResponse {
    /// External payment page to redirect the browser to
    pub url: String,
}

// ============================================================================
// Kitchen
// ============================================================================

/// PATCH /api/kitchen/orders/{order_id}/status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusResponse {
    pub success: bool,
    pub order_id: Uuid,
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// GET /api/kitchen/orders
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KitchenOrders {
    /// pending / cooking / served, newest first
    pub active: Vec<OrderDetail>,
    /// completed / cancelled, newest first
    pub history: Vec<OrderDetail>,
}

impl KitchenOrders {
    /// Split a newest-first list into board and history, keeping order
    pub fn from_details(details: Vec<OrderDetail>) -> Self {
        let (active, history) = details
            .into_iter()
            .partition(|d| d.order.status.is_active());
        Self { active, history }
    }
}
