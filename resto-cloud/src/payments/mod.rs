//! Payment session bridge
//!
//! Turns a placed order's cart into an external checkout session and hands
//! back the redirect URL. Nothing local changes here; the order only becomes
//! paid when the provider's webhook arrives.
//!
//! Line prices are taken from the store's menu, never from the request, so a
//! tampered cart cannot lower what the customer is charged.

use std::collections::HashMap;

use async_trait::async_trait;
use shared::models::MenuItem;
use shared::order::{CheckoutRequest, CheckoutResponse};
use shared::util::to_minor_units;
use thiserror::Error;
use uuid::Uuid;

use crate::db::OrderStore;
use crate::orders::{OrderError, OrderResult};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment provider unreachable: {0}")]
    Unreachable(String),

    #[error("Payment provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// One line of a checkout session, amounts in minor units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentLine {
    pub name: String,
    pub unit_amount: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub order_id: Uuid,
    pub store_id: Uuid,
    pub table_id: Option<Uuid>,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub lines: Vec<PaymentLine>,
}

/// External payment provider
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a hosted checkout session and return its redirect URL
    async fn create_checkout_session(
        &self,
        session: &CheckoutSession,
    ) -> Result<String, PaymentError>;
}

/// Where the provider sends the browser back to, and in which currency to charge
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub currency: String,
    pub public_base_url: String,
}

impl PaymentSettings {
    pub fn success_url(&self, store_id: Uuid) -> String {
        format!(
            "{}/store/{store_id}/success?session_id={{CHECKOUT_SESSION_ID}}",
            self.public_base_url
        )
    }

    pub fn cancel_url(&self, store_id: Uuid) -> String {
        format!("{}/store/{store_id}?canceled=true", self.public_base_url)
    }
}

fn parse_uuid(field: &str, value: &str) -> OrderResult<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| OrderError::Validation(format!("{field} is not a valid id: {value:?}")))
}

/// Create a payment session for an already placed order
pub async fn create_payment_session(
    store: &dyn OrderStore,
    provider: &dyn PaymentProvider,
    settings: &PaymentSettings,
    req: CheckoutRequest,
) -> OrderResult<CheckoutResponse> {
    if req.items.is_empty() {
        return Err(OrderError::Validation("No items in cart".into()));
    }
    let store_id = parse_uuid("store_id", &req.store_id)?;
    let order_id = parse_uuid("order_id", &req.order_id)?;
    let table_id = match req.table_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(parse_uuid("table_id", raw)?),
    };

    let order = store
        .find_order(order_id)
        .await?
        .filter(|o| o.store_id == store_id)
        .ok_or(OrderError::OrderNotFound(order_id))?;

    let mut requested: Vec<(Uuid, i64)> = Vec::with_capacity(req.items.len());
    for item in &req.items {
        // Unparseable ids are treated like stale ones and dropped below
        if let (Ok(id), true) = (Uuid::parse_str(item.id.trim()), item.quantity > 0) {
            requested.push((id, item.quantity));
        }
    }

    let ids: Vec<Uuid> = requested.iter().map(|(id, _)| *id).collect();
    let menu: HashMap<Uuid, MenuItem> = store
        .fetch_menu_items(store_id, &ids)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    let mut lines = Vec::with_capacity(requested.len());
    for (id, quantity) in requested {
        let Some(item) = menu.get(&id) else {
            continue;
        };
        let unit_amount = to_minor_units(item.price).ok_or_else(|| OrderError::PaymentSession {
            order_id,
            reason: format!("menu item {id} has an unpayable price {}", item.price),
        })?;
        lines.push(PaymentLine {
            name: item.name.clone(),
            unit_amount,
            quantity,
        });
    }

    if lines.is_empty() {
        return Err(OrderError::PaymentSession {
            order_id,
            reason: "no payable items".into(),
        });
    }

    let session = CheckoutSession {
        order_id: order.id,
        store_id,
        table_id,
        currency: settings.currency.clone(),
        success_url: settings.success_url(store_id),
        cancel_url: settings.cancel_url(store_id),
        lines,
    };

    let url = provider
        .create_checkout_session(&session)
        .await
        .map_err(|e| OrderError::PaymentSession {
            order_id,
            reason: e.to_string(),
        })?;

    tracing::info!(order_id = %order_id, store_id = %store_id, lines = session.lines.len(), "Payment session created");
    Ok(CheckoutResponse { url })
}
