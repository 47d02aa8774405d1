//! Kitchen WebSocket protocol
//!
//! Cloud → Kitchen: KitchenMessage (push)
//! Kitchen → Cloud: KitchenCommand (store filter)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Order;

/// Kind of change observed on an order row
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderChangeKind {
    /// A new order was placed
    Inserted,
    /// Status or payment status changed
    Updated,
}

impl OrderChangeKind {
    /// Advisory toast text shown on the kitchen console
    pub const fn toast(&self) -> &'static str {
        match self {
            OrderChangeKind::Inserted => "New order received!",
            OrderChangeKind::Updated => "Order updated",
        }
    }
}

/// Cloud → Kitchen push message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum KitchenMessage {
    /// Subscription is live
    Ready { tenant_id: Uuid },

    /// An order changed; the console should refresh its board
    OrderChanged {
        kind: OrderChangeKind,
        order: Box<Order>,
        toast: String,
    },

    /// Events were dropped for this subscriber; do a full reload
    Resync,
}

impl KitchenMessage {
    pub fn order_changed(kind: OrderChangeKind, order: Order) -> Self {
        KitchenMessage::OrderChanged {
            kind,
            order: Box::new(order),
            toast: kind.toast().to_string(),
        }
    }
}

/// Kitchen → Cloud command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum KitchenCommand {
    /// Only receive changes for these stores (empty = every store of the tenant)
    Subscribe { store_ids: Vec<Uuid> },
}
