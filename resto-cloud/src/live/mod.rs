//! KitchenHub: realtime order change fan-out
//!
//! Order writers (placement, status change, payment webhook) publish every
//! committed insert/update here; kitchen WebSocket sessions subscribe per
//! tenant and forward the changes to their consoles.
//!
//! ```text
//! placement / status / webhook
//!       │ OrderChange
//!       ▼
//! KitchenHub
//!   └── tenants: tenant_id → broadcast::Sender<OrderChange>
//!         │
//!         ▼
//!   Kitchen WS session (subscribe → store filter → push)
//! ```
//!
//! Delivery is at-most-once: a change with no subscriber is dropped, and a
//! subscriber that falls behind is told to reload instead of replaying.

use dashmap::DashMap;
use shared::kitchen::OrderChangeKind;
use shared::models::Order;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;
use uuid::Uuid;

/// A committed change to an order row
#[derive(Debug, Clone)]
pub struct OrderChange {
    pub kind: OrderChangeKind,
    pub order: Box<Order>,
}

/// Enough to absorb a burst of orders while a console is busy
const BROADCAST_CAPACITY: usize = 256;

/// Per-tenant broadcast hub
#[derive(Clone, Default)]
pub struct KitchenHub {
    tenants: Arc<DashMap<Uuid, broadcast::Sender<OrderChange>>>,
    /// Open kitchen WS connections per tenant
    connections: Arc<DashMap<Uuid, AtomicUsize>>,
}

/// One counted kitchen connection; frees its slot on drop
pub struct ConnectionSlot {
    connections: Arc<DashMap<Uuid, AtomicUsize>>,
    tenant_id: Uuid,
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        if let Some(counter) = self.connections.get(&self.tenant_id) {
            counter.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl KitchenHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a change to the order's tenant. Never fails.
    pub fn publish(&self, kind: OrderChangeKind, order: &Order) {
        let Some(tx) = self.tenants.get(&order.tenant_id) else {
            tracing::trace!(order_id = %order.id, "No kitchen subscribers, change dropped");
            return;
        };
        // Err only means nobody is listening right now
        let _ = tx.send(OrderChange {
            kind,
            order: Box::new(order.clone()),
        });
    }

    pub fn subscribe(&self, tenant_id: Uuid) -> broadcast::Receiver<OrderChange> {
        self.tenants
            .entry(tenant_id)
            .or_insert_with(|| broadcast::channel(BROADCAST_CAPACITY).0)
            .subscribe()
    }

    /// Drop the tenant's channel once its last subscriber is gone
    pub fn release(&self, tenant_id: Uuid) {
        self.tenants
            .remove_if(&tenant_id, |_, tx| tx.receiver_count() == 0);
    }

    /// Reserve a connection slot for the tenant, or return the number of
    /// open connections when `max` is already reached.
    pub fn try_connect(&self, tenant_id: Uuid, max: usize) -> Result<ConnectionSlot, usize> {
        let counter = self
            .connections
            .entry(tenant_id)
            .or_insert_with(|| AtomicUsize::new(0));
        let prev = counter.fetch_add(1, Ordering::SeqCst);
        if prev >= max {
            counter.fetch_sub(1, Ordering::SeqCst);
            return Err(prev);
        }
        drop(counter);

        Ok(ConnectionSlot {
            connections: self.connections.clone(),
            tenant_id,
        })
    }

    #[cfg(test)]
    pub fn subscriber_count(&self, tenant_id: Uuid) -> usize {
        self.tenants
            .get(&tenant_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}
