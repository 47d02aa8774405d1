//! Kitchen status state machine
//!
//! Legal moves live on [`OrderStatus::allowed_next`]. The write is a
//! compare-and-set on the status the order was read with, so two staff
//! members racing on the same order cannot both win.

use shared::kitchen::OrderChangeKind;
use shared::models::OrderStatus;
use shared::order::UpdateOrderStatusResponse;
use uuid::Uuid;

use super::error::{OrderError, OrderResult};
use crate::db::OrderStore;
use crate::live::KitchenHub;

/// Move an order of `tenant_id` to `to`.
///
/// Orders of other tenants are reported as not found.
pub async fn transition(
    store: &dyn OrderStore,
    hub: &KitchenHub,
    tenant_id: Uuid,
    order_id: Uuid,
    to: OrderStatus,
) -> OrderResult<UpdateOrderStatusResponse> {
    let order = store
        .find_order(order_id)
        .await?
        .filter(|o| o.tenant_id == tenant_id)
        .ok_or(OrderError::OrderNotFound(order_id))?;

    let from = order.status;
    if !from.can_transition_to(to) {
        return Err(OrderError::InvalidTransition { from, to });
    }

    if !store.update_order_status(order_id, from, to).await? {
        // Someone else moved it between our read and write
        let current = store
            .find_order(order_id)
            .await?
            .map(|o| o.status)
            .unwrap_or(from);
        tracing::warn!(order_id = %order_id, expected = %from, current = %current, "Status changed concurrently");
        return Err(OrderError::InvalidTransition { from: current, to });
    }

    let mut updated = order;
    updated.status = to;
    hub.publish(OrderChangeKind::Updated, &updated);

    tracing::info!(order_id = %order_id, tenant_id = %tenant_id, from = %from, to = %to, "Order status changed");

    Ok(UpdateOrderStatusResponse {
        success: true,
        order_id,
        from,
        to,
    })
}
