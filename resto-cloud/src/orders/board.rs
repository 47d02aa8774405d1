//! Kitchen board listing
//!
//! A plain read of the tenant's orders. The board must be correct from this
//! call alone; live pushes only tell the console when to call it again.

use shared::order::KitchenOrders;
use uuid::Uuid;

use super::error::OrderResult;
use crate::db::OrderStore;

/// Active and finished orders of a tenant, newest first, optionally for one store
pub async fn kitchen_orders(
    store: &dyn OrderStore,
    tenant_id: Uuid,
    store_id: Option<Uuid>,
) -> OrderResult<KitchenOrders> {
    let mut details = store.list_order_details(tenant_id).await?;
    if let Some(store_id) = store_id {
        details.retain(|d| d.order.store_id == store_id);
    }
    Ok(KitchenOrders::from_details(details))
}
