//! In-memory [`OrderStore`] for tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use shared::models::{
    MenuItem, Order, OrderDetail, OrderItem, OrderLine, OrderStatus, PaymentStatus,
};
use uuid::Uuid;

use super::{OrderStore, StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    /// store_id -> tenant_id (None = misconfigured store)
    stores: HashMap<Uuid, Option<Uuid>>,
    tables: HashMap<Uuid, String>,
    menu: HashMap<Uuid, MenuItem>,
    orders: HashMap<Uuid, Order>,
    items: Vec<OrderItem>,
}

#[derive(Default)]
pub struct MemoryOrderStore {
    inner: Mutex<Inner>,
    fail_item_insert: AtomicBool,
    fail_everything: AtomicBool,
    /// Status another writer sets just before the next status update
    concurrent_status: Mutex<Option<OrderStatus>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_store(&self, store_id: Uuid, tenant_id: Option<Uuid>) {
        self.inner.lock().stores.insert(store_id, tenant_id);
    }

    pub fn add_table(&self, table_id: Uuid, name: &str) {
        self.inner.lock().tables.insert(table_id, name.to_string());
    }

    /// Add an available menu item and return its id
    pub fn add_menu_item(&self, store_id: Uuid, name: &str, price: Decimal) -> Uuid {
        let id = Uuid::new_v4();
        let mut inner = self.inner.lock();
        let tenant_id = inner.stores.get(&store_id).copied().flatten();
        inner.menu.insert(
            id,
            MenuItem {
                id,
                store_id,
                tenant_id,
                name: name.to_string(),
                price,
                is_available: true,
            },
        );
        id
    }

    pub fn set_price(&self, menu_item_id: Uuid, price: Decimal) {
        if let Some(item) = self.inner.lock().menu.get_mut(&menu_item_id) {
            item.price = price;
        }
    }

    pub fn insert_raw_order(&self, order: Order) {
        self.inner.lock().orders.insert(order.id, order);
    }

    pub fn fail_item_insert(&self, fail: bool) {
        self.fail_item_insert.store(fail, Ordering::SeqCst);
    }

    pub fn fail_everything(&self, fail: bool) {
        self.fail_everything.store(fail, Ordering::SeqCst);
    }

    /// Make the next `update_order_status` find the order already moved to
    /// `status` by someone else
    pub fn move_before_next_update(&self, status: OrderStatus) {
        *self.concurrent_status.lock() = Some(status);
    }

    pub fn order(&self, order_id: Uuid) -> Option<Order> {
        self.inner.lock().orders.get(&order_id).cloned()
    }

    pub fn order_count(&self) -> usize {
        self.inner.lock().orders.len()
    }

    pub fn items_of(&self, order_id: Uuid) -> Vec<OrderItem> {
        self.inner
            .lock()
            .items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect()
    }

    fn check(&self) -> StoreResult<()> {
        if self.fail_everything.load(Ordering::SeqCst) {
            return Err(StoreError::Database("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn fetch_menu_items(&self, store_id: Uuid, ids: &[Uuid]) -> StoreResult<Vec<MenuItem>> {
        self.check()?;
        let inner = self.inner.lock();
        let mut seen = Vec::new();
        let mut found = Vec::new();
        for id in ids {
            if seen.contains(id) {
                continue;
            }
            seen.push(*id);
            if let Some(item) = inner.menu.get(id).filter(|m| m.store_id == store_id) {
                found.push(item.clone());
            }
        }
        Ok(found)
    }

    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        self.check()?;
        let mut inner = self.inner.lock();
        if inner.orders.contains_key(&order.id) {
            return Err(StoreError::Database(format!("duplicate order id {}", order.id)));
        }
        inner.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn insert_order_items(&self, items: &[OrderItem]) -> StoreResult<()> {
        self.check()?;
        if self.fail_item_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Database("order_items insert failed".into()));
        }
        self.inner.lock().items.extend_from_slice(items);
        Ok(())
    }

    async fn find_order(&self, order_id: Uuid) -> StoreResult<Option<Order>> {
        self.check()?;
        Ok(self.order(order_id))
    }

    async fn update_order_status(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<bool> {
        self.check()?;
        let concurrent = self.concurrent_status.lock().take();
        let mut inner = self.inner.lock();
        if let (Some(status), Some(order)) = (concurrent, inner.orders.get_mut(&order_id)) {
            order.status = status;
        }
        match inner.orders.get_mut(&order_id) {
            Some(order) if order.status == from => {
                order.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_order_paid(&self, order_id: Uuid) -> StoreResult<Option<Order>> {
        self.check()?;
        let mut inner = self.inner.lock();
        Ok(inner.orders.get_mut(&order_id).map(|order| {
            order.payment_status = PaymentStatus::Paid;
            order.clone()
        }))
    }

    async fn list_order_details(&self, tenant_id: Uuid) -> StoreResult<Vec<OrderDetail>> {
        self.check()?;
        let inner = self.inner.lock();
        let mut orders: Vec<&Order> = inner
            .orders
            .values()
            .filter(|o| o.tenant_id == tenant_id)
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(orders
            .into_iter()
            .map(|order| OrderDetail {
                order: order.clone(),
                table_name: order.table_id.and_then(|t| inner.tables.get(&t).cloned()),
                items: inner
                    .items
                    .iter()
                    .filter(|i| i.order_id == order.id)
                    .map(|i| OrderLine {
                        id: i.id,
                        menu_item_id: i.menu_item_id,
                        name: inner.menu.get(&i.menu_item_id).map(|m| m.name.clone()),
                        quantity: i.quantity,
                        price: i.price,
                        options_selected: i.options_selected.clone(),
                    })
                    .collect(),
            })
            .collect())
    }
}
