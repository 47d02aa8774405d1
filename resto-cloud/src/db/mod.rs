//! Database access layer
//!
//! The ordering flows talk to storage through [`OrderStore`] so they can run
//! against PostgreSQL in production and an in-memory store in tests.

#[cfg(test)]
pub mod memory;
pub mod orders;

pub use orders::PgOrderStore;

use async_trait::async_trait;
use shared::models::{MenuItem, Order, OrderDetail, OrderItem, OrderStatus};
use thiserror::Error;
use uuid::Uuid;

/// Storage error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence needed by order placement, the kitchen and the payment webhook
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Menu items of `store_id` whose id is in `ids`, with the store's tenant.
    /// Ids belonging to other stores are silently absent from the result.
    async fn fetch_menu_items(&self, store_id: Uuid, ids: &[Uuid]) -> StoreResult<Vec<MenuItem>>;

    async fn insert_order(&self, order: &Order) -> StoreResult<()>;

    async fn insert_order_items(&self, items: &[OrderItem]) -> StoreResult<()>;

    async fn find_order(&self, order_id: Uuid) -> StoreResult<Option<Order>>;

    /// Compare-and-set the kitchen status. Returns false when the order is
    /// missing or its status is no longer `from`.
    async fn update_order_status(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<bool>;

    /// Set payment_status = paid. Returns the updated order, or None if the
    /// order does not exist. Already-paid orders are returned unchanged.
    async fn mark_order_paid(&self, order_id: Uuid) -> StoreResult<Option<Order>>;

    /// All orders of a tenant with their lines, newest first
    async fn list_order_details(&self, tenant_id: Uuid) -> StoreResult<Vec<OrderDetail>>;
}
