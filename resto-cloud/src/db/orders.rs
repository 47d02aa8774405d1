//! Order persistence (PostgreSQL)
//!
//! All kitchen-facing queries filter by tenant_id.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{
    MenuItem, Order, OrderDetail, OrderItem, OrderLine, OrderStatus, PaymentStatus,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{OrderStore, StoreError, StoreResult};

const ORDER_COLUMNS: &str = "id, store_id, tenant_id, table_id, customer_id, total_amount, \
     status, payment_status, customer_notes, created_at";

#[derive(sqlx::FromRow)]
struct MenuItemRow {
    id: Uuid,
    store_id: Uuid,
    tenant_id: Option<Uuid>,
    name: String,
    price: Decimal,
    is_available: bool,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        MenuItem {
            id: row.id,
            store_id: row.store_id,
            tenant_id: row.tenant_id,
            name: row.name,
            price: row.price,
            is_available: row.is_available,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    store_id: Uuid,
    tenant_id: Uuid,
    table_id: Option<Uuid>,
    customer_id: Option<Uuid>,
    total_amount: Decimal,
    status: String,
    payment_status: String,
    customer_notes: Option<String>,
    created_at: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::from_db(&row.status).ok_or_else(|| {
            StoreError::Corrupt(format!("order {} has status '{}'", row.id, row.status))
        })?;
        let payment_status = PaymentStatus::from_db(&row.payment_status).ok_or_else(|| {
            StoreError::Corrupt(format!(
                "order {} has payment_status '{}'",
                row.id, row.payment_status
            ))
        })?;
        Ok(Order {
            id: row.id,
            store_id: row.store_id,
            tenant_id: row.tenant_id,
            table_id: row.table_id,
            customer_id: row.customer_id,
            total_amount: row.total_amount,
            status,
            payment_status,
            customer_notes: row.customer_notes,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderDetailRow {
    #[sqlx(flatten)]
    order: OrderRow,
    table_name: Option<String>,
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    id: Uuid,
    order_id: Uuid,
    menu_item_id: Uuid,
    name: Option<String>,
    quantity: i32,
    price: Decimal,
    options_selected: serde_json::Value,
}

/// PostgreSQL-backed [`OrderStore`]
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn fetch_menu_items(&self, store_id: Uuid, ids: &[Uuid]) -> StoreResult<Vec<MenuItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<MenuItemRow> = sqlx::query_as(
            "SELECT m.id, m.store_id, s.tenant_id, m.name, m.price, m.is_available
             FROM menu_items m
             JOIN stores s ON s.id = m.store_id
             WHERE m.store_id = $1 AND m.id = ANY($2)",
        )
        .bind(store_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MenuItem::from).collect())
    }

    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO orders (id, store_id, tenant_id, table_id, customer_id, total_amount,
                                 status, payment_status, customer_notes, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(order.id)
        .bind(order.store_id)
        .bind(order.tenant_id)
        .bind(order.table_id)
        .bind(order.customer_id)
        .bind(order.total_amount)
        .bind(order.status.as_db())
        .bind(order.payment_status.as_db())
        .bind(&order.customer_notes)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_order_items(&self, items: &[OrderItem]) -> StoreResult<()> {
        if items.is_empty() {
            return Ok(());
        }
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO order_items (id, order_id, menu_item_id, quantity, price, options_selected) ",
        );
        qb.push_values(items, |mut b, item| {
            b.push_bind(item.id)
                .push_bind(item.order_id)
                .push_bind(item.menu_item_id)
                .push_bind(item.quantity)
                .push_bind(item.price)
                .push_bind(&item.options_selected);
        });
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn find_order(&self, order_id: Uuid) -> StoreResult<Option<Order>> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Order::try_from).transpose()
    }

    async fn update_order_status(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2 AND status = $3")
            .bind(to.as_db())
            .bind(order_id)
            .bind(from.as_db())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_order_paid(&self, order_id: Uuid) -> StoreResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE orders SET payment_status = 'paid' WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Order::try_from).transpose()
    }

    async fn list_order_details(&self, tenant_id: Uuid) -> StoreResult<Vec<OrderDetail>> {
        let headers: Vec<OrderDetailRow> = sqlx::query_as(
            "SELECT o.id, o.store_id, o.tenant_id, o.table_id, o.customer_id, o.total_amount,
                    o.status, o.payment_status, o.customer_notes, o.created_at,
                    t.name AS table_name
             FROM orders o
             LEFT JOIN tables t ON t.id = o.table_id
             WHERE o.tenant_id = $1
             ORDER BY o.created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = headers.iter().map(|h| h.order.id).collect();
        let lines: Vec<OrderLineRow> = sqlx::query_as(
            "SELECT i.id, i.order_id, i.menu_item_id, m.name, i.quantity, i.price, i.options_selected
             FROM order_items i
             LEFT JOIN menu_items m ON m.id = i.menu_item_id
             WHERE i.order_id = ANY($1)
             ORDER BY i.id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for line in lines {
            by_order.entry(line.order_id).or_default().push(OrderLine {
                id: line.id,
                menu_item_id: line.menu_item_id,
                name: line.name,
                quantity: line.quantity,
                price: line.price,
                options_selected: line.options_selected,
            });
        }

        headers
            .into_iter()
            .map(|h| {
                let items = by_order.remove(&h.order.id).unwrap_or_default();
                Ok(OrderDetail {
                    order: Order::try_from(h.order)?,
                    table_name: h.table_name,
                    items,
                })
            })
            .collect()
    }
}
