//! Order placement: authoritative pricing and the two-phase write
//!
//! The cart only contributes menu item ids and quantities. Every price comes
//! from the store's menu at the moment of placement and is snapshotted onto
//! the order lines, so later menu edits never change a placed order.

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::kitchen::OrderChangeKind;
use shared::models::{MenuItem, Order, OrderItem, OrderStatus, PaymentStatus};
use shared::order::{PlaceOrderItem, PlaceOrderRequest, PlaceOrderResponse};
use shared::util::now_millis;
use uuid::Uuid;

use super::error::{OrderError, OrderResult};
use crate::db::OrderStore;
use crate::live::KitchenHub;

/// Longest customer note kept on an order
const MAX_NOTES_LEN: usize = 500;

/// A request line that passed validation
#[derive(Debug)]
struct RequestedLine {
    menu_item_id: Uuid,
    quantity: i32,
    options: serde_json::Value,
}

/// Validated placement input
#[derive(Debug)]
struct Placement {
    store_id: Uuid,
    table_id: Option<Uuid>,
    customer_notes: Option<String>,
    lines: Vec<RequestedLine>,
}

fn parse_uuid(field: &str, value: &str) -> OrderResult<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| OrderError::Validation(format!("{field} is not a valid id: {value:?}")))
}

fn validate_line(index: usize, item: PlaceOrderItem) -> OrderResult<RequestedLine> {
    let menu_item_id = parse_uuid(&format!("items[{index}].id"), &item.id)?;
    if item.quantity <= 0 {
        return Err(OrderError::Validation(format!(
            "items[{index}].quantity must be positive, got {}",
            item.quantity
        )));
    }
    let quantity = i32::try_from(item.quantity).map_err(|_| {
        OrderError::Validation(format!("items[{index}].quantity is too large"))
    })?;
    Ok(RequestedLine {
        menu_item_id,
        quantity,
        options: item.options.unwrap_or_else(|| serde_json::json!({})),
    })
}

fn validate(store_id: &str, req: PlaceOrderRequest) -> OrderResult<Placement> {
    let store_id = parse_uuid("store_id", store_id)?;
    let table_id = match req.table_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(parse_uuid("table_id", raw)?),
    };
    if req.items.is_empty() {
        return Err(OrderError::Validation("No items in order".into()));
    }
    let lines = req
        .items
        .into_iter()
        .enumerate()
        .map(|(i, item)| validate_line(i, item))
        .collect::<OrderResult<Vec<_>>>()?;

    let customer_notes = req
        .customer_notes
        .map(|n| n.trim().chars().take(MAX_NOTES_LEN).collect::<String>())
        .filter(|n| !n.is_empty());

    Ok(Placement {
        store_id,
        table_id,
        customer_notes,
        lines,
    })
}

/// Price the requested lines against the menu, dropping ids the menu did not return
fn price_lines<'a>(
    lines: &'a [RequestedLine],
    menu: &'a HashMap<Uuid, MenuItem>,
) -> Vec<(&'a RequestedLine, &'a MenuItem)> {
    lines
        .iter()
        .filter_map(|line| match menu.get(&line.menu_item_id) {
            Some(item) => Some((line, item)),
            None => {
                tracing::debug!(menu_item_id = %line.menu_item_id, "Dropping unknown menu item");
                None
            }
        })
        .collect()
}

/// Place an order for `store_id`.
///
/// `customer_id` is None for guests. The header insert is the commit point:
/// if the line insert fails afterwards the header stays and
/// [`OrderError::PartialWrite`] is returned with its id.
pub async fn place_order(
    store: &dyn OrderStore,
    hub: &KitchenHub,
    store_id: &str,
    customer_id: Option<Uuid>,
    req: PlaceOrderRequest,
) -> OrderResult<PlaceOrderResponse> {
    let placement = validate(store_id, req)?;

    let ids: Vec<Uuid> = placement.lines.iter().map(|l| l.menu_item_id).collect();
    let menu: HashMap<Uuid, MenuItem> = store
        .fetch_menu_items(placement.store_id, &ids)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    let priced = price_lines(&placement.lines, &menu);
    let Some((_, first)) = priced.first() else {
        return Err(OrderError::MenuFetch {
            store_id: placement.store_id,
        });
    };
    let tenant_id = first.tenant_id.ok_or(OrderError::StoreConfig {
        store_id: placement.store_id,
    })?;

    let order_id = Uuid::new_v4();
    let items: Vec<OrderItem> = priced
        .iter()
        .map(|(line, menu_item)| OrderItem {
            id: Uuid::new_v4(),
            order_id,
            menu_item_id: menu_item.id,
            quantity: line.quantity,
            price: menu_item.price,
            options_selected: line.options.clone(),
        })
        .collect();
    let total_amount: Decimal = items.iter().map(OrderItem::line_total).sum();

    let order = Order {
        id: order_id,
        store_id: placement.store_id,
        tenant_id,
        table_id: placement.table_id,
        customer_id,
        total_amount,
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        customer_notes: placement.customer_notes,
        created_at: now_millis(),
    };

    store.insert_order(&order).await?;
    let items_result = store.insert_order_items(&items).await;

    // Header is committed either way; the kitchen should see it
    hub.publish(OrderChangeKind::Inserted, &order);

    if let Err(source) = items_result {
        return Err(OrderError::PartialWrite { order_id, source });
    }

    tracing::info!(
        order_id = %order_id,
        store_id = %order.store_id,
        tenant_id = %tenant_id,
        items = items.len(),
        dropped = placement.lines.len() - items.len(),
        total = %total_amount,
        guest = customer_id.is_none(),
        "Order placed"
    );

    Ok(PlaceOrderResponse { order_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryOrderStore;

    struct Fixture {
        store: MemoryOrderStore,
        hub: KitchenHub,
        tenant_id: Uuid,
        store_id: Uuid,
    }

    fn fixture() -> Fixture {
        let store = MemoryOrderStore::new();
        let tenant_id = Uuid::new_v4();
        let store_id = Uuid::new_v4();
        store.add_store(store_id, Some(tenant_id));
        Fixture {
            store,
            hub: KitchenHub::new(),
            tenant_id,
            store_id,
        }
    }

    fn line(id: impl ToString, quantity: i64) -> PlaceOrderItem {
        PlaceOrderItem {
            id: id.to_string(),
            quantity,
            options: None,
        }
    }

    fn request(items: Vec<PlaceOrderItem>) -> PlaceOrderRequest {
        PlaceOrderRequest {
            items,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn prices_from_menu_not_cart() {
        // cart thought A=10, B=5; menu says A=12, B=5
        let f = fixture();
        let a = f.store.add_menu_item(f.store_id, "A", Decimal::new(12, 0));
        let b = f.store.add_menu_item(f.store_id, "B", Decimal::new(5, 0));

        let resp = place_order(
            &f.store,
            &f.hub,
            &f.store_id.to_string(),
            None,
            request(vec![line(a, 2), line(b, 1)]),
        )
        .await
        .unwrap();

        let order = f.store.order(resp.order_id).unwrap();
        assert_eq!(order.total_amount, Decimal::new(29, 0));
        assert_eq!(order.tenant_id, f.tenant_id);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert!(order.customer_id.is_none());
    }

    #[tokio::test]
    async fn total_equals_sum_of_lines() {
        let f = fixture();
        let a = f.store.add_menu_item(f.store_id, "A", Decimal::new(333, 2));
        let b = f.store.add_menu_item(f.store_id, "B", Decimal::new(1, 1));
        let c = f.store.add_menu_item(f.store_id, "C", Decimal::new(1999, 2));

        let resp = place_order(
            &f.store,
            &f.hub,
            &f.store_id.to_string(),
            None,
            request(vec![line(a, 3), line(b, 7), line(c, 1)]),
        )
        .await
        .unwrap();

        let order = f.store.order(resp.order_id).unwrap();
        let items = f.store.items_of(resp.order_id);
        let sum: Decimal = items
            .iter()
            .map(|i| i.price * Decimal::from(i.quantity))
            .sum();
        assert_eq!(order.total_amount, sum);
        assert_eq!(order.total_amount, Decimal::new(3068, 2));
    }

    #[tokio::test]
    async fn menu_price_change_does_not_touch_placed_order() {
        let f = fixture();
        let a = f.store.add_menu_item(f.store_id, "A", Decimal::new(10, 0));

        let resp = place_order(
            &f.store,
            &f.hub,
            &f.store_id.to_string(),
            None,
            request(vec![line(a, 2)]),
        )
        .await
        .unwrap();

        f.store.set_price(a, Decimal::new(99, 0));

        let order = f.store.order(resp.order_id).unwrap();
        let items = f.store.items_of(resp.order_id);
        assert_eq!(order.total_amount, Decimal::new(20, 0));
        assert_eq!(items[0].price, Decimal::new(10, 0));
    }

    #[tokio::test]
    async fn unknown_items_are_dropped() {
        let f = fixture();
        let a = f.store.add_menu_item(f.store_id, "A", Decimal::new(10, 0));

        let resp = place_order(
            &f.store,
            &f.hub,
            &f.store_id.to_string(),
            None,
            request(vec![line(a, 1), line(Uuid::new_v4(), 4)]),
        )
        .await
        .unwrap();

        let items = f.store.items_of(resp.order_id);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].menu_item_id, a);
        assert_eq!(
            f.store.order(resp.order_id).unwrap().total_amount,
            Decimal::new(10, 0)
        );
    }

    #[tokio::test]
    async fn all_unknown_items_is_menu_fetch_error() {
        let f = fixture();

        let err = place_order(
            &f.store,
            &f.hub,
            &f.store_id.to_string(),
            None,
            request(vec![line(Uuid::new_v4(), 1), line(Uuid::new_v4(), 2)]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, OrderError::MenuFetch { .. }));
        assert_eq!(f.store.order_count(), 0);
    }

    #[tokio::test]
    async fn other_stores_items_do_not_resolve() {
        let f = fixture();
        let other_store = Uuid::new_v4();
        f.store.add_store(other_store, Some(Uuid::new_v4()));
        let foreign = f.store.add_menu_item(other_store, "X", Decimal::new(1, 0));

        let err = place_order(
            &f.store,
            &f.hub,
            &f.store_id.to_string(),
            None,
            request(vec![line(foreign, 1)]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, OrderError::MenuFetch { .. }));
        assert_eq!(f.store.order_count(), 0);
    }

    #[tokio::test]
    async fn store_without_tenant_is_config_error() {
        let f = fixture();
        let orphan = Uuid::new_v4();
        f.store.add_store(orphan, None);
        let a = f.store.add_menu_item(orphan, "A", Decimal::new(10, 0));

        let err = place_order(
            &f.store,
            &f.hub,
            &orphan.to_string(),
            None,
            request(vec![line(a, 1)]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, OrderError::StoreConfig { .. }));
        assert_eq!(f.store.order_count(), 0);
    }

    #[tokio::test]
    async fn validation_rejects_before_any_read() {
        let f = fixture();
        let a = f.store.add_menu_item(f.store_id, "A", Decimal::new(10, 0));
        f.store.fail_everything(true);
        let store_id = f.store_id.to_string();

        let cases = vec![
            ("not-a-uuid".to_string(), request(vec![line(a, 1)])),
            (store_id.clone(), request(vec![])),
            (store_id.clone(), request(vec![line(a, 0)])),
            (store_id.clone(), request(vec![line(a, -2)])),
            (store_id.clone(), request(vec![line("bogus", 1)])),
            (store_id.clone(), request(vec![line(a, i64::MAX)])),
            (
                store_id.clone(),
                PlaceOrderRequest {
                    items: vec![line(a, 1)],
                    table_id: Some("table-7".into()),
                    customer_notes: None,
                },
            ),
        ];

        for (sid, req) in cases {
            let err = place_order(&f.store, &f.hub, &sid, None, req)
                .await
                .unwrap_err();
            assert!(matches!(err, OrderError::Validation(_)), "{err:?}");
        }
    }

    #[tokio::test]
    async fn item_insert_failure_keeps_header() {
        let f = fixture();
        let a = f.store.add_menu_item(f.store_id, "A", Decimal::new(10, 0));
        f.store.fail_item_insert(true);

        let err = place_order(
            &f.store,
            &f.hub,
            &f.store_id.to_string(),
            None,
            request(vec![line(a, 1)]),
        )
        .await
        .unwrap_err();

        let OrderError::PartialWrite { order_id, .. } = err else {
            panic!("expected PartialWrite, got {err:?}");
        };
        let order = f.store.order(order_id).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(f.store.items_of(order_id).is_empty());
    }

    #[tokio::test]
    async fn records_table_customer_notes_and_options() {
        let f = fixture();
        let a = f.store.add_menu_item(f.store_id, "A", Decimal::new(10, 0));
        let table = Uuid::new_v4();
        let customer = Uuid::new_v4();

        let resp = place_order(
            &f.store,
            &f.hub,
            &f.store_id.to_string(),
            Some(customer),
            PlaceOrderRequest {
                items: vec![PlaceOrderItem {
                    id: a.to_string(),
                    quantity: 1,
                    options: Some(serde_json::json!({"spice": "hot"})),
                }],
                table_id: Some(table.to_string()),
                customer_notes: Some("  no onions  ".into()),
            },
        )
        .await
        .unwrap();

        let order = f.store.order(resp.order_id).unwrap();
        assert_eq!(order.table_id, Some(table));
        assert_eq!(order.customer_id, Some(customer));
        assert_eq!(order.customer_notes.as_deref(), Some("no onions"));
        let items = f.store.items_of(resp.order_id);
        assert_eq!(items[0].options_selected, serde_json::json!({"spice": "hot"}));
    }

    #[tokio::test]
    async fn empty_table_id_means_takeaway() {
        let f = fixture();
        let a = f.store.add_menu_item(f.store_id, "A", Decimal::new(10, 0));

        let resp = place_order(
            &f.store,
            &f.hub,
            &f.store_id.to_string(),
            None,
            PlaceOrderRequest {
                items: vec![line(a, 1)],
                table_id: Some(String::new()),
                customer_notes: Some("   ".into()),
            },
        )
        .await
        .unwrap();

        let order = f.store.order(resp.order_id).unwrap();
        assert!(order.table_id.is_none());
        assert!(order.customer_notes.is_none());
    }

    #[tokio::test]
    async fn each_order_gets_a_fresh_id() {
        let f = fixture();
        let a = f.store.add_menu_item(f.store_id, "A", Decimal::new(10, 0));

        let first = place_order(
            &f.store,
            &f.hub,
            &f.store_id.to_string(),
            None,
            request(vec![line(a, 1)]),
        )
        .await
        .unwrap();
        let second = place_order(
            &f.store,
            &f.hub,
            &f.store_id.to_string(),
            None,
            request(vec![line(a, 1)]),
        )
        .await
        .unwrap();

        assert_ne!(first.order_id, second.order_id);
        assert_eq!(f.store.order_count(), 2);
    }

    #[tokio::test]
    async fn publishes_new_order_to_kitchen() {
        let f = fixture();
        let a = f.store.add_menu_item(f.store_id, "A", Decimal::new(10, 0));
        let mut rx = f.hub.subscribe(f.tenant_id);

        let resp = place_order(
            &f.store,
            &f.hub,
            &f.store_id.to_string(),
            None,
            request(vec![line(a, 1)]),
        )
        .await
        .unwrap();

        let change = rx.recv().await.unwrap();
        assert_eq!(change.kind, OrderChangeKind::Inserted);
        assert_eq!(change.order.id, resp.order_id);
    }
}
