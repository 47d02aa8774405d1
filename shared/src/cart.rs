//! Client-side shopping cart
//!
//! The cart is a disposable selection of menu items for one store, kept on the
//! customer's device between page loads. Its prices are for display only; the
//! server re-prices every line at checkout, so only ids and quantities ever
//! leave the device meaningfully.
//!
//! Persistence is best-effort: a missing, unreadable or corrupt saved cart
//! loads as an empty cart, and failed saves are logged and otherwise ignored.

use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

use crate::order::{CheckoutItem, CheckoutRequest, PlaceOrderItem, PlaceOrderRequest};

/// Storage key for the persisted cart
pub const CART_STORAGE_KEY: &str = "resto-cart";

/// One cart line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Menu item id
    pub id: Uuid,
    pub name: String,
    /// Advisory unit price
    pub price: Decimal,
    /// Always >= 1
    pub quantity: u32,
    pub store_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

/// A menu item being added to the cart (quantity is managed by the cart)
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub store_id: Uuid,
    pub options: Option<serde_json::Value>,
}

impl From<NewCartItem> for CartItem {
    fn from(item: NewCartItem) -> Self {
        CartItem {
            id: item.id,
            name: item.name,
            price: item.price,
            quantity: 1,
            store_id: item.store_id,
            options: item.options,
        }
    }
}

/// Key/value persistence for the cart (browser local storage, a file, ...)
pub trait CartStorage {
    fn load(&self, key: &str) -> std::io::Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> std::io::Result<()>;
}

/// In-memory storage, lost on restart
#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCartStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for MemoryCartStorage {
    fn load(&self, key: &str) -> std::io::Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> std::io::Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key under a directory
#[derive(Debug, Clone)]
pub struct FileCartStorage {
    dir: PathBuf,
}

impl FileCartStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CartStorage for FileCartStorage {
    fn load(&self, key: &str) -> std::io::Result<Option<String>> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, key: &str, value: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        // write-then-rename so a crash never leaves a half-written cart
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, value)?;
        std::fs::rename(tmp, self.path(key))
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedCart {
    items: Vec<CartItem>,
}

/// Shopping cart for a single store
pub struct Cart<S: CartStorage> {
    items: Vec<CartItem>,
    storage: S,
}

impl<S: CartStorage> Cart<S> {
    /// Restore the cart saved in `storage`, or start empty
    pub fn load(storage: S) -> Self {
        let items = match storage.load(CART_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<PersistedCart>(&raw) {
                Ok(saved) => sanitize(saved.items),
                Err(e) => {
                    tracing::warn!(error = %e, "Saved cart is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read saved cart, starting empty");
                Vec::new()
            }
        };
        Self { items, storage }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Store every line belongs to, if any
    pub fn store_id(&self) -> Option<Uuid> {
        self.items.first().map(|i| i.store_id)
    }

    pub fn quantity_of(&self, id: Uuid) -> u32 {
        self.items
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.quantity)
            .unwrap_or(0)
    }

    /// Add one unit of a menu item, merging with an existing line.
    ///
    /// Adding an item from a different store starts a new cart for that store.
    pub fn add_item(&mut self, item: NewCartItem) {
        if let Some(current) = self.store_id()
            && current != item.store_id
        {
            tracing::debug!(from = %current, to = %item.store_id, "Cart switched store, clearing");
            self.items.clear();
        }

        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(1),
            None => self.items.push(item.into()),
        }
        self.persist();
    }

    /// Remove the whole line regardless of quantity
    pub fn remove_item(&mut self, id: Uuid) {
        self.items.retain(|i| i.id != id);
        self.persist();
    }

    /// Set a line's quantity; zero or less removes the line
    pub fn update_quantity(&mut self, id: Uuid, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(line) = self.items.iter_mut().find(|i| i.id == id) {
            line.quantity = quantity;
        }
        self.persist();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    /// Sum of quantities
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Display total from cart prices (not what will be charged)
    pub fn total_price(&self) -> Decimal {
        self.items
            .iter()
            .map(|i| i.price * Decimal::from(i.quantity))
            .sum()
    }

    /// Build the order placement payload (ids and quantities only)
    pub fn to_order_request(
        &self,
        table_id: Option<Uuid>,
        customer_notes: Option<String>,
    ) -> PlaceOrderRequest {
        PlaceOrderRequest {
            items: self
                .items
                .iter()
                .map(|i| PlaceOrderItem {
                    id: i.id.to_string(),
                    quantity: i64::from(i.quantity),
                    options: i.options.clone(),
                })
                .collect(),
            table_id: table_id.map(|t| t.to_string()),
            customer_notes,
        }
    }

    /// Build the payment-session payload for an order placed from this cart
    pub fn to_checkout_request(
        &self,
        order_id: Uuid,
        table_id: Option<Uuid>,
    ) -> Option<CheckoutRequest> {
        let store_id = self.store_id()?;
        Some(CheckoutRequest {
            items: self
                .items
                .iter()
                .map(|i| CheckoutItem {
                    id: i.id.to_string(),
                    name: i.name.clone(),
                    price: i.price,
                    quantity: i64::from(i.quantity),
                })
                .collect(),
            store_id: store_id.to_string(),
            table_id: table_id.map(|t| t.to_string()),
            order_id: order_id.to_string(),
        })
    }

    fn persist(&self) {
        let payload = PersistedCart {
            items: self.items.clone(),
        };
        let result = serde_json::to_string(&payload)
            .map_err(std::io::Error::other)
            .and_then(|json| self.storage.save(CART_STORAGE_KEY, &json));
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist cart");
        }
    }
}

/// Drop lines a healthy cart can never contain
fn sanitize(items: Vec<CartItem>) -> Vec<CartItem> {
    let Some(store_id) = items.first().map(|i| i.store_id) else {
        return items;
    };
    let mut clean: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity == 0 || item.store_id != store_id {
            continue;
        }
        match clean.iter_mut().find(|c| c.id == item.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => clean.push(item),
        }
    }
    clean
}
