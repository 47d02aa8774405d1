//! Menu Item Model
//!
//! Menu items are owned by the menu admin pages; the ordering flow only reads them
//! to get authoritative prices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    pub id: Uuid,
    pub store_id: Uuid,
    /// Tenant owning the item's store (joined from `stores`)
    pub tenant_id: Option<Uuid>,
    pub name: String,
    /// Authoritative unit price
    pub price: Decimal,
    pub is_available: bool,
}
