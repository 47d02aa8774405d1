//! Data models
//!
//! Shared between the cloud server and front-ends (via API).
//! All IDs are UUIDs; money is `rust_decimal::Decimal`.

pub mod menu_item;
pub mod order;

// Re-exports
pub use menu_item::*;
pub use order::*;
