//! Ordering API types
//!
//! Request/response payloads exchanged between the storefront, the kitchen
//! console and the cloud server.

pub mod types;

// Re-exports
pub use types::*;
