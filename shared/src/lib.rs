//! Shared types for the restaurant ordering platform
//!
//! Types used by both the cloud server and front-ends: error codes and
//! response envelopes, order/menu models, API payloads, kitchen live-feed
//! messages and the client-side cart.

pub mod cart;
pub mod error;
pub mod kitchen;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
