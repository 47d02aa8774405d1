//! Ordering domain: placement, kitchen status and the kitchen board

pub mod board;
pub mod error;
pub mod placement;
pub mod status;

pub use error::{OrderError, OrderResult};
