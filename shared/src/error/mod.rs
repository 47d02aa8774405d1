//! Error codes and the error body shared by the server and its clients
//!
//! Code ranges: 0xxx general, 1xxx auth, 2xxx permission, 3xxx tenant/store,
//! 4xxx order, 5xxx payment, 9xxx system.
//!
//! ```
//! use shared::error::{ApiResponse, AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::OrderItemsNotSaved).with_detail("order_id", "o-1");
//! let body = ApiResponse::from(&err);
//! assert_eq!(body.code, 4009);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError};
