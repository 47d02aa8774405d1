//! Error codes returned to the storefront and kitchen clients
//!
//! The leading digit is the category (see [`super::ErrorCategory`]).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric error code carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    /// Malformed body, bad identifier, empty cart
    ValidationFailed = 2,

    NotAuthenticated = 1001,
    TokenExpired = 1003,
    TokenInvalid = 1004,

    /// Valid token, wrong role or no tenant
    PermissionDenied = 2001,

    /// Store exists but has no owning tenant
    TenantNotFound = 3002,

    OrderNotFound = 4001,
    /// Nothing in the cart resolved to a menu item of the store
    OrderEmpty = 4007,
    InvalidStatusTransition = 4008,
    /// Header written, lines not
    OrderItemsNotSaved = 4009,

    PaymentSessionFailed = 5006,
    WebhookSignatureInvalid = 5007,

    DatabaseError = 9002,
    /// Per-tenant connection cap reached
    ResourceLimitExceeded = 9006,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 14] = [
        Self::ValidationFailed,
        Self::NotAuthenticated,
        Self::TokenExpired,
        Self::TokenInvalid,
        Self::PermissionDenied,
        Self::TenantNotFound,
        Self::OrderNotFound,
        Self::OrderEmpty,
        Self::InvalidStatusTransition,
        Self::OrderItemsNotSaved,
        Self::PaymentSessionFailed,
        Self::WebhookSignatureInvalid,
        Self::DatabaseError,
        Self::ResourceLimitExceeded,
    ];

    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Default message when the caller does not supply one
    pub const fn message(&self) -> &'static str {
        match self {
            Self::ValidationFailed => "Validation failed",
            Self::NotAuthenticated => "Sign-in required",
            Self::TokenExpired => "Session has expired",
            Self::TokenInvalid => "Session token is invalid",
            Self::PermissionDenied => "Kitchen staff only",
            Self::TenantNotFound => "Store is not configured",
            Self::OrderNotFound => "Order not found",
            Self::OrderEmpty => "None of the selected items are available",
            Self::InvalidStatusTransition => "Status change is not allowed",
            Self::OrderItemsNotSaved => "Order received but its items were not saved",
            Self::PaymentSessionFailed => "Payment could not be started",
            Self::WebhookSignatureInvalid => "Webhook signature is invalid",
            Self::DatabaseError => "Database error",
            Self::ResourceLimitExceeded => "Too many connections",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown error code {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == value)
            .ok_or(InvalidErrorCode(value))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
